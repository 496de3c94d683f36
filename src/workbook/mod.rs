use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader, Read, Seek},
    path::{Path, PathBuf},
    sync::Arc,
};

use quick_xml::{Reader as XmlReader, events::Event};
use tracing::debug;
use zip::{ZipArchive, result::ZipError};

use crate::{Result, error::SheetError};

pub mod cell;
pub mod rows;

pub use cell::Cell;
pub use rows::{Row, RowIter};

const WORKBOOK_XML: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

#[inline]
pub(crate) fn attr_val(attr: &quick_xml::events::attributes::Attribute) -> String {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_default()
}

/// Read-only view of an `.xlsx` workbook: sheet order plus the shared-string
/// table. Worksheet XML is loaded when rows are requested.
pub struct XlsxReader {
    path: PathBuf,
    sheet_paths: HashMap<String, String>,
    sheet_order: Vec<String>,
    shared_strings: Arc<Vec<String>>,
}

impl XlsxReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut archive = open_archive(path)?;

        let (sheet_order, rid_to_name) = parse_workbook(&mut archive)?;
        let rid_to_path = parse_workbook_rels(&mut archive)?;

        let sheet_paths: HashMap<String, String> = rid_to_name
            .into_iter()
            .filter_map(|(rid, name)| rid_to_path.get(&rid).map(|p| (name, p.clone())))
            .collect();

        let shared_strings = Arc::new(parse_shared_strings(&mut archive)?);

        debug!(
            path = %path.display(),
            sheets = sheet_order.len(),
            shared_strings = shared_strings.len(),
            "opened workbook"
        );

        Ok(XlsxReader {
            path: path.to_path_buf(),
            sheet_paths,
            sheet_order,
            shared_strings,
        })
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_order
    }

    /// Name of the first worksheet in workbook order.
    pub fn first_sheet(&self) -> Result<&str> {
        self.sheet_order
            .first()
            .map(String::as_str)
            .ok_or_else(|| SheetError::Parse("workbook declares no worksheets".into()))
    }

    pub fn rows(&self, sheet_name: &str) -> Result<RowIter> {
        let zip_path = self
            .sheet_paths
            .get(sheet_name)
            .ok_or_else(|| SheetError::SheetNotFound(sheet_name.to_string()))?;

        let mut archive = open_archive(&self.path)?;
        let xml = slurp_entry(&mut archive, zip_path)?;

        Ok(RowIter::new(xml, Arc::clone(&self.shared_strings)))
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SheetError::NotFound(path.to_path_buf()),
        _ => SheetError::Io(e),
    })?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

fn parse_workbook<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<(Vec<String>, HashMap<String, String>)> {
    let bytes = slurp_entry(archive, WORKBOOK_XML)?;
    let mut xml = XmlReader::from_reader(bytes.as_slice());
    xml.config_mut().trim_text(true);

    let mut order = Vec::new();
    let mut rid_map = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let (mut name, mut rid) = (String::new(), String::new());
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = attr_val(&attr),
                        b"r:id" | b"id" => rid = attr_val(&attr),
                        _ => {}
                    }
                }
                if !name.is_empty() && !rid.is_empty() {
                    order.push(name.clone());
                    rid_map.insert(rid, name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((order, rid_map))
}

fn parse_workbook_rels<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<HashMap<String, String>> {
    let bytes = slurp_entry(archive, WORKBOOK_RELS)?;
    let mut xml = XmlReader::from_reader(bytes.as_slice());
    xml.config_mut().trim_text(true);

    let mut map = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let (mut id, mut target, mut is_sheet) = (String::new(), String::new(), false);
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = attr_val(&attr),
                        b"Target" => target = attr_val(&attr),
                        b"Type" => is_sheet = attr_val(&attr).ends_with("/worksheet"),
                        _ => {}
                    }
                }
                if is_sheet && !id.is_empty() {
                    map.insert(id, normalize_path(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(map)
}

fn parse_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let entry = match archive.by_name(SHARED_STRINGS) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut xml = XmlReader::from_reader(BufReader::with_capacity(64 * 1024, entry));
    xml.config_mut().trim_text(false);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = !in_phonetic,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Text(ref e) if in_t => current.push_str(&e.unescape()?),
            Event::CData(ref e) if in_t => current.push_str(&String::from_utf8_lossy(&**e)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn slurp_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(path).map_err(|e| match e {
        ZipError::FileNotFound => SheetError::Parse(format!("workbook is missing '{path}'")),
        e => e.into(),
    })?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    io::copy(&mut entry, &mut buf)?;
    Ok(buf)
}

fn normalize_path(target: &str) -> String {
    let t = target.trim_start_matches('/');
    if t.starts_with("xl/") {
        t.to_string()
    } else {
        format!("xl/{t}")
    }
}
