#![allow(dead_code)]

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use zip::{ZipWriter, write::SimpleFileOptions};

pub enum Value {
    Num(f64),
    /// Stored in the shared-string table.
    Shared(&'static str),
    Inline(&'static str),
    Bool(bool),
    Blank,
}

pub use Value::*;

/// Builds small `.xlsx` files for tests.
#[derive(Default)]
pub struct Fixture {
    sheets: Vec<(String, Vec<Vec<Value>>)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, rows: Vec<Vec<Value>>) -> Self {
        self.sheets.push((name.to_string(), rows));
        self
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut shared: Vec<&str> = Vec::new();
        let mut sheet_xml = Vec::new();
        for (_, rows) in &self.sheets {
            sheet_xml.push(worksheet_xml(rows, &mut shared));
        }

        let names: Vec<&str> = self.sheets.iter().map(|(n, _)| n.as_str()).collect();
        put(&mut zip, "[Content_Types].xml", &content_types_xml(names.len()), options);
        put(&mut zip, "_rels/.rels", RELS_DOT_RELS, options);
        put(&mut zip, "xl/workbook.xml", &workbook_xml(&names), options);
        put(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &workbook_rels_xml(names.len()),
            options,
        );
        if !shared.is_empty() {
            put(&mut zip, "xl/sharedStrings.xml", &shared_strings_xml(&shared), options);
        }
        for (i, xml) in sheet_xml.iter().enumerate() {
            put(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), xml, options);
        }
        zip.finish().unwrap();
        path
    }
}

/// A header row `[x, y]` followed by one row per point.
pub fn coordinates_sheet(points: &[(f64, f64)]) -> Vec<Vec<Value>> {
    let mut rows = vec![vec![Shared("x"), Shared("y")]];
    rows.extend(points.iter().map(|&(x, y)| vec![Num(x), Num(y)]));
    rows
}

fn put(zip: &mut ZipWriter<File>, path: &str, content: &str, options: SimpleFileOptions) {
    zip.start_file(path, options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
}

const RELS_DOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

fn workbook_xml(order: &[&str]) -> String {
    let sheets: String = order
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                xml_escape(name),
                i + 1,
                i + 1
            )
        })
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets>{}</sheets>"#,
            r#"</workbook>"#,
        ),
        sheets
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels: String = (1..=sheet_count)
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            )
        })
        .collect();
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 1
    ));

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"{}"#,
            r#"</Relationships>"#,
        ),
        rels
    )
}

fn content_types_xml(sheet_count: usize) -> String {
    let overrides: String = (1..=sheet_count)
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            )
        })
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"{}"#,
            r#"</Types>"#,
        ),
        overrides
    )
}

fn shared_strings_xml(strings: &[&str]) -> String {
    let items: String = strings
        .iter()
        .map(|s| format!(r#"<si><t xml:space="preserve">{}</t></si>"#, xml_escape(s)))
        .collect();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            r#"{1}</sst>"#,
        ),
        strings.len(),
        items
    )
}

fn worksheet_xml(rows: &[Vec<Value>], shared: &mut Vec<&'static str>) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData>"#,
    ));

    for (r, cells) in rows.iter().enumerate() {
        let row = r + 1;
        xml.push_str(&format!(r#"<row r="{row}">"#));
        for (col, value) in cells.iter().enumerate() {
            let cell_ref = format!("{}{row}", col_to_letters(col as u32));
            match value {
                Blank => {}
                Num(n) => xml.push_str(&format!(r#"<c r="{cell_ref}"><v>{n}</v></c>"#)),
                Shared(s) => {
                    let idx = match shared.iter().position(|x| x == s) {
                        Some(i) => i,
                        None => {
                            shared.push(*s);
                            shared.len() - 1
                        }
                    };
                    xml.push_str(&format!(r#"<c r="{cell_ref}" t="s"><v>{idx}</v></c>"#));
                }
                Inline(s) => xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    xml_escape(s)
                )),
                Bool(b) => xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="b"><v>{}</v></c>"#,
                    u8::from(*b)
                )),
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn col_to_letters(mut col: u32) -> String {
    let mut result = Vec::new();
    loop {
        result.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result.reverse();
    String::from_utf8(result).unwrap()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
