use std::{io::Cursor, sync::Arc};

use quick_xml::{Reader as XmlReader, events::Event};

use crate::{
    Result,
    error::SheetError,
    workbook::{attr_val, cell::Cell},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based row number as stored in the sheet.
    pub index: u32,
    pub cells: Vec<Cell>,
}

/// Walks `<sheetData>` and yields one [`Row`] per stored `<row>` that has at
/// least one cell.
pub struct RowIter {
    xml: XmlReader<Cursor<Vec<u8>>>,
    shared_strings: Arc<Vec<String>>,
    state: ParseState,
    buf: Vec<u8>,
    done: bool,
}

struct ParseState {
    row: Vec<Cell>,
    row_index: u32,
    col: u32,
    next_col: u32,
    cell_ref: String,
    cell_type: CellType,
    in_v: bool,
    in_t: bool,
    in_phonetic: bool,
    value_buf: String,
    in_row: bool,
}

#[derive(Clone, Copy)]
enum CellType {
    Number,
    SharedStr,
    Inline,
    Bool,
    Str,
    Error,
}

impl ParseState {
    fn new() -> Self {
        ParseState {
            row: Vec::new(),
            row_index: 0,
            col: 0,
            next_col: 0,
            cell_ref: String::new(),
            cell_type: CellType::Number,
            in_v: false,
            in_t: false,
            in_phonetic: false,
            value_buf: String::new(),
            in_row: false,
        }
    }
}

impl RowIter {
    pub(crate) fn new(xml: Vec<u8>, shared_strings: Arc<Vec<String>>) -> Self {
        let mut reader = XmlReader::from_reader(Cursor::new(xml));
        reader.config_mut().trim_text(false);

        RowIter {
            xml: reader,
            shared_strings,
            state: ParseState::new(),
            buf: Vec::with_capacity(256),
            done: false,
        }
    }

    fn start_row(&mut self, e: &quick_xml::events::BytesStart) {
        let mut index = None;
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"r" {
                index = attr_val(&attr).parse().ok();
            }
        }
        self.state.row_index = index.unwrap_or(self.state.row_index + 1);
        self.state.row.clear();
        self.state.next_col = 0;
        self.state.in_row = true;
    }

    fn start_cell(&mut self, e: &quick_xml::events::BytesStart) -> Result<()> {
        let mut col_ref = String::new();
        let mut cell_type = CellType::Number;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => col_ref = attr_val(&attr),
                b"t" => {
                    cell_type = match attr_val(&attr).as_str() {
                        "s" => CellType::SharedStr,
                        "inlineStr" => CellType::Inline,
                        "b" => CellType::Bool,
                        // ISO 8601 dates are kept as written
                        "str" | "d" => CellType::Str,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }
                _ => {}
            }
        }

        self.state.col = col_ref_to_index(&col_ref)?.unwrap_or(self.state.next_col);
        self.state.cell_ref = col_ref;
        self.state.cell_type = cell_type;
        self.state.value_buf.clear();
        self.state.in_v = false;
        self.state.in_t = false;
        self.state.in_phonetic = false;
        Ok(())
    }

    fn finish_cell(&mut self) -> Result<()> {
        let raw = std::mem::take(&mut self.state.value_buf);
        let value = match self.state.cell_type {
            _ if raw.is_empty() => Cell::Empty,
            CellType::Number => {
                let n = raw.trim().parse::<f64>().map_err(|_| {
                    SheetError::Parse(format!(
                        "invalid number '{raw}' in cell {}",
                        self.state.cell_ref
                    ))
                })?;
                Cell::Number(n)
            }
            CellType::SharedStr => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    SheetError::Parse(format!(
                        "invalid shared string index '{raw}' in cell {}",
                        self.state.cell_ref
                    ))
                })?;
                let s = self.shared_strings.get(idx).ok_or_else(|| {
                    SheetError::Parse(format!(
                        "shared string {idx} out of range in cell {}",
                        self.state.cell_ref
                    ))
                })?;
                Cell::Text(s.clone())
            }
            CellType::Bool => Cell::Bool(raw.trim() == "1"),
            CellType::Error => Cell::Error(raw),
            CellType::Inline | CellType::Str => Cell::Text(raw),
        };
        let col = self.state.col as usize;
        let row = &mut self.state.row;
        if col < row.len() {
            // out-of-order or repeated reference: last value wins
            row[col] = value;
        } else {
            row.resize(col, Cell::Empty);
            row.push(value);
        }
        self.state.next_col = row.len() as u32;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Row>> {
        loop {
            self.buf.clear();

            let event = self.xml.read_event_into(&mut self.buf)?.into_owned();
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => self.start_row(&e),
                    b"c" => self.start_cell(&e)?,
                    b"v" => self.state.in_v = true,
                    b"t" => self.state.in_t = !self.state.in_phonetic,
                    b"rPh" => self.state.in_phonetic = true,
                    _ => {}
                },

                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => {
                        self.start_row(&e);
                        self.state.in_row = false;
                    }
                    b"c" => {
                        self.start_cell(&e)?;
                        self.finish_cell()?;
                    }
                    _ => {}
                },

                Event::Text(e) => {
                    if self.state.in_v || self.state.in_t {
                        let text = e.unescape()?.into_owned();
                        self.state.value_buf.push_str(&text);
                    }
                }

                Event::CData(e) => {
                    if self.state.in_v || self.state.in_t {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        self.state.value_buf.push_str(&text);
                    }
                }

                Event::End(e) => match e.local_name().as_ref() {
                    b"v" => self.state.in_v = false,
                    b"t" => self.state.in_t = false,
                    b"rPh" => self.state.in_phonetic = false,
                    b"c" => self.finish_cell()?,
                    b"row" => {
                        if self.state.in_row && !self.state.row.is_empty() {
                            self.state.in_row = false;
                            return Ok(Some(Row {
                                index: self.state.row_index,
                                cells: std::mem::take(&mut self.state.row),
                            }));
                        }
                        self.state.in_row = false;
                    }
                    b"sheetData" => return Ok(None),
                    _ => {}
                },

                Event::Eof => return Ok(None),

                _ => {}
            }
        }
    }
}

impl Iterator for RowIter {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.step() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Last column a worksheet can hold (`XFD`).
const MAX_COL: u32 = 16_383;

/// Zero-based column of a cell reference such as `B7` or `AA12`.
/// `None` when the reference carries no column letters.
pub(crate) fn col_ref_to_index(cell_ref: &str) -> Result<Option<u32>> {
    let letters: &str = cell_ref
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or("");
    if letters.is_empty() {
        return Ok(None);
    }
    let out_of_range = || SheetError::Parse(format!("column out of range in cell {cell_ref}"));
    if letters.len() > 3 {
        return Err(out_of_range());
    }
    let n = letters.bytes().fold(0u32, |acc, b| {
        acc * 26 + (b.to_ascii_uppercase() - b'A') as u32 + 1
    });
    if n - 1 > MAX_COL {
        return Err(out_of_range());
    }
    Ok(Some(n - 1))
}
