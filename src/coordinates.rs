use std::{fs::File, io, io::Read, path::Path};

use tracing::debug;

use crate::{Result, error::SheetError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Read `(x, y)` points from a converted CSV file. The header line is
/// skipped and the first two fields of each record are the coordinates.
pub fn read_coordinates<P: AsRef<Path>>(path: P) -> Result<Vec<Coordinate>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SheetError::NotFound(path.to_path_buf()),
        _ => SheetError::Io(e),
    })?;
    let points = parse_coordinates(file)?;
    debug!(path = %path.display(), points = points.len(), "read coordinates");
    Ok(points)
}

pub fn parse_coordinates<R: Read>(input: R) -> Result<Vec<Coordinate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let field = |i: usize| -> Result<f64> {
            let raw = record.get(i).ok_or_else(|| {
                SheetError::Parse(format!("line {line}: expected 2 fields, found {}", record.len()))
            })?;
            raw.trim()
                .parse()
                .map_err(|_| SheetError::Parse(format!("line {line}: '{raw}' is not a number")))
        };

        points.push(Coordinate {
            x: field(0)?,
            y: field(1)?,
        });
    }
    Ok(points)
}
