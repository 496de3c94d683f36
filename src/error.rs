use std::{io, path::PathBuf};

use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid workbook archive: {0}")]
    Zip(#[from] ZipError),

    #[error("malformed workbook xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for SheetError {
    fn from(e: csv::Error) -> SheetError {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => SheetError::Io(io),
            kind => SheetError::Csv(format!("{kind:?}")),
        }
    }
}

impl SheetError {
    /// True for failures caused by the input not being a readable workbook.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            SheetError::Parse(_) | SheetError::Zip(_) | SheetError::Xml(_)
        )
    }
}
