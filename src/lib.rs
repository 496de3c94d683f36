pub mod convert;
pub mod coordinates;
pub mod dataset;
pub mod error;
pub mod workbook;

pub use convert::{convert, read_dataset, write_csv};
pub use coordinates::{Coordinate, read_coordinates};
pub use dataset::Dataset;
pub use error::SheetError;

pub(crate) type Result<T> = std::result::Result<T, error::SheetError>;
