use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{Result, dataset::Dataset, workbook::XlsxReader};

pub const INPUT_PATH: &str = "coordinates.xlsx";
pub const OUTPUT_PATH: &str = "coordinates.csv";

/// Load the first worksheet of the workbook at `path`.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let reader = XlsxReader::open(path)?;
    let sheet = reader.first_sheet()?;
    debug!(sheet, "reading first worksheet");

    let rows = reader.rows(sheet)?.collect::<Result<Vec<_>>>()?;
    Ok(Dataset::from_rows(rows))
}

/// Write `dataset` as CSV: header line, then one line per row. Returns the
/// number of data rows written.
pub fn write_csv<W: Write>(dataset: &Dataset, out: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    if dataset.is_empty() {
        writer.flush()?;
        return Ok(0);
    }

    writer.write_record(&dataset.headers)?;
    for row in &dataset.rows {
        writer.write_record(row.iter().map(|c| c.to_field()))?;
    }
    writer.flush()?;
    Ok(dataset.rows.len())
}

/// Convert the first worksheet of `input` into a CSV file at `output`.
///
/// The input is fully parsed before `output` is created, so a missing or
/// malformed workbook never leaves an output file behind. An existing output
/// file is truncated.
pub fn convert<P, Q>(input: P, output: Q) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let dataset = read_dataset(input)?;
    let file = BufWriter::new(File::create(output)?);
    let n = write_csv(&dataset, file)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rows = n,
        columns = dataset.width(),
        "converted worksheet"
    );
    Ok(n)
}
