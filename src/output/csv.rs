//! Delimited text export

use std::io::Write;

use termcolor::WriteColor;

use crate::config::Config;
use crate::error::Result;
use crate::merge::MergeResult;
use crate::model::Table;

use super::OutputFormatter;

/// Writes the full merged table as delimited text
pub struct CsvOutput;

impl CsvOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CsvOutput {
    fn render(
        &self,
        result: &MergeResult,
        config: &Config,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        write_csv(&result.table, writer, config.output_delimiter)
    }
}

/// Write `table` with a header row and no row index. Nulls become empty
/// fields; a table without columns writes nothing.
pub fn write_csv<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    if table.column_count() == 0 {
        return Ok(());
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(table.column_names())?;
    for row in &table.rows {
        for cell in &row.cells {
            csv_writer.write_field(cell.to_field().as_bytes())?;
        }
        csv_writer.write_record(None::<&[u8]>)?;
    }
    csv_writer.flush()?;
    Ok(())
}
