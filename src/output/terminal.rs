//! Terminal preview of a merge result

use std::io::Write;

use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::Config;
use crate::error::Result;
use crate::merge::MergeResult;
use crate::model::Table;

use super::OutputFormatter;

/// Summary plus the first rows of the merged table
pub struct PreviewOutput;

impl PreviewOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, config: &Config, writer: &mut dyn WriteColor) -> Result<()> {
        let rule = "━".repeat(64);
        writeln!(writer, "{}", rule)?;
        write!(
            writer,
            " csvmerge: {} of {} files",
            config.merge.strategy,
            config.input_files.len()
        )?;
        if let Some(key) = &config.merge.key_column {
            write!(writer, " (key: {}, {})", key, config.merge.conflict_policy)?;
        }
        writeln!(writer)?;
        for path in &config.input_files {
            writeln!(writer, "   {}", path.display())?;
        }
        writeln!(writer, "{}", rule)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_rows(&self, table: &Table, limit: usize, writer: &mut dyn WriteColor) -> Result<()> {
        if table.column_count() == 0 {
            writeln!(writer, "No columns in result.")?;
            return Ok(());
        }

        let shown = table.head(limit);
        if shown.len() < table.row_count() {
            writeln!(
                writer,
                "Preview: first {} of {} rows",
                shown.len(),
                table.row_count()
            )?;
        }

        let mut builder = Builder::default();
        builder.push_record(
            table
                .columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.inferred_type)),
        );
        for row in shown {
            builder.push_record(row.cells.iter().map(|c| c.display().into_owned()));
        }

        let mut rendered = builder.build();
        rendered.with(Style::modern());
        writeln!(writer, "{}", rendered)?;
        Ok(())
    }
}

impl Default for PreviewOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for PreviewOutput {
    fn render(
        &self,
        result: &MergeResult,
        config: &Config,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        self.write_header(config, writer)?;
        write_stats(result, writer)?;
        writeln!(writer)?;
        self.write_rows(&result.table, config.preview_rows, writer)?;
        Ok(())
    }
}

/// Write the row and column counts of a merge
pub fn write_stats(result: &MergeResult, writer: &mut dyn WriteColor) -> Result<()> {
    let stats = &result.stats;

    writer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(
        writer,
        "Result: {} rows, {} columns",
        stats.output_rows, stats.output_columns
    )?;
    writer.reset()?;
    writeln!(writer)?;

    let inputs: Vec<String> = stats.input_rows.iter().map(|n| n.to_string()).collect();
    writeln!(
        writer,
        "Input rows: {} (total {})",
        inputs.join(" + "),
        stats.total_input_rows()
    )?;

    if stats.duplicates_dropped > 0 {
        writer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(writer, "Duplicates dropped: {}", stats.duplicates_dropped)?;
        writer.reset()?;
        writeln!(writer)?;
    }
    if stats.rows_updated > 0 || stats.rows_appended > 0 {
        writeln!(
            writer,
            "Updated: {}  Appended: {}",
            stats.rows_updated, stats.rows_appended
        )?;
    }
    Ok(())
}
