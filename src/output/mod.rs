//! Output formatting for merge results

mod csv;
mod json;
mod terminal;

use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::Path;

use termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::merge::MergeResult;

pub use self::csv::{write_csv, CsvOutput};
pub use self::json::JsonOutput;
pub use self::terminal::{write_stats, PreviewOutput};

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a merge result to a writer
    fn render(
        &self,
        result: &MergeResult,
        config: &Config,
        writer: &mut dyn WriteColor,
    ) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Csv => Box::new(CsvOutput::new()),
            OutputFormat::Preview => Box::new(PreviewOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Colored stdout when attached to a terminal, plain otherwise
pub fn stdout_stream() -> StandardStream {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Render a merge result to stdout
pub fn render_to_stdout(result: &MergeResult, config: &Config) -> Result<()> {
    let formatter = OutputFactory::create(config.output_format);
    let mut stdout = stdout_stream();
    formatter.render(result, config, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Render a merge result into a file, replacing it if it exists
pub fn render_to_path(result: &MergeResult, config: &Config, path: &Path) -> Result<()> {
    let formatter = OutputFactory::create(config.output_format);
    let mut writer = NoColor::new(BufWriter::new(File::create(path)?));
    formatter.render(result, config, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Render to the configured output file, or stdout when none is set
pub fn render(result: &MergeResult, config: &Config) -> Result<()> {
    match &config.output_file {
        Some(path) => render_to_path(result, config, path),
        None => render_to_stdout(result, config),
    }
}
