//! csvmerge - Merge tabular data files

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvmerge::config::{Config, ConflictPolicy, MergeConfig, MergeStrategy, OutputFormat};
use csvmerge::merge::MergeEngine;
use csvmerge::output::{render, stdout_stream, write_stats};
use csvmerge::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStrategy {
    Append,
    Union,
    Intersection,
    Update,
}

impl From<CliStrategy> for MergeStrategy {
    fn from(s: CliStrategy) -> Self {
        match s {
            CliStrategy::Append => MergeStrategy::Append,
            CliStrategy::Union => MergeStrategy::Union,
            CliStrategy::Intersection => MergeStrategy::Intersection,
            CliStrategy::Update => MergeStrategy::Update,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliConflictPolicy {
    KeepFirst,
    KeepLast,
    KeepLonger,
    MergeValues,
}

impl From<CliConflictPolicy> for ConflictPolicy {
    fn from(p: CliConflictPolicy) -> Self {
        match p {
            CliConflictPolicy::KeepFirst => ConflictPolicy::KeepFirst,
            CliConflictPolicy::KeepLast => ConflictPolicy::KeepLast,
            CliConflictPolicy::KeepLonger => ConflictPolicy::KeepLonger,
            CliConflictPolicy::MergeValues => ConflictPolicy::MergeValues,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Csv,
    Preview,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Preview => OutputFormat::Preview,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Merge tabular data files (CSV, JSON)
#[derive(Parser, Debug)]
#[command(name = "csvmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files to merge, in order (at least two)
    #[arg(required = true, num_args = 2..)]
    files: Vec<PathBuf>,

    /// How the files are combined
    #[arg(short, long, value_enum, default_value = "append")]
    strategy: CliStrategy,

    /// Which row wins when keys collide
    #[arg(short, long, value_enum, default_value = "keep-first")]
    conflict: CliConflictPolicy,

    /// Column identifying the same record across files
    #[arg(short, long)]
    key: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: CliOutputFormat,

    /// Rows shown by the preview format
    #[arg(long, default_value_t = csvmerge::config::DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Input field delimiter (auto-detected when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// Field delimiter for CSV output
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    output_delimiter: u8,

    /// Only show statistics, not the merged rows
    #[arg(long)]
    stats_only: bool,
}

/// Accept a single ASCII character, or `\t` / `tab` for tabs
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut merge =
        MergeConfig::new(cli.strategy.into()).with_conflict_policy(cli.conflict.into());
    if let Some(key) = cli.key {
        merge = merge.with_key_column(key);
    }

    let mut config = Config::new(cli.files)
        .with_merge(merge)
        .with_output_format(cli.format.into())
        .with_preview_rows(cli.preview_rows)
        .with_output_delimiter(cli.output_delimiter)
        .with_stats_only(cli.stats_only);
    if let Some(delimiter) = cli.delimiter {
        config = config.with_delimiter(delimiter);
    }
    if let Some(output) = cli.output {
        config = config.with_output_file(output);
    }

    let tables = ParserFactory::new()
        .load_all(&config.input_files, &config)
        .context("Failed to load input files")?;

    let mut report = |done: usize, total: usize| {
        info!(done, total, percent = done * 100 / total.max(1), "merge progress");
    };
    let result = MergeEngine::new(config.merge.clone())
        .merge_with_progress(&tables, &mut report)
        .context("Merge failed")?;

    if config.stats_only {
        let mut stdout = stdout_stream();
        write_stats(&result, &mut stdout)?;
        return Ok(());
    }

    render(&result, &config).with_context(|| match &config.output_file {
        Some(path) => format!("Failed to write {}", path.display()),
        None => "Failed to write output".to_string(),
    })?;

    if let Some(path) = &config.output_file {
        info!(path = %path.display(), rows = result.stats.output_rows, "wrote merged file");
    }

    Ok(())
}
