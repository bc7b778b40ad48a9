//! Delimited text parser with delimiter detection

use std::borrow::Cow;
use std::path::Path;

use crate::config::Config;
use crate::error::{MergeError, Result};
use crate::model::{CellValue, Table};

use super::Parser;

/// Delimiters tried by [`sniff_delimiter`], in order of preference
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Lines inspected when sniffing the delimiter
const SNIFF_LINES: usize = 20;

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MergeError::parse(path, format!("cannot read file: {}", e)))?;

        let delimiter = config
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(&contents));

        CsvParser::parse_str(&contents, delimiter).map_err(|e| match e {
            MergeError::Parse { message, .. } => MergeError::parse(path, message),
            other => other,
        })
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

impl CsvParser {
    /// Parse delimited text held in memory
    pub fn parse_str(contents: &str, delimiter: u8) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(contents.as_bytes());

        let headers = csv_reader
            .headers()
            .map_err(|e| MergeError::parse("<input>", format!("failed to read header: {}", e)))?
            .clone();

        if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
            return Err(MergeError::parse("<input>", "missing header row"));
        }

        let mut table = Table::with_column_names(column_names(headers.iter()));

        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let line = line_num + 2;
            let record = result
                .map_err(|e| MergeError::parse("<input>", format!("line {}: {}", line, e)))?;

            // Blank lines come through as a single empty field
            if record.len() == 1 && record[0].is_empty() && table.column_count() > 1 {
                continue;
            }

            if record.len() > table.column_count() {
                return Err(MergeError::parse(
                    "<input>",
                    format!(
                        "line {}: expected {} fields, found {}",
                        line,
                        table.column_count(),
                        record.len()
                    ),
                ));
            }

            let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
            table.add_row(cells, 0, line);
        }

        table.infer_column_types();
        Ok(table)
    }
}

/// Name header fields, filling blanks and de-duplicating repeats
fn column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, raw) in headers.enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

/// Guess the field delimiter from the first lines of `contents`.
///
/// Each candidate splits the sample lines into records; the candidate for
/// which the most lines share one field count greater than one wins. Ties go
/// to the earlier candidate, and `,` is returned when nothing splits.
pub fn sniff_delimiter(contents: &str) -> u8 {
    let sample: String = contents
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let mut best = (b',', 0usize);
    for &delimiter in &CANDIDATE_DELIMITERS {
        let score = consistency_score(&sample, delimiter);
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

/// Number of sample records that share the most common field count (> 1)
fn consistency_score(sample: &str, delimiter: u8) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(sample.as_bytes());

    let mut counts: rustc_hash::FxHashMap<usize, usize> = rustc_hash::FxHashMap::default();
    for record in reader.records() {
        match record {
            Ok(r) if r.len() > 1 => *counts.entry(r.len()).or_default() += 1,
            Ok(_) => {}
            Err(_) => return 0,
        }
    }
    counts.values().copied().max().unwrap_or(0)
}

/// Parse a string value into a CellValue with type inference
pub fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed == "NA"
        || trimmed == "NaN"
    {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Only fractions and exponents become floats. Integers too wide for i64
    // stay text so long identifiers keep every digit; "inf" stays text too
    let has_digit = trimmed.bytes().any(|b| b.is_ascii_digit());
    let has_fraction = trimmed.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'));
    if has_digit && has_fraction {
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Text is kept verbatim so it survives export unchanged
    CellValue::String(Cow::Owned(s.to_string()))
}
