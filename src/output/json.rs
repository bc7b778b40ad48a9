//! JSON output format

use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;
use termcolor::WriteColor;

use crate::config::{Config, ConflictPolicy, MergeStrategy};
use crate::error::Result;
use crate::merge::{MergeResult, MergeStats};
use crate::model::{CellType, CellValue};

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    cell_type: CellType,
}

#[derive(Serialize)]
struct JsonMergeOutput<'a> {
    inputs: Vec<String>,
    strategy: MergeStrategy,
    conflict_policy: ConflictPolicy,
    key_column: Option<&'a str>,
    columns: Vec<JsonColumn<'a>>,
    rows: Vec<IndexMap<&'a str, serde_json::Value>>,
    stats: &'a MergeStats,
}

fn cell_value_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::json!(*i),
        CellValue::Float(f) => serde_json::json!(*f),
        other => serde_json::Value::String(other.display().into_owned()),
    }
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        result: &MergeResult,
        config: &Config,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        let table = &result.table;
        let rows: Vec<IndexMap<&str, serde_json::Value>> = table
            .rows
            .iter()
            .map(|row| {
                table
                    .column_names()
                    .zip(&row.cells)
                    .map(|(name, cell)| (name, cell_value_to_json(cell)))
                    .collect()
            })
            .collect();

        let output = JsonMergeOutput {
            inputs: config
                .input_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            strategy: config.merge.strategy,
            conflict_policy: config.merge.conflict_policy,
            key_column: config.merge.key_column.as_deref(),
            columns: table
                .columns
                .iter()
                .map(|c| JsonColumn {
                    name: &c.name,
                    cell_type: c.inferred_type,
                })
                .collect(),
            rows,
            stats: &result.stats,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
