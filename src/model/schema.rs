//! Column metadata and schema alignment across tables

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::table::{CellValue, Row, Table};

/// Inferred cell type for a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    Mixed,
}

impl CellType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            _ => CellType::Mixed,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CellType::Null => "null",
            CellType::Bool => "bool",
            CellType::Int => "int",
            CellType::Float => "float",
            CellType::String => "string",
            CellType::Date => "date",
            CellType::DateTime => "datetime",
            CellType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Inferred type from data
    pub inferred_type: CellType,
}

impl Column {
    /// Create a new column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            inferred_type: CellType::Null,
        }
    }
}

/// Ordered union of column names across several tables
#[derive(Debug, Clone, Default)]
pub struct Schema {
    names: IndexSet<String>,
}

impl Schema {
    /// Union of all columns in order of first appearance
    pub fn union_of<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        let mut schema = Self::default();
        for table in tables {
            schema.extend(table);
        }
        schema
    }

    /// Add the columns of `table` that are not present yet
    pub fn extend(&mut self, table: &Table) {
        for name in table.column_names() {
            if !self.names.contains(name) {
                self.names.insert(name.to_string());
            }
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    /// Empty table with this schema
    pub fn empty_table(&self) -> Table {
        Table::with_column_names(self.names.iter().cloned())
    }

    /// Mapping that places rows of `table` into this schema
    pub fn mapping_for(&self, table: &Table) -> ColumnMapping {
        let sources = self
            .names
            .iter()
            .map(|name| table.column_index(name))
            .collect();
        ColumnMapping { sources }
    }
}

/// For each target column, the source column index (if the source has it)
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    sources: Vec<Option<usize>>,
}

impl ColumnMapping {
    /// Re-order the cells of `row` into the target layout, null for gaps
    pub fn project(&self, row: &Row) -> Row {
        let cells = self
            .sources
            .iter()
            .map(|src| {
                src.and_then(|i| row.cells.get(i))
                    .cloned()
                    .unwrap_or(CellValue::Null)
            })
            .collect();
        Row::new(cells, row.source_table, row.source_line)
    }
}
