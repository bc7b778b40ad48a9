//! Row key handling for matching records across tables

use rustc_hash::FxHashMap;

use super::table::{CellValue, Row, Table};

/// Identity of a row: either its key cell or all of its cells
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(Vec<CellValue>);

/// Builder for computing row keys
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    column_indices: Vec<usize>,
}

impl KeyBuilder {
    /// Key over every column of the row
    pub fn whole_row() -> Self {
        Self::default()
    }

    /// Set the key columns by index
    pub fn with_columns(indices: Vec<usize>) -> Self {
        Self {
            column_indices: indices,
        }
    }

    /// Key on one named column; `None` when the table does not have it
    pub fn for_column(table: &Table, name: &str) -> Option<Self> {
        table.column_index(name).map(|i| Self::with_columns(vec![i]))
    }

    /// Build a key from a row's cells
    pub fn build_key(&self, row: &Row) -> RowKey {
        if self.column_indices.is_empty() {
            RowKey(row.cells.clone())
        } else {
            RowKey(
                self.column_indices
                    .iter()
                    .map(|&i| row.cells.get(i).cloned().unwrap_or(CellValue::Null))
                    .collect(),
            )
        }
    }

    /// Index every key in `table` to the positions of the rows carrying it
    pub fn index(&self, table: &Table) -> FxHashMap<RowKey, Vec<usize>> {
        let mut index: FxHashMap<RowKey, Vec<usize>> = FxHashMap::default();
        for (pos, row) in table.rows.iter().enumerate() {
            index.entry(self.build_key(row)).or_default().push(pos);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_on_named_column() {
        let table = Table::from_records(&["id", "v"], &[&["1", "x"], &["2", "y"], &["1", "z"]]);
        let builder = KeyBuilder::for_column(&table, "id").unwrap();

        assert_eq!(builder.build_key(&table.rows[0]), builder.build_key(&table.rows[2]));
        assert_ne!(builder.build_key(&table.rows[0]), builder.build_key(&table.rows[1]));

        let index = builder.index(&table);
        assert_eq!(index.len(), 2);
        assert_eq!(index[&builder.build_key(&table.rows[0])], vec![0, 2]);
    }

    #[test]
    fn test_whole_row_key() {
        let table = Table::from_records(&["id", "v"], &[&["1", "x"], &["1", "y"]]);
        let builder = KeyBuilder::whole_row();
        assert_ne!(builder.build_key(&table.rows[0]), builder.build_key(&table.rows[1]));
    }

    #[test]
    fn test_missing_column() {
        let table = Table::with_column_names(["id"]);
        assert!(KeyBuilder::for_column(&table, "nope").is_none());
    }

    #[test]
    fn test_null_keys_match_each_other() {
        let mut table = Table::with_column_names(["id"]);
        table.add_row(vec![CellValue::Null], 0, 2);
        table.add_row(vec![CellValue::Null], 0, 3);
        let builder = KeyBuilder::with_columns(vec![0]);
        assert_eq!(builder.build_key(&table.rows[0]), builder.build_key(&table.rows[1]));
    }
}
