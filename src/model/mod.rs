//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::{KeyBuilder, RowKey};
pub use schema::{CellType, Column, ColumnMapping, Schema};
pub use table::{CellValue, Row, Table};
