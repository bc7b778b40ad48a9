//! Concatenation and duplicate removal

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::model::{KeyBuilder, Schema, Table};

use super::progress::Progress;

/// Stack the rows of all tables in input order over the union of their columns
pub(super) fn concat(tables: &[Table], progress: &mut Progress<'_>) -> Table {
    let schema = Schema::union_of(tables);
    let mut out = schema.empty_table();
    out.rows.reserve(tables.iter().map(Table::row_count).sum());

    for (source, table) in tables.iter().enumerate() {
        let mapping = schema.mapping_for(table);
        out.rows.extend(table.rows.iter().map(|row| {
            let mut row = mapping.project(row);
            row.source_table = source;
            row
        }));
        debug!(source, rows = table.row_count(), "appended table");
        progress.step();
    }

    out
}

/// Remove rows whose key was already seen, keeping either the first or the
/// last occurrence. Survivors stay in their original order. With no key
/// column the whole row is the key. Returns the number of rows dropped.
pub(super) fn drop_duplicates(table: &mut Table, key: Option<&str>, keep_last: bool) -> usize {
    let builder = match key {
        Some(name) => match KeyBuilder::for_column(table, name) {
            Some(builder) => builder,
            None => return 0,
        },
        None => KeyBuilder::whole_row(),
    };

    let mut seen = FxHashSet::default();
    let mut keep = vec![false; table.row_count()];
    let positions: Box<dyn Iterator<Item = usize>> = if keep_last {
        Box::new((0..table.row_count()).rev())
    } else {
        Box::new(0..table.row_count())
    };
    for pos in positions {
        keep[pos] = seen.insert(builder.build_key(&table.rows[pos]));
    }

    let before = table.row_count();
    let mut flags = keep.into_iter();
    table.rows.retain(|_| flags.next().unwrap_or(false));
    let dropped = before - table.row_count();
    debug!(dropped, keep_last, "dropped duplicate rows");
    dropped
}
