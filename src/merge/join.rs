//! Inner join used by the intersection strategy

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{MergeError, Result};
use crate::model::{CellValue, KeyBuilder, Row, Table};

use super::progress::Progress;

/// Fold `tables` left to right with inner joins.
///
/// With a key column every step joins on it; otherwise each step joins on
/// the columns both sides share. A step without shared columns empties the
/// result and ends the fold.
pub(super) fn intersect(
    tables: &[Table],
    key: Option<&str>,
    progress: &mut Progress<'_>,
) -> Result<Table> {
    let Some((first, rest)) = tables.split_first() else {
        return Ok(Table::default());
    };

    let mut result = first.clone();
    for row in &mut result.rows {
        row.source_table = 0;
    }
    progress.step();

    for (offset, right) in rest.iter().enumerate() {
        let on: Vec<String> = match key {
            Some(key) => vec![key.to_string()],
            None => result
                .column_names()
                .filter(|name| right.has_column(name))
                .map(str::to_string)
                .collect(),
        };

        if on.is_empty() {
            debug!(table = offset + 1, "no shared columns, intersection is empty");
            return Ok(Table::default());
        }

        result = inner_join(&result, right, &on)?;
        debug!(
            table = offset + 1,
            on = ?on,
            rows = result.row_count(),
            "joined table"
        );
        progress.step();
    }

    Ok(result)
}

/// Inner join of `left` and `right` on the columns named in `on`.
///
/// Output columns are the left columns followed by the right columns that
/// are not join columns; other names present on both sides get `_x` and
/// `_y` suffixes. Rows follow left order, each paired with every matching
/// right row in right order. A suffixed name that collides with another
/// output column is an error.
pub(super) fn inner_join(left: &Table, right: &Table, on: &[String]) -> Result<Table> {
    let left_on: Vec<usize> = on.iter().filter_map(|c| left.column_index(c)).collect();
    let right_on: Vec<usize> = on.iter().filter_map(|c| right.column_index(c)).collect();
    let is_join_column = |name: &str| on.iter().any(|c| c == name);

    let mut names: Vec<String> = left
        .column_names()
        .map(|name| {
            if !is_join_column(name) && right.has_column(name) {
                format!("{}_x", name)
            } else {
                name.to_string()
            }
        })
        .collect();

    let right_extra: Vec<usize> = right
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_join_column(&c.name))
        .map(|(i, _)| i)
        .collect();
    names.extend(right_extra.iter().map(|&i| {
        let name = &right.columns[i].name;
        if left.has_column(name) {
            format!("{}_y", name)
        } else {
            name.clone()
        }
    }));

    let mut seen = FxHashSet::default();
    if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(MergeError::DuplicateColumn {
            column: dup.clone(),
            on: on.to_vec(),
        });
    }

    let mut out = Table::with_column_names(names);

    let right_index = KeyBuilder::with_columns(right_on).index(right);
    let left_keys = KeyBuilder::with_columns(left_on);

    for left_row in &left.rows {
        let Some(matches) = right_index.get(&left_keys.build_key(left_row)) else {
            continue;
        };
        for &pos in matches {
            let right_row = &right.rows[pos];
            let mut cells = left_row.cells.clone();
            cells.extend(right_extra.iter().map(|&i| {
                right_row.cells.get(i).cloned().unwrap_or(CellValue::Null)
            }));
            out.rows
                .push(Row::new(cells, left_row.source_table, left_row.source_line));
        }
    }

    Ok(out)
}
