//! Keyed update strategy

use tracing::debug;

use crate::config::ConflictPolicy;
use crate::model::{KeyBuilder, Schema, Table};

use super::progress::Progress;
use super::MergeStats;

/// Start from the first table and fold each later table into it by `key`.
///
/// Incoming rows with a known key overwrite the matching rows' columns under
/// `KeepLast` and are ignored under `KeepFirst`; rows with a new key are
/// appended. Columns the result lacks are added first, null-filled.
pub(super) fn update(
    tables: &[Table],
    key: &str,
    policy: ConflictPolicy,
    stats: &mut MergeStats,
    progress: &mut Progress<'_>,
) -> Table {
    let Some((first, rest)) = tables.split_first() else {
        return Table::default();
    };

    let mut result = first.clone();
    for row in &mut result.rows {
        row.source_table = 0;
    }
    progress.step();

    for (offset, incoming) in rest.iter().enumerate() {
        let source = offset + 1;
        let (Some(result_key), Some(incoming_key)) = (
            KeyBuilder::for_column(&result, key),
            KeyBuilder::for_column(incoming, key),
        ) else {
            // Key presence is checked before merging; keep the fold total
            progress.step();
            continue;
        };

        for name in incoming.column_names() {
            if !result.has_column(name) {
                result.add_column(name);
            }
        }

        // Target position in `result` of every incoming column
        let targets: Vec<usize> = incoming
            .column_names()
            .filter_map(|name| result.column_index(name))
            .collect();
        let existing = result_key.index(&result);

        let mut updated = 0;
        let mut fresh = Vec::new();
        for row in &incoming.rows {
            match existing.get(&incoming_key.build_key(row)) {
                Some(positions) => {
                    if policy != ConflictPolicy::KeepLast {
                        continue;
                    }
                    for &pos in positions {
                        let target = &mut result.rows[pos];
                        for (cell, &col) in row.cells.iter().zip(&targets) {
                            target.cells[col] = cell.clone();
                        }
                        target.source_table = source;
                        target.source_line = row.source_line;
                    }
                    updated += positions.len();
                }
                None => fresh.push(row),
            }
        }

        let mapping = Schema::union_of([&result]).mapping_for(incoming);
        let appended = fresh.len();
        result.rows.extend(fresh.into_iter().map(|row| {
            let mut row = mapping.project(row);
            row.source_table = source;
            row
        }));

        stats.rows_updated += updated;
        stats.rows_appended += appended;
        debug!(source, updated, appended, "applied update table");
        progress.step();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::NoProgress;
    use crate::model::CellValue;

    fn run(tables: &[Table], policy: ConflictPolicy) -> (Table, MergeStats) {
        let mut sink = NoProgress;
        let mut progress = Progress::new(&mut sink, tables.len());
        let mut stats = MergeStats::default();
        let table = update(tables, "id", policy, &mut stats, &mut progress);
        (table, stats)
    }

    fn values(table: &Table, name: &str) -> Vec<String> {
        let idx = table.column_index(name).unwrap();
        table
            .rows
            .iter()
            .map(|r| r.cells[idx].display().into_owned())
            .collect()
    }

    #[test]
    fn test_keep_last_overwrites_and_appends() {
        let a = Table::from_records(&["id", "v"], &[&["1", "x"], &["2", "y"]]);
        let b = Table::from_records(&["id", "v"], &[&["2", "z"], &["3", "w"]]);

        let (out, stats) = run(&[a, b], ConflictPolicy::KeepLast);
        assert_eq!(values(&out, "id"), vec!["1", "2", "3"]);
        assert_eq!(values(&out, "v"), vec!["x", "z", "w"]);
        assert_eq!(out.rows[1].source_table, 1);
        assert_eq!((stats.rows_updated, stats.rows_appended), (1, 1));
    }

    #[test]
    fn test_keep_first_only_appends() {
        let a = Table::from_records(&["id", "v"], &[&["1", "x"], &["2", "y"]]);
        let b = Table::from_records(&["id", "v"], &[&["2", "z"], &["3", "w"]]);

        let (out, stats) = run(&[a, b], ConflictPolicy::KeepFirst);
        assert_eq!(values(&out, "v"), vec!["x", "y", "w"]);
        assert_eq!((stats.rows_updated, stats.rows_appended), (0, 1));
    }

    #[test]
    fn test_partial_columns_update_only_what_incoming_carries() {
        let a = Table::from_records(&["id", "name", "city"], &[&["1", "ann", "oslo"]]);
        let b = Table::from_records(&["city", "id", "phone"], &[&["rome", "1", "555"]]);

        let (out, _) = run(&[a, b], ConflictPolicy::KeepLast);
        let names: Vec<_> = out.column_names().collect();
        assert_eq!(names, vec!["id", "name", "city", "phone"]);
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.value(0, "name"), Some(&CellValue::from("ann")));
        assert_eq!(out.value(0, "city"), Some(&CellValue::from("rome")));
        assert_eq!(out.value(0, "phone"), Some(&CellValue::from("555")));
    }

    #[test]
    fn test_later_tables_see_earlier_updates() {
        let a = Table::from_records(&["id", "v"], &[&["1", "a"]]);
        let b = Table::from_records(&["id", "v"], &[&["2", "b"], &["1", "b"]]);
        let c = Table::from_records(&["id", "v"], &[&["2", "c"]]);

        let (out, stats) = run(&[a, b, c], ConflictPolicy::KeepLast);
        assert_eq!(values(&out, "id"), vec!["1", "2"]);
        assert_eq!(values(&out, "v"), vec!["b", "c"]);
        assert_eq!(stats.rows_updated, 2);
        assert_eq!(stats.rows_appended, 1);
    }

    #[test]
    fn test_new_duplicate_keys_are_all_appended() {
        let a = Table::from_records(&["id", "v"], &[&["1", "a"]]);
        let b = Table::from_records(&["id", "v"], &[&["5", "b"], &["5", "c"]]);

        let (out, _) = run(&[a, b], ConflictPolicy::KeepLast);
        assert_eq!(values(&out, "v"), vec!["a", "b", "c"]);
    }
}
