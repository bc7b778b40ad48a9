use csvmerge::config::{ConflictPolicy, MergeConfig, MergeStrategy};
use csvmerge::model::{CellValue, KeyBuilder, Table};
use csvmerge::output::write_csv;
use csvmerge::parser::{sniff_delimiter, CsvParser, JsonParser};
use csvmerge::{merge, MergeError};

fn people_a() -> Table {
    CsvParser::parse_str(
        "id,name,city\n1,Ann,Oslo\n2,Bob,Rome\n3,Cid,Kyiv\n2,Bob,Rome\n",
        b',',
    )
    .unwrap()
}

fn people_b() -> Table {
    CsvParser::parse_str("id;name;city\n3;Cid;Lima\n4;Dee;Nice\n", b';').unwrap()
}

fn people_c() -> Table {
    CsvParser::parse_str("id,name,city,phone\n4,Dee,Nice,555\n1,Ann,Oslo,777\n", b',').unwrap()
}

fn ids(table: &Table) -> Vec<i64> {
    let idx = table.column_index("id").unwrap();
    table
        .rows
        .iter()
        .map(|r| match r.cells[idx] {
            CellValue::Int(i) => i,
            ref other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

#[test]
fn append_without_key_keeps_all_rows_in_order() {
    let tables = [people_a(), people_b(), people_c()];
    let result = merge(&tables, &MergeConfig::new(MergeStrategy::Append)).unwrap();

    let expected: usize = tables.iter().map(Table::row_count).sum();
    assert_eq!(result.table.row_count(), expected);
    assert_eq!(ids(&result.table), vec![1, 2, 3, 2, 3, 4, 4, 1]);

    // Per-source relative order is preserved
    for source in 0..tables.len() {
        let lines: Vec<_> = result
            .table
            .rows
            .iter()
            .filter(|r| r.source_table == source)
            .map(|r| r.source_line)
            .collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn append_with_key_respects_policy() {
    let tables = [people_a(), people_b(), people_c()];

    let first = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Append).with_key_column("id"),
    )
    .unwrap();
    assert_eq!(ids(&first.table), vec![1, 2, 3, 4]);
    assert_eq!(first.table.value(2, "city"), Some(&CellValue::from("Kyiv")));

    let last = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Append)
            .with_conflict_policy(ConflictPolicy::KeepLast)
            .with_key_column("id"),
    )
    .unwrap();
    assert_eq!(ids(&last.table), vec![2, 3, 4, 1]);
    assert_eq!(last.table.value(1, "city"), Some(&CellValue::from("Lima")));
    assert_eq!(last.stats.duplicates_dropped, 4);
}

#[test]
fn union_never_repeats_a_key_or_a_row() {
    let tables = [people_a(), people_b(), people_c()];

    let by_key = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Union).with_key_column("id"),
    )
    .unwrap();
    let builder = KeyBuilder::for_column(&by_key.table, "id").unwrap();
    let index = builder.index(&by_key.table);
    assert!(index.values().all(|positions| positions.len() == 1));

    let by_row = merge(&tables, &MergeConfig::new(MergeStrategy::Union)).unwrap();
    let index = KeyBuilder::whole_row().index(&by_row.table);
    assert!(index.values().all(|positions| positions.len() == 1));
    // The repeated "2,Bob,Rome" row collapses; rows that differ in any cell stay
    assert_eq!(by_row.table.row_count(), 7);
}

#[test]
fn intersection_keeps_common_records() {
    let a = CsvParser::parse_str("id,v\n1,a\n2,b\n3,c\n", b',').unwrap();
    let b = CsvParser::parse_str("id,w\n3,x\n1,y\n9,z\n", b',').unwrap();

    let result = merge(
        &[a.clone(), b.clone()],
        &MergeConfig::new(MergeStrategy::Intersection).with_key_column("id"),
    )
    .unwrap();
    assert!(result.table.row_count() <= a.row_count().min(b.row_count()));
    assert_eq!(ids(&result.table), vec![1, 3]);
    let names: Vec<_> = result.table.column_names().collect();
    assert_eq!(names, vec!["id", "v", "w"]);

    let unrelated = CsvParser::parse_str("other\nq\n", b',').unwrap();
    let empty = merge(
        &[a, unrelated],
        &MergeConfig::new(MergeStrategy::Intersection),
    )
    .unwrap();
    assert_eq!(empty.table.row_count(), 0);
    assert_eq!(empty.table.column_count(), 0);
}

#[test]
fn update_keep_last_takes_newest_row() {
    let a = CsvParser::parse_str("id,v\n1,x\n2,y\n", b',').unwrap();
    let b = CsvParser::parse_str("id,v\n2,z\n3,w\n", b',').unwrap();

    let result = merge(
        &[a, b],
        &MergeConfig::new(MergeStrategy::Update)
            .with_conflict_policy(ConflictPolicy::KeepLast)
            .with_key_column("id"),
    )
    .unwrap();

    assert_eq!(ids(&result.table), vec![1, 2, 3]);
    let v: Vec<_> = result
        .table
        .rows
        .iter()
        .map(|r| r.cells[1].display().into_owned())
        .collect();
    assert_eq!(v, vec!["x", "z", "w"]);
}

#[test]
fn update_adds_columns_from_later_tables() {
    let tables = [people_a(), people_c()];
    let result = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Update)
            .with_conflict_policy(ConflictPolicy::KeepLast)
            .with_key_column("id"),
    )
    .unwrap();

    assert_eq!(ids(&result.table), vec![1, 2, 3, 2, 4]);
    assert_eq!(result.table.value(0, "phone"), Some(&CellValue::Int(777)));
    assert_eq!(result.table.value(1, "phone"), Some(&CellValue::Null));
    assert_eq!(result.table.value(4, "phone"), Some(&CellValue::Int(555)));
}

#[test]
fn written_result_reads_back_the_same() {
    let tables = [people_a(), people_b(), people_c()];
    let result = merge(&tables, &MergeConfig::new(MergeStrategy::Append)).unwrap();

    let mut buf = Vec::new();
    write_csv(&result.table, &mut buf, b',').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(sniff_delimiter(&text), b',');

    let reread = CsvParser::parse_str(&text, b',').unwrap();
    let original_names: Vec<_> = result.table.column_names().collect();
    let reread_names: Vec<_> = reread.column_names().collect();
    assert_eq!(original_names, reread_names);
    assert_eq!(reread.row_count(), result.table.row_count());
    for (a, b) in result.table.rows.iter().zip(&reread.rows) {
        assert_eq!(a.cells, b.cells);
    }
}

fn union_by_id() -> MergeConfig {
    MergeConfig::new(MergeStrategy::Union).with_key_column("id")
}

#[test]
fn union_keeps_distinct_wide_integer_ids() {
    let a = CsvParser::parse_str("id,v\n10000000000000000001,a\n", b',').unwrap();
    let b = CsvParser::parse_str("id,v\n10000000000000000002,b\n", b',').unwrap();

    let result = merge(&[a, b], &union_by_id()).unwrap();
    assert_eq!(result.table.row_count(), 2);

    let mut buf = Vec::new();
    write_csv(&result.table, &mut buf, b',').unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "id,v\n10000000000000000001,a\n10000000000000000002,b\n"
    );
}

#[test]
fn union_matches_int_and_float_keys_only_when_exact() {
    let mut a = Table::with_column_names(["id"]);
    a.add_row(vec![CellValue::Int(9_007_199_254_740_993)], 0, 2);
    a.add_row(vec![CellValue::Int(9_007_199_254_740_992)], 0, 3);
    let mut b = Table::with_column_names(["id"]);
    b.add_row(vec![CellValue::Float(9_007_199_254_740_992.0)], 0, 2);

    let result = merge(&[a, b], &union_by_id()).unwrap();
    assert_eq!(result.table.row_count(), 2);
    assert_eq!(result.stats.duplicates_dropped, 1);
}

#[test]
fn keys_match_by_type_across_csv_and_json() {
    let csv = CsvParser::parse_str("id,v\n1,a\n", b',').unwrap();

    let text_id = JsonParser::parse_str(r#"[{"id": "1", "v": "b"}]"#).unwrap();
    let result = merge(&[csv.clone(), text_id], &union_by_id()).unwrap();
    assert_eq!(result.table.row_count(), 2);

    let number_id = JsonParser::parse_str(r#"[{"id": 1, "v": "b"}]"#).unwrap();
    let result = merge(&[csv, number_id], &union_by_id()).unwrap();
    assert_eq!(result.table.row_count(), 1);
    assert_eq!(result.table.value(0, "v"), Some(&CellValue::from("a")));
}

#[test]
fn intersection_requires_key_in_every_table() {
    let tables = [people_a(), people_b(), CsvParser::parse_str("name\nAnn\n", b',').unwrap()];
    let err = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Intersection).with_key_column("id"),
    )
    .unwrap_err();

    match err {
        MergeError::MissingKeyColumn { column, table } => {
            assert_eq!(column, "id");
            assert_eq!(table, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rows_without_key_column_collapse_on_null_key() {
    let no_id = CsvParser::parse_str("name,city\nEve,Bern\nFay,Riga\n", b',').unwrap();
    let tables = [people_a(), no_id];

    let union = merge(&tables, &union_by_id()).unwrap();
    assert_eq!(union.table.row_count(), 4);
    assert_eq!(union.table.value(3, "id"), Some(&CellValue::Null));
    assert_eq!(union.table.value(3, "name"), Some(&CellValue::from("Eve")));

    let append_last = merge(
        &tables,
        &MergeConfig::new(MergeStrategy::Append)
            .with_conflict_policy(ConflictPolicy::KeepLast)
            .with_key_column("id"),
    )
    .unwrap();
    assert_eq!(append_last.table.row_count(), 4);
    assert_eq!(append_last.table.value(3, "id"), Some(&CellValue::Null));
    assert_eq!(append_last.table.value(3, "name"), Some(&CellValue::from("Fay")));
}
