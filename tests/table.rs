use bgc_tables::table::Table;
use serde_json::{Map, Value, json};

fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn concat_unions_columns_in_first_seen_order() {
    let first = Table::from_maps([map(json!({"a": 1, "b": 2}))]);
    let second = Table::from_maps([map(json!({"b": 3, "c": 4}))]);
    let table = Table::concat([first, Table::default(), second]);

    assert_eq!(table.columns(), ["a", "b", "c"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "c"), Some(&Value::Null));
    assert_eq!(table.cell(1, "a"), Some(&Value::Null));
    assert_eq!(table.cell(1, "b"), Some(&json!(3)));
}

#[test]
fn left_join_repeats_and_fills() {
    let left = Table::from_maps([
        map(json!({"reference": "A", "score": 1})),
        map(json!({"reference": "B", "score": 2})),
        map(json!({"reference": null, "score": 3})),
    ]);
    let right = Table::from_maps([
        map(json!({"reference": "A", "score": "dup", "organism": "x"})),
        map(json!({"reference": "A", "score": "dup", "organism": "y"})),
    ]);
    let joined = left.left_join(&right, "reference");

    assert_eq!(joined.columns(), ["reference", "score", "score_right", "organism"]);
    assert_eq!(joined.len(), 4);
    assert_eq!(joined.cell(1, "organism"), Some(&json!("y")));
    assert_eq!(joined.cell(2, "organism"), Some(&Value::Null));
    assert_eq!(joined.cell(3, "organism"), Some(&Value::Null));
}

#[test]
fn dedup_keeps_first_occurrence() {
    let mut table = Table::from_maps([
        map(json!({"a": 1, "b": "x"})),
        map(json!({"a": 2, "b": "x"})),
        map(json!({"a": 1, "b": "x"})),
    ]);
    table.dedup();
    assert_eq!(table.column("a"), [&json!(1), &json!(2)]);
}

#[test]
fn csv_output_has_header_and_no_index() {
    let table = Table::from_maps([
        map(json!({"sequence": "seq1", "type": ["NRPS", "T1PKS"], "similarity": null})),
        map(json!({"sequence": "seq,2", "type": [], "similarity": 0.5})),
    ]);
    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(
        text,
        "sequence,type,similarity\nseq1,NRPS; T1PKS,\n\"seq,2\",,0.5\n"
    );
}

#[test]
fn column_less_table_writes_nothing() {
    let mut buffer = Vec::new();
    Table::default().write_csv(&mut buffer).unwrap();
    assert!(buffer.is_empty());
}
