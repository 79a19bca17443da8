use bgc_tables::document::AnnotationRecord;
use bgc_tables::extract::{Extractor, MibigEntryExtractor, RecordContext, extract_or_empty};
use serde_json::{Value, json};

fn record(knowncluster: Value) -> AnnotationRecord {
    serde_json::from_value(json!({
        "id": "seq9",
        "modules": {"antismash.modules.clusterblast": {"knowncluster": knowncluster}}
    }))
    .unwrap()
}

fn entry(protein: &str) -> Value {
    json!([protein, "surfactin synthetase", "BGC0000433", "c1", "NRP", 71, 1812, 98.1, 0.0])
}

#[test]
fn entries_per_region_and_contig() {
    let record = record(json!({"mibig_entries": {
        "1": {"ctg1_4": [entry("AAA1"), entry("AAA2")], "ctg1_5": [entry("AAA3")]},
        "3": {"ctg1_9": [entry("AAA4")]}
    }}));
    let table = MibigEntryExtractor
        .extract(&RecordContext::new(1, &record))
        .unwrap();

    assert_eq!(
        table.columns(),
        [
            "mibig_protein",
            "description",
            "mibig_cluster",
            "mibig_product",
            "percentage_id",
            "blast_score",
            "percentage_coverage",
            "evalue",
            "sequence",
            "region",
            "ctg"
        ]
    );
    assert_eq!(table.len(), 4);
    assert_eq!(table.cell(0, "mibig_protein"), Some(&json!("AAA1")));
    assert_eq!(table.cell(0, "mibig_product"), Some(&json!("NRP")));
    assert_eq!(table.cell(0, "percentage_id"), Some(&json!(71)));
    assert_eq!(table.cell(0, "evalue"), Some(&json!(0.0)));
    assert_eq!(table.cell(2, "ctg"), Some(&json!("ctg1_5")));
    assert_eq!(table.cell(3, "region"), Some(&json!("2.3")));
    assert_eq!(table.cell(3, "sequence"), Some(&json!("seq9")));
    assert!(!table.column("mibig_product").contains(&&json!("c1")));
}

#[test]
fn region_keys_are_read_as_integers() {
    let record = record(json!({"mibig_entries": {
        "01": {"ctg1_4": [entry("AAA1")]},
        "region": {"ctg1_5": [entry("AAA2")]}
    }}));
    let table = MibigEntryExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, "region"), Some(&json!("1.1")));
}

#[test]
fn short_entries_leave_trailing_fields_null() {
    let record = record(json!({"mibig_entries": {"1": {"ctg1_4": [["AAA1", "desc"]]}}}));
    let table = MibigEntryExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.cell(0, "description"), Some(&json!("desc")));
    assert_eq!(table.cell(0, "evalue"), Some(&Value::Null));
}

#[test]
fn missing_mibig_entries_yields_empty_table() {
    let record = record(json!({"results": []}));
    let context = RecordContext::new(0, &record);
    let absence = MibigEntryExtractor.extract(&context).unwrap_err();
    assert_eq!(absence.missing, "mibig_entries");
    assert!(extract_or_empty(&MibigEntryExtractor, &context).is_empty());
}
