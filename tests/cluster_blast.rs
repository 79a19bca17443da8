use bgc_tables::document::AnnotationRecord;
use bgc_tables::extract::{ClusterBlastResultExtractor, Extractor, RecordContext};
use serde_json::{Value, json};

fn record(general: Value) -> AnnotationRecord {
    serde_json::from_value(json!({
        "id": "seq1",
        "modules": {"antismash.modules.clusterblast": {"general": general}}
    }))
    .unwrap()
}

fn annotation(accession: &str, proteins: usize) -> Value {
    let proteins = vec![json!({}); proteins];
    json!({
        "accession": accession,
        "cluster_label": "c1",
        "description": "surfactin",
        "cluster_type": "NRPS",
        "proteins": proteins
    })
}

fn metrics(hits: u32) -> Value {
    json!({"hits": hits, "core_gene_hits": 1, "synteny_score": 2, "core_bonus": 3, "similarity": 40})
}

#[test]
fn annotation_and_metrics_halves_side_by_side() {
    let record = record(json!({
        "record_id": "NODE_12_length_40000",
        "results": [
            {"ranking": [
                [annotation("NC_014551", 4), metrics(3)],
                [annotation("NC_000964", 2), metrics(1)]
            ]},
            {"ranking": [[annotation("CP000560", 7), metrics(5)]]}
        ]
    }));
    let table = ClusterBlastResultExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();

    assert_eq!(
        table.columns(),
        [
            "accession",
            "cluster_label",
            "description",
            "cluster_type",
            "number_of_genes_in_ref",
            "hits",
            "core_gene_hits",
            "synteny_score",
            "core_bonus",
            "similarity",
            "sequence"
        ]
    );
    assert_eq!(table.len(), 3);
    assert_eq!(table.cell(0, "number_of_genes_in_ref"), Some(&json!(4)));
    assert_eq!(table.cell(1, "hits"), Some(&json!(1)));
    assert_eq!(table.cell(2, "accession"), Some(&json!("CP000560")));
    assert_eq!(table.cell(2, "hits"), Some(&json!(5)));
    // The module's own record id, not the record's id.
    assert_eq!(table.cell(0, "sequence"), Some(&json!("NODE_12_length_40000")));
}

#[test]
fn missing_half_pads_with_nulls() {
    let record = record(json!({
        "record_id": "r1",
        "results": [{"ranking": [
            [annotation("A", 1), metrics(1)],
            [annotation("B", 1)]
        ]}]
    }));
    let table = ClusterBlastResultExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(1, "accession"), Some(&json!("B")));
    assert_eq!(table.cell(1, "similarity"), Some(&Value::Null));
}

#[test]
fn missing_results_is_absence() {
    let record = record(json!({"record_id": "r1"}));
    let absence = ClusterBlastResultExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap_err();
    assert_eq!(absence.missing, "results");
}

#[test]
fn broken_entry_in_the_middle_keeps_later_rows_aligned() {
    let record = record(json!({
        "record_id": "r1",
        "results": [{"ranking": [
            [annotation("A", 1), metrics(1)],
            [annotation("B", 1), null],
            [annotation("C", 1), metrics(3)],
            [null, metrics(4)]
        ]}]
    }));
    let table = ClusterBlastResultExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.cell(1, "accession"), Some(&json!("B")));
    assert_eq!(table.cell(1, "hits"), Some(&Value::Null));
    assert_eq!(table.cell(2, "accession"), Some(&json!("C")));
    assert_eq!(table.cell(2, "hits"), Some(&json!(3)));
    assert_eq!(table.cell(3, "accession"), Some(&Value::Null));
    assert_eq!(table.cell(3, "hits"), Some(&json!(4)));
}

#[test]
fn entry_without_any_half_is_skipped() {
    let record = record(json!({
        "record_id": "r1",
        "results": [{"ranking": [[], [annotation("A", 1), metrics(2)]]}]
    }));
    let table = ClusterBlastResultExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, "accession"), Some(&json!("A")));
}
