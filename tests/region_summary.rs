use bgc_tables::document::AnnotationRecord;
use bgc_tables::extract::{Extractor, RecordContext, RegionSummaryExtractor, extract_or_empty};
use serde_json::{Value, json};

fn record(description: &str, clusterblast: Value) -> AnnotationRecord {
    serde_json::from_value(json!({
        "id": "seq1",
        "description": description,
        "areas": [{"products": ["NRPS"]}, {"products": ["T1PKS", "NRPS"]}],
        "modules": {
            "antismash.detection.full_hmmer": {},
            "antismash.detection.hmm_detection": {},
            "antismash.modules.clusterblast": clusterblast
        }
    }))
    .unwrap()
}

fn known_cluster(ranking: Value) -> Value {
    json!({"knowncluster": {"results": [{"ranking": ranking}]}})
}

#[test]
fn areas_joined_with_known_cluster_ranking() {
    let record = record(
        "seq1",
        known_cluster(json!([
            [{"description": "surfactin", "cluster_type": "NRP"}, {"similarity": 82}]
        ])),
    );
    let table = RegionSummaryExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();

    assert_eq!(
        table.columns(),
        [
            "sequence",
            "region",
            "type",
            "most_similar_known_cluster",
            "most_similar_known_cluster_type",
            "similarity"
        ]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "region"), Some(&json!("1.1")));
    assert_eq!(table.cell(1, "region"), Some(&json!("1.2")));
    assert_eq!(table.cell(1, "type"), Some(&json!(["T1PKS", "NRPS"])));
    assert_eq!(table.cell(0, "most_similar_known_cluster"), Some(&json!("surfactin")));
    assert_eq!(table.cell(1, "similarity"), Some(&json!(82)));
}

#[test]
fn every_ranked_hit_repeats_each_area() {
    let record = record(
        "seq1",
        known_cluster(json!([
            [{"description": "a", "cluster_type": "NRP"}, {"similarity": 10}],
            [{"description": "b", "cluster_type": "PKS"}, {"similarity": 5}]
        ])),
    );
    let table = RegionSummaryExtractor
        .extract(&RecordContext::new(2, &record))
        .unwrap();
    assert_eq!(table.len(), 4);
    let regions: Vec<&Value> = table.column("region");
    assert_eq!(regions, [&json!("3.1"), &json!("3.1"), &json!("3.2"), &json!("3.2")]);
}

#[test]
fn unmatched_sequence_keeps_null_cluster_fields() {
    let record = record(
        "contig description",
        known_cluster(json!([[{"description": "a", "cluster_type": "NRP"}, {"similarity": 10}]])),
    );
    let table = RegionSummaryExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "sequence"), Some(&json!("contig description")));
    assert_eq!(table.cell(0, "most_similar_known_cluster"), Some(&Value::Null));
    assert_eq!(table.cell(1, "similarity"), Some(&Value::Null));
}

#[test]
fn empty_ranking_keeps_area_rows() {
    let record = record("seq1", known_cluster(json!([])));
    let table = RegionSummaryExtractor
        .extract(&RecordContext::new(0, &record))
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "most_similar_known_cluster_type"), Some(&Value::Null));
}

#[test]
fn missing_known_cluster_yields_empty_table() {
    let record = record("seq1", json!({"general": {}}));
    let context = RecordContext::new(0, &record);
    let absence = RegionSummaryExtractor.extract(&context).unwrap_err();
    assert_eq!(absence.missing, "knowncluster");

    let table = extract_or_empty(&RegionSummaryExtractor, &context);
    assert!(table.is_empty());
    assert!(table.columns().is_empty());
}
