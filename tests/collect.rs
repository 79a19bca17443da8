use std::fs;
use std::path::Path;

use assert_matches::assert_matches;
use serde_json::{Value, json};

use bgc_tables::batch::IgnoreSet;
use bgc_tables::collect::{collect_relevant, document_status};
use bgc_tables::error::BgcError;

fn baseline_record() -> Value {
    json!({"id": "r", "modules": {"antismash.detection.full_hmmer": {}, "antismash.detection.hmm_detection": {}}})
}

fn analyzable_record() -> Value {
    json!({"id": "r", "modules": {"a": {}, "b": {}, "antismash.modules.clusterblast": {}}})
}

fn write_run(root: &Path, name: &str, records: Vec<Value>) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let doc = json!({"input_file": format!("{name}.fasta"), "records": records});
    fs::write(dir.join(format!("{name}.json")), doc.to_string()).unwrap();
}

#[test]
fn status_reports_analyzable_records() {
    let temp = tempfile::tempdir().unwrap();
    write_run(temp.path(), "bin1", vec![baseline_record(), analyzable_record()]);

    let status = document_status(&temp.path().join("bin1").join("bin1.json")).unwrap();
    assert!(status.is_relevant());
    assert_eq!(status.records, 2);
    assert_eq!(status.analyzable_records, vec![1]);
}

#[test]
fn status_of_unparsable_document_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, "not json").unwrap();
    assert_matches!(document_status(&path), Err(BgcError::DocumentParse { .. }));
}

#[test]
fn collect_copies_only_relevant_documents() {
    let temp = tempfile::tempdir().unwrap();
    let results = temp.path().join("results");
    write_run(&results, "bin1", vec![analyzable_record()]);
    write_run(&results, "bin2", vec![baseline_record()]);
    fs::create_dir_all(results.join("bin3")).unwrap();
    fs::create_dir_all(results.join(".snakemake")).unwrap();

    let destination = temp.path().join("jsons");
    let report = collect_relevant(&results, &destination, &IgnoreSet::default()).unwrap();

    assert_eq!(report.copied, ["bin1"]);
    assert_eq!(report.not_relevant, ["bin2"]);
    assert_eq!(report.missing, ["bin3"]);
    assert!(report.failed.is_empty());
    assert!(destination.join("bin1.json").is_file());
    assert!(!destination.join("bin2.json").exists());
}
