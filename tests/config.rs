use std::path::PathBuf;

use assert_matches::assert_matches;

use bgc_tables::config::{Config, ConfigLoader, SearchEntry};
use bgc_tables::domain::{ScoreSelectionPolicy, SearchProgram};
use bgc_tables::error::BgcError;

#[test]
fn resolve_config_fills_defaults() {
    let config = Config {
        schema_version: None,
        ignore: vec!["logs".to_string()],
        output_dir: None,
        score_selection: None,
        search: Some(SearchEntry {
            program: Some(SearchProgram::Blastp),
            executable: None,
        }),
    };

    let resolved = ConfigLoader::resolve_config(config);
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.output_dir, PathBuf::from("temp_file"));
    assert_eq!(resolved.score_selection, ScoreSelectionPolicy::LastNonEmpty);
    assert_eq!(resolved.search.program, SearchProgram::Blastp);
    assert!(resolved.ignore.is_ignored("logs"));
    assert!(resolved.ignore.is_ignored(".DS_Store"));
    assert!(!resolved.ignore.is_ignored("bin1.json"));
}

#[test]
fn resolve_reads_json_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bgc-tables.json");
    std::fs::write(
        &path,
        r#"{"output_dir": "tables", "score_selection": "last-seen", "search": {"executable": "/opt/blast/bin/blastn"}}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.output_dir, PathBuf::from("tables"));
    assert_eq!(resolved.score_selection, ScoreSelectionPolicy::LastSeen);
    assert_eq!(
        resolved.search.executable,
        Some(PathBuf::from("/opt/blast/bin/blastn"))
    );
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, BgcError::ConfigRead(_));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, "{\"score_selection\": \"sometimes\"}").unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, BgcError::ConfigParse(_));
}
