use std::path::PathBuf;

use assert_matches::assert_matches;

use bgc_tables::domain::SearchProgram;
use bgc_tables::error::BgcError;
use bgc_tables::search::{SearchRequest, SearchRunner, SystemSearchRunner};

fn request() -> SearchRequest {
    SearchRequest {
        query: PathBuf::from("genes.fasta"),
        database: PathBuf::from("db/antismash_nucl"),
        output: PathBuf::from("hits.tsv"),
    }
}

#[test]
fn argument_template_is_fixed() {
    let args = SystemSearchRunner::build_args(&request());
    assert_eq!(
        args,
        [
            "-query",
            "genes.fasta",
            "-db",
            "db/antismash_nucl",
            "-out",
            "hits.tsv",
            "-outfmt",
            "6",
            "-evalue",
            "1e-5",
            "-num_threads",
            "4"
        ]
    );
}

#[cfg(unix)]
#[test]
fn zero_exit_is_success() {
    let runner = SystemSearchRunner::with_executable(SearchProgram::Blastn, PathBuf::from("true"));
    let outcome = runner.run(&request()).unwrap();
    assert_eq!(outcome.program, "blastn");
    assert_eq!(outcome.output, "hits.tsv");
    // `true -version` prints nothing.
    assert_eq!(outcome.version, None);
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_reported() {
    let runner = SystemSearchRunner::with_executable(SearchProgram::Blastp, PathBuf::from("false"));
    let err = runner.run(&request()).unwrap_err();
    assert_matches!(
        err,
        BgcError::SearchFailed { status: 1, message } if message == "blastp reported no error text"
    );
}

#[test]
fn missing_executable_is_reported() {
    let runner = SystemSearchRunner::with_executable(
        SearchProgram::Blastn,
        PathBuf::from("definitely-not-a-search-tool-7f3a"),
    );
    let err = runner.run(&request()).unwrap_err();
    assert_matches!(err, BgcError::MissingTool(_));
}
