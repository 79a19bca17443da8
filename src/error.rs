use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BgcError {
    #[error("failed to read annotation document {path}: {message}")]
    DocumentRead { path: PathBuf, message: String },

    #[error("failed to parse annotation document {path}: {message}")]
    DocumentParse { path: PathBuf, message: String },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("invalid region id: {0}")]
    InvalidRegionId(String),

    #[error("invalid gene table line: {0}")]
    InvalidGeneLine(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to write table {table}: {message}")]
    TableWrite { table: String, message: String },

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("search tool exited with status {status}: {message}")]
    SearchFailed { status: i32, message: String },
}
