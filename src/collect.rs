use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::batch::IgnoreSet;
use crate::document::AnnotationDocument;
use crate::error::BgcError;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatus {
    pub path: String,
    pub records: usize,
    pub analyzable_records: Vec<usize>,
}

impl DocumentStatus {
    pub fn is_relevant(&self) -> bool {
        !self.analyzable_records.is_empty()
    }
}

/// Whether one document carries any record beyond the baseline modules.
pub fn document_status(path: &Path) -> Result<DocumentStatus, BgcError> {
    let document = AnnotationDocument::load(path)?;
    Ok(DocumentStatus {
        path: path.display().to_string(),
        records: document.records.len(),
        analyzable_records: document.analyzable_indices(),
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectReport {
    pub copied: Vec<String>,
    pub not_relevant: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
}

/// Copies `<entry>/<entry>.json` of every result directory that has
/// analyzable records into `destination`.
pub fn collect_relevant(
    results_dir: &Path,
    destination: &Path,
    ignore: &IgnoreSet,
) -> Result<CollectReport, BgcError> {
    let entries = crate::batch::list_candidate_entries(results_dir, ignore)?;
    fs::create_dir_all(destination).map_err(|err| BgcError::Filesystem(err.to_string()))?;

    let mut report = CollectReport::default();
    for entry in entries {
        let Some(name) = entry.file_name().map(|name| name.to_string_lossy().to_string()) else {
            continue;
        };
        let json_file = entry.join(format!("{name}.json"));
        if !json_file.is_file() {
            warn!("no JSON file found for directory {name}");
            report.missing.push(name);
            continue;
        }

        match document_status(&json_file) {
            Ok(status) if status.is_relevant() => {
                let target = destination.join(format!("{name}.json"));
                match fs::copy(&json_file, &target) {
                    Ok(_) => {
                        info!("copied: {}", json_file.display());
                        report.copied.push(name);
                    }
                    Err(err) => {
                        warn!("copy failed for {}: {err}", json_file.display());
                        report.failed.push(name);
                    }
                }
            }
            Ok(_) => {
                info!("not copied: {} (no analysis results)", json_file.display());
                report.not_relevant.push(name);
            }
            Err(err) => {
                warn!("{err}");
                report.failed.push(name);
            }
        }
    }
    Ok(report)
}
