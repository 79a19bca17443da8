use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::document::AnnotationDocument;
use crate::domain::{ScoreSelectionPolicy, TableKind};
use crate::error::BgcError;
use crate::extract::{ExtractorSet, RecordContext};
use crate::table::Table;

/// Entry names skipped in every input directory, on top of dotfiles.
pub const DEFAULT_IGNORED: [&str; 2] = [".DS_Store", ".cache"];

#[derive(Debug, Clone)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: BTreeSet<String> = DEFAULT_IGNORED.iter().map(|name| name.to_string()).collect();
        names.extend(extra.into_iter().map(Into::into));
        Self { names }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        name.starts_with('.') || self.names.contains(name)
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// Candidate document paths of `directory`, sorted by entry name.
pub fn list_candidate_entries(directory: &Path, ignore: &IgnoreSet) -> Result<Vec<PathBuf>, BgcError> {
    if !directory.exists() {
        return Err(BgcError::InputNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(BgcError::NotADirectory(directory.to_path_buf()));
    }
    let entries = fs::read_dir(directory).map_err(|err| BgcError::Filesystem(err.to_string()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| BgcError::Filesystem(err.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if ignore.is_ignored(&name) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names.into_iter().map(|name| directory.join(name)).collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub documents_seen: usize,
    pub documents_parsed: usize,
    pub records_processed: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// The six concatenated tables of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchTables {
    tables: BTreeMap<TableKind, Table>,
}

impl BatchTables {
    pub fn get(&self, kind: TableKind) -> &Table {
        static EMPTY: Table = Table::empty();
        self.tables.get(&kind).unwrap_or(&EMPTY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &Table)> {
        TableKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn row_counts(&self) -> BTreeMap<TableKind, usize> {
        self.iter().map(|(kind, table)| (kind, table.len())).collect()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub tables: BatchTables,
    pub report: BatchReport,
}

#[derive(Default)]
struct Accumulators {
    parts: BTreeMap<TableKind, Vec<Table>>,
}

impl Accumulators {
    fn absorb(&mut self, extractors: &ExtractorSet, document: &AnnotationDocument) -> usize {
        let indices = document.analyzable_indices();
        for &index in &indices {
            let context = RecordContext::new(index, &document.records[index]);
            for (kind, table) in extractors.extract_all(&context) {
                self.parts.entry(kind).or_default().push(table);
            }
        }
        indices.len()
    }

    fn finish(mut self) -> BatchTables {
        let tables = TableKind::ALL
            .into_iter()
            .map(|kind| {
                let parts = self.parts.remove(&kind).unwrap_or_default();
                let table = Table::concat(parts).or_columns(kind.fallback_columns());
                (kind, table)
            })
            .collect();
        BatchTables { tables }
    }
}

/// Runs the record selector and all six extractors over many documents and
/// concatenates the per-record tables. Unreadable documents are skipped.
pub struct BatchAggregator {
    extractors: ExtractorSet,
}

impl BatchAggregator {
    pub fn new(policy: ScoreSelectionPolicy) -> Self {
        Self {
            extractors: ExtractorSet::new(policy),
        }
    }

    pub fn run<I>(&self, entries: I) -> BatchOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut accumulators = Accumulators::default();
        let mut report = BatchReport::default();

        for path in entries {
            report.documents_seen += 1;
            info!("processing file: {}", path.display());
            let document = match AnnotationDocument::load(&path) {
                Ok(document) => document,
                Err(err) => {
                    warn!("{err}. skipping file");
                    report.skipped.push(SkippedEntry {
                        path: path.display().to_string(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            report.documents_parsed += 1;
            report.records_processed += accumulators.absorb(&self.extractors, &document);
        }

        BatchOutcome {
            tables: accumulators.finish(),
            report,
        }
    }

    /// Aggregates documents that are already in memory.
    pub fn aggregate<'a, I>(&self, documents: I) -> BatchTables
    where
        I: IntoIterator<Item = &'a AnnotationDocument>,
    {
        let mut accumulators = Accumulators::default();
        for document in documents {
            accumulators.absorb(&self.extractors, document);
        }
        accumulators.finish()
    }
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new(ScoreSelectionPolicy::default())
    }
}

/// Lists `directory` and aggregates every candidate entry in name order.
pub fn parse_directory(
    directory: &Path,
    ignore: &IgnoreSet,
    policy: ScoreSelectionPolicy,
) -> Result<BatchOutcome, BgcError> {
    let entries = list_candidate_entries(directory, ignore)?;
    Ok(BatchAggregator::new(policy).run(entries))
}
