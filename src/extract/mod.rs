//! Record-scoped transformations from nested module data to flat tables.
//!
//! Each extractor reads one analyzable record and returns a [`Table`]. A
//! missing module path surfaces as a [`SchemaAbsence`], which
//! [`extract_or_empty`] turns into an empty contribution.

mod blast_score;
mod cluster_blast;
mod mibig;
mod query_to_reference;
mod region_summary;
mod similarity;

pub use blast_score::BlastScoreExtractor;
pub use cluster_blast::{ClusterBlastResult, ClusterBlastResultExtractor};
pub use mibig::{MIBIG_COLUMNS, MIBIG_DROPPED_POSITION, MibigEntry, MibigEntryExtractor};
pub use query_to_reference::QueryToReferenceExtractor;
pub use region_summary::RegionSummaryExtractor;
pub use similarity::SimilarityScoreExtractor;

use serde_json::Value;
use tracing::info;

use crate::document::AnnotationRecord;
use crate::domain::{ScoreSelectionPolicy, TableKind};
use crate::probe::SchemaAbsence;
use crate::table::Table;

/// One selected record together with its position in the document.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub index: usize,
    pub record: &'a AnnotationRecord,
}

impl<'a> RecordContext<'a> {
    pub fn new(index: usize, record: &'a AnnotationRecord) -> Self {
        Self { index, record }
    }

    pub fn sequence(&self) -> Value {
        Value::String(self.record.id.clone())
    }
}

pub trait Extractor {
    fn kind(&self) -> TableKind;

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence>;
}

/// Runs an extractor, downgrading a schema absence to an empty table.
pub fn extract_or_empty(extractor: &dyn Extractor, context: &RecordContext<'_>) -> Table {
    match extractor.extract(context) {
        Ok(table) => table,
        Err(absence) => {
            info!(
                table = %extractor.kind(),
                record = %context.record.id,
                "no data ({absence}), empty contribution"
            );
            Table::default()
        }
    }
}

/// The six extractors in output order.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorSet {
    pub fn new(policy: ScoreSelectionPolicy) -> Self {
        Self {
            extractors: vec![
                Box::new(RegionSummaryExtractor),
                Box::new(QueryToReferenceExtractor),
                Box::new(SimilarityScoreExtractor::new(policy)),
                Box::new(BlastScoreExtractor),
                Box::new(MibigEntryExtractor),
                Box::new(ClusterBlastResultExtractor),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Extractor> {
        self.extractors.iter().map(|extractor| extractor.as_ref())
    }

    /// All six tables for one record, tagged with their kind.
    pub fn extract_all(&self, context: &RecordContext<'_>) -> Vec<(TableKind, Table)> {
        self.iter()
            .map(|extractor| (extractor.kind(), extract_or_empty(extractor, context)))
            .collect()
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new(ScoreSelectionPolicy::default())
    }
}
