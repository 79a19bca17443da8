use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ModuleKey, RegionId, ScoreSelectionPolicy, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::{SchemaAbsence, field_or_null};
use crate::table::{Table, TableRow};

/// Similarity scores per reference and analysis kind, joined with the
/// reference annotations pooled over every analysis kind of the record.
///
/// Scores are kept per analysis kind; a later non-empty block of the same
/// kind replaces the earlier one. Whether a kind with no scores blanks the
/// record is decided by the [`ScoreSelectionPolicy`].
pub struct SimilarityScoreExtractor {
    policy: ScoreSelectionPolicy,
}

impl SimilarityScoreExtractor {
    pub fn new(policy: ScoreSelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScoreSelectionPolicy {
        self.policy
    }
}

impl Default for SimilarityScoreExtractor {
    fn default() -> Self {
        Self::new(ScoreSelectionPolicy::default())
    }
}

struct ScoreRow {
    reference: String,
    analysis: String,
    score: Value,
    position: Value,
    region: RegionId,
    sequence: Value,
}

impl TableRow for ScoreRow {
    const COLUMNS: &'static [&'static str] = &[
        "reference",
        "analysis",
        "similarity_score",
        "position",
        "region",
        "sequence",
    ];

    fn into_cells(self) -> Vec<Value> {
        vec![
            Value::String(self.reference),
            Value::String(self.analysis),
            self.score,
            self.position,
            Value::String(self.region.to_string()),
            self.sequence,
        ]
    }
}

struct AnnotationRow {
    reference: Value,
    products: Value,
    compound: Value,
    organism: Value,
}

impl AnnotationRow {
    fn from_reference_region(hit: &Value) -> Self {
        let products = hit
            .get("products")
            .and_then(Value::as_array)
            .map(|products| {
                let labels: Vec<String> = products
                    .iter()
                    .map(|product| match product {
                        Value::String(label) => label.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Value::String(labels.join("; "))
            })
            .unwrap_or(Value::Null);
        Self {
            reference: field_or_null(hit, "accession"),
            products,
            compound: field_or_null(hit, "description"),
            organism: field_or_null(hit, "organism"),
        }
    }
}

impl TableRow for AnnotationRow {
    const COLUMNS: &'static [&'static str] = &["reference", "type", "compound", "organism"];

    fn into_cells(self) -> Vec<Value> {
        vec![self.reference, self.products, self.compound, self.organism]
    }
}

/// Splits a `"<reference>: <position>"` key; keys without a position keep a
/// null position.
fn split_reference(key: &str) -> (String, Value) {
    match key.split_once(": ") {
        Some((reference, position)) => {
            (reference.to_string(), Value::String(position.to_string()))
        }
        None => (key.to_string(), Value::Null),
    }
}

/// Latest non-empty score rows per analysis kind, in first-seen kind order.
#[derive(Default)]
struct ScoresByAnalysis {
    kinds: Vec<(String, Vec<ScoreRow>)>,
}

impl ScoresByAnalysis {
    fn replace(&mut self, analysis: &str, rows: Vec<ScoreRow>) {
        match self.kinds.iter_mut().find(|(kind, _)| kind.as_str() == analysis) {
            Some((_, existing)) => *existing = rows,
            None => self.kinds.push((analysis.to_string(), rows)),
        }
    }

    fn into_rows(self) -> impl Iterator<Item = ScoreRow> {
        self.kinds.into_iter().flat_map(|(_, rows)| rows)
    }
}

fn score_rows(
    scores: &Map<String, Value>,
    analysis: &str,
    region: &RegionId,
    sequence: &Value,
) -> Vec<ScoreRow> {
    scores
        .iter()
        .map(|(key, score)| {
            let (reference, position) = split_reference(key);
            ScoreRow {
                reference,
                analysis: analysis.to_string(),
                score: score.clone(),
                position,
                region: region.clone(),
                sequence: sequence.clone(),
            }
        })
        .collect()
}

impl Extractor for SimilarityScoreExtractor {
    fn kind(&self) -> TableKind {
        TableKind::SimilarityScore
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let by_region = context
            .record
            .module(ModuleKey::ClusterCompare)
            .key("db_results")
            .key("MIBiG")
            .key("by_region")
            .object()?;

        let sequence = context.sequence();
        let mut scores_by_analysis = ScoresByAnalysis::default();
        let mut live = false;
        let mut annotations: Vec<AnnotationRow> = Vec::new();

        for (region_key, analyses) in by_region {
            let Some(analyses) = analyses.as_object() else {
                debug!(record = %context.record.id, region = %region_key, "region is not a mapping");
                continue;
            };
            let region = RegionId::from_region_key(context.index, region_key);

            for (analysis, data) in analyses {
                let scores = data
                    .get("scores_by_region")
                    .and_then(Value::as_object)
                    .filter(|scores| !scores.is_empty());
                match (scores, self.policy) {
                    (Some(scores), _) => {
                        scores_by_analysis
                            .replace(analysis, score_rows(scores, analysis, &region, &sequence));
                        live = true;
                    }
                    (None, ScoreSelectionPolicy::LastSeen) => live = false,
                    (None, ScoreSelectionPolicy::LastNonEmpty) => {}
                }

                if let Some(references) = data.get("reference_regions").and_then(Value::as_object)
                {
                    annotations.extend(references.values().map(AnnotationRow::from_reference_region));
                }
            }
        }

        if !live || annotations.is_empty() {
            return Ok(Table::default());
        }

        let mut annotations = Table::from_rows(annotations);
        annotations.dedup();
        let mut joined =
            Table::from_rows(scores_by_analysis.into_rows()).left_join(&annotations, "reference");
        joined.dedup();
        Ok(joined)
    }
}
