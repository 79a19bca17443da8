use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{ModuleKey, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::{Probe, SchemaAbsence, field_or_null};
use crate::table::{Table, TableRow};

/// Ranked cluster-blast hits: the annotation half and the metrics half of
/// each ranking entry, read together so a broken entry only nulls itself.
pub struct ClusterBlastResultExtractor;

#[derive(Debug, Clone, PartialEq)]
struct HitAnnotation {
    accession: Value,
    cluster_label: Value,
    description: Value,
    cluster_type: Value,
    reference_genes: Value,
}

impl HitAnnotation {
    fn from_value(hit: &Value) -> Self {
        let reference_genes = hit
            .get("proteins")
            .and_then(Value::as_array)
            .map(|proteins| Value::from(proteins.len()))
            .unwrap_or(Value::Null);
        Self {
            accession: field_or_null(hit, "accession"),
            cluster_label: field_or_null(hit, "cluster_label"),
            description: field_or_null(hit, "description"),
            cluster_type: field_or_null(hit, "cluster_type"),
            reference_genes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HitMetrics {
    hits: Value,
    core_gene_hits: Value,
    synteny_score: Value,
    core_bonus: Value,
    similarity: Value,
}

impl HitMetrics {
    fn from_value(hit: &Value) -> Self {
        Self {
            hits: field_or_null(hit, "hits"),
            core_gene_hits: field_or_null(hit, "core_gene_hits"),
            synteny_score: field_or_null(hit, "synteny_score"),
            core_bonus: field_or_null(hit, "core_bonus"),
            similarity: field_or_null(hit, "similarity"),
        }
    }
}

/// One ranked hit. A half missing from the source leaves its columns null.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBlastResult {
    annotation: Option<HitAnnotation>,
    metrics: Option<HitMetrics>,
    sequence: Value,
}

impl TableRow for ClusterBlastResult {
    const COLUMNS: &'static [&'static str] = &[
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
        "sequence",
    ];

    fn into_cells(self) -> Vec<Value> {
        let mut cells = Vec::with_capacity(Self::COLUMNS.len());
        match self.annotation {
            Some(annotation) => cells.extend([
                annotation.accession,
                annotation.cluster_label,
                annotation.description,
                annotation.cluster_type,
                annotation.reference_genes,
            ]),
            None => cells.extend(std::iter::repeat_n(Value::Null, 5)),
        }
        match self.metrics {
            Some(metrics) => cells.extend([
                metrics.hits,
                metrics.core_gene_hits,
                metrics.synteny_score,
                metrics.core_bonus,
                metrics.similarity,
            ]),
            None => cells.extend(std::iter::repeat_n(Value::Null, 5)),
        }
        cells.push(self.sequence);
        cells
    }
}

impl Extractor for ClusterBlastResultExtractor {
    fn kind(&self) -> TableKind {
        TableKind::ClusterBlast
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let module = context.record.module(ModuleKey::ClusterBlast);
        let results = module.clone().key("general").key("results").array()?;
        // The module names its own record; it is not read from the record id.
        let sequence = module
            .clone()
            .key("general")
            .key("record_id")
            .value()
            .or_else(|_| module.key("record_id").value())
            .cloned()
            .unwrap_or(Value::Null);

        let mut rows = Vec::new();
        for (position, result) in results.iter().enumerate() {
            let ranking = match Probe::new(format!("results[{position}]"), result)
                .key("ranking")
                .array()
            {
                Ok(ranking) => ranking,
                Err(absence) => {
                    debug!(record = %context.record.id, "skipping region: {absence}");
                    continue;
                }
            };
            for (rank, entry) in ranking.iter().enumerate() {
                let annotation = entry
                    .get(0)
                    .filter(|hit| hit.is_object())
                    .map(HitAnnotation::from_value);
                let metrics = entry
                    .get(1)
                    .filter(|hit| hit.is_object())
                    .map(HitMetrics::from_value);
                match (&annotation, &metrics) {
                    (None, None) => {
                        warn!(
                            record = %context.record.id,
                            region = position + 1,
                            rank,
                            "ranking entry has no hit data, skipped"
                        );
                        continue;
                    }
                    (None, Some(_)) | (Some(_), None) => {
                        warn!(
                            record = %context.record.id,
                            region = position + 1,
                            rank,
                            annotation = annotation.is_some(),
                            metrics = metrics.is_some(),
                            "ranking entry is missing one half, padded with nulls"
                        );
                    }
                    (Some(_), Some(_)) => {}
                }
                rows.push(ClusterBlastResult {
                    annotation,
                    metrics,
                    sequence: sequence.clone(),
                });
            }
        }

        Ok(Table::from_rows(rows))
    }
}
