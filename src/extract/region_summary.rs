use serde_json::Value;

use crate::domain::{ModuleKey, RegionId, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::{SchemaAbsence, field_or_null};
use crate::table::{Table, TableRow};

/// Region product labels joined with the known-cluster ranking of the record.
///
/// Area rows are keyed by the record description and ranking rows by the
/// record id; both are joined on that `sequence` column, so every area row
/// is repeated for each ranked hit when the two agree.
pub struct RegionSummaryExtractor;

struct AreaRow {
    sequence: String,
    region: RegionId,
    products: Vec<String>,
}

impl TableRow for AreaRow {
    const COLUMNS: &'static [&'static str] = &["sequence", "region", "type"];

    fn into_cells(self) -> Vec<Value> {
        vec![
            Value::String(self.sequence),
            Value::String(self.region.to_string()),
            Value::Array(self.products.into_iter().map(Value::String).collect()),
        ]
    }
}

struct KnownClusterRow {
    sequence: String,
    description: Value,
    cluster_type: Value,
    similarity: Value,
}

impl TableRow for KnownClusterRow {
    const COLUMNS: &'static [&'static str] = &[
        "sequence",
        "most_similar_known_cluster",
        "most_similar_known_cluster_type",
        "similarity",
    ];

    fn into_cells(self) -> Vec<Value> {
        vec![
            Value::String(self.sequence),
            self.description,
            self.cluster_type,
            self.similarity,
        ]
    }
}

impl Extractor for RegionSummaryExtractor {
    fn kind(&self) -> TableKind {
        TableKind::RegionSummary
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let record = context.record;
        let ranking = record
            .module(ModuleKey::ClusterBlast)
            .key("knowncluster")
            .key("results")
            .index(0)
            .key("ranking")
            .array()?;

        let areas = record
            .areas
            .iter()
            .enumerate()
            .map(|(position, area)| AreaRow {
                sequence: record.description.clone(),
                region: RegionId::from_positions(context.index, position),
                products: area.products.clone(),
            });

        let known = ranking.iter().map(|entry| {
            let annotation = entry.get(0).unwrap_or(&Value::Null);
            let metrics = entry.get(1).unwrap_or(&Value::Null);
            KnownClusterRow {
                sequence: record.id.clone(),
                description: field_or_null(annotation, "description"),
                cluster_type: field_or_null(annotation, "cluster_type"),
                similarity: field_or_null(metrics, "similarity"),
            }
        });

        let areas = Table::from_rows(areas);
        Ok(areas.left_join(&Table::from_rows(known), "sequence"))
    }
}
