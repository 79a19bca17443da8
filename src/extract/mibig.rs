use serde_json::Value;
use tracing::warn;

use crate::domain::{ModuleKey, RegionId, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::SchemaAbsence;
use crate::table::{Table, TableRow};

/// Source position to column name for the positional MIBiG entry arrays.
pub const MIBIG_COLUMNS: [(usize, &str); 8] = [
    (0, "mibig_protein"),
    (1, "description"),
    (2, "mibig_cluster"),
    (4, "mibig_product"),
    (5, "percentage_id"),
    (6, "blast_score"),
    (7, "percentage_coverage"),
    (8, "evalue"),
];

/// Raw region column of the entry arrays, superseded by the synthesized one.
pub const MIBIG_DROPPED_POSITION: usize = 3;

/// Known-reference-cluster entries per region and contig tag.
pub struct MibigEntryExtractor;

#[derive(Debug, Clone, PartialEq)]
pub struct MibigEntry {
    pub protein: Value,
    pub description: Value,
    pub cluster: Value,
    pub product: Value,
    pub percentage_id: Value,
    pub blast_score: Value,
    pub percentage_coverage: Value,
    pub evalue: Value,
    pub sequence: Value,
    pub region: RegionId,
    pub ctg: String,
}

impl MibigEntry {
    /// Maps one positional entry through [`MIBIG_COLUMNS`]; short arrays leave
    /// the missing fields null.
    pub fn from_positional(fields: &[Value], sequence: Value, region: RegionId, ctg: &str) -> Self {
        let [protein, description, cluster, product, percentage_id, blast_score, coverage, evalue] =
            MIBIG_COLUMNS.map(|(position, _)| fields.get(position).cloned().unwrap_or(Value::Null));
        Self {
            protein,
            description,
            cluster,
            product,
            percentage_id,
            blast_score,
            percentage_coverage: coverage,
            evalue,
            sequence,
            region,
            ctg: ctg.to_string(),
        }
    }
}

impl TableRow for MibigEntry {
    const COLUMNS: &'static [&'static str] = &[
        "mibig_protein",
        "description",
        "mibig_cluster",
        "mibig_product",
        "percentage_id",
        "blast_score",
        "percentage_coverage",
        "evalue",
        "sequence",
        "region",
        "ctg",
    ];

    fn into_cells(self) -> Vec<Value> {
        vec![
            self.protein,
            self.description,
            self.cluster,
            self.product,
            self.percentage_id,
            self.blast_score,
            self.percentage_coverage,
            self.evalue,
            self.sequence,
            Value::String(self.region.to_string()),
            Value::String(self.ctg),
        ]
    }
}

impl Extractor for MibigEntryExtractor {
    fn kind(&self) -> TableKind {
        TableKind::MibigEntries
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let regions = context
            .record
            .module(ModuleKey::ClusterBlast)
            .key("knowncluster")
            .key("mibig_entries")
            .object()?;

        let mut entries = Vec::new();
        for (region_key, contigs) in regions {
            let region = match RegionId::from_numeric_key(context.index, region_key) {
                Ok(region) => region,
                Err(err) => {
                    warn!(record = %context.record.id, "skipping MIBiG entries: {err}");
                    continue;
                }
            };
            let Some(contigs) = contigs.as_object() else {
                warn!(record = %context.record.id, region = %region, "MIBiG entries are not keyed by contig");
                continue;
            };

            for (ctg, rows) in contigs {
                let Some(rows) = rows.as_array() else {
                    warn!(record = %context.record.id, region = %region, ctg = %ctg, "MIBiG entries are not a list");
                    continue;
                };
                for row in rows {
                    match row.as_array() {
                        Some(fields) => entries.push(MibigEntry::from_positional(
                            fields,
                            context.sequence(),
                            region.clone(),
                            ctg,
                        )),
                        None => warn!(
                            record = %context.record.id,
                            region = %region,
                            ctg = %ctg,
                            "MIBiG entry is not positional, skipped: {row}"
                        ),
                    }
                }
            }
        }

        Ok(Table::from_rows(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_layout_follows_position_map() {
        let mapped: Vec<&str> = MIBIG_COLUMNS.iter().map(|(_, name)| *name).collect();
        assert_eq!(&MibigEntry::COLUMNS[..8], mapped.as_slice());
        assert!(
            MIBIG_COLUMNS
                .iter()
                .all(|(position, _)| *position != MIBIG_DROPPED_POSITION)
        );
    }
}
