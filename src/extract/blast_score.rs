use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{ModuleKey, RegionId, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::{Probe, SchemaAbsence};
use crate::table::Table;

const SYNTHESIZED: [&str; 4] = ["coordinate", "sequence", "region", "ctg"];

/// Pairwise protein hits of every ranked cluster-blast hit, one row per
/// pairing. Row fields are whatever the hit detail object carries plus the
/// synthesized coordinate, sequence, region and contig tag.
pub struct BlastScoreExtractor;

/// Contig tag (component 4) and coordinate (component 2) of a pipe-delimited
/// query locus string.
pub fn parse_locus(locus: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = locus.split('|').collect();
    Some((*parts.get(4)?, *parts.get(2)?))
}

fn pairing_row(
    pairing: &Value,
    context: &RecordContext<'_>,
    region: &RegionId,
) -> Option<Map<String, Value>> {
    let (ctg, coordinate) = parse_locus(pairing.get(0)?.as_str()?)?;
    let mut row = pairing.get(2)?.as_object()?.clone();
    row.insert("coordinate".to_string(), Value::String(coordinate.to_string()));
    row.insert("sequence".to_string(), context.sequence());
    row.insert("region".to_string(), Value::String(region.to_string()));
    row.insert("ctg".to_string(), Value::String(ctg.to_string()));
    Some(row)
}

impl Extractor for BlastScoreExtractor {
    fn kind(&self) -> TableKind {
        TableKind::BlastScore
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let results = context
            .record
            .module(ModuleKey::ClusterBlast)
            .key("general")
            .key("results")
            .array()?;

        let mut rows = Vec::new();
        for (position, result) in results.iter().enumerate() {
            let region = RegionId::from_positions(context.index, position);
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
                let pairings = match Probe::new(format!("ranking[{rank}]"), entry)
                    .index(1)
                    .key("pairings")
                    .array()
                {
                    Ok(pairings) => pairings,
                    Err(absence) => {
                        debug!(record = %context.record.id, region = %region, "{absence}");
                        continue;
                    }
                };
                for pairing in pairings {
                    match pairing_row(pairing, context, &region) {
                        Some(row) => rows.push(row),
                        None => warn!(
                            record = %context.record.id,
                            region = %region,
                            "malformed pairing skipped: {pairing}"
                        ),
                    }
                }
            }
        }

        Ok(Table::from_maps(rows).with_trailing_columns(&SYNTHESIZED))
    }
}
