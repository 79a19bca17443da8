use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{ModuleKey, RegionId, TableKind};
use crate::extract::{Extractor, RecordContext};
use crate::probe::{Probe, SchemaAbsence};
use crate::table::Table;

/// Analysis kind whose per-protein hits populate the table.
pub const PROTO_TO_REGION: &str = "ProtoToRegion_RiQ";

/// Per-protein alignment rows of every reference cluster compared against
/// every region of the record.
pub struct QueryToReferenceExtractor;

impl Extractor for QueryToReferenceExtractor {
    fn kind(&self) -> TableKind {
        TableKind::QueryToReference
    }

    fn extract(&self, context: &RecordContext<'_>) -> Result<Table, SchemaAbsence> {
        let by_region = context
            .record
            .module(ModuleKey::ClusterCompare)
            .key("db_results")
            .key("MIBiG")
            .key("by_region")
            .object()?;

        let mut rows = Vec::new();
        for (region_key, region) in by_region {
            let hits = match Probe::new(format!("by_region.{region_key}"), region)
                .key(PROTO_TO_REGION)
                .key("hits")
                .object()
            {
                Ok(hits) => hits,
                Err(absence) => {
                    debug!(record = %context.record.id, "skipping region: {absence}");
                    continue;
                }
            };
            let region_id = RegionId::from_region_key(context.index, region_key);

            for (reference, proteins) in hits {
                let Some(proteins) = proteins.as_object() else {
                    warn!(
                        record = %context.record.id,
                        region = %region_id,
                        reference = %reference,
                        "hit table is not a mapping, skipped"
                    );
                    continue;
                };
                for (protein, fields) in proteins {
                    let mut row = Map::new();
                    row.insert("protein".to_string(), Value::String(protein.clone()));
                    if let Some(fields) = fields.as_object() {
                        for (name, value) in fields {
                            row.insert(name.clone(), value.clone());
                        }
                    }
                    row.insert("reference".to_string(), Value::String(reference.clone()));
                    row.insert("region".to_string(), Value::String(region_id.to_string()));
                    row.insert("sequence".to_string(), context.sequence());
                    rows.push(row);
                }
            }
        }

        Ok(Table::from_maps(rows).with_trailing_columns(&["reference", "region", "sequence"]))
    }
}
