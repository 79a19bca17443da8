use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::ModuleKey;
use crate::error::BgcError;
use crate::probe::{Probe, SchemaAbsence};

/// Records whose `modules` mapping holds no more than this many entries only
/// carry the two baseline detection modules and are skipped.
pub const BASELINE_MODULE_COUNT: usize = 2;

/// One parsed annotation-tool output document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationDocument {
    #[serde(default)]
    pub input_file: Option<String>,
    #[serde(default)]
    pub records: Vec<AnnotationRecord>,
}

/// One sequence (contig or bin) of a document.
///
/// Deserialization never fails for a single record: fields of an unexpected
/// type fall back to their defaults and a record that is not an object
/// becomes an empty, non-analyzable record. Record positions are kept, so
/// region ids of the siblings do not move.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct AnnotationRecord {
    pub id: String,
    pub description: String,
    pub areas: Vec<Area>,
    pub modules: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Area {
    pub products: Vec<String>,
}

impl AnnotationDocument {
    /// Loads a document from a JSON file, a `.json.gz` file, or an output
    /// directory `<name>/` containing `<name>.json`.
    pub fn load(path: &Path) -> Result<Self, BgcError> {
        let file_path = resolve_document_path(path)?;
        let file = File::open(&file_path).map_err(|err| BgcError::DocumentRead {
            path: file_path.clone(),
            message: err.to_string(),
        })?;
        let reader: Box<dyn Read> = if is_gzip(&file_path) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        serde_json::from_reader(BufReader::new(reader)).map_err(|err| {
            if err.is_io() {
                BgcError::DocumentRead {
                    path: file_path.clone(),
                    message: err.to_string(),
                }
            } else {
                BgcError::DocumentParse {
                    path: file_path.clone(),
                    message: err.to_string(),
                }
            }
        })
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Indices of records carrying more than the baseline modules, in order.
    pub fn analyzable_indices(&self) -> Vec<usize> {
        select_records(&self.records)
    }
}

/// Record selector: the ordered indices `i` with `len(records[i].modules) > 2`.
pub fn select_records(records: &[AnnotationRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_analyzable())
        .map(|(index, _)| index)
        .collect()
}

impl From<Value> for AnnotationRecord {
    fn from(value: Value) -> Self {
        Self::from_value_lenient(&value)
    }
}

impl AnnotationRecord {
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            warn!("record is not a JSON object, ignored");
            return Self::default();
        };

        let mut coerced = Vec::new();
        let id = text_field(object, "id", &mut coerced);
        let description = text_field(object, "description", &mut coerced);
        let areas = match object.get("areas") {
            None => Vec::new(),
            Some(Value::Array(areas)) => areas
                .iter()
                .map(|area| Area::from_value_lenient(area, &mut coerced))
                .collect(),
            Some(_) => {
                coerced.push("areas");
                Vec::new()
            }
        };
        let modules = match object.get("modules") {
            None => Map::new(),
            Some(Value::Object(modules)) => modules.clone(),
            Some(_) => {
                coerced.push("modules");
                Map::new()
            }
        };

        if !coerced.is_empty() {
            coerced.dedup();
            warn!(record = %id, fields = ?coerced, "unexpected field types, defaults used");
        }
        Self {
            id,
            description,
            areas,
            modules,
        }
    }

    pub fn is_analyzable(&self) -> bool {
        self.modules.len() > BASELINE_MODULE_COUNT
    }

    /// Looks a module up by its qualified name, falling back to the bare name.
    pub fn module(&self, key: ModuleKey) -> Probe<'_> {
        let found = self
            .modules
            .get(key.qualified_name())
            .or_else(|| self.modules.get(key.short_name()));
        match found {
            Some(value) => Probe::new(key.short_name(), value),
            None => Probe::absent(SchemaAbsence::new("modules", key.qualified_name())),
        }
    }
}

impl Area {
    fn from_value_lenient(value: &Value, coerced: &mut Vec<&'static str>) -> Self {
        let products = match value.get("products") {
            None if value.is_object() => Vec::new(),
            Some(Value::Array(products)) => products
                .iter()
                .filter_map(|product| match product {
                    Value::String(label) => Some(label.clone()),
                    Value::Null => {
                        coerced.push("areas");
                        None
                    }
                    other => {
                        coerced.push("areas");
                        Some(other.to_string())
                    }
                })
                .collect(),
            Some(Value::String(label)) => {
                coerced.push("areas");
                vec![label.clone()]
            }
            _ => {
                coerced.push("areas");
                Vec::new()
            }
        };
        Self { products }
    }
}

/// A string field; numbers and booleans are stringified, anything else
/// (including `null`) becomes empty.
fn text_field(
    object: &Map<String, Value>,
    key: &'static str,
    coerced: &mut Vec<&'static str>,
) -> String {
    match object.get(key) {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => {
            coerced.push(key);
            value.to_string()
        }
        Some(_) => {
            coerced.push(key);
            String::new()
        }
    }
}

fn resolve_document_path(path: &Path) -> Result<PathBuf, BgcError> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| BgcError::DocumentRead {
            path: path.to_path_buf(),
            message: "directory name is not valid UTF-8".to_string(),
        })?;
    let candidate = path.join(format!("{name}.json"));
    if candidate.is_file() {
        return Ok(candidate);
    }
    Err(BgcError::DocumentRead {
        path: path.to_path_buf(),
        message: format!("no {name}.json inside output directory"),
    })
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_lookup_accepts_bare_name() {
        let record: AnnotationRecord = serde_json::from_value(json!({
            "id": "seq1",
            "modules": {"clusterblast": {"general": {}}}
        }))
        .unwrap();
        assert!(record.module(ModuleKey::ClusterBlast).key("general").value().is_ok());
        let err = record.module(ModuleKey::ClusterCompare).value().unwrap_err();
        assert_eq!(err.missing, "antismash.modules.cluster_compare");
    }

    #[test]
    fn mistyped_fields_fall_back_to_defaults() {
        let record: AnnotationRecord = serde_json::from_value(json!({
            "id": 17,
            "description": null,
            "areas": [{"products": "NRPS"}, {"products": ["T1PKS", null]}, "junk"],
            "modules": []
        }))
        .unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.description, "");
        assert_eq!(record.areas.len(), 3);
        assert_eq!(record.areas[0].products, ["NRPS"]);
        assert_eq!(record.areas[1].products, ["T1PKS"]);
        assert!(record.areas[2].products.is_empty());
        assert!(record.modules.is_empty());
    }
}
