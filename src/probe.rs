//! Optional chaining over untyped module data.
//!
//! Module payloads are not type-checked upstream, so every extractor walks
//! them through [`Probe`]: each step either moves one level deeper or records
//! where the walk stopped. Nothing here panics on a missing key, an index out
//! of range, or a value of the wrong shape.

use serde_json::{Map, Value};
use thiserror::Error;

/// An expected key, index or shape was not found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing `{missing}` under `{path}`")]
pub struct SchemaAbsence {
    pub path: String,
    pub missing: String,
}

impl SchemaAbsence {
    pub fn new(path: impl Into<String>, missing: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            missing: missing.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Probe<'a> {
    trail: String,
    state: Result<&'a Value, SchemaAbsence>,
}

impl<'a> Probe<'a> {
    pub fn new(label: impl Into<String>, value: &'a Value) -> Self {
        Self {
            trail: label.into(),
            state: Ok(value),
        }
    }

    pub fn absent(absence: SchemaAbsence) -> Self {
        Self {
            trail: absence.path.clone(),
            state: Err(absence),
        }
    }

    pub fn key(self, key: &str) -> Self {
        let Probe { trail, state } = self;
        match state {
            Ok(value) => match value.as_object().and_then(|map| map.get(key)) {
                Some(next) => Probe {
                    trail: format!("{trail}.{key}"),
                    state: Ok(next),
                },
                None => Probe {
                    state: Err(SchemaAbsence::new(trail.clone(), key)),
                    trail,
                },
            },
            Err(absence) => Probe {
                trail,
                state: Err(absence),
            },
        }
    }

    pub fn index(self, index: usize) -> Self {
        let Probe { trail, state } = self;
        match state {
            Ok(value) => match value.as_array().and_then(|items| items.get(index)) {
                Some(next) => Probe {
                    trail: format!("{trail}[{index}]"),
                    state: Ok(next),
                },
                None => Probe {
                    state: Err(SchemaAbsence::new(trail.clone(), format!("[{index}]"))),
                    trail,
                },
            },
            Err(absence) => Probe {
                trail,
                state: Err(absence),
            },
        }
    }

    pub fn trail(&self) -> &str {
        &self.trail
    }

    pub fn value(self) -> Result<&'a Value, SchemaAbsence> {
        self.state
    }

    pub fn object(self) -> Result<&'a Map<String, Value>, SchemaAbsence> {
        let trail = self.trail;
        self.state?
            .as_object()
            .ok_or_else(|| SchemaAbsence::new(trail, "<object>"))
    }

    pub fn array(self) -> Result<&'a Vec<Value>, SchemaAbsence> {
        let trail = self.trail;
        self.state?
            .as_array()
            .ok_or_else(|| SchemaAbsence::new(trail, "<array>"))
    }

    pub fn str(self) -> Result<&'a str, SchemaAbsence> {
        let trail = self.trail;
        self.state?
            .as_str()
            .ok_or_else(|| SchemaAbsence::new(trail, "<string>"))
    }
}

/// `value[key]` cloned, or null when `value` is not an object or lacks `key`.
pub fn field_or_null(value: &Value, key: &str) -> Value {
    value
        .as_object()
        .and_then(|map| map.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}
