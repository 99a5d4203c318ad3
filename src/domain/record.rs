//! Input records and node keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::domain::error::StructureError;

/// One flat input unit: an identifier, an optional parent reference and a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// `None` marks a top-level record, reparented under the synthetic root.
    pub parent_id: Option<String>,
    pub label: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            label: Some(label.into()),
        }
    }

    /// Extract a record from a JSON object using the configured field names.
    ///
    /// Identifiers may be strings or numbers. A missing, `null`, `false` or empty
    /// parent field means "no parent". Labels are optional and non-string
    /// scalars are rendered as text.
    pub fn from_object(
        index: usize,
        object: &Map<String, Value>,
        fields: &FieldNames,
    ) -> Result<Self, StructureError> {
        let invalid = |field: &str, reason: &str| StructureError::InvalidField {
            index,
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let id = match object.get(&fields.id) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => return Err(invalid(&fields.id, "empty identifier")),
            Some(Value::Number(n)) => number_text(n),
            Some(Value::Null) | None => return Err(invalid(&fields.id, "missing identifier")),
            Some(_) => return Err(invalid(&fields.id, "identifier must be a string or number")),
        };

        let parent_id = match object.get(&fields.parent_id) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(number_text(n)),
            Some(_) => {
                return Err(invalid(
                    &fields.parent_id,
                    "parent identifier must be a string or number",
                ))
            }
        };

        let label = match object.get(&fields.label) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(number_text(n)),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(_) => return Err(invalid(&fields.label, "label must be a scalar")),
        };

        Ok(Self {
            id,
            parent_id,
            label,
        })
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Text of a JSON number; integral floats such as `1.0` read as `1`.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Convert a list of JSON values (each an object) into records.
pub fn records_from_values(
    values: &[Value],
    fields: &FieldNames,
) -> Result<Vec<Record>, StructureError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(object) => Record::from_object(index, object, fields),
            _ => Err(StructureError::InvalidField {
                index,
                field: "<record>".to_string(),
                reason: "record must be a JSON object".to_string(),
            }),
        })
        .collect()
}

/// Names of the object fields holding identifier, parent identifier and label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub id: String,
    pub parent_id: String,
    pub label: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "id".into(),
            parent_id: "parentId".into(),
            label: "name".into(),
        }
    }
}

/// Identity of a hierarchy node.
///
/// The synthetic root has its own variant so that no record identifier,
/// including the literal string "null", can ever collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKey {
    Root,
    Record(String),
}

impl NodeKey {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeKey::Root)
    }

    /// Record identifier, `None` for the synthetic root.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            NodeKey::Root => None,
            NodeKey::Record(id) => Some(id),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(id: &str) -> Self {
        NodeKey::Record(id.to_string())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Root => write!(f, "<root>"),
            NodeKey::Record(id) => write!(f, "{}", id),
        }
    }
}
