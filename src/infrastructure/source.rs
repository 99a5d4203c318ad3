//! Record sources: JSON arrays of objects from files or stdin.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::infrastructure::error::{InfraError, InfraResult, IoResultExt};

/// Path that stands for standard input.
pub const STDIN: &str = "-";

/// Parse a JSON array of record objects.
pub fn read_values<R: Read>(reader: R, origin: &str) -> InfraResult<Vec<Value>> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| InfraError::Json {
        context: origin.to_string(),
        source: e,
    })?;
    match value {
        Value::Array(values) => {
            debug!(origin, count = values.len(), "records read");
            Ok(values)
        }
        other => Err(InfraError::InvalidInput {
            context: origin.to_string(),
            message: format!("expected an array of records, found {}", kind(&other)),
        }),
    }
}

/// Load record objects from `path`, or from stdin when `path` is `-`.
pub fn load_values(path: &Path) -> InfraResult<Vec<Value>> {
    if path.as_os_str() == STDIN {
        return read_values(io::stdin().lock(), "<stdin>");
    }
    let file = File::open(path).with_path_context("open records", path)?;
    read_values(BufReader::new(file), &path.display().to_string())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
