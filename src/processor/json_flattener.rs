use serde_json::{Map, Value};

use crate::error::{NormalizeError, NormalizeResult, json_type_name};
use crate::models::FlatRecord;

pub const DEFAULT_SEPARATOR: &str = ".";

/// Turns nested JSON objects into single-level records keyed by joined paths.
///
/// Arrays and scalars are leaves; only objects are descended into. The walk
/// uses an explicit stack, so deeply nested input cannot exhaust the call
/// stack.
#[derive(Debug, Clone)]
pub struct JsonFlattener {
    separator: String,
}

struct Frame<'a> {
    prefix: Option<String>,
    entries: serde_json::map::Iter<'a>,
}

impl JsonFlattener {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        JsonFlattener {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Flattens one record. Fails fast if the record is not an object.
    pub fn flatten(&self, record: &Value) -> NormalizeResult<FlatRecord> {
        match record {
            Value::Object(map) => Ok(self.flatten_object(map)),
            other => Err(NormalizeError::NotAnObject {
                found: json_type_name(other),
            }),
        }
    }

    pub fn flatten_object(&self, root: &Map<String, Value>) -> FlatRecord {
        let mut flat = FlatRecord::new();
        let mut stack = vec![Frame {
            prefix: None,
            entries: root.iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some((key, value)) = frame.entries.next() else {
                stack.pop();
                continue;
            };

            let path = match &frame.prefix {
                Some(parent) => format!("{}{}{}", parent, self.separator, key),
                None => key.clone(),
            };

            match value {
                Value::Object(child) => stack.push(Frame {
                    prefix: Some(path),
                    entries: child.iter(),
                }),
                // A path seen twice keeps its first slot; the later value wins.
                leaf => {
                    flat.insert(path, leaf.clone());
                }
            }
        }

        flat
    }
}

impl Default for JsonFlattener {
    fn default() -> Self {
        Self::new()
    }
}
