use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NormalizeError, NormalizeResult};

/// Single-level view of a record: dot-joined key paths to leaf values.
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration follows the
/// order the leaves were found in the source document.
pub type FlatRecord = Map<String, Value>;

/// Value held by one cell of a mapped row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No source key resolved to this column.
    Missing,
    /// The source value, carried verbatim (a JSON `null` stays a present value).
    Value(Value),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// The source value, if any. JSON `null` counts as no value here.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CellValue::Value(Value::Null) | CellValue::Missing => None,
            CellValue::Value(v) => Some(v),
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        CellValue::Value(value)
    }
}

/// Ordered, duplicate-free list of output column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl CanonicalSchema {
    pub fn new<I, S>(columns: I) -> NormalizeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(columns.len());

        for (index, column) in columns.iter().enumerate() {
            if column.is_empty() {
                return Err(NormalizeError::InvalidConfig(
                    "canonical column names cannot be empty".to_string(),
                ));
            }
            if positions.insert(column.clone(), index).is_some() {
                return Err(NormalizeError::InvalidConfig(format!(
                    "duplicate canonical column '{}'",
                    column
                )));
            }
        }

        Ok(Self { columns, positions })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }
}

/// One output row: exactly one cell per canonical column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    schema: Arc<CanonicalSchema>,
    cells: Vec<CellValue>,
}

impl MappedRow {
    /// Builds a row from cells already laid out in schema order.
    pub fn from_cells(schema: Arc<CanonicalSchema>, cells: Vec<CellValue>) -> NormalizeResult<Self> {
        if cells.len() != schema.len() {
            return Err(NormalizeError::SchemaViolation(format!(
                "row has {} cells but the canonical schema has {} columns",
                cells.len(),
                schema.len()
            )));
        }
        Ok(Self { schema, cells })
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    /// Cell for `column`, or `None` if the column is not part of the schema.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.schema.position(column).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    pub(crate) fn shares_schema(&self, schema: &Arc<CanonicalSchema>) -> bool {
        Arc::ptr_eq(&self.schema, schema) || *self.schema == **schema
    }
}
