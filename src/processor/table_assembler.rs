use polars::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::{CanonicalSchema, CellValue, MappedRow};

/// Mapped rows in input order, all laid out on one canonical schema.
#[derive(Debug, Clone)]
pub struct OutputTable {
    schema: Arc<CanonicalSchema>,
    rows: Vec<MappedRow>,
}

impl OutputTable {
    pub fn new(schema: Arc<CanonicalSchema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have been built against this table's schema.
    pub fn push_row(&mut self, row: MappedRow) -> NormalizeResult<()> {
        if !row.shares_schema(&self.schema) {
            return Err(NormalizeError::SchemaViolation(format!(
                "row built against a different schema ({} columns) than the table ({} columns)",
                row.schema().len(),
                self.schema.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn schema(&self) -> &Arc<CanonicalSchema> {
        &self.schema
    }

    pub fn column_names(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[MappedRow] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let position = self.schema.position(name)?;
        Some(self.rows.iter().map(move |row| &row.cells()[position]))
    }

    /// Converts to a polars `DataFrame`, one column per schema entry in order.
    ///
    /// Each column's type comes from its present values: all integers become
    /// `Int64`, all numbers `Float64`, all booleans `Boolean`, anything else
    /// (and columns with no values at all) `String`. Missing cells and JSON
    /// nulls become polars nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.width());

        for (position, name) in self.schema.columns().iter().enumerate() {
            let values: Vec<Option<&Value>> = self
                .rows
                .iter()
                .map(|row| row.cells()[position].as_value())
                .collect();

            columns.push(build_series(name, &values).into());
        }

        DataFrame::new(columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_kind(values: &[Option<&Value>]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;

    for value in values.iter().flatten() {
        let this = match value {
            Value::Number(n) if n.is_i64() => ColumnKind::Int,
            Value::Number(_) => ColumnKind::Float,
            Value::Bool(_) => ColumnKind::Bool,
            _ => return ColumnKind::Text,
        };

        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int | ColumnKind::Float), ColumnKind::Int | ColumnKind::Float) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        });
    }

    kind.unwrap_or(ColumnKind::Text)
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn build_series(name: &str, values: &[Option<&Value>]) -> Series {
    match infer_kind(values) {
        ColumnKind::Int => {
            let data: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Float => {
            let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Bool => {
            let data: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Series::new(name.into(), data)
        }
        ColumnKind::Text => {
            let data: Vec<Option<String>> = values.iter().map(|v| v.map(render_text)).collect();
            Series::new(name.into(), data)
        }
    }
}

/// Collects mapped rows into an [`OutputTable`].
///
/// Purely structural: rows are neither filtered nor deduplicated.
#[derive(Debug, Clone)]
pub struct TableAssembler {
    schema: Arc<CanonicalSchema>,
}

impl TableAssembler {
    pub fn new(schema: Arc<CanonicalSchema>) -> Self {
        Self { schema }
    }

    pub fn assemble<I>(&self, rows: I) -> NormalizeResult<OutputTable>
    where
        I: IntoIterator<Item = MappedRow>,
    {
        let mut table = OutputTable::new(Arc::clone(&self.schema));
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn schema() -> Arc<CanonicalSchema> {
        Arc::new(CanonicalSchema::new(["Amazon store", "Units sold", "Net sales", "Flag"]).unwrap())
    }

    fn row(schema: &Arc<CanonicalSchema>, cells: Vec<CellValue>) -> MappedRow {
        MappedRow::from_cells(Arc::clone(schema), cells).unwrap()
    }

    fn sample_table() -> OutputTable {
        let schema = schema();
        let rows = vec![
            row(
                &schema,
                vec![
                    json!("ATVPDKIKX0DER").into(),
                    json!(5).into(),
                    json!(12.5).into(),
                    json!(true).into(),
                ],
            ),
            row(
                &schema,
                vec![
                    json!("A1F83G8C2ARO7P").into(),
                    CellValue::Missing,
                    json!(3).into(),
                    CellValue::Missing,
                ],
            ),
        ];
        TableAssembler::new(schema).assemble(rows).unwrap()
    }

    #[test]
    fn test_rows_keep_input_order() {
        let table = sample_table();
        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 4);
        assert_eq!(
            table.cell(1, "Amazon store"),
            Some(&CellValue::Value(json!("A1F83G8C2ARO7P")))
        );
        let units: Vec<&CellValue> = table.column("Units sold").unwrap().collect();
        assert_eq!(units, vec![&CellValue::Value(json!(5)), &CellValue::Missing]);
        assert!(table.column("Sales").is_none());
    }

    #[test]
    fn test_dataframe_types_and_nulls() {
        let df = sample_table().to_dataframe().unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["Amazon store", "Units sold", "Net sales", "Flag"]);

        assert_eq!(df.column("Amazon store").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Units sold").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Net sales").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Flag").unwrap().dtype(), &DataType::Boolean);

        assert_eq!(df.column("Units sold").unwrap().null_count(), 1);
        let net_sales = df.column("Net sales").unwrap().f64().unwrap();
        assert_eq!(net_sales.get(1), Some(3.0));
    }

    #[test]
    fn test_mixed_values_fall_back_to_text() {
        let (one, half, two) = (json!(1), json!(0.5), json!("two"));
        let (yes, tags) = (json!(true), json!([1, 2]));

        assert_eq!(infer_kind(&[Some(&one), None, Some(&two)]), ColumnKind::Text);
        assert_eq!(infer_kind(&[Some(&yes), Some(&one)]), ColumnKind::Text);
        assert_eq!(infer_kind(&[Some(&one), Some(&half)]), ColumnKind::Float);
        assert_eq!(infer_kind(&[None, None]), ColumnKind::Text);

        let series = build_series("tags", &[Some(&tags)]);
        assert_eq!(series.str().unwrap().get(0), Some("[1,2]"));
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let schema = schema();
        let table = TableAssembler::new(Arc::clone(&schema)).assemble(Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), schema.columns());

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 4);
        assert_eq!(df.column("Net sales").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_row_from_other_schema_is_rejected() {
        let other = Arc::new(CanonicalSchema::new(["ASIN"]).unwrap());
        let foreign = row(&other, vec![CellValue::Missing]);

        let err = TableAssembler::new(schema()).assemble(vec![foreign]).unwrap_err();
        assert!(matches!(err, NormalizeError::SchemaViolation(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_column_order_is_schema_order(
            units in prop::collection::vec(prop::option::of(any::<i32>()), 0..20)
        ) {
            let schema = schema();
            let rows = units.iter().map(|u| {
                let cell = u.map_or(CellValue::Missing, |n| json!(n).into());
                row(&schema, vec![CellValue::Missing, cell, CellValue::Missing, CellValue::Missing])
            });

            let table = TableAssembler::new(Arc::clone(&schema)).assemble(rows).unwrap();
            prop_assert_eq!(table.height(), units.len());
            for mapped in table.rows() {
                let names: Vec<&str> = mapped.iter().map(|(name, _)| name).collect();
                prop_assert_eq!(names, vec!["Amazon store", "Units sold", "Net sales", "Flag"]);
            }

            let df = table.to_dataframe().unwrap();
            let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
            prop_assert_eq!(names, schema.columns().to_vec());
        }
    }
}
