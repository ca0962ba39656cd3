use anyhow::{Context, Result};
use polars::prelude::*;

use super::require_columns;

/// Fields that should never be negative or empty.
pub const CRITICAL_FIELDS: [&str; 3] = ["Net sales", "Units sold", "Units returned"];

/// Rows of the table that fail a check on one field. Every column is kept.
#[derive(Debug, Clone)]
pub struct FieldCheck {
    pub field: &'static str,
    pub negative: DataFrame,
    pub missing: DataFrame,
}

/// Lists the rows with a negative or missing value in each critical field.
///
/// Values that do not parse as numbers count as missing.
pub fn value_checks(df: &DataFrame) -> Result<Vec<FieldCheck>> {
    require_columns(df, &CRITICAL_FIELDS)?;

    CRITICAL_FIELDS
        .iter()
        .map(|&field| -> Result<FieldCheck> {
            let value = col(field).cast(DataType::Float64);

            let negative = df
                .clone()
                .lazy()
                .filter(value.clone().lt(lit(0.0)))
                .collect()
                .with_context(|| format!("Failed to find negative values in {}", field))?;

            let missing = df
                .clone()
                .lazy()
                .filter(value.is_null())
                .collect()
                .with_context(|| format!("Failed to find missing values in {}", field))?;

            Ok(FieldCheck {
                field,
                negative,
                missing,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks() -> Vec<FieldCheck> {
        let df = df!(
            "ASIN" => ["S1", "S2", "S3", "S4"],
            "Net sales" => [Some(10.0), Some(-2.5), None, Some(0.0)],
            "Units sold" => [Some(1i64), Some(2), Some(3), Some(-1)],
            "Units returned" => [None, Some(0i64), None, Some(0)],
        )
        .unwrap();
        value_checks(&df).unwrap()
    }

    fn asins(df: &DataFrame) -> Vec<Option<&str>> {
        df.column("ASIN").unwrap().str().unwrap().into_iter().collect()
    }

    #[test]
    fn test_one_check_per_field_in_order() {
        let fields: Vec<&str> = checks().iter().map(|c| c.field).collect();
        assert_eq!(fields, CRITICAL_FIELDS.to_vec());
    }

    #[test]
    fn test_negative_and_missing_rows() {
        let checks = checks();

        assert_eq!(asins(&checks[0].negative), vec![Some("S2")]);
        assert_eq!(asins(&checks[0].missing), vec![Some("S3")]);

        assert_eq!(asins(&checks[1].negative), vec![Some("S4")]);
        assert_eq!(checks[1].missing.height(), 0);

        assert_eq!(checks[2].negative.height(), 0);
        assert_eq!(asins(&checks[2].missing), vec![Some("S1"), Some("S3")]);

        // Listings keep the whole row.
        assert_eq!(checks[0].negative.width(), 4);
    }

    #[test]
    fn test_zero_is_not_negative() {
        let df = df!(
            "Net sales" => [0.0],
            "Units sold" => [0i64],
            "Units returned" => [0i64],
        )
        .unwrap();

        for check in value_checks(&df).unwrap() {
            assert_eq!(check.negative.height(), 0);
            assert_eq!(check.missing.height(), 0);
        }
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = df!("Net sales" => [1.0], "Units sold" => [1i64]).unwrap();
        let err = value_checks(&df).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: Units returned");
    }
}
