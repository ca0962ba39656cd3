use anyhow::{Context, Result};
use polars::prelude::*;

use super::require_columns;

/// Net proceeds, net sales and units per `Parent ASIN`, with
/// `Profitability ratio = Net proceeds total / Net sales`.
///
/// Sorted by net proceeds, highest first. The ratio is null when a product has
/// no net sales.
pub fn profitability(df: &DataFrame) -> Result<DataFrame> {
    require_columns(
        df,
        &["Parent ASIN", "Net proceeds total", "Net sales", "Units sold"],
    )?;

    df.clone()
        .lazy()
        .filter(col("Parent ASIN").is_not_null())
        .group_by([col("Parent ASIN")])
        .agg([
            col("Net proceeds total").cast(DataType::Float64).sum(),
            col("Net sales").cast(DataType::Float64).sum(),
            col("Units sold").cast(DataType::Float64).sum(),
        ])
        .with_column(
            when(col("Net sales").neq(lit(0.0)))
                .then(col("Net proceeds total") / col("Net sales"))
                .otherwise(lit(NULL))
                .alias("Profitability ratio"),
        )
        .sort_by_exprs(
            [col("Net proceeds total"), col("Parent ASIN")],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true),
        )
        .collect()
        .context("Failed to compute profitability by product")
}
