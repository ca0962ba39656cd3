use anyhow::{Context, Result};
use polars::prelude::*;

use super::require_columns;

pub const TOP_RETURNED_PRODUCTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct ReturnRates {
    /// Per `Parent ASIN`, highest return rate first.
    pub by_product: DataFrame,
    /// Per `Amazon store`, highest return rate first.
    pub by_store: DataFrame,
}

/// `Units returned` as a percentage of `Units sold`. Null when nothing sold.
fn return_rate() -> Expr {
    when(col("Units sold").gt(lit(0.0)))
        .then(col("Units returned") * lit(100.0) / col("Units sold"))
        .otherwise(lit(NULL))
        .alias("Return rate")
}

fn rates_by(df: &DataFrame, key: &str) -> LazyFrame {
    df.clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([
            col("Units sold").cast(DataType::Float64).sum(),
            col("Units returned").cast(DataType::Float64).sum(),
        ])
        .with_column(return_rate())
        .sort_by_exprs(
            [col("Return rate"), col(key)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true),
        )
}

pub fn return_rates(df: &DataFrame) -> Result<ReturnRates> {
    require_columns(
        df,
        &["Parent ASIN", "Amazon store", "Units sold", "Units returned"],
    )?;

    let by_product = rates_by(df, "Parent ASIN")
        .limit(TOP_RETURNED_PRODUCTS)
        .collect()
        .context("Failed to compute return rates by product")?;

    let by_store = rates_by(df, "Amazon store")
        .collect()
        .context("Failed to compute return rates by store")?;

    Ok(ReturnRates {
        by_product,
        by_store,
    })
}
