use anyhow::{Context, Result};
use polars::prelude::*;

use super::require_columns;

pub const TOP_PRODUCTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct SalesSummary {
    /// `Amazon store`, `Net sales`: one row per store, sorted by store.
    pub by_store: DataFrame,
    /// `Parent ASIN`, `ASIN`, `Net sales`: the best selling rows, highest
    /// first. Holds more than [`TOP_PRODUCTS`] rows when several tie for last
    /// place; rows without net sales are never ranked.
    pub top_products: DataFrame,
}

/// Net sales per store and the top rows by net sales.
///
/// Rows without a store are left out of the per-store totals. `Net sales` is
/// read as a float; values that do not parse count as null.
pub fn sales_summary(df: &DataFrame) -> Result<SalesSummary> {
    require_columns(df, &["Amazon store", "Parent ASIN", "ASIN", "Net sales"])?;

    let by_store = df
        .clone()
        .lazy()
        .filter(col("Amazon store").is_not_null())
        .group_by([col("Amazon store")])
        .agg([col("Net sales").cast(DataType::Float64).sum()])
        .sort_by_exprs([col("Amazon store")], SortMultipleOptions::default())
        .collect()
        .context("Failed to total net sales by store")?;

    let ranked = df
        .clone()
        .lazy()
        .select([
            col("Parent ASIN"),
            col("ASIN"),
            col("Net sales").cast(DataType::Float64),
        ])
        .filter(col("Net sales").is_not_null())
        .sort_by_exprs(
            [col("Net sales")],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()
        .context("Failed to rank products by net sales")?;

    // Rows tied with the last place are all kept.
    let cutoff = ranked
        .column("Net sales")?
        .f64()?
        .get(TOP_PRODUCTS as usize - 1);
    let top_products = match cutoff {
        Some(cutoff) => ranked
            .lazy()
            .filter(col("Net sales").gt_eq(lit(cutoff)))
            .collect()
            .context("Failed to select top products")?,
        None => ranked,
    };

    Ok(SalesSummary {
        by_store,
        top_products,
    })
}
