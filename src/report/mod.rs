pub mod profitability;
pub mod return_rates;
pub mod sales_summary;
pub mod value_checks;

pub use profitability::*;
pub use return_rates::*;
pub use sales_summary::*;
pub use value_checks::*;

use anyhow::{Result, bail};
use polars::prelude::DataFrame;

/// Fails with the name of the first column `df` lacks.
pub(crate) fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    for name in columns {
        if df.column(name).is_err() {
            bail!("Missing required column: {}", name);
        }
    }
    Ok(())
}
