use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::CanonicalSchema;

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 80;

/// Known source key paths and the canonical column each one feeds.
const REFERENCE_EXACT_MAPPINGS: &[(&str, &str)] = &[
    ("marketplaceId", "Amazon store"),
    ("startDate", "Start date"),
    ("endDate", "End date"),
    ("parentAsin", "Parent ASIN"),
    ("childAsin", "ASIN"),
    ("fnsku", "FNSKU"),
    ("msku", "MSKU"),
    ("netProceeds.perUnit.currencyCode", "Currency code"),
    ("sales.averageSellingPrice.amount", "Average sales price"),
    ("sales.unitsOrdered", "Units sold"),
    ("sales.unitsRefunded", "Units returned"),
    ("sales.netUnitsSold", "Net units sold"),
    ("sales.orderedProductSales.amount", "Sales"),
    ("sales.netProductSales.amount", "Net sales"),
    ("fees.baseFulfillment.perUnit", "Base fulfilment fee per unit"),
    ("fees.baseFulfillment.quantity", "Base fulfilment fee quantity"),
    ("fees.baseFulfillment.total", "Base fulfilment fee total"),
    ("cost.costOfGoodsSold", "Cost of goods sold per unit"),
    ("cost.miscellaneousCost", "Miscellaneous cost per unit"),
    ("netProceeds.total.amount", "Net proceeds total"),
];

const REFERENCE_SCHEMA: &[&str] = &[
    "Amazon store",
    "Start date",
    "End date",
    "Parent ASIN",
    "ASIN",
    "FNSKU",
    "MSKU",
    "Currency code",
    "Average sales price",
    "Units sold",
    "Units returned",
    "Net units sold",
    "Sales",
    "Net sales",
    "Base fulfilment fee per unit",
    "Base fulfilment fee quantity",
    "Base fulfilment fee total",
    "Fulfilment by Amazon fulfilment fees per unit",
    "Fulfilment by Amazon fulfilment fees quantity",
    "Fulfilment by Amazon fulfilment fees total",
    "Inbound Transportation Program Fee per unit",
    "Inbound Transportation Program Fee quantity",
    "Inbound Transportation Program Fee total",
    "Inbound transportation charge per unit",
    "Inbound transportation charge quantity",
    "Inbound transportation charge total",
    "Low-inventory-level fee per unit",
    "Low-inventory-level fee quantity",
    "Low-inventory-level fee total",
    "Referral fee per unit",
    "Referral fee quantity",
    "Referral fee total",
    "Refund administration fee per unit",
    "Refund administration fee quantity",
    "Refund administration fee total",
    "Sponsored Products charge per unit",
    "Sponsored Products charge quantity",
    "Sponsored Products charge total",
    "Cost of goods sold per unit",
    "Miscellaneous cost per unit",
    "Net proceeds total",
    "Net proceeds per unit",
];

/// Everything the normalization core needs to know about the target table.
///
/// `Default` carries the sales-report tables. A TOML file with the same keys
/// can replace any of them:
///
/// ```toml
/// separator = "."
/// fuzzy_threshold = 80
/// schema = ["Amazon store", "Units sold"]
///
/// [exact_mappings]
/// "marketplaceId" = "Amazon store"
/// "sales.unitsOrdered" = "Units sold"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Output columns, in output order.
    pub schema: Vec<String>,
    /// Flattened source key path -> canonical column.
    pub exact_mappings: HashMap<String, String>,
    /// Minimum weighted-ratio score (0-100) a fuzzy match needs.
    pub fuzzy_threshold: u8,
    pub separator: String,
}

impl MappingConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load mapping config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MappingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NormalizeResult<()> {
        if self.fuzzy_threshold > 100 {
            return Err(NormalizeError::InvalidConfig(format!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                self.fuzzy_threshold
            )));
        }

        if self.separator.is_empty() {
            return Err(NormalizeError::InvalidConfig(
                "separator cannot be empty".to_string(),
            ));
        }

        let schema = self.canonical_schema()?;
        if schema.is_empty() {
            return Err(NormalizeError::InvalidConfig(
                "schema must name at least one column".to_string(),
            ));
        }

        if let Some((key, column)) = self
            .exact_mappings
            .iter()
            .find(|(_, column)| !schema.contains(column))
        {
            return Err(NormalizeError::InvalidConfig(format!(
                "exact mapping '{}' targets '{}', which is not in the schema",
                key, column
            )));
        }

        Ok(())
    }

    pub fn canonical_schema(&self) -> NormalizeResult<CanonicalSchema> {
        CanonicalSchema::new(self.schema.iter().cloned())
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            schema: REFERENCE_SCHEMA.iter().map(|c| c.to_string()).collect(),
            exact_mappings: REFERENCE_EXACT_MAPPINGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            separator: ".".to_string(),
        }
    }
}
