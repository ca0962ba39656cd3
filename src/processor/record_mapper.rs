use serde_json::Value;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::debug;

use crate::config::MappingConfig;
use crate::error::NormalizeResult;
use crate::models::{CanonicalSchema, CellValue, MappedRow};
use crate::processor::json_flattener::JsonFlattener;
use crate::processor::key_resolver::{KeyResolver, MatchKind};

/// Per-record (or accumulated) outcome of key resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingStats {
    pub exact: usize,
    pub fuzzy: usize,
    pub unresolved: usize,
    /// Keys whose value replaced one already placed in the same column.
    pub overwritten: usize,
}

impl AddAssign for MappingStats {
    fn add_assign(&mut self, other: Self) {
        self.exact += other.exact;
        self.fuzzy += other.fuzzy;
        self.unresolved += other.unresolved;
        self.overwritten += other.overwritten;
    }
}

/// Flattens a raw record and lays its values out on the canonical schema.
#[derive(Debug)]
pub struct RecordMapper {
    flattener: JsonFlattener,
    resolver: KeyResolver,
}

impl RecordMapper {
    pub fn new(flattener: JsonFlattener, resolver: KeyResolver) -> Self {
        Self {
            flattener,
            resolver,
        }
    }

    pub fn from_config(config: &MappingConfig) -> NormalizeResult<Self> {
        let resolver = KeyResolver::from_config(config)?;
        Ok(Self::new(
            JsonFlattener::with_separator(config.separator.clone()),
            resolver,
        ))
    }

    pub fn schema(&self) -> &Arc<CanonicalSchema> {
        self.resolver.schema()
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    pub fn map_record(&self, record: &Value) -> NormalizeResult<MappedRow> {
        self.map_record_with_stats(record).map(|(row, _)| row)
    }

    /// Maps one record, returning the row and how its keys were resolved.
    ///
    /// Unresolved keys are dropped. When several keys land on the same column
    /// the last one in document order wins. Columns nothing resolved to are
    /// filled with [`CellValue::Missing`].
    pub fn map_record_with_stats(&self, record: &Value) -> NormalizeResult<(MappedRow, MappingStats)> {
        let flat = self.flattener.flatten(record)?;
        let schema = self.schema();

        let mut stats = MappingStats::default();
        let mut cells: Vec<Option<Value>> = vec![None; schema.len()];

        for (key, value) in flat {
            let Some(resolution) = self.resolver.resolve(&key) else {
                stats.unresolved += 1;
                continue;
            };

            match resolution.kind {
                MatchKind::Exact => stats.exact += 1,
                MatchKind::Fuzzy { .. } => stats.fuzzy += 1,
            }

            let slot = &mut cells[resolution.position];
            if slot.is_some() {
                stats.overwritten += 1;
                debug!(
                    "Key '{}' overwrote an earlier value in column '{}'",
                    key,
                    schema.columns()[resolution.position]
                );
            }
            *slot = Some(value);
        }

        let cells = cells
            .into_iter()
            .map(|cell| cell.map_or(CellValue::Missing, CellValue::Value))
            .collect();

        Ok((MappedRow::from_cells(Arc::clone(schema), cells)?, stats))
    }
}
