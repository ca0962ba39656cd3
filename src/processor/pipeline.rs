use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::MappingConfig;
use crate::error::NormalizeResult;
use crate::models::CanonicalSchema;
use crate::processor::record_mapper::{MappingStats, RecordMapper};
use crate::processor::table_assembler::{OutputTable, TableAssembler};

/// Counts gathered over one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub records: usize,
    pub keys: MappingStats,
    /// Cells left at the missing marker, summed over all rows.
    pub missing_cells: usize,
}

/// Raw records in, canonical table out.
#[derive(Debug)]
pub struct NormalizationPipeline {
    mapper: RecordMapper,
    assembler: TableAssembler,
}

impl NormalizationPipeline {
    pub fn new(config: &MappingConfig) -> NormalizeResult<Self> {
        let mapper = RecordMapper::from_config(config)?;
        let assembler = TableAssembler::new(Arc::clone(mapper.schema()));
        Ok(Self { mapper, assembler })
    }

    pub fn schema(&self) -> &Arc<CanonicalSchema> {
        self.mapper.schema()
    }

    pub fn mapper(&self) -> &RecordMapper {
        &self.mapper
    }

    pub fn run<'a, I>(&self, records: I) -> NormalizeResult<OutputTable>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.run_with_report(records).map(|(table, _)| table)
    }

    /// Maps every record in order. Stops at the first record that is not a
    /// JSON object.
    pub fn run_with_report<'a, I>(&self, records: I) -> NormalizeResult<(OutputTable, PipelineReport)>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut report = PipelineReport::default();
        let mut rows = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let (row, stats) = self.mapper.map_record_with_stats(record).inspect_err(|e| {
                error!("Record {} cannot be normalized: {}", index, e);
            })?;

            report.records += 1;
            report.keys += stats;
            report.missing_cells += row.missing_count();
            rows.push(row);
        }

        let table = self.assembler.assemble(rows)?;

        info!(
            "Normalized {} records into {} columns: {} exact keys, {} fuzzy keys, {} unresolved, {} overwritten",
            report.records,
            table.width(),
            report.keys.exact,
            report.keys.fuzzy,
            report.keys.unresolved,
            report.keys.overwritten
        );

        Ok((table, report))
    }
}
