use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Records read from a JSON Lines source.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub records: Vec<Value>,
    /// Non-blank lines that were not valid JSON.
    pub skipped: usize,
}

/// Parses one JSON document per line.
///
/// Blank lines are ignored. Lines that fail to parse are logged and skipped;
/// only I/O failures are returned as errors.
pub fn parse_lines<R: BufRead>(reader: R) -> Result<IngestOutcome> {
    let mut outcome = IngestOutcome::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!("Skipping malformed line {}: {}", index + 1, e);
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

pub fn load_records(path: impl AsRef<Path>) -> Result<IngestOutcome> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let outcome = parse_lines(BufReader::new(file))
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    info!(
        "Loaded {} records from {} ({} malformed lines skipped)",
        outcome.records.len(),
        path.display(),
        outcome.skipped
    );
    Ok(outcome)
}
