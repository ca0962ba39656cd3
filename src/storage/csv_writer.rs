use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Writes `df` as CSV with a header row, creating parent directories as needed.
/// Nulls are written as empty fields.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;

    info!("Wrote {} rows x {} columns to {}", df.height(), df.width(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("cleaned.csv");

        let mut df = df!(
            "Amazon store" => [Some("ATVPDKIKX0DER"), None],
            "Units sold" => [Some(5i64), None],
        )
        .unwrap();

        write_csv(&mut df, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, vec!["Amazon store,Units sold", "ATVPDKIKX0DER,5", ","]);
    }

    #[test]
    fn test_zero_rows_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let mut df = DataFrame::new(vec![
            Column::new("ASIN".into(), Vec::<Option<String>>::new()),
            Column::new("Sales".into(), Vec::<Option<String>>::new()),
        ])
        .unwrap();

        write_csv(&mut df, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim_end(), "ASIN,Sales");
    }
}
