use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "NORMALIZER";
const DEFAULT_SETTINGS_FILE: &str = "normalizer";

/// Run settings for the command-line pipeline.
///
/// Layered lowest to highest: built-in defaults, the settings file
/// (`normalizer.toml` in the working directory unless one is given), then
/// `NORMALIZER_*` environment variables. CLI flags are applied on top by the
/// binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// JSON Lines file with one sales record per line.
    pub input_path: PathBuf,
    /// Where the normalized table is written as CSV.
    pub output_path: PathBuf,
    /// Optional TOML file replacing the built-in mapping tables.
    pub mapping_path: Option<PathBuf>,
    /// Overrides the mapping config's fuzzy threshold.
    pub fuzzy_threshold: Option<u8>,
    /// Print the sales and return-rate summaries after writing the table.
    pub report: bool,
}

impl Settings {
    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("input_path", "dummydata.txt")?
            .set_default("output_path", "cleaned_data.csv")?
            .set_default("report", true)?;

        let builder = match settings_file {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name(DEFAULT_SETTINGS_FILE).required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to assemble settings")?
            .try_deserialize::<Settings>()
            .context("Failed to parse settings")?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "input_path = \"data/sales.jsonl\"").unwrap();
        writeln!(file, "mapping_path = \"mapping.toml\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.input_path, PathBuf::from("data/sales.jsonl"));
        assert_eq!(settings.output_path, PathBuf::from("cleaned_data.csv"));
        assert_eq!(settings.mapping_path, Some(PathBuf::from("mapping.toml")));
    }

    #[test]
    fn test_environment_overrides_threshold() {
        unsafe {
            env::set_var("NORMALIZER_FUZZY_THRESHOLD", "85");
        }

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "fuzzy_threshold = 70").unwrap();
        let settings = Settings::load(Some(file.path()));

        unsafe {
            env::remove_var("NORMALIZER_FUZZY_THRESHOLD");
        }

        assert_eq!(settings.unwrap().fuzzy_threshold, Some(85));
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("no/such/settings.toml"))).is_err());
    }
}
