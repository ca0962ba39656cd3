use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use sales_normalizer::config::{MappingConfig, Settings};
use sales_normalizer::ingest::load_records;
use sales_normalizer::processor::NormalizationPipeline;
use sales_normalizer::report::{profitability, return_rates, sales_summary, value_checks};
use sales_normalizer::storage::write_csv;

#[derive(Parser, Debug)]
#[command(
    name = "sales-normalizer",
    about = "Normalize JSON Lines sales records into a fixed CSV schema",
    version
)]
struct Cli {
    /// JSON Lines file with one record per line.
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV file to write the normalized table to.
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML file with the schema and exact mappings.
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Minimum fuzzy-match score (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Skip the sales and return-rate summaries.
    #[arg(long)]
    no_report: bool,

    /// Settings file (defaults to normalizer.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(input) = self.input {
            settings.input_path = input;
        }
        if let Some(output) = self.output {
            settings.output_path = output;
        }
        if self.mapping.is_some() {
            settings.mapping_path = self.mapping;
        }
        if self.threshold.is_some() {
            settings.fuzzy_threshold = self.threshold;
        }
        if self.no_report {
            settings.report = false;
        }
        settings
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings_file = cli.config.clone();
    let settings = cli.apply(
        Settings::load(settings_file.as_deref()).context("Failed to load run settings")?,
    );

    info!("🚀 Starting sales normalization: {}", settings.input_path.display());

    let mut mapping = match &settings.mapping_path {
        Some(path) => MappingConfig::from_file(path)?,
        None => MappingConfig::default(),
    };
    if let Some(threshold) = settings.fuzzy_threshold {
        mapping = mapping.with_threshold(threshold);
    }

    let pipeline = NormalizationPipeline::new(&mapping).context("Invalid mapping configuration")?;
    info!(
        "Loaded mapping: {} columns, {} exact mappings, fuzzy threshold {}",
        pipeline.schema().len(),
        mapping.exact_mappings.len(),
        mapping.fuzzy_threshold
    );

    let ingested = load_records(&settings.input_path)?;
    if ingested.records.is_empty() {
        warn!("No records found in {}", settings.input_path.display());
    }

    let table = pipeline
        .run(&ingested.records)
        .context("Failed to normalize records")?;

    let mut df = table
        .to_dataframe()
        .context("Failed to build DataFrame from normalized table")?;
    write_csv(&mut df, &settings.output_path)?;

    println!("{}", df.head(Some(5)));

    if settings.report {
        let summary = sales_summary(&df)?;
        println!("\nNet sales by Amazon store:\n{}", summary.by_store);
        println!("\nTop products by net sales:\n{}", summary.top_products);

        let rates = return_rates(&df)?;
        println!("\nReturn rates by product:\n{}", rates.by_product);
        println!("\nReturn rates by Amazon store:\n{}", rates.by_store);

        println!("\nProfitability by product:\n{}", profitability(&df)?);

        for check in value_checks(&df)? {
            println!("\nNegative values in {}:\n{}", check.field, check.negative);
            println!("\nMissing values in {}:\n{}", check.field, check.missing);
        }
    }

    info!("✅ Cleaned data saved to {}", settings.output_path.display());
    Ok(())
}
