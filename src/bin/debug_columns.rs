use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};
use std::path::PathBuf;

use sales_normalizer::config::MappingConfig;
use sales_normalizer::ingest::load_records;
use sales_normalizer::processor::{FuzzyMatch, JsonFlattener, KeyResolver, MatchKind};

/// Shows how every flattened key of the input resolves to a canonical column.
#[derive(Parser, Debug)]
#[command(name = "debug_columns")]
struct Cli {
    /// JSON Lines file to inspect. A built-in sample record is used when omitted.
    input: Option<PathBuf>,

    /// TOML mapping file (defaults to the built-in tables).
    #[arg(long)]
    mapping: Option<PathBuf>,

    #[arg(long)]
    threshold: Option<u8>,

    /// Only inspect the first N records.
    #[arg(long, default_value_t = 1)]
    limit: usize,
}

fn sample_records() -> Vec<Value> {
    vec![json!({
        "marketplaceId": "ATVPDKIKX0DER",
        "fnsku": "X001ABC",
        "sales": {
            "unitsOrdered": 5,
            "unitsRefunded": 1,
            "netProductSalesAmt": 42.5
        },
        "Units sold": 6,
        "warehouseNote": "aisle 9"
    })]
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.mapping {
        Some(path) => MappingConfig::from_file(path)?,
        None => MappingConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }

    let records = match &cli.input {
        Some(path) => load_records(path)?.records,
        None => sample_records(),
    };

    let resolver = KeyResolver::from_config(&config).context("Invalid mapping configuration")?;
    let flattener = JsonFlattener::with_separator(config.separator.clone());
    let schema = resolver.schema();
    let fuzzy = FuzzyMatch::new(schema, config.fuzzy_threshold)?;

    println!("=== KEY RESOLUTION ===");
    println!(
        "Strategies: {:?}, fuzzy threshold {}\n",
        resolver.strategy_names(),
        config.fuzzy_threshold
    );

    for (index, record) in records.iter().take(cli.limit).enumerate() {
        println!("Record {}:", index);
        let flat = flattener.flatten(record)?;

        for (key, value) in &flat {
            match resolver.resolve(key) {
                Some(resolution) => {
                    let column = &schema.columns()[resolution.position];
                    let how = match resolution.kind {
                        MatchKind::Exact => "exact".to_string(),
                        MatchKind::Fuzzy { score } => format!("fuzzy {}", score),
                    };
                    println!("   {:<40} -> {:<35} ({}) = {}", key, column, how, value);
                }
                None => {
                    // Closest column even though it missed the threshold.
                    let closest = fuzzy
                        .best_match(key)
                        .map(|(position, score)| (&schema.columns()[position], score));
                    match closest {
                        Some((column, score)) => println!(
                            "   {:<40} -> unresolved (closest '{}' at {})",
                            key, column, score
                        ),
                        None => println!("   {:<40} -> unresolved", key),
                    }
                }
            }
        }
        println!();
    }

    Ok(())
}
