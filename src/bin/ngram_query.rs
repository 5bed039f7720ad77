//! ngram_query - look up corpus frequencies from the command line
//!
//! Run with:
//!   cargo run --features cli --bin ngram_query -- --config config/kilogram.yaml "the cat SUB"
//!
//! Prints one JSON object per query:
//!   {"query":"quick brown","counts":[{"ngram":["quick","brown"],"count":42}]}

use anyhow::{Context, Result};
use clap::Parser;
use kilogram::{assemble, Endpoint, FrequencyEntry, NgramOracle, OracleConfig};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ngram_query", about = "Query n-gram corpus frequencies")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "KILOGRAM_CONFIG")]
    config: Option<String>,

    /// Document store as host:port (overrides the configuration file)
    #[arg(long)]
    document_store: Option<String>,

    /// Column store REST gateway as host:port (overrides the configuration file)
    #[arg(long)]
    column_store: Option<String>,

    /// Extra substitution label, may be repeated
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Space-delimited n-grams; use SUB for the substitution token
    #[arg(required = true)]
    queries: Vec<String>,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    counts: Vec<FrequencyEntry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kilogram=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration");
            OracleConfig::from_file(path).with_context(|| format!("Failed to load {}", path))?
        }
        None => OracleConfig::default(),
    };
    config.apply_env().context("Invalid KILOGRAM_* environment")?;

    if let Some(value) = &args.document_store {
        config.document_store = Some(Endpoint::parse(value)?);
    }
    if let Some(value) = &args.column_store {
        config.set_column_store(Endpoint::parse(value)?);
    }
    config.vocabulary.labels.extend(args.labels.iter().cloned());

    let oracle = NgramOracle::connect(&config)
        .await
        .context("Failed to configure n-gram oracle")?;

    for query in &args.queries {
        let counts = oracle
            .get_freq(query)
            .await
            .with_context(|| format!("Query failed: {}", query))?;
        let output = QueryOutput {
            query,
            counts: assemble::entries(&counts),
        };
        println!("{}", serde_json::to_string(&output)?);
    }

    oracle.close();
    Ok(())
}
