use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mention_counts::client::HttpApiClient;
use mention_counts::config::Config;
use mention_counts::counts::CountEngine;
use mention_counts::models::CountOptions;

#[derive(Parser)]
#[command(name = "mention-counts")]
#[command(about = "Fetch mention counts for topics and hashtags", long_about = None)]
struct Cli {
    /// Topic ids and/or hashtags (hashtags start with '#')
    #[arg(required = true)]
    ids: Vec<String>,

    /// Start of the window (unix seconds or RFC 3339); defaults to one hour before --until
    #[arg(long, value_parser = parse_timestamp)]
    since: Option<DateTime<Utc>>,

    /// End of the window (unix seconds or RFC 3339); defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    until: Option<DateTime<Utc>>,

    /// Dimensions to break topic counts down by, e.g. gender,age_range
    #[arg(long, value_delimiter = ',')]
    breakdown_by: Vec<String>,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(seconds) = value.parse::<i64>() {
        return Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| anyhow!("timestamp {seconds} is out of range"));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .with_context(|| format!("'{value}' is neither unix seconds nor RFC 3339"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Loaded configuration (API: {})", config.api.base_url);

    let client = Arc::new(HttpApiClient::from_config(&config.api)?);
    let engine = CountEngine::from_config(client, &config.engine);

    let options = CountOptions {
        mentions_since: cli.since,
        mentions_until: cli.until,
        breakdown_by: cli.breakdown_by,
    };

    let records = engine
        .topic_counts(&cli.ids, &options)
        .await
        .context("failed to fetch mention counts")?;

    serde_json::to_writer_pretty(std::io::stdout().lock(), &records)
        .context("failed to write results")?;
    println!();

    Ok(())
}
