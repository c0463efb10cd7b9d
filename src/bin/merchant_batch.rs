//! Merchant Batch CLI
//!
//! Resolves a list of merchant names and writes the enriched CSV.
//!
//! Usage:
//!   cargo run --features cli --bin merchant_batch
//!   cargo run --features cli --bin merchant_batch -- --merchants merchants.txt --output out.csv
//!   cargo run --features cli --bin merchant_batch -- --json --no-verify
//!
//! Requires `ABR_GUID` (environment or `.env`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use futures::stream::{self, StreamExt};

use merchant_resolver::report::write_csv;
use merchant_resolver::{
    default_merchants, AbrClient, LookupCache, MerchantRow, Resolver, ResolverConfig, Summary,
};

/// Resolve merchant names to ABN registry identities
#[derive(Parser, Debug)]
#[command(name = "merchant_batch")]
#[command(about = "Resolve merchant names against the Australian Business Register")]
struct Args {
    /// Newline-delimited merchant names (defaults to the built-in list)
    #[arg(long, short = 'm')]
    merchants: Option<PathBuf>,

    /// CSV output path (overrides OUTPUT_FILE)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Skip the verification search
    #[arg(long)]
    no_verify: bool,

    /// Print results as JSON instead of the coloured log
    #[arg(long)]
    json: bool,

    /// Merchants resolved concurrently
    #[arg(long, short = 'c', default_value_t = 4)]
    concurrency: usize,
}

/// Merchant names from a file, one per line; blank lines and `#` comments skipped
fn read_merchants(path: &PathBuf) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read merchants file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn print_row(index: usize, total: usize, row: &MerchantRow) {
    let progress = format!("[{}/{}]", index + 1, total).dimmed();
    if row.is_found() {
        println!(
            "{} {} {} {} ({}, {})",
            progress,
            "OK".green(),
            row.merchant_name.bold(),
            row.abn.cyan(),
            row.legal_name,
            row.state
        );
    } else {
        println!(
            "{} {} {}",
            progress,
            "MISS".yellow(),
            row.merchant_name.bold()
        );
    }
}

fn print_summary(summary: &Summary, output: &str) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "SUMMARY".cyan().bold());
    println!("{}", "═".repeat(60));
    println!("Total merchants:  {}", summary.total);
    println!("  ABN found:      {}", summary.found.to_string().green());
    println!("  ABN not found:  {}", summary.not_found.to_string().red());
    println!("  Success rate:   {:.1}%", summary.success_rate);
    println!("Results written to {}", output.yellow());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ResolverConfig::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merchant_resolver=warn".into()),
        )
        .init();

    let merchants = match &args.merchants {
        Some(path) => read_merchants(path)?,
        None => default_merchants(),
    };
    let output = args.output.unwrap_or_else(|| config.output_file.clone());

    let client = AbrClient::new(&config).context("Failed to create ABR client")?;
    let resolver = Resolver::new(Arc::new(client), config.ranking_policy()?)
        .with_verification(config.enable_verification && !args.no_verify);
    let cache = Arc::new(LookupCache::new(resolver));

    if !args.json {
        println!(
            "{} {} merchants",
            "Resolving".cyan().bold(),
            merchants.len()
        );
    }

    let total = merchants.len();
    let rows: Vec<MerchantRow> = stream::iter(merchants)
        .map(|name| {
            let cache = Arc::clone(&cache);
            async move {
                let identity = cache.resolve(&name).await;
                MerchantRow::from_resolution(&name, identity.as_ref())
            }
        })
        .buffered(args.concurrency.max(1))
        .collect()
        .await;

    write_csv(&output, &rows).with_context(|| format!("Failed to write {}", output))?;

    let summary = Summary::from_rows(&rows);
    if args.json {
        let report = serde_json::json!({ "rows": rows, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (index, row) in rows.iter().enumerate() {
            print_row(index, total, row);
        }
        print_summary(&summary, &output);
    }

    Ok(())
}
