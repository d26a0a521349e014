//! Batch lookup of related domains.
//!
//! Run with: cargo run -p investigate --example batch_lookup -- www.test.com www.example.com
//!
//! Set the INVESTIGATE_KEY environment variable before running. Use
//! RUST_LOG=investigate_client=debug to watch retries and workers.

use investigate::{InvestigateClient, Record, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let domains: Vec<String> = std::env::args().skip(1).collect();
    let client = InvestigateClient::from_env()?;

    let mut results = client.batch().concurrency(4).related(domains);
    println!("=== Related domains ({} queued) ===", results.submitted());

    while let Some(item) = results.recv().await {
        match item.outcome {
            Ok(Record::Related(list)) => {
                println!("{}:", item.item);
                for related in list.iter().take(5) {
                    println!("  {} ({})", related.domain, related.score);
                }
            }
            Ok(other) => println!("{}: {other:?}", item.item),
            Err(err) => eprintln!("{}: {err}", item.item),
        }
    }

    Ok(())
}
