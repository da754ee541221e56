use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ceneo_opinions::clients::ClientPool;
use ceneo_opinions::config::Settings;
use ceneo_opinions::services::stats::{recommendation_distribution, star_distribution, to_rows};
use ceneo_opinions::services::{PaginationWalker, ProductService};
use ceneo_opinions::storage::SnapshotStore;

#[derive(Debug, Parser)]
#[command(about = "Scrape and summarise ceneo.pl product reviews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape a product and replace its stored snapshot
    Extract { product_id: String },
    /// Print the stored stats and reviews of a product
    Show { product_id: String },
    /// List every stored product
    List,
    /// Write a product's stored reviews as a Parquet table
    Table { product_id: String, output: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::new()?;

    let client_pool = ClientPool::new(&settings.scraper)?;
    let walker = PaginationWalker::new(client_pool, &settings.scraper)?;
    let store = SnapshotStore::new(&settings.storage.data_dir);
    let service = ProductService::new(walker, store);

    match cli.command {
        Command::Extract { product_id } => {
            let started_at = Utc::now();
            info!(product_id = %product_id, started_at = %started_at.format("%Y-%m-%d %H:%M:%S"), "Extraction requested");

            match service.extract(&product_id).await {
                Ok(stats) => {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                    let elapsed = Utc::now() - started_at;
                    info!(elapsed_ms = elapsed.num_milliseconds(), "Done");
                }
                Err(e) if e.is_not_found() => println!("{e}"),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Show { product_id } => match service.show(&product_id).await {
            Ok((stats, reviews)) => {
                println!("{}", serde_json::to_string_pretty(&stats)?);

                let recommendations = recommendation_distribution(&reviews);
                println!(
                    "recommendations: positive {}, negative {}, none {}",
                    recommendations.positive, recommendations.negative, recommendations.none
                );
                for (stars, count) in star_distribution(&to_rows(&reviews)?) {
                    println!("{stars:>3.1} ★ {count}");
                }
                for review in &reviews {
                    println!("\n{review}");
                }
            }
            Err(e) if e.is_not_found() => println!("{e}"),
            Err(e) => return Err(e.into()),
        },
        Command::List => {
            for stats in service.list().await? {
                println!(
                    "{}\t{}\t{} opinions\t{}",
                    stats.product_id,
                    stats.product_name.as_deref().unwrap_or("-"),
                    stats.opinions_count,
                    stats
                        .average_score
                        .map(|score| format!("{score:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        Command::Table { product_id, output } => {
            let rows = service.export_table(&product_id, &output).await?;
            println!("{rows} rows written to {}", output.display());
        }
    }

    Ok(())
}
