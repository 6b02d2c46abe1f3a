use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use skins_scraper::app::ports::{HttpClientPort, SleeperPort};
use skins_scraper::config::Config;
use skins_scraper::fx::FxResolution;
use skins_scraper::harvester::Harvester;
use skins_scraper::infra::http_client::ReqwestHttp;
use skins_scraper::infra::sleeper::TokioSleeper;
use skins_scraper::logging;

#[derive(Parser)]
#[command(name = "skins_scraper")]
#[command(about = "Weapon skin price harvester")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest every category and write the JSON snapshots
    Run {
        /// Output directory for the snapshot files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Only harvest these categories (comma-separated slugs, e.g. ak-47,awp)
        #[arg(long)]
        categories: Option<String>,
    },
    /// Print the categories discovery would harvest
    Discover,
    /// Print the conversion rate the next run would use
    Fx,
}

fn parse_list(list: Option<String>) -> Vec<String> {
    list.map(|l| {
        l.split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn build_harvester(config: Config, only: Vec<String>) -> skins_scraper::error::Result<Harvester> {
    let http: Arc<dyn HttpClientPort> = Arc::new(ReqwestHttp::new(&config.marketplace.user_agent)?);
    let sleeper: Arc<dyn SleeperPort> = Arc::new(TokioSleeper);
    Ok(Harvester::new(http, sleeper, config).with_categories(only))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            output_dir,
            categories,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            let harvester = build_harvester(config, parse_list(categories))?;

            match harvester.run_and_write().await {
                Ok((outcome, written)) => {
                    println!(
                        "Saved {} items under {} {} across {} guns",
                        outcome.snapshot.count,
                        outcome.snapshot.limit_azn,
                        outcome.snapshot.currency_target,
                        outcome.snapshot.weapons_count
                    );
                    if let FxResolution::Fallback { reason, .. } = &outcome.fx {
                        println!("   FX fallback used: {}", reason);
                    }
                    for skipped in &outcome.skipped {
                        println!("   Skipped {}: {}", skipped.slug, skipped.reason);
                    }
                    for path in &written {
                        println!("   {}", path.display());
                    }
                }
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Discover => {
            let harvester = build_harvester(config, Vec::new())?;
            let slugs = harvester.discover().await?;
            info!("{} categories", slugs.len());
            for slug in slugs {
                println!("{}", slug);
            }
        }
        Commands::Fx => {
            let harvester = build_harvester(config, Vec::new())?;
            let fx = harvester.resolve_fx().await;
            let rate = fx.fx_rate();
            println!(
                "{} -> {}: {} ({}, fetched at {})",
                harvester.config().fx.base_currency,
                harvester.config().fx.target_currency,
                rate.rate,
                rate.provider,
                rate.fetched_at.as_deref().unwrap_or("n/a")
            );
        }
    }
    Ok(())
}
