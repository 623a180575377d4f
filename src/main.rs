use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelscribe::cli::{Cli, Commands};
use reelscribe::config::Config;
use reelscribe::pipeline::Pipeline;
use reelscribe::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Check for required external dependencies (non-fatal in Docker)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Run {
            username,
            limit,
            min_plays,
            workers,
            output,
            format,
        } => {
            if let Some(min_plays) = min_plays {
                config.pipeline.min_play_count = min_plays;
            }
            if let Some(workers) = workers {
                config.pipeline.workers = workers;
            }

            let pipeline = Pipeline::new(config)?;

            tracing::info!("Starting batch run for creator: {}", username);

            let result = pipeline.run_batch(&username, limit).await?;

            if result.is_empty() {
                println!("No high-performing reels found for {}.", username);
                return Ok(());
            }

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format).await?;
                    println!("Report saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, &format)?;
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration initialized. Edit the config file to change settings:");
                config.display();
            }
        }
    }

    Ok(())
}
