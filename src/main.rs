//! Coursebot CLI entry point.

use anyhow::Result;
use clap::Parser;
use coursebot::cli::{commands, Cli, Commands};
use coursebot::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("coursebot={}", settings.log_level(cli.verbose))
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Ask { message, history } => {
            commands::run_ask(message, history.clone(), settings).await?;
        }

        Commands::Search { query, k } => {
            commands::run_search(query, *k, settings).await?;
        }

        Commands::Index { courses } => {
            commands::run_index(courses.clone(), settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), settings)?;
        }
    }

    Ok(())
}
