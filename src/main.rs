use clap::Parser;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use muxpick::cli::handlers::{self, PickParams};
use muxpick::cli::{Cli, Commands};
use muxpick::utils::tui_writer::TuiWriter;
use muxpick::{Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs must not hit the terminal while the picker owns it
    let filter = EnvFilter::from_default_env().add_directive("muxpick=info".parse()?);
    let (tui_writer, log_rx) = TuiWriter::new();
    match &cli.logfile {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(tui_writer)
                .init();
        }
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        None => {
            handlers::pick_and_launch(PickParams {
                config,
                path: cli.path,
                layout: cli.layout,
                log_rx,
            })
            .await
        }
        Some(Commands::Init) => handlers::init(config, cli.config).await,
        Some(Commands::Layouts) => handlers::list_layouts(config).await,
    }
}
