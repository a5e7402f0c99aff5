mod config;
mod input;
mod reader;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{RobotFeed, WarehouseSession};
use tokio::{
    io::BufReader,
    sync::{broadcast::error::RecvError, mpsc},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::Settings, reader::CommandReader};

const EVENT_QUEUE_DEPTH: usize = 256;

/// Operator console for the warehouse simulator.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// TOML settings file (defaults to ./console.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    simulator_url: Option<String>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    grid_size: Option<usize>,
    /// Robot feed poll interval; 0 disables polling
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    /// tracing filter, e.g. `debug` or `client_core=trace`
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.simulator_url {
            settings.simulator_url = v.clone();
        }
        if let Some(v) = &self.api_url {
            settings.api_url = v.clone();
        }
        if let Some(v) = self.grid_size {
            settings.grid_size = v;
        }
        if let Some(v) = self.poll_interval_ms {
            settings.poll_interval_ms = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    // --log beats RUST_LOG, which beats the configured filter.
    let filter = match &args.log {
        Some(directive) => EnvFilter::try_new(directive).context("invalid --log filter")?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.log))
            .context("invalid log filter")?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    settings.validate().context("invalid console settings")?;
    info!(?settings, "console: starting");

    let session = WarehouseSession::mount(settings.session_options()).await;
    let mut updates = session.subscribe();
    let (events, queue) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let feed = RobotFeed::new(settings.api_url.clone());

    let poller = settings
        .poll_interval()
        .map(|interval| feed.clone().spawn_poller(interval, events.clone()));

    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => println!("{}", render::render_update(&update)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "console: dropped view updates"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let reader = CommandReader::new(events, feed, settings.grid_size);
    let reader = tokio::spawn(reader.run(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    ));

    let summary = session.run(queue).await;

    if let Some(poller) = poller {
        poller.abort();
    }
    reader.abort();
    let _ = printer.await;

    println!("{}", render::render_summary(&summary));
    Ok(())
}
