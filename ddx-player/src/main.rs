//! Drilldex Preview Player (ddx-player) - Main entry point
//!
//! Starts a preview queue for a beat, pack or kit against the configured
//! REST API, waits for the queue host to confirm it and prints the resulting
//! `audio:state` snapshot as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ddx_common::config::{ConfigOverrides, PlayerConfig};
use ddx_common::events::{QueueBus, QueueEvent, QueueStateSnapshot};
use ddx_common::models::{CatalogRow, SourceKey};
use ddx_player::api::HttpCatalogApi;
use ddx_player::{Player, QueueHost};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line arguments for ddx-player
#[derive(Parser, Debug)]
#[command(name = "ddx-player")]
#[command(about = "Preview playback queue for the Drilldex catalog")]
#[command(version)]
struct Args {
    /// Path to player.toml
    #[arg(short, long, env = "DDX_CONFIG")]
    config: Option<PathBuf>,

    /// REST API root (e.g. https://drilldex.com/api)
    #[arg(long)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    source: Source,
}

#[derive(Subcommand, Debug)]
enum Source {
    /// Preview a single beat
    Beat { id: String },
    /// Preview a sample pack
    Pack { id: String },
    /// Preview a drum kit
    Kit { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayerConfig::load(ConfigOverrides {
        config_path: args.config.clone(),
        api_base_url: args.api_base_url.clone(),
    })
    .context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "ddx_player={level},ddx_common={level}",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Drilldex preview player against {}", config.api_base_url);

    let api = Arc::new(
        HttpCatalogApi::from_config(&config).context("Failed to build catalog API client")?,
    );
    let bus = QueueBus::new(config.bus_capacity);
    let host = QueueHost::new().spawn(bus.clone());
    let player = Player::from_config(&config, api, bus.clone());

    // Subscribe before dispatching so the confirmation cannot be missed
    let mut rx = bus.subscribe();

    let source_key = match args.source {
        Source::Beat { id } => {
            let row = CatalogRow::new(id, "");
            let key = SourceKey::beat(row.id.clone());
            player
                .play_beat(row)
                .await
                .with_context(|| format!("Failed to start beat {}", key.id()))?;
            key
        }
        Source::Pack { id } => {
            player
                .play_pack(&id)
                .await
                .with_context(|| format!("Failed to start pack {}", id))?;
            SourceKey::pack(id)
        }
        Source::Kit { id } => {
            player
                .play_kit(&id)
                .await
                .with_context(|| format!("Failed to start kit {}", id))?;
            SourceKey::kit(id)
        }
    };

    let snapshot = tokio::time::timeout(STATE_TIMEOUT, wait_for_state(&mut rx, &source_key))
        .await
        .context("Timed out waiting for the queue host")??;

    host.abort();

    if !snapshot.playing {
        warn!(source_key = %source_key, "Queue loaded but nothing is playable");
    }

    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize queue state")?;
    println!("{}", json);
    Ok(())
}

/// Wait for the first `audio:state` that belongs to `source_key`
async fn wait_for_state(
    rx: &mut broadcast::Receiver<QueueEvent>,
    source_key: &SourceKey,
) -> Result<QueueStateSnapshot> {
    loop {
        match rx.recv().await {
            Ok(QueueEvent::State(snapshot))
                if snapshot.source_key.as_ref() == Some(source_key) =>
            {
                return Ok(snapshot)
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed queue events while waiting for state");
            }
            Err(broadcast::error::RecvError::Closed) => bail!("Queue bus closed"),
        }
    }
}
