//! Mapsync daemon entry point.

use std::sync::Arc;

use log::{error, info};
use tokio::signal;
use tokio::sync::{mpsc, RwLock};

use mapsync::config::Config;
use mapsync::mirror::{run_mirror, Mirror};
use mapsync::registrar::run_registrar;
use mapsync::{ServiceMapHistory, Update};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let cfg = Config::load()?;
    info!("Starting mapsync daemon with config: {:?}", cfg);

    // Shared state
    let history = Arc::new(ServiceMapHistory::with_capacity(cfg.history_capacity));

    // Registration channel
    let (update_tx, update_rx) = mpsc::channel(cfg.update_channel_size);

    let registrar_handle = tokio::spawn(run_registrar(update_rx, Arc::clone(&history)));

    // Local mirror
    let mirror = Arc::new(RwLock::new(Mirror::new()));
    let mirror_handle = tokio::spawn(run_mirror(
        Arc::clone(&history),
        Arc::clone(&mirror),
        cfg.mirror_poll_timeout(),
    ));

    // Seed static registrations
    for (name, spec) in cfg.initial_mappings {
        if let Err(e) = update_tx.send(Update::Add { name, spec }).await {
            error!("Failed to seed initial mapping: {}", e);
        }
    }

    // Graceful Shutdown
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, shutting down...");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    drop(update_tx);
    if let Err(e) = registrar_handle.await {
        error!("Registrar task failed: {}", e);
    }
    mirror_handle.abort();

    info!(
        "Shutdown complete at generation {} (mirror at {}).",
        history.current_generation(),
        mirror.read().await.generation()
    );
    Ok(())
}
