//! Applies registration commands to the directory.

use std::sync::Arc;

use log::info;
use tokio::sync::mpsc;

use crate::history::ServiceMapHistory;
use crate::types::{ServiceMapping, Update};

/// Drain `update_rx`, applying every command to `history`, until all
/// senders are gone.
pub async fn run_registrar(mut update_rx: mpsc::Receiver<Update>, history: Arc<ServiceMapHistory>) {
    while let Some(update) = update_rx.recv().await {
        apply_update(&history, update);
    }
    info!("Registration channel closed, shutting down");
}

pub fn apply_update(history: &ServiceMapHistory, update: Update) {
    match update {
        Update::Add { name, spec } => {
            let generation = history.update(ServiceMapping::new(name.as_str(), spec.as_str()));
            info!("Registered {} -> {} at generation {}", name, spec, generation);
        }
        Update::Remove { name } => {
            let generation = history.remove(&name);
            info!("Unregistered {} at generation {}", name, generation);
        }
    }
}
