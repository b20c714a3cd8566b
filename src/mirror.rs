//! Consumer-side copy of the directory kept current by applying diffs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::generation::Generation;
use crate::history::ServiceMapHistory;
use crate::types::{MapChange, MapDiff};
use crate::watch::next_diff;

/// A local, possibly stale, copy of the `name -> spec` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mirror {
    generation: Generation,
    entries: BTreeMap<String, String>,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation this copy is current as of; pass it to the next diff request.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply a diff.  Applying the same diff more than once has no further
    /// effect.
    pub fn apply(&mut self, diff: &MapDiff) {
        match diff {
            MapDiff::Snapshot {
                new_generation,
                entries,
            } => {
                self.entries = entries
                    .iter()
                    .map(|m| (m.name.clone(), m.spec.clone()))
                    .collect();
                self.generation = *new_generation;
            }
            MapDiff::Incremental {
                base_generation,
                new_generation,
                changes,
            } => {
                if *base_generation != self.generation && *new_generation != self.generation {
                    warn!(
                        "applying diff {} -> {} to mirror at generation {}",
                        base_generation, new_generation, self.generation
                    );
                }
                for change in changes {
                    match change {
                        MapChange::Updated { name, spec } => {
                            self.entries.insert(name.clone(), spec.clone());
                        }
                        MapChange::Removed { name } => {
                            self.entries.remove(name);
                        }
                    }
                }
                self.generation = *new_generation;
            }
        }
    }
}

/// Keep `mirror` up to date with `history` forever, long-polling with
/// `poll_timeout` per request.
pub async fn run_mirror(
    history: Arc<ServiceMapHistory>,
    mirror: Arc<RwLock<Mirror>>,
    poll_timeout: Duration,
) {
    let mut generation = mirror.read().await.generation();
    info!("Mirror started at generation {}", generation);
    loop {
        let Some(diff) = next_diff(&history, generation, poll_timeout).await else {
            debug!("No changes within {:?}", poll_timeout);
            continue;
        };
        match serde_json::to_string(&diff) {
            Ok(json) => debug!("Applying diff: {}", json),
            Err(e) => warn!("Failed to serialize diff: {}", e),
        }
        let entries = {
            let mut local = mirror.write().await;
            local.apply(&diff);
            generation = local.generation();
            local.len()
        };
        info!(
            "Mirror at generation {} with {} entries ({} {})",
            generation,
            entries,
            diff.len(),
            if diff.is_snapshot() { "dumped" } else { "changed" }
        );
    }
}
