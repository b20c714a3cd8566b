//! Data structures shared by the directory and its mirrors.
//!
//! These types are serialised using [`serde`](https://serde.rs/) so the
//! host can hand them to whatever transport carries diffs to remote
//! mirrors.  A diff never carries history, only the current value of each
//! name that changed, which keeps repeated churn on one name cheap.

use serde::{Deserialize, Serialize};

use crate::generation::Generation;

/// One `name -> spec` entry of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceMapping {
    pub name: String,
    /// Opaque connection spec, e.g. `tcp/host:port`.
    pub spec: String,
}

impl ServiceMapping {
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
        }
    }
}

/// A single entry of an incremental diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapChange {
    /// The name currently maps to this spec.
    Updated { name: String, spec: String },
    /// The name was explicitly removed (tombstone).
    Removed { name: String },
}

impl MapChange {
    pub fn name(&self) -> &str {
        match self {
            MapChange::Updated { name, .. } | MapChange::Removed { name } => name,
        }
    }
}

/// Result of a diff request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapDiff {
    /// Changes between `base_generation` and `new_generation`; only valid
    /// for a receiver holding `base_generation`.
    Incremental {
        base_generation: Generation,
        new_generation: Generation,
        changes: Vec<MapChange>,
    },
    /// The complete table as of `new_generation`.  The receiver discards
    /// whatever it held and adopts this.
    Snapshot {
        new_generation: Generation,
        entries: Vec<ServiceMapping>,
    },
}

impl MapDiff {
    pub fn new_generation(&self) -> Generation {
        match self {
            MapDiff::Incremental { new_generation, .. } | MapDiff::Snapshot { new_generation, .. } => {
                *new_generation
            }
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, MapDiff::Snapshot { .. })
    }

    /// Number of changed or dumped entries.
    pub fn len(&self) -> usize {
        match self {
            MapDiff::Incremental { changes, .. } => changes.len(),
            MapDiff::Snapshot { entries, .. } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A registration command for the directory.
///
/// Each message either adds or replaces a name → spec entry, or removes
/// an entry.  Commands are applied in arrival order; the last one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    /// A service has registered, or re-registered with a new spec.
    Add { name: String, spec: String },
    /// A service has gone away.  Only the name is required.
    Remove { name: String },
}
