//! Diff computation between a caller's generation and the current table.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use crate::change_log::ChangeLog;
use crate::generation::Generation;
use crate::types::{MapChange, MapDiff, ServiceMapping};

/// Describe what changed in `table` since `from`.
///
/// Within the retained window this is an incremental diff holding one
/// entry per distinct changed name, in order of first appearance, with the
/// name's *current* value or a tombstone.  Anything else (aged-out, unknown
/// or future generations) gets a full snapshot.
pub fn diff_from(table: &BTreeMap<String, String>, log: &ChangeLog, from: Generation) -> MapDiff {
    let current = log.current();
    if !log.contains(from) {
        debug!(
            "generation {} outside history [{}, {}], sending snapshot",
            from,
            log.start(),
            current
        );
        return snapshot(table, current);
    }

    let mut seen = HashSet::new();
    let changes = log
        .updated_since(from)
        .filter(|name| seen.insert(*name))
        .map(|name| match table.get(name) {
            Some(spec) => MapChange::Updated {
                name: name.to_string(),
                spec: spec.clone(),
            },
            None => MapChange::Removed {
                name: name.to_string(),
            },
        })
        .collect();

    MapDiff::Incremental {
        base_generation: from,
        new_generation: current,
        changes,
    }
}

pub fn snapshot(table: &BTreeMap<String, String>, generation: Generation) -> MapDiff {
    MapDiff::Snapshot {
        new_generation: generation,
        entries: table
            .iter()
            .map(|(name, spec)| ServiceMapping::new(name.as_str(), spec.as_str()))
            .collect(),
    }
}
