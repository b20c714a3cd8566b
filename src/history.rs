//! Generation-versioned service map with long-poll diff delivery.
//!
//! [`ServiceMapHistory`] owns the authoritative `name -> spec` table, the
//! bounded change log and the set of pending diff requests.  Every
//! mutation advances the generation by one and completes *all* pending
//! requests.  Handlers always run outside the internal lock, so a handler
//! may immediately call back into the history, typically to ask for the
//! next diff.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::change_log::{ChangeLog, DEFAULT_HISTORY_CAPACITY};
use crate::diff::diff_from;
use crate::generation::Generation;
use crate::types::{MapDiff, ServiceMapping};

/// Completion callback for [`ServiceMapHistory::request_diff`].
pub type DiffHandler = Box<dyn FnOnce(MapDiff) + Send + 'static>;

/// Opaque handle identifying one call to
/// [`request_diff`](ServiceMapHistory::request_diff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Waiter {
    id: RequestId,
    from: Generation,
    handler: DiffHandler,
}

struct Inner {
    map: BTreeMap<String, String>,
    log: ChangeLog,
    waiters: Vec<Waiter>,
    next_request: u64,
}

impl Inner {
    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// Detach every waiter and compute its diff against the current state.
    fn take_ready(&mut self) -> Vec<(DiffHandler, MapDiff)> {
        let waiters = std::mem::take(&mut self.waiters);
        waiters
            .into_iter()
            .map(|w| {
                trace!("completing request {} from generation {}", w.id, w.from);
                (w.handler, diff_from(&self.map, &self.log, w.from))
            })
            .collect()
    }
}

pub struct ServiceMapHistory {
    inner: Mutex<Inner>,
}

impl ServiceMapHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty history retaining at most `capacity` changes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: BTreeMap::new(),
                log: ChangeLog::new(capacity),
                waiters: Vec::new(),
                next_request: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // handlers never run under the lock, so a poisoned state is still consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask for the changes made after `from`.
    ///
    /// If the history has already moved past `from` the handler is invoked
    /// before this returns.  Otherwise it is parked and invoked from within
    /// the next [`update`](Self::update) or [`remove`](Self::remove).
    pub fn request_diff<F>(&self, from: Generation, handler: F) -> RequestId
    where
        F: FnOnce(MapDiff) + Send + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_request_id();
        if from == inner.log.current() {
            debug!("request {} parked at generation {}", id, from);
            inner.waiters.push(Waiter {
                id,
                from,
                handler: Box::new(handler),
            });
            return id;
        }
        let diff = diff_from(&inner.map, &inner.log, from);
        drop(inner);
        debug!(
            "request {} answered immediately: {} -> {}",
            id,
            from,
            diff.new_generation()
        );
        handler(diff);
        id
    }

    /// Withdraw a parked request.
    ///
    /// Returns `true` only if the handler was removed without ever being
    /// invoked.  Requests that were answered, or that are unknown, give
    /// `false`.
    pub fn cancel(&self, id: RequestId) -> bool {
        let mut inner = self.lock();
        match inner.waiters.iter().position(|w| w.id == id) {
            Some(pos) => {
                inner.waiters.swap_remove(pos);
                debug!("request {} cancelled", id);
                true
            }
            None => false,
        }
    }

    /// Add or replace the mapping for `mapping.name`, returning the
    /// generation this change produced.
    pub fn update(&self, mapping: ServiceMapping) -> Generation {
        let (generation, ready) = {
            let mut inner = self.lock();
            inner.log.add(mapping.name.as_str());
            inner.map.insert(mapping.name, mapping.spec);
            (inner.log.current(), inner.take_ready())
        };
        notify(ready);
        generation
    }

    /// Remove the mapping for `name`.  Unknown names still advance the
    /// generation and reach observers as a tombstone.
    pub fn remove(&self, name: &str) -> Generation {
        let (generation, ready) = {
            let mut inner = self.lock();
            inner.map.remove(name);
            inner.log.add(name);
            (inner.log.current(), inner.take_ready())
        };
        notify(ready);
        generation
    }

    pub fn current_generation(&self) -> Generation {
        self.lock().log.current()
    }

    /// Oldest generation still answered incrementally.
    pub fn start_generation(&self) -> Generation {
        self.lock().log.start()
    }

    /// Number of parked requests.
    pub fn pending_requests(&self) -> usize {
        self.lock().waiters.len()
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        self.lock().map.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }
}

impl Default for ServiceMapHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceMapHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ServiceMapHistory")
            .field("start_generation", &inner.log.start())
            .field("current_generation", &inner.log.current())
            .field("mappings", &inner.map.len())
            .field("pending_requests", &inner.waiters.len())
            .finish()
    }
}

fn notify(ready: Vec<(DiffHandler, MapDiff)>) {
    for (handler, diff) in ready {
        handler(diff);
    }
}
