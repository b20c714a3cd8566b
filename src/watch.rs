//! Async long-poll on top of [`ServiceMapHistory::request_diff`].

use std::time::Duration;

use log::debug;
use tokio::sync::oneshot;

use crate::generation::Generation;
use crate::history::ServiceMapHistory;
use crate::types::MapDiff;

/// Wait up to `wait` for the changes made after `from`.
///
/// Returns `None` if nothing changed in time.  When the timer fires the
/// pending request is cancelled; if cancellation loses the race the diff
/// is already on its way and is returned rather than dropped.
pub async fn next_diff(
    history: &ServiceMapHistory,
    from: Generation,
    wait: Duration,
) -> Option<MapDiff> {
    let (tx, mut rx) = oneshot::channel();
    let id = history.request_diff(from, move |diff| {
        if tx.send(diff).is_err() {
            debug!("diff receiver dropped before delivery");
        }
    });

    match tokio::time::timeout(wait, &mut rx).await {
        Ok(result) => result.ok(),
        Err(_) => {
            if history.cancel(id) {
                debug!("request {} timed out at generation {}", id, from);
                return None;
            }
            // the handler has been detached and is about to run
            rx.await.ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::{MapChange, ServiceMapping};

    #[tokio::test]
    async fn returns_immediately_when_behind() {
        let history = ServiceMapHistory::new();
        history.update(ServiceMapping::new("A", "x"));
        let diff = next_diff(&history, Generation::ZERO, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(diff.new_generation(), Generation::new(1));
    }

    #[tokio::test]
    async fn times_out_and_cancels() {
        let history = ServiceMapHistory::new();
        let diff = next_diff(&history, Generation::ZERO, Duration::from_millis(20)).await;
        assert!(diff.is_none());
        assert_eq!(history.pending_requests(), 0);
    }

    #[tokio::test]
    async fn wakes_on_later_update() {
        let history = Arc::new(ServiceMapHistory::new());
        let writer = Arc::clone(&history);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.remove("A");
        });

        let diff = next_diff(&history, Generation::ZERO, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(
            diff,
            MapDiff::Incremental {
                base_generation: Generation::ZERO,
                new_generation: Generation::new(1),
                changes: vec![MapChange::Removed { name: "A".into() }],
            }
        );
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn timed_out_request_does_not_swallow_next_change() {
        let history = ServiceMapHistory::new();
        assert!(next_diff(&history, Generation::ZERO, Duration::from_millis(10))
            .await
            .is_none());

        history.update(ServiceMapping::new("A", "x"));
        let diff = next_diff(&history, Generation::ZERO, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(history.pending_requests(), 0);
    }
}
