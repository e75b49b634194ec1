//! Coalescing results scheduler
//!
//! Bursts of votes must not flood clients: within one debounce window only
//! the latest snapshot is broadcast. The scheduler is an explicit two-state
//! machine: `Idle` until a snapshot arrives, `Armed` while the one-shot
//! timer is pending, back to `Idle` when it fires. Repeated `schedule`
//! calls while armed are O(1) replacements of the buffered snapshot and
//! never re-arm the timer, so there is at most one pending timer at any
//! time and it cannot double-fire.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use poll_core::ResultsSnapshot;

use crate::connection::ConnectionRegistry;
use crate::events::PollEvent;

/// Debounce timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    /// No timer pending
    Idle,
    /// A one-shot flush timer is pending
    Armed,
}

/// Mutable scheduler state, guarded by one small mutex
struct Inner {
    state: DebounceState,
    /// Most recently scheduled snapshot; older ones are discarded, never
    /// queued
    latest: Option<ResultsSnapshot>,
}

/// Debounced broadcaster for `results-update` events
pub struct ResultsScheduler {
    registry: Arc<ConnectionRegistry>,
    delay: Duration,
    inner: Mutex<Inner>,
}

impl ResultsScheduler {
    /// Create a scheduler broadcasting through `registry` after `delay`
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            registry,
            delay,
            inner: Mutex::new(Inner {
                state: DebounceState::Idle,
                latest: None,
            }),
        })
    }

    /// Buffer a snapshot for the next coalesced broadcast
    ///
    /// Arms the flush timer when idle; otherwise just replaces the buffered
    /// snapshot.
    pub fn schedule(self: &Arc<Self>, snapshot: ResultsSnapshot) {
        let mut inner = self.inner.lock();
        inner.latest = Some(snapshot);

        if inner.state == DebounceState::Armed {
            return;
        }
        inner.state = DebounceState::Armed;
        drop(inner);

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(scheduler.delay).await;
            scheduler.fire();
        });
    }

    /// Flush the buffered snapshot and disarm
    fn fire(&self) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.state = DebounceState::Idle;
            inner.latest.take()
        };

        if let Some(snapshot) = snapshot {
            match serde_json::to_value(&snapshot) {
                Ok(data) => {
                    let sent = self.registry.send(PollEvent::ResultsUpdate, data, None);
                    tracing::debug!(
                        question_id = %snapshot.question.id,
                        total_votes = snapshot.total_votes,
                        sent,
                        "Results snapshot broadcast"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Snapshot serialization failed");
                }
            }
        }
    }

    /// The configured debounce window
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl std::fmt::Debug for ResultsScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsScheduler")
            .field("delay", &self.delay)
            .field("state", &self.inner.lock().state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::registry_tests::test_registry;
    use crate::connection::Peer;
    use crate::events::Envelope;
    use poll_core::entities::AnswerOption;
    use poll_core::{aggregate, Question};
    use tokio::sync::mpsc;

    fn snapshot(votes: &[(&str, &str)]) -> ResultsSnapshot {
        let question = Question::new(
            "q1".to_string(),
            "Pick?".to_string(),
            vec![AnswerOption::new("A"), AnswerOption::new("B")],
            None,
        );
        let answers: Vec<_> = votes
            .iter()
            .map(|(user, selected)| {
                poll_core::Answer::new(
                    format!("a-{user}"),
                    "q1".to_string(),
                    (*user).to_string(),
                    (*user).to_string(),
                    (*selected).to_string(),
                )
            })
            .collect();
        aggregate(&question, &answers).into_snapshot(1)
    }

    async fn attach_peer(
        registry: &Arc<ConnectionRegistry>,
    ) -> mpsc::Receiver<String> {
        let (tx, mut rx) = mpsc::channel(16);
        let peer = Peer::new(Peer::generate_id(), "/ws", "default", None, tx);
        registry.open(peer).await;
        // drain the connections-update from open
        while rx.try_recv().is_ok() {}
        rx
    }

    #[tokio::test]
    async fn test_window_coalesces_to_latest_snapshot() {
        let registry = test_registry();
        let mut rx = attach_peer(&registry).await;
        let scheduler = ResultsScheduler::new(registry, Duration::from_millis(40));

        scheduler.schedule(snapshot(&[("u1", "A")]));
        scheduler.schedule(snapshot(&[("u1", "A"), ("u2", "A")]));
        scheduler.schedule(snapshot(&[("u1", "B"), ("u2", "A"), ("u3", "A")]));

        // nothing flushes before the window elapses
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;

        let envelope: Envelope = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(envelope.event, "results-update");
        assert_eq!(envelope.data["totalVotes"], 3, "only the latest snapshot");

        // exactly one broadcast for the whole burst
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rearm_after_fire() {
        let registry = test_registry();
        let mut rx = attach_peer(&registry).await;
        let scheduler = ResultsScheduler::new(registry, Duration::from_millis(20));

        scheduler.schedule(snapshot(&[("u1", "A")]));
        tokio::time::sleep(Duration::from_millis(60)).await;
        let first: Envelope = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(first.data["totalVotes"], 1);

        scheduler.schedule(snapshot(&[("u1", "A"), ("u2", "B")]));
        tokio::time::sleep(Duration::from_millis(60)).await;
        let second: Envelope = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(second.data["totalVotes"], 2);
    }

    #[tokio::test]
    async fn test_idle_fire_with_no_snapshot_is_silent() {
        let registry = test_registry();
        let mut rx = attach_peer(&registry).await;
        let scheduler = ResultsScheduler::new(registry, Duration::from_millis(10));

        // arming and firing consumed the snapshot; the state machine is back
        // to Idle with an empty buffer
        scheduler.schedule(snapshot(&[]));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }
}
