use super::Phase;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of where a node is in its round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStatus {
    pub phase: Phase,
    pub message: String,
    pub finished: bool,
    /// Set when the last round ended with an error
    pub failed: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for RoundStatus {
    fn default() -> Self {
        Self {
            phase: Phase::Initializing,
            message: Phase::Initializing.progress().to_string(),
            finished: false,
            failed: None,
            updated_at: Utc::now(),
        }
    }
}

/// Shared, observable round status
///
/// Cloning the handle shares the same status; the driver writes, the API
/// and tests read or subscribe.
#[derive(Clone)]
pub struct StatusHandle {
    tx: Arc<watch::Sender<RoundStatus>>,
}

impl Default for StatusHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RoundStatus::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> RoundStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoundStatus> {
        self.tx.subscribe()
    }

    pub(crate) fn enter(&self, phase: Phase) {
        self.tx.send_modify(|status| {
            if phase == Phase::Initializing {
                status.finished = false;
                status.failed = None;
            }
            status.phase = phase;
            status.message = phase.progress().to_string();
            status.updated_at = Utc::now();
        });
    }

    pub(crate) fn finish(&self) {
        self.tx.send_modify(|status| {
            status.phase = Phase::Terminal;
            status.message = Phase::Terminal.progress().to_string();
            status.finished = true;
            status.updated_at = Utc::now();
        });
    }

    pub(crate) fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|status| {
            status.message = format!("error: {}", message);
            status.failed = Some(message);
            status.finished = true;
            status.updated_at = Utc::now();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_phases() {
        let handle = StatusHandle::new();
        assert_eq!(handle.snapshot().message, "initializing...");

        handle.enter(Phase::GlobalAggregate);
        let status = handle.snapshot();
        assert_eq!(status.phase, Phase::GlobalAggregate);
        assert_eq!(status.message, "aggregate column information...");
        assert!(!status.finished);

        handle.finish();
        let status = handle.snapshot();
        assert!(status.finished);
        assert_eq!(status.message, "finished.");
    }

    #[test]
    fn test_failure_cleared_by_next_round() {
        let handle = StatusHandle::new();
        handle.enter(Phase::WaitForModeAgreement);
        handle.fail("nodes disagree");
        let status = handle.snapshot();
        assert!(status.finished);
        assert_eq!(status.failed.as_deref(), Some("nodes disagree"));
        assert_eq!(status.phase, Phase::WaitForModeAgreement);

        handle.enter(Phase::Initializing);
        let status = handle.snapshot();
        assert!(!status.finished);
        assert!(status.failed.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let handle = StatusHandle::new();
        let mut rx = handle.subscribe();
        handle.enter(Phase::ReadInput);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().phase, Phase::ReadInput);
    }
}
