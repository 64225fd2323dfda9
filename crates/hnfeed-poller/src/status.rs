use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

/// Lifecycle of the poller: linear, no backwards transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    Uninitialized,
    Running,
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Snapshot published by the poller after every state change or tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollerStatus {
    pub state: PollerState,
    /// Completion time of the most recent successful tick.
    pub last_check_time: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl Default for PollerStatus {
    fn default() -> Self {
        Self {
            state: PollerState::Uninitialized,
            last_check_time: None,
            consecutive_failures: 0,
        }
    }
}

/// Read-only view of a running poller. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    rx: watch::Receiver<PollerStatus>,
}

impl PollerHandle {
    pub(crate) fn new(rx: watch::Receiver<PollerStatus>) -> Self {
        Self { rx }
    }

    /// A handle for a poller that was never started (polling disabled).
    pub fn detached() -> Self {
        let (_tx, rx) = watch::channel(PollerStatus::default());
        Self { rx }
    }

    pub fn status(&self) -> PollerStatus {
        self.rx.borrow().clone()
    }

    pub fn state(&self) -> PollerState {
        self.rx.borrow().state
    }

    /// `None` until the first successful tick.
    pub fn last_check_time(&self) -> Option<DateTime<Utc>> {
        self.rx.borrow().last_check_time
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.rx.borrow().consecutive_failures
    }
}
