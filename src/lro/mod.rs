//! Long-running operation model
//!
//! A remote generation job cannot complete within one request/response
//! cycle. The service hands back an [`Operation`] holding an opaque
//! handle; the caller re-queries that handle until the operation reports
//! completion, then resolves the result reference into the artifact.

pub mod poller;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use poller::{CancelToken, LroPoller, DEFAULT_POLL_INTERVAL};

/// A remote asynchronous job, as last reported by the service.
///
/// The record is only ever replaced wholesale with a fresh status
/// response, never mutated field by field, so the handle, done flag and
/// result always describe the same point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Opaque identifier owned by the remote service; passed back
    /// verbatim on every status query, never interpreted locally
    pub handle: String,

    /// True once the remote side reports the job terminal
    #[serde(default)]
    pub done: bool,

    /// Indirect reference to the produced artifact; present only when
    /// the job completed successfully
    #[serde(default)]
    pub result_reference: Option<String>,

    /// Remote failure report; present only when the job failed
    #[serde(default)]
    pub error: Option<RemoteError>,
}

impl Operation {
    /// A freshly submitted, still-running operation
    pub fn pending(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            done: false,
            result_reference: None,
            error: None,
        }
    }

    /// True if no further status queries can change this operation
    pub fn is_terminal(&self) -> bool {
        self.done
    }

    /// True if the job finished and produced an artifact reference
    pub fn succeeded(&self) -> bool {
        self.done && self.error.is_none() && self.result_reference.is_some()
    }
}

/// Failure report attached to a terminal operation by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<i32>,
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Workflow states for one operation.
///
/// `Polling` is the only state with a re-entrant transition (one per
/// non-terminal tick); the three terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Created,
    Polling,
    Completed,
    Failed,
    Cancelled,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: OperationState) -> bool {
        match self {
            Self::Created => matches!(
                next,
                Self::Polling | Self::Completed | Self::Failed | Self::Cancelled
            ),
            Self::Polling => matches!(
                next,
                Self::Polling | Self::Completed | Self::Failed | Self::Cancelled
            ),
            // Terminal states are absorbing
            Self::Completed | Self::Failed | Self::Cancelled => false,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}
