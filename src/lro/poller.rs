//! Fixed-cadence poller for long-running operations
//!
//! The remote job takes minutes; holding a connection open that long is
//! not an option, so time is externalized: sleep, query the handle,
//! replace the in-memory operation with the response, repeat. The loop
//! is deliberately sequential. One poll is in flight at a time, so a
//! slow response can never be overtaken and applied out of order by a
//! later one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::{OperationService, VideoRequest};
use crate::error::{Result, StudioError};
use crate::lro::{Operation, OperationState};

/// Poll cadence used when none is configured (the service recommends
/// checking video operations roughly every ten seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Cooperative cancellation flag shared between the poller and callers.
///
/// Cancellation is advisory: it stops future ticks but cannot abort a
/// dispatched network call. A response that lands after cancellation is
/// discarded rather than applied.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation at the next tick boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives one operation from submission to a terminal state.
///
/// Generic over the service seam so tests (and the CLI's offline mode)
/// can run the full workflow against a scripted implementation.
pub struct LroPoller<S> {
    service: S,
    interval: Duration,
}

impl<S: OperationService> LroPoller<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Submit a generation request to the remote service.
    ///
    /// The returned operation usually has `done == false`; a service may
    /// complete trivially small jobs synchronously.
    pub fn submit(&self, request: &VideoRequest) -> Result<Operation> {
        let operation = self.service.submit_generation(request)?;
        info!(
            handle = %operation.handle,
            done = operation.done,
            "operation submitted"
        );
        Ok(operation)
    }

    /// Poll the operation on the configured cadence until it is terminal.
    ///
    /// Each tick replaces the operation wholesale with the status
    /// response; the record is never patched field by field. A single
    /// failed query aborts the wait immediately. The job runs for
    /// minutes, so a transient failure must be visible to the caller
    /// instead of silently swallowed by a retry.
    ///
    /// # Errors
    /// * `Poll` - A status query failed
    /// * `Cancelled` - The token was cancelled at a tick boundary, or an
    ///   in-flight response was discarded after cancellation
    pub fn await_completion(&self, operation: Operation, cancel: &CancelToken) -> Result<Operation> {
        let mut operation = operation;
        let mut state = OperationState::Created;
        let mut ticks = 0u32;

        while !operation.is_terminal() {
            if cancel.is_cancelled() {
                return self.cancelled(&operation, state);
            }

            std::thread::sleep(self.interval);

            // Tick boundary: cancellation observed here means the tick's
            // request is never dispatched
            if cancel.is_cancelled() {
                return self.cancelled(&operation, state);
            }

            debug!(handle = %operation.handle, tick = ticks, "polling operation status");
            let response = self.service.query_status(&operation.handle)?;
            ticks += 1;

            // The call was already in flight when cancellation arrived;
            // discard its result instead of resuming a cancelled workflow
            if cancel.is_cancelled() {
                debug!(handle = %operation.handle, "discarding response received after cancellation");
                return self.cancelled(&operation, state);
            }

            operation = response;

            let next = if operation.is_terminal() {
                if operation.error.is_some() {
                    OperationState::Failed
                } else {
                    OperationState::Completed
                }
            } else {
                OperationState::Polling
            };
            debug!(handle = %operation.handle, from = %state, to = %next, "state transition");
            state = next;
        }

        info!(
            handle = %operation.handle,
            ticks,
            succeeded = operation.succeeded(),
            "operation terminal"
        );
        Ok(operation)
    }

    /// Resolve a completed operation's result reference into raw bytes.
    ///
    /// No retry: if the reference has expired or the transport fails, the
    /// caller decides whether to resubmit the whole workflow.
    pub fn fetch_artifact(&self, reference: &str) -> Result<Vec<u8>> {
        let bytes = self.service.resolve_artifact(reference)?;
        info!(reference = %reference, size = bytes.len(), "artifact fetched");
        Ok(bytes)
    }

    /// Run the full workflow: submit, wait for completion, fetch.
    ///
    /// A terminal operation that carries a remote failure report, or that
    /// completed without producing a result reference, surfaces as
    /// `JobFailed`.
    pub fn run(&self, request: &VideoRequest, cancel: &CancelToken) -> Result<Vec<u8>> {
        let operation = self.submit(request)?;
        let operation = self.await_completion(operation, cancel)?;

        if let Some(remote) = &operation.error {
            return Err(StudioError::JobFailed {
                reason: remote.to_string(),
            });
        }

        let reference = operation
            .result_reference
            .as_deref()
            .ok_or_else(|| StudioError::JobFailed {
                reason: "generation finished, but no artifact was returned".to_string(),
            })?;

        self.fetch_artifact(reference)
    }

    fn cancelled(&self, operation: &Operation, state: OperationState) -> Result<Operation> {
        warn!(handle = %operation.handle, from = %state, "workflow cancelled");
        Err(StudioError::Cancelled)
    }
}
