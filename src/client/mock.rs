//! Scripted offline service implementation
//!
//! Simulates the remote API without network access: operations complete
//! after a configurable number of pending polls, artifacts and PCM are
//! synthetic but deterministic, and every call is counted so tests can
//! assert on exact query/fetch behavior. Also backs the CLI's `--mock`
//! mode.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::{
    OperationService, SpeechAudio, SpeechRequest, SpeechService, VideoRequest,
};
use crate::error::{Result, StudioError};
use crate::lro::poller::CancelToken;
use crate::lro::{Operation, RemoteError};

#[derive(Default)]
struct Inner {
    pending_polls: AtomicU32,
    completed_at_submit: AtomicBool,
    fail_after_queries: AtomicU32,
    cancel_on_query: AtomicU32,
    remote_failure: Mutex<Option<String>>,
    without_result: AtomicBool,
    token: Mutex<Option<CancelToken>>,
    query_calls: AtomicU32,
    fetch_calls: AtomicU32,
    fetched: Mutex<Vec<String>>,
}

/// Offline stand-in for the remote generative-media service
#[derive(Clone, Default)]
pub struct MockService {
    inner: Arc<Inner>,
}

impl MockService {
    /// Handle issued for every mock operation
    pub const HANDLE: &'static str = "operations/mock-video-1";

    /// Result reference attached to completed mock operations
    pub const RESULT_REFERENCE: &'static str = "mock://artifacts/r1";

    /// Bytes served for every resolved artifact
    pub const ARTIFACT_BYTES: &'static [u8] = b"mock-video-artifact";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report `done = false` for the first `n` status queries
    pub fn with_pending_polls(self, n: u32) -> Self {
        self.inner.pending_polls.store(n, Ordering::SeqCst);
        self
    }

    /// Return an already-terminal operation straight from submission
    pub fn completed_at_submit(self) -> Self {
        self.inner.completed_at_submit.store(true, Ordering::SeqCst);
        self
    }

    /// Let `n` status queries succeed, then fail every later one
    pub fn failing_after_queries(self, n: u32) -> Self {
        self.inner.fail_after_queries.store(n, Ordering::SeqCst);
        self
    }

    /// Cancel the installed token while serving status query number `n`,
    /// simulating cancellation racing an in-flight response
    pub fn cancelling_on_query(self, n: u32) -> Self {
        self.inner.cancel_on_query.store(n, Ordering::SeqCst);
        self
    }

    /// Make the job fail remotely: the terminal operation carries an
    /// error report instead of a result reference
    pub fn failing_remotely(self, message: &str) -> Self {
        *self.inner.remote_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make the job complete without producing a result reference
    pub fn without_result(self) -> Self {
        self.inner.without_result.store(true, Ordering::SeqCst);
        self
    }

    /// Create the token this mock will cancel from inside a scripted query
    pub fn install_token(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.inner.token.lock().unwrap() = Some(token.clone());
        token
    }

    pub fn query_count(&self) -> u32 {
        self.inner.query_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> u32 {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn fetched_references(&self) -> Vec<String> {
        self.inner.fetched.lock().unwrap().clone()
    }

    fn terminal_operation(&self) -> Operation {
        let mut operation = Operation::pending(Self::HANDLE);
        operation.done = true;

        if let Some(message) = self.inner.remote_failure.lock().unwrap().clone() {
            operation.error = Some(RemoteError {
                code: Some(3),
                message,
            });
        } else if !self.inner.without_result.load(Ordering::SeqCst) {
            operation.result_reference = Some(Self::RESULT_REFERENCE.to_string());
        }

        operation
    }
}

impl OperationService for MockService {
    fn submit_generation(&self, request: &VideoRequest) -> Result<Operation> {
        if request.prompt.trim().is_empty() {
            return Err(StudioError::Submission {
                reason: "prompt must not be empty".to_string(),
            });
        }

        if self.inner.completed_at_submit.load(Ordering::SeqCst) {
            Ok(self.terminal_operation())
        } else {
            Ok(Operation::pending(Self::HANDLE))
        }
    }

    fn query_status(&self, handle: &str) -> Result<Operation> {
        let call = self.inner.query_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let fail_after = self.inner.fail_after_queries.load(Ordering::SeqCst);
        if fail_after > 0 && call > fail_after {
            return Err(StudioError::Poll {
                reason: "connection reset by mock".to_string(),
            });
        }

        let cancel_on = self.inner.cancel_on_query.load(Ordering::SeqCst);
        if cancel_on > 0 && call == cancel_on {
            if let Some(token) = self.inner.token.lock().unwrap().as_ref() {
                token.cancel();
            }
        }

        if call <= self.inner.pending_polls.load(Ordering::SeqCst) {
            Ok(Operation::pending(handle))
        } else {
            Ok(self.terminal_operation())
        }
    }

    fn resolve_artifact(&self, reference: &str) -> Result<Vec<u8>> {
        self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .fetched
            .lock()
            .unwrap()
            .push(reference.to_string());

        if reference == Self::RESULT_REFERENCE {
            Ok(Self::ARTIFACT_BYTES.to_vec())
        } else {
            Err(StudioError::Fetch {
                reason: format!("unknown artifact reference: {}", reference),
            })
        }
    }
}

impl SpeechService for MockService {
    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        if request.text.trim().is_empty() {
            return Err(StudioError::Submission {
                reason: "text must not be empty".to_string(),
            });
        }

        // A short deterministic ramp, one 16-bit sample per text byte
        let pcm: Vec<u8> = request
            .text
            .bytes()
            .flat_map(|b| ((b as i16) << 6).to_le_bytes())
            .collect();

        Ok(SpeechAudio {
            pcm,
            sample_rate: crate::audio::TTS_SAMPLE_RATE,
            channel_count: crate::audio::TTS_CHANNEL_COUNT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_queries_and_fetches() {
        let service = MockService::new().with_pending_polls(2);

        let op = service
            .submit_generation(&VideoRequest::from_prompt("test"))
            .unwrap();
        assert!(!op.done);

        assert!(!service.query_status(&op.handle).unwrap().done);
        assert!(!service.query_status(&op.handle).unwrap().done);
        let terminal = service.query_status(&op.handle).unwrap();
        assert!(terminal.succeeded());

        let bytes = service
            .resolve_artifact(terminal.result_reference.as_deref().unwrap())
            .unwrap();
        assert_eq!(bytes, MockService::ARTIFACT_BYTES);
        assert_eq!(service.query_count(), 3);
        assert_eq!(service.fetch_count(), 1);
    }

    #[test]
    fn test_rejects_empty_prompt() {
        let service = MockService::new();
        let err = service
            .submit_generation(&VideoRequest::from_prompt("   "))
            .unwrap_err();
        assert_eq!(err.error_code(), "SUBMISSION_ERROR");
    }

    #[test]
    fn test_unknown_reference_fails_fetch() {
        let service = MockService::new();
        let err = service.resolve_artifact("mock://artifacts/other").unwrap_err();
        assert_eq!(err.error_code(), "FETCH_ERROR");
    }

    #[test]
    fn test_speech_pcm_is_whole_frames() {
        let service = MockService::new();
        let audio = service
            .synthesize_speech(&SpeechRequest::new("hello world"))
            .unwrap();

        assert_eq!(audio.sample_rate, 24_000);
        assert_eq!(audio.channel_count, 1);
        assert_eq!(audio.pcm.len() % 2, 0);
        assert_eq!(audio.pcm.len(), "hello world".len() * 2);
    }

    #[test]
    fn test_clones_share_state() {
        let service = MockService::new().with_pending_polls(1);
        let clone = service.clone();

        clone.query_status(MockService::HANDLE).unwrap();
        assert_eq!(service.query_count(), 1);
    }
}
