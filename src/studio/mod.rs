//! High-level generation workflows
//!
//! Ties the pieces together the way a front end drives them: the video
//! workflow is submit, poll to terminal, fetch bytes; the speech
//! workflow is one synthesis call followed by WAV encoding so the
//! result is immediately playable.

use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::info;

use crate::audio;
use crate::client::{OperationService, SpeechRequest, SpeechService, VideoRequest};
use crate::error::Result;
use crate::lro::{CancelToken, LroPoller, DEFAULT_POLL_INTERVAL};

/// A fetched generation artifact with its integrity digest
#[derive(Debug, Clone)]
pub struct VideoArtifact {
    /// Raw artifact bytes as served by the download host
    pub bytes: Vec<u8>,
    /// Lowercase hex SHA-256 of the bytes
    pub sha256: String,
}

/// One studio session over a remote service implementation
pub struct Studio<S> {
    service: S,
    poll_interval: Duration,
    session_id: String,
}

impl<S> Studio<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            poll_interval: DEFAULT_POLL_INTERVAL,
            session_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Short random id correlating this session's log lines
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl<S: OperationService> Studio<S> {
    /// Run the full video workflow and return the artifact with its
    /// digest. Cancellable at every poll tick via `cancel`.
    pub fn generate_video(
        &self,
        request: &VideoRequest,
        cancel: &CancelToken,
    ) -> Result<VideoArtifact> {
        info!(session_id = %self.session_id, prompt_len = request.prompt.len(), "video workflow started");

        let poller = LroPoller::new(&self.service).with_interval(self.poll_interval);
        let bytes = poller.run(request, cancel)?;

        let sha256 = hex_digest(&bytes);
        info!(session_id = %self.session_id, size = bytes.len(), sha256 = %sha256, "video workflow finished");

        Ok(VideoArtifact { bytes, sha256 })
    }
}

impl<S: SpeechService> Studio<S> {
    /// Synthesize speech and wrap the raw PCM into a playable WAV, at
    /// whatever format the service reports for its output.
    pub fn generate_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        info!(session_id = %self.session_id, voice = %request.voice, "speech workflow started");

        let speech = self.service.synthesize_speech(request)?;
        let wav = audio::encode(&speech.pcm, speech.sample_rate, speech.channel_count)?;

        info!(
            session_id = %self.session_id,
            pcm_bytes = speech.pcm.len(),
            sample_rate = speech.sample_rate,
            "speech workflow finished"
        );
        Ok(wav)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
