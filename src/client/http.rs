//! HTTP implementation of the remote service boundary
//!
//! Talks to the hosted generative-media API over blocking HTTP with JSON
//! bodies. Each method maps its own transport failures to the error
//! variant of the workflow phase it serves, so a dead connection during
//! submission and one during polling stay distinguishable all the way up
//! to the user.

use base64::Engine;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::debug;

use crate::client::{
    OperationService, SpeechAudio, SpeechRequest, SpeechService, VideoRequest,
};
use crate::error::{Result, StudioError};
use crate::lro::{Operation, RemoteError};

/// HTTP client for the hosted generative-media API
pub struct StudioClient {
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl StudioClient {
    /// Create a client from the environment.
    ///
    /// Reads `GENSTUDIO_API_URL` (default `https://api.genstudio.dev`),
    /// `GENSTUDIO_API_KEY` (required) and `GENSTUDIO_TIMEOUT_MS`
    /// (default 120000).
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("GENSTUDIO_API_URL").unwrap_or_else(|_| "https://api.genstudio.dev".into());
        let api_key = env::var("GENSTUDIO_API_KEY").map_err(|_| StudioError::Submission {
            reason: "GENSTUDIO_API_KEY environment variable is not set".to_string(),
        })?;
        let timeout_ms = env::var("GENSTUDIO_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120_000); // 2 minutes default

        Ok(Self::with_config(base_url, api_key, timeout_ms))
    }

    /// Create a client with explicit configuration
    pub fn with_config(base_url: String, api_key: String, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms,
        }
    }

    /// Check if the service is reachable
    pub fn health(&self) -> Result<bool> {
        let client = self.http_client(|reason| StudioError::Submission { reason })?;
        let url = format!("{}/health", self.base_url);
        match client.get(&url).send() {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn http_client(
        &self,
        to_error: impl Fn(String) -> StudioError,
    ) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| to_error(e.to_string()))
    }

    /// The artifact reference is served by a download host that expects
    /// the API key as a `key` query parameter; relative references are
    /// resolved against the API base.
    fn artifact_url(&self, reference: &str) -> String {
        let absolute = if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            format!("{}/v1/{}", self.base_url, reference)
        };

        if absolute.contains('?') {
            format!("{}&key={}", absolute, self.api_key)
        } else {
            format!("{}?key={}", absolute, self.api_key)
        }
    }

    fn transport_reason(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("cannot connect to service: {}", error)
        } else {
            error.to_string()
        }
    }
}

impl OperationService for StudioClient {
    fn submit_generation(&self, request: &VideoRequest) -> Result<Operation> {
        let client = self.http_client(|reason| StudioError::Submission { reason })?;
        let url = format!(
            "{}/v1/models/{}:generateVideos",
            self.base_url, request.model
        );

        debug!(url = %url, aspect = request.config.aspect_ratio.as_str(), "submitting generation request");

        let response = client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .map_err(|e| StudioError::Submission {
                reason: Self::transport_reason(&e),
            })?;

        if !response.status().is_success() {
            return Err(StudioError::Submission {
                reason: format!("service returned {}", response.status()),
            });
        }

        let envelope: OperationEnvelope =
            response.json().map_err(|e| StudioError::Submission {
                reason: format!("invalid response from service: {}", e),
            })?;

        Ok(envelope.into_operation())
    }

    fn query_status(&self, handle: &str) -> Result<Operation> {
        let client = self.http_client(|reason| StudioError::Poll { reason })?;
        let url = format!("{}/v1/{}", self.base_url, handle);

        let response = client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .map_err(|e| StudioError::Poll {
                reason: Self::transport_reason(&e),
            })?;

        if !response.status().is_success() {
            return Err(StudioError::Poll {
                reason: format!("service returned {}", response.status()),
            });
        }

        let envelope: OperationEnvelope = response.json().map_err(|e| StudioError::Poll {
            reason: format!("invalid response from service: {}", e),
        })?;

        Ok(envelope.into_operation())
    }

    fn resolve_artifact(&self, reference: &str) -> Result<Vec<u8>> {
        let client = self.http_client(|reason| StudioError::Fetch { reason })?;
        let url = self.artifact_url(reference);

        let response = client.get(&url).send().map_err(|e| StudioError::Fetch {
            reason: Self::transport_reason(&e),
        })?;

        if !response.status().is_success() {
            return Err(StudioError::Fetch {
                reason: format!("service returned {}", response.status()),
            });
        }

        let bytes = response.bytes().map_err(|e| StudioError::Fetch {
            reason: format!("failed to read artifact body: {}", e),
        })?;

        Ok(bytes.to_vec())
    }
}

impl SpeechService for StudioClient {
    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let client = self.http_client(|reason| StudioError::Submission { reason })?;
        let url = format!("{}/v1/speech:synthesize", self.base_url);

        debug!(url = %url, voice = %request.voice, "submitting speech request");

        let response = client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .map_err(|e| StudioError::Submission {
                reason: Self::transport_reason(&e),
            })?;

        if !response.status().is_success() {
            return Err(StudioError::Submission {
                reason: format!("service returned {}", response.status()),
            });
        }

        let body: SpeechEnvelope = response.json().map_err(|e| StudioError::Submission {
            reason: format!("invalid response from service: {}", e),
        })?;

        let pcm = base64::engine::general_purpose::STANDARD
            .decode(&body.audio_content)
            .map_err(|e| StudioError::Submission {
                reason: format!("service returned undecodable audio payload: {}", e),
            })?;

        Ok(SpeechAudio {
            pcm,
            sample_rate: body.sample_rate,
            channel_count: body.channel_count,
        })
    }
}

/// Wire shape of an operation status response
#[derive(Debug, Deserialize)]
struct OperationEnvelope {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<GenerationResponse>,
    #[serde(default)]
    error: Option<StatusDetail>,
}

impl OperationEnvelope {
    fn into_operation(self) -> Operation {
        let result_reference = self
            .response
            .and_then(|r| r.generated_videos.into_iter().next())
            .map(|v| v.video.uri);

        Operation {
            handle: self.name,
            done: self.done,
            result_reference,
            error: self.error.map(|e| RemoteError {
                code: e.code,
                message: e.message,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusDetail {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationResponse {
    #[serde(default)]
    generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
struct GeneratedVideo {
    video: VideoReference,
}

#[derive(Debug, Deserialize)]
struct VideoReference {
    uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechEnvelope {
    audio_content: String,
    #[serde(default = "default_sample_rate")]
    sample_rate: u32,
    #[serde(default = "default_channel_count")]
    channel_count: u16,
}

fn default_sample_rate() -> u32 {
    crate::audio::TTS_SAMPLE_RATE
}

fn default_channel_count() -> u16 {
    crate::audio::TTS_CHANNEL_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StudioClient {
        StudioClient::with_config(
            "https://api.example.test/".to_string(),
            "k-123".to_string(),
            5_000,
        )
    }

    #[test]
    fn test_with_config_trims_trailing_slash() {
        let client = test_client();
        assert_eq!(client.base_url, "https://api.example.test");
    }

    #[test]
    fn test_artifact_url_appends_key() {
        let client = test_client();

        assert_eq!(
            client.artifact_url("https://dl.example.test/v1/files/abc:download?alt=media"),
            "https://dl.example.test/v1/files/abc:download?alt=media&key=k-123"
        );
        assert_eq!(
            client.artifact_url("https://dl.example.test/files/abc"),
            "https://dl.example.test/files/abc?key=k-123"
        );
        assert_eq!(
            client.artifact_url("files/abc"),
            "https://api.example.test/v1/files/abc?key=k-123"
        );
    }

    #[test]
    fn test_envelope_parses_pending_operation() {
        let envelope: OperationEnvelope =
            serde_json::from_str(r#"{"name":"operations/vid-42"}"#).unwrap();
        let operation = envelope.into_operation();

        assert_eq!(operation.handle, "operations/vid-42");
        assert!(!operation.done);
        assert!(operation.result_reference.is_none());
    }

    #[test]
    fn test_envelope_parses_completed_operation() {
        let json = r#"{
            "name": "operations/vid-42",
            "done": true,
            "response": {
                "generatedVideos": [
                    {"video": {"uri": "https://dl.example.test/files/v1?alt=media"}}
                ]
            }
        }"#;
        let envelope: OperationEnvelope = serde_json::from_str(json).unwrap();
        let operation = envelope.into_operation();

        assert!(operation.succeeded());
        assert_eq!(
            operation.result_reference.as_deref(),
            Some("https://dl.example.test/files/v1?alt=media")
        );
    }

    #[test]
    fn test_envelope_parses_failed_operation() {
        let json = r#"{
            "name": "operations/vid-42",
            "done": true,
            "error": {"code": 8, "message": "quota exhausted"}
        }"#;
        let envelope: OperationEnvelope = serde_json::from_str(json).unwrap();
        let operation = envelope.into_operation();

        assert!(operation.done);
        assert!(!operation.succeeded());
        assert_eq!(operation.error.unwrap().to_string(), "quota exhausted (code 8)");
    }

    #[test]
    fn test_speech_envelope_defaults_to_tts_format() {
        let envelope: SpeechEnvelope =
            serde_json::from_str(r#"{"audioContent":"AAA="}"#).unwrap();
        assert_eq!(envelope.sample_rate, 24_000);
        assert_eq!(envelope.channel_count, 1);
    }
}
