//! Remote generative-media service boundary
//!
//! The studio only ever talks to the hosted API through the two traits
//! here: [`OperationService`] for the asynchronous video jobs and
//! [`SpeechService`] for the synchronous text-to-speech call. The HTTP
//! implementation lives in [`http`], a scripted offline implementation
//! in [`mock`].

pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lro::Operation;

/// Default video generation model
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Default output resolution for generated video
pub const DEFAULT_RESOLUTION: &str = "720p";

/// Default voice for speech synthesis
pub const DEFAULT_VOICE: &str = "Kore";

/// Supported video aspect ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "16:9" | "landscape" => Some(Self::Landscape),
            "9:16" | "portrait" => Some(Self::Portrait),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9 (Landscape)",
            Self::Portrait => "9:16 (Portrait)",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Landscape
    }
}

/// An image sent inline with a generation request (image-to-video)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineImage {
    /// Base64-encoded image bytes
    #[serde(rename = "imageBytes")]
    pub data: String,
    /// MIME type of the encoded image, e.g. "image/png"
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl InlineImage {
    /// Encode raw image bytes for inline transport
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        use base64::Engine;
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

/// A video generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Model identifier
    pub model: String,
    /// Text description of the desired video
    pub prompt: String,
    /// Optional starting image to animate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
    /// Generation configuration
    pub config: VideoConfig,
}

impl VideoRequest {
    /// Create a prompt-to-video request with default model and config
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_VIDEO_MODEL.to_string(),
            prompt: prompt.into(),
            image: None,
            config: VideoConfig::default(),
        }
    }

    /// Attach a starting image, turning this into an image-to-video request
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.config.aspect_ratio = aspect_ratio;
        self
    }
}

/// Video generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(rename = "numberOfVideos")]
    pub number_of_videos: u32,
    pub resolution: String,
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: AspectRatio,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            number_of_videos: 1,
            resolution: DEFAULT_RESOLUTION.to_string(),
            aspect_ratio: AspectRatio::default(),
        }
    }
}

/// A speech synthesis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Prebuilt voice name
    pub voice: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }
}

/// Raw PCM returned by the speech endpoint, with its format
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Raw little-endian 16-bit PCM bytes
    pub pcm: Vec<u8>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channel_count: u16,
}

/// The asynchronous-operation surface of the remote service.
///
/// `query_status` is idempotent: the same handle may be queried any
/// number of times and always describes the same remote job.
pub trait OperationService {
    /// Submit a generation request, receiving an operation to poll
    fn submit_generation(&self, request: &VideoRequest) -> Result<Operation>;

    /// Query the current state of a previously submitted operation
    fn query_status(&self, handle: &str) -> Result<Operation>;

    /// Resolve a completed operation's result reference into raw bytes
    fn resolve_artifact(&self, reference: &str) -> Result<Vec<u8>>;
}

/// The synchronous speech surface of the remote service
pub trait SpeechService {
    /// Synthesize speech, returning raw PCM and its format
    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<SpeechAudio>;
}

impl<T: OperationService + ?Sized> OperationService for &T {
    fn submit_generation(&self, request: &VideoRequest) -> Result<Operation> {
        (**self).submit_generation(request)
    }

    fn query_status(&self, handle: &str) -> Result<Operation> {
        (**self).query_status(handle)
    }

    fn resolve_artifact(&self, reference: &str) -> Result<Vec<u8>> {
        (**self).resolve_artifact(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_conversion() {
        assert_eq!(AspectRatio::from_str("16:9"), Some(AspectRatio::Landscape));
        assert_eq!(AspectRatio::from_str("9:16"), Some(AspectRatio::Portrait));
        assert_eq!(
            AspectRatio::from_str("portrait"),
            Some(AspectRatio::Portrait)
        );
        assert_eq!(AspectRatio::from_str("4:3"), None);
        assert_eq!(AspectRatio::Landscape.as_str(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_serializes_as_ratio_string() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");
    }

    #[test]
    fn test_video_request_builder() {
        let request = VideoRequest::from_prompt("a raccoon on a skateboard")
            .with_aspect_ratio(AspectRatio::Portrait);

        assert_eq!(request.model, DEFAULT_VIDEO_MODEL);
        assert_eq!(request.config.number_of_videos, 1);
        assert_eq!(request.config.aspect_ratio, AspectRatio::Portrait);
        assert!(request.image.is_none());
    }

    #[test]
    fn test_video_request_omits_absent_image() {
        let request = VideoRequest::from_prompt("sunset");
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("image"));

        let with_image = request.with_image(InlineImage {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        });
        let json = serde_json::to_string(&with_image).unwrap();
        assert!(json.contains("imageBytes"));
        assert!(json.contains("image/png"));
    }

    #[test]
    fn test_speech_request_defaults() {
        let request = SpeechRequest::new("hello");
        assert_eq!(request.voice, DEFAULT_VOICE);

        let request = request.with_voice("Puck");
        assert_eq!(request.voice, "Puck");
    }
}
