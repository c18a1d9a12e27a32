//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::info;

use crate::client::http::StudioClient;
use crate::client::mock::MockService;
use crate::client::{
    AspectRatio, InlineImage, OperationService, SpeechRequest, SpeechService, VideoRequest,
};
use crate::lro::CancelToken;
use crate::studio::Studio;

/// Generate a video and write the artifact bytes to disk.
pub fn video(
    prompt: &str,
    image: Option<&Path>,
    aspect: &str,
    interval_secs: u64,
    output: Option<PathBuf>,
    mock: bool,
) -> anyhow::Result<()> {
    let aspect_ratio = AspectRatio::from_str(aspect)
        .with_context(|| format!("unsupported aspect ratio '{}' (use 16:9 or 9:16)", aspect))?;

    let mut request = VideoRequest::from_prompt(prompt).with_aspect_ratio(aspect_ratio);

    if let Some(image_path) = image {
        let bytes = fs::read(image_path)
            .with_context(|| format!("failed to read image: {}", image_path.display()))?;
        let mime = mime_for_path(image_path);
        info!(
            "Animating image: {} ({}, {} bytes)",
            image_path.display(),
            mime,
            bytes.len()
        );
        request = request.with_image(InlineImage::from_bytes(&bytes, mime));
    }

    let output = output.unwrap_or_else(|| default_output_path("video", "mp4"));
    let interval = Duration::from_secs(interval_secs);

    info!(
        "Generating video ({}), polling every {}s",
        aspect_ratio.description(),
        interval_secs
    );

    if mock {
        run_video(MockService::new().with_pending_polls(2), &request, interval, &output)
    } else {
        run_video(StudioClient::from_env()?, &request, interval, &output)
    }
}

fn run_video<S: OperationService>(
    service: S,
    request: &VideoRequest,
    interval: Duration,
    output: &Path,
) -> anyhow::Result<()> {
    let studio = Studio::new(service).with_poll_interval(interval);
    let cancel = CancelToken::new();

    let artifact = studio
        .generate_video(request, &cancel)
        .map_err(|e| anyhow::anyhow!("{} phase failed ({}): {}", e.phase(), e.error_code(), e))?;

    fs::write(output, &artifact.bytes)
        .with_context(|| format!("failed to write video: {}", output.display()))?;

    println!("Video written: {} ({} bytes)", output.display(), artifact.bytes.len());
    println!("SHA-256: {}", artifact.sha256);

    Ok(())
}

/// Synthesize speech and write a playable WAV file.
pub fn speech(text: &str, voice: &str, output: Option<PathBuf>, mock: bool) -> anyhow::Result<()> {
    let request = SpeechRequest::new(text).with_voice(voice);
    let output = output.unwrap_or_else(|| default_output_path("speech", "wav"));

    info!("Synthesizing speech with voice '{}'", voice);

    if mock {
        run_speech(MockService::new(), &request, &output)
    } else {
        run_speech(StudioClient::from_env()?, &request, &output)
    }
}

fn run_speech<S: SpeechService>(
    service: S,
    request: &SpeechRequest,
    output: &Path,
) -> anyhow::Result<()> {
    let studio = Studio::new(service);

    let wav = studio
        .generate_speech(request)
        .map_err(|e| anyhow::anyhow!("{} phase failed ({}): {}", e.phase(), e.error_code(), e))?;

    fs::write(output, &wav)
        .with_context(|| format!("failed to write audio: {}", output.display()))?;

    println!("Audio written: {} ({} bytes)", output.display(), wav.len());

    Ok(())
}

/// Probe the remote service.
pub fn health() -> anyhow::Result<()> {
    let client = StudioClient::from_env()?;

    if client.health()? {
        println!("Service is reachable.");
        Ok(())
    } else {
        anyhow::bail!("Service is not reachable.")
    }
}

fn default_output_path(kind: &str, extension: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("genstudio-{}-{}.{}", kind, stamp, extension))
}

fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
