//! Audio container handling
//!
//! The remote text-to-speech endpoint returns raw PCM with no container;
//! this module wraps it into a playable WAV.

pub mod wav;

pub use wav::{encode, TTS_CHANNEL_COUNT, TTS_SAMPLE_RATE};
