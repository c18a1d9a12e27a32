//! PCM-to-WAV encoder
//!
//! Wraps raw little-endian 16-bit PCM samples in the canonical 44-byte
//! WAV header so generic audio tooling can play them. The header is
//! built by hand, field by field at fixed offsets; every multi-byte
//! integer is little-endian and the four-character tags are written as
//! raw ASCII in literal order.
//!
//! Layout:
//!
//! | Offset | Size | Field          | Value                        |
//! |--------|------|----------------|------------------------------|
//! | 0      | 4    | ChunkID        | "RIFF"                       |
//! | 4      | 4    | ChunkSize      | 36 + data length             |
//! | 8      | 4    | Format         | "WAVE"                       |
//! | 12     | 4    | Subchunk1ID    | "fmt "                       |
//! | 16     | 4    | Subchunk1Size  | 16                           |
//! | 20     | 2    | AudioFormat    | 1 (PCM)                      |
//! | 22     | 2    | NumChannels    | channel count                |
//! | 24     | 4    | SampleRate     | sample rate                  |
//! | 28     | 4    | ByteRate       | sample rate * channels * 2   |
//! | 32     | 2    | BlockAlign     | channels * 2                 |
//! | 34     | 2    | BitsPerSample  | 16                           |
//! | 36     | 4    | Subchunk2ID    | "data"                       |
//! | 40     | 4    | Subchunk2Size  | data length                  |
//! | 44     | n    | data           | samples verbatim             |

use crate::error::{Result, StudioError};

/// Size of the canonical WAV header in bytes
pub const WAV_HEADER_LEN: usize = 44;

/// Bits per sample; the speech endpoint always returns 16-bit PCM
pub const BITS_PER_SAMPLE: u16 = 16;

/// Sample rate of PCM returned by the speech endpoint, in Hz
pub const TTS_SAMPLE_RATE: u32 = 24_000;

/// Channel count of PCM returned by the speech endpoint
pub const TTS_CHANNEL_COUNT: u16 = 1;

const WAVE_FORMAT_PCM: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;

/// Encode raw 16-bit little-endian PCM samples as a WAV container.
///
/// Pure and deterministic: identical inputs always produce byte-identical
/// output, and nothing outside the returned buffer is touched.
///
/// # Arguments
/// * `samples` - Raw PCM bytes, 16 bits per sample, little-endian,
///   channels interleaved
/// * `sample_rate` - Samples per second per channel, in Hz
/// * `channel_count` - Number of interleaved channels
///
/// # Errors
/// * `InvalidAudioFormat` - If `sample_rate` or `channel_count` is zero,
///   if `samples` does not hold a whole number of sample frames, or if
///   the payload is too large for a 32-bit RIFF chunk size. A malformed
///   input is a caller bug; it must never produce a silently truncated
///   container.
pub fn encode(samples: &[u8], sample_rate: u32, channel_count: u16) -> Result<Vec<u8>> {
    if sample_rate == 0 {
        return Err(StudioError::InvalidAudioFormat {
            reason: "sample rate must be positive".to_string(),
        });
    }
    if channel_count == 0 {
        return Err(StudioError::InvalidAudioFormat {
            reason: "channel count must be positive".to_string(),
        });
    }

    let block_align = channel_count as u32 * (BITS_PER_SAMPLE as u32 / 8);
    if samples.len() % block_align as usize != 0 {
        return Err(StudioError::InvalidAudioFormat {
            reason: format!(
                "{} PCM bytes do not divide into whole {}-byte frames",
                samples.len(),
                block_align
            ),
        });
    }

    let byte_rate = sample_rate
        .checked_mul(block_align)
        .ok_or_else(|| StudioError::InvalidAudioFormat {
            reason: format!("byte rate overflows at {} Hz", sample_rate),
        })?;

    // RIFF chunk sizes are u32; a payload beyond that cannot be represented
    let data_len = u32::try_from(samples.len())
        .ok()
        .filter(|&n| n <= u32::MAX - 36)
        .ok_or_else(|| StudioError::InvalidAudioFormat {
            reason: format!("{} PCM bytes exceed the WAV size limit", samples.len()),
        })?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len());

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channel_count.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(samples);

    Ok(out)
}
