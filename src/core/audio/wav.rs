//! Manual WAV container framing for raw linear PCM.
//!
//! The speech provider returns headerless 16-bit mono PCM at a fixed
//! sample rate; a generic audio element needs RIFF/WAVE framing before it
//! can play the buffer. The header is built by hand (44 bytes, computed
//! fields) rather than pulled from a container library so the framing
//! stays byte-exact and dependency-free.

use bytes::Bytes;

use crate::errors::{EngineError, EngineResult};

/// Fixed RIFF/WAVE/fmt /data header size for 16-bit mono PCM.
pub const WAV_HEADER_SIZE: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Decoded WAV container: sample rate plus the raw PCM payload.
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub pcm: Bytes,
}

impl WavAudio {
    /// Duration derived from the payload length (16-bit mono).
    pub fn duration_secs(&self) -> f64 {
        let bytes_per_sec = self.sample_rate as f64 * f64::from(CHANNELS) * 2.0;
        self.pcm.len() as f64 / bytes_per_sec
    }
}

/// Frames raw 16-bit mono PCM into a playable WAV container.
///
/// Header fields are computed from the payload, never hardcoded. A
/// zero-length payload yields exactly the 44 header bytes.
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Bytes {
    let data_size = pcm.len() as u32;
    let chunk_size = 36 + data_size;
    let byte_rate = sample_rate * u32::from(CHANNELS) * u32::from(BITS_PER_SAMPLE) / 8;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;

    let mut out = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // PCM fmt sub-chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // audio format: linear PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);

    Bytes::from(out)
}

/// Parses a WAV container produced by [`encode_wav`] (or any plain
/// 44-byte-header PCM WAV), returning the sample rate and payload.
pub fn decode_wav(container: &[u8]) -> EngineResult<WavAudio> {
    if container.len() < WAV_HEADER_SIZE {
        return Err(EngineError::Codec(format!(
            "container too short for WAV header: {} bytes",
            container.len()
        )));
    }
    if &container[0..4] != b"RIFF" {
        return Err(EngineError::Codec("missing RIFF marker".to_string()));
    }
    if &container[8..12] != b"WAVE" {
        return Err(EngineError::Codec("missing WAVE marker".to_string()));
    }

    let sample_rate = u32::from_le_bytes([
        container[24],
        container[25],
        container[26],
        container[27],
    ]);
    let data_size = u32::from_le_bytes([
        container[40],
        container[41],
        container[42],
        container[43],
    ]) as usize;

    let payload = &container[WAV_HEADER_SIZE..];
    if data_size > payload.len() {
        return Err(EngineError::Codec(format!(
            "data chunk claims {} bytes, only {} present",
            data_size,
            payload.len()
        )));
    }

    Ok(WavAudio {
        sample_rate,
        pcm: Bytes::copy_from_slice(&payload[..data_size]),
    })
}
