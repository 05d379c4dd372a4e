//! 16-bit PCM framing for the real-time session.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use auditros_core::generation::GenerationError;

/// Microphone capture rate.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Model audio playback rate.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;
/// Samples per captured frame.
pub const CAPTURE_FRAME_SAMPLES: usize = 4096;

const INPUT_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// A base64 audio chunk as sent in `realtimeInput.mediaChunks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaChunk {
    pub data: String,
    pub mime_type: String,
}

/// Encodes float samples as little-endian i16 PCM.
///
/// Samples are scaled by 32768 and clamped, so `1.0` maps to `i16::MAX`.
pub fn encode_pcm16(samples: &[f32]) -> MediaChunk {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let scaled = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        bytes.extend_from_slice(&scaled.to_le_bytes());
    }

    MediaChunk {
        data: STANDARD.encode(bytes),
        mime_type: INPUT_MIME_TYPE.to_string(),
    }
}

/// Decodes base64 little-endian i16 PCM into floats in `[-1.0, 1.0)`.
///
/// A trailing odd byte is dropped.
pub fn decode_pcm16(data: &str) -> Result<Vec<f32>, GenerationError> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|err| GenerationError::InvalidResponse(format!("Invalid audio payload: {err}")))?;

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

/// Groups captured samples into fixed-size frames.
#[derive(Debug, Default)]
pub struct CaptureFramer {
    pending: Vec<f32>,
}

impl CaptureFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `samples` and returns every complete frame.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let complete = self.pending.len() / CAPTURE_FRAME_SAMPLES;
        let mut frames = Vec::with_capacity(complete);
        for _ in 0..complete {
            let rest = self.pending.split_off(CAPTURE_FRAME_SAMPLES);
            frames.push(std::mem::replace(&mut self.pending, rest));
        }
        frames
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let chunk = encode_pcm16(&[0.0, 0.5, -1.0]);
        assert_eq!(chunk.mime_type, "audio/pcm;rate=16000");

        let bytes = STANDARD.decode(&chunk.data).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x40, 0x00, 0x80]);
    }

    #[test]
    fn test_encode_clamps_full_scale() {
        let chunk = encode_pcm16(&[1.0, 2.5, -3.0]);
        let bytes = STANDARD.decode(&chunk.data).unwrap();
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), i16::MIN);
    }

    #[test]
    fn test_decode_scales_by_32768() {
        let data = STANDARD.encode([0x00, 0x40, 0x00, 0x80, 0xff]);
        let samples = decode_pcm16(&data).unwrap();
        assert_eq!(samples, vec![0.5, -1.0]);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(decode_pcm16("not base64!").is_err());
    }

    #[test]
    fn test_framer_emits_fixed_frames() {
        let mut framer = CaptureFramer::new();
        assert!(framer.push(&[0.1; 3000]).is_empty());

        let frames = framer.push(&[0.2; 6000]);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.len() == CAPTURE_FRAME_SAMPLES));
        assert_eq!(frames[0][2999], 0.1);
        assert_eq!(frames[0][3000], 0.2);
        assert_eq!(framer.buffered(), 9000 - 2 * CAPTURE_FRAME_SAMPLES);
    }
}
