//! Real-time voice session.
//!
//! Microphone samples are framed into 4096-sample blocks, encoded as 16 kHz
//! PCM and streamed to the model; audio coming back is decoded at 24 kHz and
//! scheduled back to back on an [`AudioOutput`]. Device capture and output are
//! supplied by the host through that trait.

mod bridge;
mod pcm;
mod playback;
mod protocol;
mod transport;

pub use bridge::{LiveBridge, LiveEvent, StopHandle};
pub use pcm::{
    CAPTURE_FRAME_SAMPLES, CaptureFramer, INPUT_SAMPLE_RATE, MediaChunk, OUTPUT_SAMPLE_RATE,
    decode_pcm16, encode_pcm16,
};
pub use playback::{AudioOutput, PlaybackScheduler, SourceId};
pub use protocol::{ClientMessage, ServerContent, ServerMessage};
pub use transport::{ChannelPeer, ChannelTransport, LiveTransport};
