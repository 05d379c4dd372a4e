//! Drives one real-time voice session.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc};

use auditros_core::config::LiveSettings;
use auditros_core::generation::GenerationError;

use super::pcm::{CaptureFramer, decode_pcm16, encode_pcm16};
use super::playback::{AudioOutput, PlaybackScheduler};
use super::protocol::{ClientMessage, ServerMessage};
use super::transport::LiveTransport;

/// What the session reports back to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Opened,
    /// A piece of the spoken reply's transcript
    Transcript(String),
    Interrupted,
    TurnComplete,
    Closed,
}

/// Stops a running [`LiveBridge::run`] from another task.
#[derive(Clone, Default)]
pub struct StopHandle(Arc<Notify>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.notify_one();
    }
}

pub struct LiveBridge<T, O> {
    transport: T,
    playback: PlaybackScheduler<O>,
    framer: CaptureFramer,
    settings: LiveSettings,
    events: mpsc::UnboundedSender<LiveEvent>,
    stop_handle: StopHandle,
    open: bool,
}

impl<T: LiveTransport, O: AudioOutput> LiveBridge<T, O> {
    pub fn new(
        transport: T,
        output: O,
        settings: LiveSettings,
        events: mpsc::UnboundedSender<LiveEvent>,
    ) -> Self {
        Self {
            transport,
            playback: PlaybackScheduler::new(output),
            framer: CaptureFramer::new(),
            settings,
            events,
            stop_handle: StopHandle::default(),
            open: false,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn playback(&self) -> &PlaybackScheduler<O> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackScheduler<O> {
        &mut self.playback
    }

    /// Sends the session setup and reports `Opened`.
    pub async fn connect(&mut self) -> Result<(), GenerationError> {
        self.transport
            .send(ClientMessage::setup(&self.settings))
            .await?;
        self.open = true;
        tracing::info!("[LiveBridge] Session opened with {}", self.settings.model);
        self.emit(LiveEvent::Opened);
        Ok(())
    }

    /// Buffers captured samples and sends every complete frame.
    ///
    /// Returns the number of chunks sent.
    pub async fn send_audio(&mut self, samples: &[f32]) -> Result<usize, GenerationError> {
        if !self.open {
            return Err(GenerationError::Configuration(
                "Live session is not open".into(),
            ));
        }

        let frames = self.framer.push(samples);
        let sent = frames.len();
        for frame in frames {
            self.transport
                .send(ClientMessage::audio(encode_pcm16(&frame)))
                .await?;
        }
        Ok(sent)
    }

    /// Applies one server message to playback and reports what happened.
    pub fn handle_server_message(&mut self, message: ServerMessage) {
        if message.setup_complete.is_some() {
            tracing::debug!("[LiveBridge] Setup complete");
        }

        let Some(content) = &message.server_content else {
            return;
        };

        if content.interrupted {
            tracing::debug!(
                "[LiveBridge] Interrupted, dropping {} queued buffers",
                self.playback.in_flight()
            );
            self.playback.interrupt();
            self.emit(LiveEvent::Interrupted);
        }

        for payload in message.audio_payloads() {
            match decode_pcm16(payload) {
                Ok(samples) if !samples.is_empty() => {
                    self.playback.enqueue(samples);
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("[LiveBridge] Skipping audio chunk: {}", err),
            }
        }

        if let Some(transcription) = &content.output_transcription {
            if !transcription.text.is_empty() {
                self.emit(LiveEvent::Transcript(transcription.text.clone()));
            }
        }

        if content.turn_complete {
            self.emit(LiveEvent::TurnComplete);
        }
    }

    /// Pumps the session until the server closes it or the stop handle fires.
    ///
    /// Captured sample blocks arriving on `capture` are framed and sent.
    pub async fn run(
        &mut self,
        mut capture: mpsc::Receiver<Vec<f32>>,
    ) -> Result<(), GenerationError> {
        let stop = self.stop_handle.0.clone();
        let mut capturing = true;

        loop {
            tokio::select! {
                _ = stop.notified() => {
                    self.stop().await?;
                    return Ok(());
                }
                block = capture.recv(), if capturing => match block {
                    Some(samples) => {
                        self.send_audio(&samples).await?;
                    }
                    None => capturing = false,
                },
                message = self.transport.recv() => match message? {
                    Some(message) => self.handle_server_message(message),
                    None => {
                        tracing::info!("[LiveBridge] Session closed by server");
                        self.mark_closed();
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Closes the session and silences playback.
    pub async fn stop(&mut self) -> Result<(), GenerationError> {
        if !self.open {
            return Ok(());
        }
        self.transport.close().await?;
        self.playback.interrupt();
        self.framer.clear();
        tracing::info!("[LiveBridge] Session stopped");
        self.mark_closed();
        Ok(())
    }

    fn mark_closed(&mut self) {
        if self.open {
            self.open = false;
            self.emit(LiveEvent::Closed);
        }
    }

    fn emit(&self, event: LiveEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::pcm::{CAPTURE_FRAME_SAMPLES, MediaChunk};
    use crate::live::playback::tests::RecordingOutput;
    use crate::live::protocol::{ModelPart, ModelTurn, ServerContent, Transcription};
    use crate::live::transport::{ChannelPeer, ChannelTransport};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    type TestBridge = LiveBridge<ChannelTransport, RecordingOutput>;

    fn bridge() -> (TestBridge, ChannelPeer, mpsc::UnboundedReceiver<LiveEvent>) {
        let (transport, peer) = ChannelTransport::pair();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let bridge = LiveBridge::new(
            transport,
            RecordingOutput::default(),
            LiveSettings::default(),
            events_tx,
        );
        (bridge, peer, events_rx)
    }

    fn audio_message(samples: usize) -> ServerMessage {
        let data = STANDARD.encode(vec![0u8; samples * 2]);
        ServerMessage {
            setup_complete: None,
            server_content: Some(ServerContent {
                model_turn: Some(ModelTurn {
                    parts: vec![ModelPart {
                        inline_data: Some(MediaChunk {
                            data,
                            mime_type: "audio/pcm;rate=24000".into(),
                        }),
                        text: None,
                    }],
                }),
                ..Default::default()
            }),
        }
    }

    fn interruption() -> ServerMessage {
        ServerMessage {
            setup_complete: None,
            server_content: Some(ServerContent {
                interrupted: true,
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_connect_sends_setup_first() {
        let (mut bridge, mut peer, mut events) = bridge();
        bridge.connect().await.unwrap();

        assert!(matches!(
            peer.received.recv().await.unwrap(),
            ClientMessage::Setup(_)
        ));
        assert_eq!(events.recv().await.unwrap(), LiveEvent::Opened);
    }

    #[tokio::test]
    async fn test_send_audio_requires_open_session() {
        let (mut bridge, _peer, _events) = bridge();
        assert!(bridge.send_audio(&[0.0; 10]).await.is_err());
    }

    #[tokio::test]
    async fn test_send_audio_in_fixed_frames() {
        let (mut bridge, mut peer, _events) = bridge();
        bridge.connect().await.unwrap();
        peer.received.recv().await.unwrap();

        assert_eq!(bridge.send_audio(&[0.25; 5000]).await.unwrap(), 1);
        assert_eq!(bridge.send_audio(&[0.25; 3192]).await.unwrap(), 1);

        for _ in 0..2 {
            match peer.received.recv().await.unwrap() {
                ClientMessage::RealtimeInput(input) => {
                    let chunk = &input.media_chunks[0];
                    assert_eq!(chunk.mime_type, "audio/pcm;rate=16000");
                    assert_eq!(
                        STANDARD.decode(&chunk.data).unwrap().len(),
                        CAPTURE_FRAME_SAMPLES * 2
                    );
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_interruption_discards_queued_audio() {
        let (mut bridge, _peer, mut events) = bridge();
        bridge.connect().await.unwrap();
        bridge.playback_mut().output_mut().now = 2.0;

        bridge.handle_server_message(audio_message(24_000));
        bridge.handle_server_message(audio_message(24_000));
        assert_eq!(bridge.playback().in_flight(), 2);
        assert_eq!(bridge.playback().next_start_time(), 4.0);
        let before: Vec<_> = bridge
            .playback()
            .output()
            .started
            .iter()
            .map(|(id, _, _)| *id)
            .collect();

        bridge.handle_server_message(interruption());
        assert_eq!(bridge.playback().in_flight(), 0);
        assert_eq!(bridge.playback().output().stopped, before);

        bridge.handle_server_message(audio_message(2_400));
        let output = bridge.playback().output();
        let (latest, len, start) = *output.started.last().unwrap();
        assert!(!before.contains(&latest));
        assert_eq!(len, 2_400);
        assert_eq!(start, 2.0);

        assert_eq!(events.recv().await.unwrap(), LiveEvent::Opened);
        assert_eq!(events.recv().await.unwrap(), LiveEvent::Interrupted);
    }

    #[tokio::test]
    async fn test_transcript_and_turn_complete_events() {
        let (mut bridge, _peer, mut events) = bridge();
        bridge.handle_server_message(ServerMessage {
            setup_complete: None,
            server_content: Some(ServerContent {
                output_transcription: Some(Transcription {
                    text: "CARO 2020 clause 3".into(),
                }),
                turn_complete: true,
                ..Default::default()
            }),
        });

        assert_eq!(
            events.recv().await.unwrap(),
            LiveEvent::Transcript("CARO 2020 clause 3".into())
        );
        assert_eq!(events.recv().await.unwrap(), LiveEvent::TurnComplete);
    }

    #[tokio::test]
    async fn test_run_until_server_closes() {
        let (mut bridge, peer, mut events) = bridge();
        bridge.connect().await.unwrap();
        let (_capture_tx, capture_rx) = mpsc::channel(4);

        peer.sender.send(audio_message(480)).unwrap();
        drop(peer);

        bridge.run(capture_rx).await.unwrap();
        assert!(!bridge.is_open());
        assert_eq!(bridge.playback().output().started.len(), 1);

        assert_eq!(events.recv().await.unwrap(), LiveEvent::Opened);
        assert_eq!(events.recv().await.unwrap(), LiveEvent::Closed);
    }

    #[tokio::test]
    async fn test_stop_handle_ends_run() {
        let (mut bridge, _peer, mut events) = bridge();
        bridge.connect().await.unwrap();
        bridge.handle_server_message(audio_message(24_000));

        let (_capture_tx, capture_rx) = mpsc::channel(4);
        bridge.stop_handle().stop();
        bridge.run(capture_rx).await.unwrap();

        assert!(!bridge.is_open());
        assert_eq!(bridge.playback().in_flight(), 0);
        assert_eq!(events.recv().await.unwrap(), LiveEvent::Opened);
        assert_eq!(events.recv().await.unwrap(), LiveEvent::Closed);

        // A second stop is a no-op
        bridge.stop().await.unwrap();
        assert!(events.try_recv().is_err());
    }
}
