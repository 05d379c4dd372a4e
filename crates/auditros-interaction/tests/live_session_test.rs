use std::sync::{Arc, Mutex};

use auditros_core::config::LiveSettings;
use auditros_interaction::live::{
    AudioOutput, CAPTURE_FRAME_SAMPLES, ChannelTransport, ClientMessage, LiveBridge, LiveEvent,
    ServerMessage, SourceId, decode_pcm16,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tokio::sync::mpsc;

/// Output whose log is shared with the test body.
#[derive(Clone, Default)]
struct SharedOutput {
    log: Arc<Mutex<Vec<(SourceId, f64)>>>,
    stopped: Arc<Mutex<Vec<SourceId>>>,
}

impl AudioOutput for SharedOutput {
    fn current_time(&self) -> f64 {
        0.5
    }

    fn start(&mut self, _samples: Vec<f32>, _sample_rate: u32, at: f64) -> SourceId {
        let mut log = self.log.lock().unwrap();
        let id = log.len() as SourceId + 1;
        log.push((id, at));
        id
    }

    fn stop(&mut self, id: SourceId) {
        self.stopped.lock().unwrap().push(id);
    }
}

fn server(value: serde_json::Value) -> ServerMessage {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_voice_round_trip() {
    let (transport, mut peer) = ChannelTransport::pair();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let output = SharedOutput::default();
    let mut bridge = LiveBridge::new(transport, output.clone(), LiveSettings::default(), events_tx);
    bridge.connect().await.unwrap();

    let (capture_tx, capture_rx) = mpsc::channel(8);
    let stop = bridge.stop_handle();

    let session = tokio::spawn(async move {
        bridge.run(capture_rx).await.unwrap();
        bridge
    });

    // Setup arrives before any audio
    assert!(matches!(
        peer.received.recv().await.unwrap(),
        ClientMessage::Setup(_)
    ));

    capture_tx.send(vec![0.1; CAPTURE_FRAME_SAMPLES]).await.unwrap();
    match peer.received.recv().await.unwrap() {
        ClientMessage::RealtimeInput(input) => {
            let samples = decode_pcm16(&input.media_chunks[0].data).unwrap();
            assert_eq!(samples.len(), CAPTURE_FRAME_SAMPLES);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    let half_second = STANDARD.encode(vec![0u8; 12_000 * 2]);
    peer.sender
        .send(server(json!({"setupComplete": {}})))
        .unwrap();
    peer.sender
        .send(server(json!({"serverContent": {
            "modelTurn": {"parts": [{"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": half_second}}]},
            "outputTranscription": {"text": "Refer SA 500."}
        }})))
        .unwrap();
    peer.sender
        .send(server(json!({"serverContent": {
            "modelTurn": {"parts": [{"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": half_second}}]}
        }})))
        .unwrap();
    peer.sender
        .send(server(json!({"serverContent": {"interrupted": true}})))
        .unwrap();

    assert_eq!(events.recv().await.unwrap(), LiveEvent::Opened);
    assert_eq!(
        events.recv().await.unwrap(),
        LiveEvent::Transcript("Refer SA 500.".into())
    );
    assert_eq!(events.recv().await.unwrap(), LiveEvent::Interrupted);

    stop.stop();
    let bridge = session.await.unwrap();
    assert!(!bridge.is_open());
    assert_eq!(events.recv().await.unwrap(), LiveEvent::Closed);

    let log = output.log.lock().unwrap().clone();
    assert_eq!(log, vec![(1, 0.5), (2, 1.0)]);
    assert_eq!(*output.stopped.lock().unwrap(), vec![1, 2]);
}
