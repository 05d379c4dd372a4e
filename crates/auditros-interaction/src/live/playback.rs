//! Gapless playback scheduling for model audio.

use std::collections::BTreeMap;

use super::pcm::OUTPUT_SAMPLE_RATE;

/// Handle for a buffer handed to the output device.
pub type SourceId = u64;

/// The audio device seam.
///
/// Times are in seconds on the device clock.
pub trait AudioOutput: Send {
    fn current_time(&self) -> f64;

    /// Schedules `samples` (mono, `sample_rate` Hz) to start at `at`.
    fn start(&mut self, samples: Vec<f32>, sample_rate: u32, at: f64) -> SourceId;

    fn stop(&mut self, id: SourceId);
}

/// Queues decoded buffers back to back on an [`AudioOutput`].
pub struct PlaybackScheduler<O> {
    output: O,
    next_start_time: f64,
    /// Scheduled sources with their end time on the device clock.
    in_flight: BTreeMap<SourceId, f64>,
}

impl<O: AudioOutput> PlaybackScheduler<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            next_start_time: 0.0,
            in_flight: BTreeMap::new(),
        }
    }

    /// Starts `samples` right after the previously queued buffer, or now if
    /// the queue has drained. Returns the source and its start time.
    pub fn enqueue(&mut self, samples: Vec<f32>) -> (SourceId, f64) {
        self.forget_finished();
        let start = self.next_start_time.max(self.output.current_time());
        let duration = samples.len() as f64 / OUTPUT_SAMPLE_RATE as f64;

        let id = self.output.start(samples, OUTPUT_SAMPLE_RATE, start);
        self.in_flight.insert(id, start + duration);
        self.next_start_time = start + duration;
        (id, start)
    }

    /// Forgets a source the device reports as finished.
    pub fn source_ended(&mut self, id: SourceId) {
        self.in_flight.remove(&id);
    }

    /// Stops everything still scheduled and resets the clock.
    pub fn interrupt(&mut self) {
        self.forget_finished();
        for id in std::mem::take(&mut self.in_flight).into_keys() {
            self.output.stop(id);
        }
        self.next_start_time = 0.0;
    }

    /// Drops sources whose audio has already played out.
    fn forget_finished(&mut self) {
        let now = self.output.current_time();
        self.in_flight.retain(|_, end| *end > now);
    }

    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call instead of playing audio.
    #[derive(Default)]
    pub(crate) struct RecordingOutput {
        pub now: f64,
        pub started: Vec<(SourceId, usize, f64)>,
        pub stopped: Vec<SourceId>,
        next_id: SourceId,
    }

    impl AudioOutput for RecordingOutput {
        fn current_time(&self) -> f64 {
            self.now
        }

        fn start(&mut self, samples: Vec<f32>, sample_rate: u32, at: f64) -> SourceId {
            assert_eq!(sample_rate, OUTPUT_SAMPLE_RATE);
            self.next_id += 1;
            self.started.push((self.next_id, samples.len(), at));
            self.next_id
        }

        fn stop(&mut self, id: SourceId) {
            self.stopped.push(id);
        }
    }

    #[test]
    fn test_buffers_play_back_to_back() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());
        scheduler.output_mut().now = 1.0;

        let (_, first) = scheduler.enqueue(vec![0.0; 24_000]);
        let (_, second) = scheduler.enqueue(vec![0.0; 12_000]);

        assert_eq!(first, 1.0);
        assert_eq!(second, 2.0);
        assert_eq!(scheduler.next_start_time(), 2.5);
        assert_eq!(scheduler.in_flight(), 2);
    }

    #[test]
    fn test_drained_queue_starts_at_device_time() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());
        scheduler.enqueue(vec![0.0; 2_400]);

        // Device clock moved past the queued audio
        scheduler.output_mut().now = 5.0;
        let (_, start) = scheduler.enqueue(vec![0.0; 2_400]);
        assert_eq!(start, 5.0);
    }

    #[test]
    fn test_source_ended_forgets_source() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());
        let (id, _) = scheduler.enqueue(vec![0.0; 10]);
        scheduler.source_ended(id);
        assert_eq!(scheduler.in_flight(), 0);

        scheduler.interrupt();
        assert!(scheduler.output().stopped.is_empty());
    }

    #[test]
    fn test_finished_sources_are_not_tracked() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());

        for _ in 0..1000 {
            let (_, start) = scheduler.enqueue(vec![0.0; 2_400]);
            // Each buffer lasts 0.1s; let the device clock pass its end
            scheduler.output_mut().now = start + 0.2;
        }
        assert!(scheduler.in_flight() <= 1);

        scheduler.interrupt();
        assert!(scheduler.output().stopped.is_empty());
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[test]
    fn test_interrupt_stops_only_unfinished_sources() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());
        let (played, _) = scheduler.enqueue(vec![0.0; 24_000]);
        let (playing, _) = scheduler.enqueue(vec![0.0; 24_000]);

        // First buffer ended at 1.0, second runs until 2.0
        scheduler.output_mut().now = 1.5;
        scheduler.interrupt();
        assert_eq!(scheduler.output().stopped, vec![playing]);
        assert!(!scheduler.output().stopped.contains(&played));
    }

    #[test]
    fn test_interrupt_stops_in_flight_and_resets_clock() {
        let mut scheduler = PlaybackScheduler::new(RecordingOutput::default());
        scheduler.output_mut().now = 3.0;
        let (a, _) = scheduler.enqueue(vec![0.0; 24_000]);
        let (b, _) = scheduler.enqueue(vec![0.0; 24_000]);

        scheduler.interrupt();
        assert_eq!(scheduler.output().stopped, vec![a, b]);
        assert_eq!(scheduler.in_flight(), 0);
        assert_eq!(scheduler.next_start_time(), 0.0);

        // New audio starts from the device clock, not after the dropped buffers
        let (c, start) = scheduler.enqueue(vec![0.0; 100]);
        assert_eq!(start, 3.0);
        assert!(c != a && c != b);

        scheduler.interrupt();
        assert_eq!(scheduler.output().stopped, vec![a, b, c]);
    }
}
