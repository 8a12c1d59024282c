//! Turns "track T fires now" into a sink call at the right volume.
//!
//! The dispatcher owns the per-lane loaded flags and the master volume.
//! Both sides of each flag are lock-free: the UI thread writes, the tick
//! loop reads on every trigger.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::trace;

use crate::audio_api::AudioSink;
use crate::shared::NUM_TRACKS;

/// Makeup gain on the squared volume curve; without it the slider's
/// midpoint reads too quiet for a working level.
const TRIGGER_GAIN: f32 = 1.8;

pub const DEFAULT_MASTER_VOLUME: f32 = 0.7;

pub struct Dispatcher {
    sink: Arc<dyn AudioSink>,
    loaded: [AtomicBool; NUM_TRACKS],
    /// Master volume as f32 bits, so the tick loop reads one consistent
    /// value without a lock.
    master: AtomicU32,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            loaded: Default::default(),
            master: AtomicU32::new(DEFAULT_MASTER_VOLUME.to_bits()),
        }
    }

    /// Mark a lane as having a registered sound. Lanes start unloaded and
    /// never revert.
    pub fn mark_loaded(&self, track: usize) {
        if let Some(flag) = self.loaded.get(track) {
            flag.store(true, Ordering::Release);
        }
    }

    pub fn is_loaded(&self, track: usize) -> bool {
        self.loaded
            .get(track)
            .is_some_and(|f| f.load(Ordering::Acquire))
    }

    pub fn loaded_lanes(&self) -> [bool; NUM_TRACKS] {
        std::array::from_fn(|track| self.is_loaded(track))
    }

    pub fn set_master_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.master.store(clamped.to_bits(), Ordering::Release);
    }

    pub fn master_volume(&self) -> f32 {
        f32::from_bits(self.master.load(Ordering::Acquire))
    }

    /// Squared slider position times the makeup gain, capped at unity.
    fn effective_volume(&self) -> f32 {
        let master = self.master_volume();
        (master * master * TRIGGER_GAIN).min(1.0)
    }

    /// Fire one lane; a lane with no registered sound is skipped.
    pub fn trigger(&self, track: usize) {
        if !self.is_loaded(track) {
            return;
        }
        let volume = self.effective_volume();
        trace!(track, volume, "trigger");
        self.sink.play(track, volume);
    }

    /// Fire every set lane of one pattern row.
    pub fn fire_row(&self, row: &[bool; NUM_TRACKS]) {
        for (track, &active) in row.iter().enumerate() {
            if active {
                self.trigger(track);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(usize, f32)>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<(usize, f32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AudioSink for RecordingSink {
        fn play(&self, track: usize, volume: f32) {
            self.calls.lock().unwrap().push((track, volume));
        }
    }

    fn rigged() -> (Arc<RecordingSink>, Dispatcher) {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(sink.clone());
        (sink, dispatcher)
    }

    #[test]
    fn unloaded_lanes_are_skipped() {
        let (sink, dispatcher) = rigged();
        dispatcher.trigger(0);
        assert!(sink.calls().is_empty());

        dispatcher.mark_loaded(0);
        dispatcher.trigger(0);
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(sink.calls()[0].0, 0);
    }

    #[test]
    fn volume_curve_endpoints() {
        let (sink, dispatcher) = rigged();
        dispatcher.mark_loaded(3);

        dispatcher.set_master_volume(0.0);
        dispatcher.trigger(3);
        dispatcher.set_master_volume(1.0);
        dispatcher.trigger(3);

        let calls = sink.calls();
        assert_relative_eq!(calls[0].1, 0.0);
        // 1.0^2 * 1.8 saturates the unity cap
        assert_relative_eq!(calls[1].1, 1.0);
    }

    #[test]
    fn midpoint_volume_follows_squared_curve() {
        let (sink, dispatcher) = rigged();
        dispatcher.mark_loaded(1);
        dispatcher.set_master_volume(0.5);
        dispatcher.trigger(1);
        assert_relative_eq!(sink.calls()[0].1, 0.25 * TRIGGER_GAIN, max_relative = 1e-6);
    }

    #[test]
    fn master_volume_is_clamped() {
        let (_, dispatcher) = rigged();
        dispatcher.set_master_volume(1.7);
        assert_relative_eq!(dispatcher.master_volume(), 1.0);
        dispatcher.set_master_volume(-0.3);
        assert_relative_eq!(dispatcher.master_volume(), 0.0);
    }

    #[test]
    fn out_of_range_track_never_fires() {
        let (sink, dispatcher) = rigged();
        dispatcher.mark_loaded(NUM_TRACKS + 1);
        dispatcher.trigger(NUM_TRACKS + 1);
        assert!(sink.calls().is_empty());
        assert!(!dispatcher.is_loaded(NUM_TRACKS + 1));
    }

    #[test]
    fn fire_row_triggers_only_set_and_loaded_lanes() {
        let (sink, dispatcher) = rigged();
        dispatcher.mark_loaded(0);
        dispatcher.mark_loaded(2);

        let mut row = [false; NUM_TRACKS];
        row[0] = true;
        row[1] = true; // set but unloaded
        row[2] = true;
        dispatcher.fire_row(&row);

        let tracks: Vec<usize> = sink.calls().iter().map(|c| c.0).collect();
        assert_eq!(tracks, vec![0, 2]);
    }

    #[test]
    fn loaded_lanes_snapshot_matches_marks() {
        let (_, dispatcher) = rigged();
        dispatcher.mark_loaded(0);
        dispatcher.mark_loaded(7);
        let lanes = dispatcher.loaded_lanes();
        assert!(lanes[0] && lanes[7]);
        assert!(!lanes[1..7].iter().any(|&l| l));
    }
}
