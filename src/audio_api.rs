//! Contract between the control side and the audio engine.
//!
//! The engine never touches the filesystem or allocates in its callback, so
//! buffers are decoded and resampled on the control thread and handed over
//! as [`AudioCommand::Load`] before the lane can be triggered.

use std::sync::Arc;

use crate::audio::SampleBuffer;

/// Fire-and-forget playback surface the dispatcher talks to. Implemented by
/// the real device stream and by test doubles.
pub trait AudioSink: Send + Sync {
    /// Start one voice of `track`'s registered sound at `volume`. Must not
    /// block the caller; dropping a trigger under pressure is acceptable,
    /// delaying the tick loop is not.
    fn play(&self, track: usize, volume: f32);
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    /// Hand the engine a ready-to-play buffer for a lane.
    LoadSample {
        track: usize,
        sound: Arc<SampleBuffer>,
    },
    /// Start one voice of a lane's registered buffer.
    Trigger { track: usize, volume: f32 },
}

/// Stand-in sink for when no output device could be opened: sequencing,
/// the grid, and the UI all keep working, just silently.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, _track: usize, _volume: f32) {}
}
