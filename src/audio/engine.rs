use std::sync::Arc;

use tracing::warn;

use crate::audio_api::AudioCommand;
use crate::shared::NUM_TRACKS;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

/// Hard cap on simultaneous voices so the callback never allocates. The
/// densest legal pattern (every lane on every step at 200 BPM, with the
/// 0.8 s sub bass overlapping itself ~11 deep) peaks around forty voices,
/// inside the pool with headroom.
const MAX_VOICES: usize = 64;

/// Mixer state owned by the device callback: one registered sound per lane
/// and a fixed pool of voices. Commands arrive over the channel drained at
/// the top of each callback.
pub(super) struct Engine {
    sounds: [Option<Arc<SampleBuffer>>; NUM_TRACKS],
    voices: [Voice; MAX_VOICES],
}

impl Engine {
    pub(super) fn new() -> Self {
        Self {
            sounds: Default::default(),
            voices: std::array::from_fn(|_| Voice::default()),
        }
    }

    pub(super) fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::LoadSample { track, sound } => {
                if let Some(slot) = self.sounds.get_mut(track) {
                    *slot = Some(sound);
                }
            }
            AudioCommand::Trigger { track, volume } => self.trigger(track, volume),
        }
    }

    /// Start a fresh voice for `track`; overlapping triggers stack rather
    /// than cutting the previous voice off.
    fn trigger(&mut self, track: usize, volume: f32) {
        let Some(sound) = self.sounds.get(track).and_then(Option::as_ref) else {
            return; // nothing registered for this lane
        };
        match self.voices.iter_mut().find(|v| v.is_free()) {
            Some(voice) => voice.start(Arc::clone(sound), volume),
            None => warn!(track, "voice pool exhausted, trigger dropped"),
        }
    }

    /// Mix every live voice into `out`. `out` must arrive zeroed.
    pub(super) fn render_block(&mut self, out: &mut [StereoFrame]) {
        for voice in &mut self.voices {
            voice.render_into(out);
        }
    }

    #[cfg(test)]
    fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }
}
