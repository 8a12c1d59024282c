use std::sync::Arc;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

/// One playing instance of a lane's buffer. Playback is always at unit
/// rate (buffers arrive pre-resampled to the device rate), so the cursor
/// just walks frames until the buffer runs out.
#[derive(Clone, Debug, Default)]
pub struct Voice {
    sound: Option<Arc<SampleBuffer>>,
    cursor: usize,
    gain: f32,
}

impl Voice {
    pub fn is_free(&self) -> bool {
        self.sound.is_none()
    }

    /// Claim this slot for a fresh playback of `sound`.
    pub fn start(&mut self, sound: Arc<SampleBuffer>, gain: f32) {
        self.cursor = 0;
        self.gain = gain;
        self.sound = Some(sound);
    }

    /// Accumulate this voice into `out`, retiring the slot once the buffer
    /// is exhausted.
    pub fn render_into(&mut self, out: &mut [StereoFrame]) {
        let Some(sound) = self.sound.clone() else {
            return;
        };
        let frames = sound.frames();
        for slot in out.iter_mut() {
            let Some(&frame) = frames.get(self.cursor) else {
                break;
            };
            slot.mix(frame, self.gain);
            self.cursor += 1;
        }
        if self.cursor >= frames.len() {
            self.sound = None;
        }
    }
}
