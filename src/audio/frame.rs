// The smallest unit of audio; one stereo frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Spread one mono sample across both channels.
    pub fn splat(sample: f32) -> Self {
        Self {
            left: sample,
            right: sample,
        }
    }

    /// Accumulate another frame into this one at the given gain.
    pub fn mix(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }
}
