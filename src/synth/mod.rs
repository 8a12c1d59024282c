//! Procedural instrument synthesis.
//!
//! Every generator follows the same shape: one pass over an evenly spaced
//! time axis computing oscillators (fixed pitch, exponential sweeps, or
//! wobble-modulated), optional seeded noise, an exponential envelope, and
//! optional tanh saturation. [`finish`] then applies the per-instrument
//! gain, fades the last few milliseconds to zero, and rescales if the peak
//! leaves the headroom ceiling. Buffers are mono f32 in [-1, 1]; the 16-bit
//! conversion happens only at the sink boundary via [`quantize_i16`].

pub mod bass;
pub mod drums;

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Synthesis inputs outside their documented domain. Generation for that
/// instrument is abandoned; nothing partial escapes.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SynthError {
    #[error("invalid synthesis parameter {name}: {value} (must be positive)")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), SynthError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SynthError::InvalidParameter { name, value })
    }
}

/// Evenly spaced sample times covering `[0, duration)`.
pub(crate) fn time_axis(sample_rate: u32, duration: f32) -> Result<Vec<f32>, SynthError> {
    ensure_positive("sample_rate", f64::from(sample_rate))?;
    ensure_positive("duration", f64::from(duration))?;
    let count = (sample_rate as f32 * duration) as usize;
    let step = 1.0 / sample_rate as f32;
    Ok((0..count).map(|i| i as f32 * step).collect())
}

/// Noise bursts are uniform in `[-NOISE_AMP, NOISE_AMP]`; the amplitude is
/// chosen so their RMS lands near 0.1, the level the drum envelopes are
/// balanced for.
pub(crate) const NOISE_AMP: f32 = 0.17;

/// Seeded noise source, so a buffer rendered twice is sample-identical.
pub(crate) fn noise_source(seed: u64) -> impl FnMut() -> f32 {
    let mut rng = StdRng::seed_from_u64(seed);
    move || rng.gen_range(-NOISE_AMP..NOISE_AMP)
}

/// Smoothed attack/decay pair: `exp(-t*decay) * (1 - exp(-t*attack))`.
pub(crate) fn attack_decay(t: f32, attack: f32, decay: f32) -> f32 {
    (-t * decay).exp() * (1.0 - (-t * attack).exp())
}

/// Soft-clip through a tanh transfer curve; drive > 1 pushes harder into
/// the knee and adds harmonic character.
pub(crate) fn saturate(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh()
}

/// Length of the linear fade stitched onto every buffer tail.
const FADE_SECS: f32 = 0.005;

/// Peaks above this are rescaled down; keeps headroom below full scale so
/// quantization never clips.
const PEAK_CEILING: f32 = 0.98;

/// Final conditioning shared by every generator: per-instrument gain, a
/// short fade so the tail genuinely reaches zero (exponential envelopes
/// alone leave a truncation click), then a peak guard.
pub(crate) fn finish(mut samples: Vec<f32>, gain: f32, sample_rate: u32) -> Vec<f32> {
    for s in &mut samples {
        *s *= gain;
    }

    let fade = ((sample_rate as f32 * FADE_SECS) as usize).min(samples.len());
    if fade > 0 {
        let start = samples.len() - fade;
        for (j, s) in samples[start..].iter_mut().enumerate() {
            *s *= 1.0 - (j as f32 + 1.0) / fade as f32;
        }
    }

    let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    if peak > PEAK_CEILING {
        let scale = PEAK_CEILING / peak;
        for s in &mut samples {
            *s *= scale;
        }
    }
    samples
}

/// Quantize one normalized sample for the 16-bit PCM sink boundary:
/// `round(sample * 32767)`, clamped to the i16 range.
pub fn quantize_i16(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Convenience oscillator: a sine at `freq` Hz evaluated at time `t`.
pub(crate) fn sine(freq: f32, t: f32) -> f32 {
    (TAU * freq * t).sin()
}
