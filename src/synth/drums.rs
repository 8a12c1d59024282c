//! Percussive generators: kick, hi-hat, snare/clap, and tuned percussion.

use super::{SynthError, ensure_positive, finish, noise_source, sine, time_axis};

const HAT_NOISE_SEED: u64 = 11;
const SNARE_NOISE_SEED: u64 = 23;

/// Punchy kick: a sine whose pitch sweeps down exponentially from 60 Hz,
/// with a 2 kHz transient click layered on top for attack definition.
pub fn kick(sample_rate: u32) -> Result<Vec<f32>, SynthError> {
    let samples = time_axis(sample_rate, 0.3)?
        .into_iter()
        .map(|t| {
            let freq = 60.0 * (-t * 8.0).exp();
            let body = sine(freq, t) * (-t * 15.0).exp();
            let click = (-t * 50.0).exp() * sine(2000.0, t) * 0.3;
            body + click
        })
        .collect();
    Ok(finish(samples, 0.8, sample_rate))
}

/// Crisp hi-hat: a fast-decaying noise burst plus a faint 8 kHz metallic
/// ring that dies even faster.
pub fn hihat(sample_rate: u32) -> Result<Vec<f32>, SynthError> {
    let mut noise = noise_source(HAT_NOISE_SEED);
    let samples = time_axis(sample_rate, 0.1)?
        .into_iter()
        .map(|t| {
            let burst = noise() * (-t * 20.0).exp();
            let ring = sine(8000.0, t) * (-t * 30.0).exp() * 0.2;
            burst + ring
        })
        .collect();
    Ok(finish(samples, 0.6, sample_rate))
}

/// Snare/clap hybrid: noise and a low 200 Hz partial under one shared
/// decay.
pub fn snare(sample_rate: u32) -> Result<Vec<f32>, SynthError> {
    let mut noise = noise_source(SNARE_NOISE_SEED);
    let samples = time_axis(sample_rate, 0.15)?
        .into_iter()
        .map(|t| {
            let tone = sine(200.0, t) * 0.3;
            (noise() + tone) * (-t * 12.0).exp()
        })
        .collect();
    Ok(finish(samples, 0.7, sample_rate))
}

/// Tuned percussion: a pitched partial with a light noise skin. The noise
/// seed derives from the pitch so differently tuned drums get distinct
/// tails.
pub fn percussion(sample_rate: u32, freq: f32) -> Result<Vec<f32>, SynthError> {
    ensure_positive("freq", f64::from(freq))?;
    let mut noise = noise_source(u64::from(freq.to_bits()));
    let samples = time_axis(sample_rate, 0.2)?
        .into_iter()
        .map(|t| (sine(freq, t) + noise() * 0.3) * (-t * 8.0).exp())
        .collect();
    Ok(finish(samples, 0.4, sample_rate))
}
