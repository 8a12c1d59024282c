//! Bass generators: the wobble-modulated lead, the deep sub, and the
//! filter-swept acid voice. All three stack harmonics over a fundamental;
//! wobbly and acid additionally run through tanh saturation for grit.

use std::f32::consts::TAU;

use super::{SynthError, attack_decay, ensure_positive, finish, saturate, sine, time_axis};

const WOBBLE_RATE: f32 = 2.5;
const WOBBLE_DEPTH: f32 = 0.3;
const WOBBLY_DRIVE: f32 = 1.5;
const ACID_DRIVE: f32 = 2.0;

/// Signature wobbly lead: the fundamental's pitch rides a 2.5 Hz LFO, two
/// harmonics thicken it, and a detuned copy of the same LFO gates the
/// amplitude for the round, pumping texture.
pub fn wobbly(sample_rate: u32, freq: f32) -> Result<Vec<f32>, SynthError> {
    ensure_positive("freq", f64::from(freq))?;
    let samples = time_axis(sample_rate, 0.5)?
        .into_iter()
        .map(|t| {
            let freq_mod = freq * (1.0 + WOBBLE_DEPTH * (TAU * WOBBLE_RATE * t).sin());
            let osc = sine(freq_mod, t)
                + 0.3 * sine(freq_mod * 2.0, t)
                + 0.1 * sine(freq_mod * 3.0, t);
            let filter_mod = 0.5 + 0.5 * (TAU * WOBBLE_RATE * 1.3 * t).sin();
            saturate(osc * filter_mod * attack_decay(t, 20.0, 2.0), WOBBLY_DRIVE)
        })
        .collect();
    Ok(finish(samples, 0.6, sample_rate))
}

/// Deep sub: a near-pure sine with a slow 1.5 Hz pitch drift and a long
/// release. Left unsaturated so the low end stays clean.
pub fn sub(sample_rate: u32, freq: f32) -> Result<Vec<f32>, SynthError> {
    ensure_positive("freq", f64::from(freq))?;
    let samples = time_axis(sample_rate, 0.8)?
        .into_iter()
        .map(|t| {
            let drift = 1.0 + 0.1 * sine(1.5, t);
            sine(freq * drift, t) * attack_decay(t, 10.0, 1.5)
        })
        .collect();
    Ok(finish(samples, 0.8, sample_rate))
}

/// Squelchy acid voice: a bright three-partial stack whose level sweeps
/// down like a closing lowpass, snapped into shape by hard-ish drive.
pub fn acid(sample_rate: u32, freq: f32) -> Result<Vec<f32>, SynthError> {
    ensure_positive("freq", f64::from(freq))?;
    let samples = time_axis(sample_rate, 0.3)?
        .into_iter()
        .map(|t| {
            let phase = TAU * freq * t;
            let osc = phase.sin() + 0.3 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin();
            let sweep = 0.3 + 0.7 * (-t * 8.0).exp();
            saturate(osc * sweep * attack_decay(t, 30.0, 10.0), ACID_DRIVE)
        })
        .collect();
    Ok(finish(samples, 0.5, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn assert_conditioned(buf: &[f32], expected_secs: f32) {
        assert_eq!(buf.len(), (RATE as f32 * expected_secs) as usize);
        for (i, s) in buf.iter().enumerate() {
            assert!(s.is_finite(), "sample {i} is not finite");
            assert!(s.abs() <= 1.0, "sample {i} = {s} leaves [-1, 1]");
        }
        assert_eq!(*buf.last().unwrap(), 0.0, "tail did not fade out");
    }

    fn rms(buf: &[f32]) -> f32 {
        (buf.iter().map(|s| s * s).sum::<f32>() / buf.len() as f32).sqrt()
    }

    fn window(buf: &[f32], center_secs: f32, half_width_secs: f32) -> &[f32] {
        let center = (center_secs * RATE as f32) as usize;
        let half = (half_width_secs * RATE as f32) as usize;
        &buf[center - half..center + half]
    }

    #[test]
    fn wobbly_is_bounded_and_reproducible() {
        let buf = wobbly(RATE, 55.0).unwrap();
        assert_conditioned(&buf, 0.5);
        assert_eq!(buf, wobbly(RATE, 55.0).unwrap());
    }

    #[test]
    fn wobbly_amplitude_pumps_with_the_lfo() {
        let buf = wobbly(RATE, 55.0).unwrap();
        // the 3.25 Hz amplitude LFO peaks near 77 ms and bottoms out near
        // 231 ms; the envelope barely moves between the two
        let loud = rms(window(&buf, 0.077, 0.01));
        let quiet = rms(window(&buf, 0.231, 0.01));
        assert!(
            loud > 3.0 * quiet,
            "no pumping: loud {loud} vs quiet {quiet}"
        );
    }

    #[test]
    fn sub_attack_is_gradual() {
        let buf = sub(RATE, 30.0).unwrap();
        assert_conditioned(&buf, 0.8);
        let onset = rms(&buf[..(RATE as usize) / 200]); // first 5 ms
        let body = rms(window(&buf, 0.125, 0.025));
        assert!(
            onset < 0.1 * body,
            "attack too abrupt: onset {onset} vs body {body}"
        );
    }

    #[test]
    fn acid_level_sweeps_down() {
        let buf = acid(RATE, 80.0).unwrap();
        assert_conditioned(&buf, 0.3);
        let peak = |s: &[f32]| s.iter().fold(0.0_f32, |m, v| m.max(v.abs()));
        let open = peak(&buf[..(RATE as f32 * 0.05) as usize]);
        let closed = peak(window(&buf, 0.25, 0.04));
        assert!(
            open > 2.0 * closed,
            "no downward sweep: open {open} vs closed {closed}"
        );
    }

    #[test]
    fn bass_generators_reject_bad_frequency() {
        assert!(matches!(
            wobbly(RATE, 0.0),
            Err(SynthError::InvalidParameter { name: "freq", .. })
        ));
        assert!(sub(RATE, -30.0).is_err());
        assert!(acid(RATE, f32::NAN).is_err());
    }

    #[test]
    fn saturation_keeps_peaks_inside_drive_ceiling() {
        // tanh bounds the pre-gain signal to (-1, 1), so the final peak can
        // never exceed the per-instrument gain
        let buf = acid(RATE, 80.0).unwrap();
        let peak = buf.iter().fold(0.0_f32, |m, v| m.max(v.abs()));
        assert!(peak <= 0.5 + 1e-6, "peak {peak} exceeds acid gain");
    }
}
