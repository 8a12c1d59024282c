//! Decoded, device-rate audio buffers.
//!
//! Buffers are immutable once built: synthesis or WAV decode happens on the
//! control thread, the result is resampled to the device rate here, and the
//! engine only ever reads frames. Quantization to 16-bit happens solely at
//! the WAV export boundary.

use std::path::Path;

use thiserror::Error;

use super::frame::StereoFrame;
use crate::synth::quantize_i16;

#[derive(Debug, Error)]
pub enum SampleBufferError {
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported wav layout: {0}")]
    Unsupported(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    frames: Vec<StereoFrame>,
}

impl SampleBuffer {
    /// Wrap a synthesized mono buffer, duplicating it across both channels
    /// and resampling from `source_rate` to `target_rate`.
    pub fn from_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Self {
        let frames: Vec<StereoFrame> = samples.iter().map(|&s| StereoFrame::splat(s)).collect();
        Self {
            frames: resample_linear(&frames, source_rate, target_rate),
        }
    }

    /// Decode a WAV file and resample it to `target_rate`. Mono files are
    /// duplicated across both channels; files with more than two channels
    /// keep their first two.
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, SampleBufferError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(SampleBufferError::Unsupported("zero channels"));
        }
        if !(1..=32).contains(&spec.bits_per_sample) {
            return Err(SampleBufferError::Unsupported("bit depth"));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?
            }
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let channels = spec.channels as usize;
        let frames: Vec<StereoFrame> = if channels == 1 {
            samples.into_iter().map(StereoFrame::splat).collect()
        } else {
            samples
                .chunks_exact(channels)
                .map(|c| StereoFrame {
                    left: c[0],
                    right: c[1],
                })
                .collect()
        };

        Ok(Self {
            frames: resample_linear(&frames, spec.sample_rate, target_rate),
        })
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Write a mono buffer as a 16-bit stereo WAV. This is the one place where
/// normalized floats become integers.
pub fn write_wav_i16(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), SampleBufferError> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        let q = quantize_i16(s);
        writer.write_sample(q)?;
        writer.write_sample(q)?;
    }
    writer.finalize()?;
    Ok(())
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = f64::from(target_rate) / f64::from(source_rate);
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= frames.len() - 1 {
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn write_test_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn from_mono_duplicates_channels() {
        let buf = SampleBuffer::from_mono(&[0.1, -0.5, 1.0], 44_100, 44_100);
        assert_eq!(buf.len(), 3);
        for frame in buf.frames() {
            assert_eq!(frame.left, frame.right);
        }
        assert_relative_eq!(buf.frames()[1].left, -0.5);
    }

    #[test]
    fn from_mono_resamples_to_target_rate() {
        let samples = vec![0.0; 1000];
        let buf = SampleBuffer::from_mono(&samples, 22_050, 44_100);
        assert_eq!(buf.len(), 2000);
    }

    #[test]
    fn load_wav_decodes_mono_int() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_test_wav(&path, 1, 44_100, &[0, 16384, -32768]);

        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 3);
        assert_relative_eq!(buf.frames()[0].left, 0.0);
        assert_relative_eq!(buf.frames()[1].left, 0.5);
        assert_relative_eq!(buf.frames()[2].left, -1.0);
        assert_eq!(buf.frames()[1].left, buf.frames()[1].right);
    }

    #[test]
    fn load_wav_keeps_stereo_separation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // interleaved L R L R
        write_test_wav(&path, 2, 44_100, &[16384, -16384, 8192, -8192]);

        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 2);
        assert_relative_eq!(buf.frames()[0].left, 0.5);
        assert_relative_eq!(buf.frames()[0].right, -0.5);
    }

    #[test]
    fn load_wav_resamples_file_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.wav");
        write_test_wav(&path, 1, 22_050, &[1000; 100]);

        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 200);
    }

    #[test]
    fn load_wav_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.wav");
        assert!(SampleBuffer::load_wav(&missing, 44_100).is_err());
    }

    #[test]
    fn exported_wav_reads_back_quantized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = [0.0_f32, 0.25, -1.0, 1.0];
        write_wav_i16(&path, &samples, 44_100).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        // stereo interleaved, both channels identical
        assert_eq!(decoded.len(), 8);
        for (i, &s) in samples.iter().enumerate() {
            let expected = quantize_i16(s);
            assert_eq!(decoded[2 * i], expected);
            assert_eq!(decoded[2 * i + 1], expected);
        }
    }

    #[test]
    fn resample_preserves_endpoint_values() {
        let frames = vec![StereoFrame::splat(1.0), StereoFrame::splat(0.0)];
        let out = resample_linear(&frames, 10, 20);
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[0].left, 1.0);
        assert_relative_eq!(out[1].left, 0.5);
        // past the last source frame the resampler holds the final value
        assert_relative_eq!(out[3].left, 0.0);
    }
}
