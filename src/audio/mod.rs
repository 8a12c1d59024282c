//! Platform audio output: a cpal stream fed by a fixed voice pool.
//!
//! Control code talks to the stream through [`AudioHandle`]. Buffers are
//! decoded and resampled on the control thread, handed over the command
//! channel, and mixed inside the device callback, which drains pending
//! commands at the top of every block and never blocks or allocates on the
//! steady path.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use crate::audio_api::{AudioCommand, AudioSink};

mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::{SampleBuffer, SampleBufferError, write_wav_i16};

use engine::Engine;

/// Scratch pre-size when the host doesn't report a block maximum, and the
/// ceiling when it reports an absurd one.
const BLOCK_FRAMES_LIMIT: usize = 16_384;

/// Largest block the callback scratch is sized for up front.
fn scratch_frames(size: &cpal::SupportedBufferSize) -> usize {
    match size {
        cpal::SupportedBufferSize::Range { max, .. } => (*max as usize).min(BLOCK_FRAMES_LIMIT),
        cpal::SupportedBufferSize::Unknown => BLOCK_FRAMES_LIMIT,
    }
}

/// Keeps the cpal stream alive. Stays on the thread that built it (the
/// stream type is not sendable); everything else talks to the engine
/// through a cloned [`AudioHandle`].
pub struct AudioOutput {
    handle: AudioHandle,
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn handle(&self) -> AudioHandle {
        self.handle.clone()
    }
}

/// Clonable control surface over the engine: the command sender plus the
/// negotiated device rate.
#[derive(Clone)]
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    device_rate: u32,
}

impl AudioHandle {
    /// Device sample rate; buffers are resampled to this before loading.
    pub fn device_rate(&self) -> u32 {
        self.device_rate
    }

    /// Register a synthesized mono buffer for a lane. Loads wait for queue
    /// space rather than dropping, so a lane the caller marks loaded really
    /// holds its sound.
    pub fn load_buffer(&self, track: usize, samples: &[f32], source_rate: u32) {
        let sound = SampleBuffer::from_mono(samples, source_rate, self.device_rate);
        self.send_load(track, sound);
    }

    /// Decode a WAV file and register it for a lane.
    pub fn load_file(&self, track: usize, path: &Path) -> Result<(), SampleBufferError> {
        let sound = SampleBuffer::load_wav(path, self.device_rate)?;
        self.send_load(track, sound);
        Ok(())
    }

    fn send_load(&self, track: usize, sound: SampleBuffer) {
        let cmd = AudioCommand::LoadSample {
            track,
            sound: Arc::new(sound),
        };
        // blocking send: loads run on the control thread and must land
        if self.tx.send(cmd).is_err() {
            warn!(track, "audio engine is gone, sample load discarded");
        }
    }
}

impl AudioSink for AudioHandle {
    fn play(&self, track: usize, volume: f32) {
        // fire and forget; a full queue drops the trigger rather than block
        let _ = self.tx.try_send(AudioCommand::Trigger { track, volume });
    }
}

pub fn start_audio() -> anyhow::Result<AudioOutput> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(256);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let config = device
        .default_output_config()
        .context("no default output config")?;

    let device_rate = config.sample_rate();
    let channels = config.channels() as usize;
    let max_block = scratch_frames(config.buffer_size());

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream(&device, &config.into(), rx, channels, max_block)?;
            stream.play().context("failed to start output stream")?;
            info!(device_rate, channels, "audio output running");
            Ok(AudioOutput {
                handle: AudioHandle { tx, device_rate },
                _stream: stream,
            })
        }
        other => anyhow::bail!("unsupported device sample format {other:?} (need f32)"),
    }
}

fn build_output_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    channels: usize,
    max_block: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    // sized for the device's largest block; the callback only reallocates
    // if a block somehow exceeds the reported maximum
    let mut scratch: Vec<StereoFrame> = Vec::with_capacity(max_block);

    let err_fn = |err: cpal::StreamError| error!(%err, "audio output stream error");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels;
            scratch.clear();
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            for (frame, out) in scratch.iter().zip(data.chunks_exact_mut(channels)) {
                if out.len() == 1 {
                    out[0] = 0.5 * (frame.left + frame.right);
                } else {
                    out[0] = frame.left;
                    out[1] = frame.right;
                    for extra in &mut out[2..] {
                        *extra = 0.0;
                    }
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
