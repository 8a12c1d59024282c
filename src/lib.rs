//! A fixed-grid psytrance step sequencer with procedurally synthesized
//! drums and basses.
//!
//! The crate splits along the thread boundaries of the running app.
//! [`synth`] renders finite buffers up front, [`pattern`] holds the one
//! piece of state shared between the UI and the [`clock`] tick loop, and
//! [`dispatcher`] turns active cells into fire-and-forget triggers on an
//! [`audio_api::AudioSink`], either the real cpal stream in [`audio`] or a
//! silent stand-in when no device is available.

pub mod audio;
pub mod audio_api;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod kit;
pub mod loader;
pub mod pattern;
pub mod shared;
pub mod synth;
