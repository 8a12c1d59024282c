//! Project configuration, read once at startup from `psybox.json` in the
//! project directory. A missing file means defaults; a malformed one is
//! logged and replaced by defaults so startup never dies over a typo.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::dispatcher::DEFAULT_MASTER_VOLUME;
use crate::shared::{BPM_MAX, BPM_MIN, DEFAULT_BPM};

pub const CONFIG_FILE: &str = "psybox.json";

/// What happens to a lane whose sample override is missing or unreadable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Render the lane's built-in recipe.
    #[default]
    Synthesize,
    /// Leave the lane unloaded; the dispatcher skips it.
    Silent,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bpm: u32,
    pub master_volume: f32,
    pub fallback: FallbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            master_volume: DEFAULT_MASTER_VOLUME,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl Config {
    /// Load from `dir/psybox.json`, pulling out-of-range values back to
    /// their defaults.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Config>(&raw) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed config ignored");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if !(BPM_MIN..=BPM_MAX).contains(&self.bpm) {
            warn!(bpm = self.bpm, "configured tempo out of range, using default");
            self.bpm = DEFAULT_BPM;
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            warn!(
                master_volume = self.master_volume,
                "configured volume out of range, using default"
            );
            self.master_volume = DEFAULT_MASTER_VOLUME;
        }
        self
    }
}
