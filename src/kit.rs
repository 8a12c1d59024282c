//! The fixed eight-lane instrument kit: display names, the file stems used
//! for sample overrides, and the synthesis recipe behind each lane.

use crate::shared::NUM_TRACKS;
use crate::synth::{self, SynthError};

/// Which recipe backs a lane. Immutable per track for the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Timbre {
    Kick,
    Hihat,
    Snare,
    WobblyBass { freq: f32 },
    SubBass { freq: f32 },
    AcidBass { freq: f32 },
    Percussion { freq: f32 },
}

impl Timbre {
    /// Render this recipe into a mono buffer at `sample_rate`.
    pub fn synthesize(&self, sample_rate: u32) -> Result<Vec<f32>, SynthError> {
        match *self {
            Timbre::Kick => synth::drums::kick(sample_rate),
            Timbre::Hihat => synth::drums::hihat(sample_rate),
            Timbre::Snare => synth::drums::snare(sample_rate),
            Timbre::WobblyBass { freq } => synth::bass::wobbly(sample_rate, freq),
            Timbre::SubBass { freq } => synth::bass::sub(sample_rate, freq),
            Timbre::AcidBass { freq } => synth::bass::acid(sample_rate, freq),
            Timbre::Percussion { freq } => synth::drums::percussion(sample_rate, freq),
        }
    }
}

/// One lane of the kit.
#[derive(Clone, Copy, Debug)]
pub struct TrackSpec {
    pub name: &'static str,
    /// File stem for kit-directory overrides (`<dir>/<key>.wav`).
    pub key: &'static str,
    pub timbre: Timbre,
    /// Lane accent color as RGB.
    pub color: (u8, u8, u8),
}

/// The fixed track list; the index into this array is the track id
/// everywhere else in the crate.
pub const TRACKS: [TrackSpec; NUM_TRACKS] = [
    TrackSpec {
        name: "Kick Drum",
        key: "kick",
        timbre: Timbre::Kick,
        color: (0xff, 0x44, 0x44),
    },
    TrackSpec {
        name: "Hi-Hat",
        key: "hihat",
        timbre: Timbre::Hihat,
        color: (0x44, 0xff, 0x44),
    },
    TrackSpec {
        name: "Snare/Clap",
        key: "snare",
        timbre: Timbre::Snare,
        color: (0xff, 0xff, 0x44),
    },
    TrackSpec {
        name: "Bass Lead",
        key: "bass_lead",
        timbre: Timbre::WobblyBass { freq: 55.0 },
        color: (0xff, 0x44, 0xff),
    },
    TrackSpec {
        name: "Sub Bass",
        key: "sub_bass",
        timbre: Timbre::SubBass { freq: 30.0 },
        color: (0x88, 0x44, 0xff),
    },
    TrackSpec {
        name: "Acid Bass",
        key: "acid_bass",
        timbre: Timbre::AcidBass { freq: 80.0 },
        color: (0x44, 0xff, 0xff),
    },
    TrackSpec {
        name: "Perc 1",
        key: "perc1",
        timbre: Timbre::Percussion { freq: 200.0 },
        color: (0xff, 0x88, 0x44),
    },
    TrackSpec {
        name: "Perc 2",
        key: "perc2",
        timbre: Timbre::Percussion { freq: 150.0 },
        color: (0x88, 0xff, 0x44),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_lane_synthesizes_at_the_house_rate() {
        for spec in &TRACKS {
            let buf = spec
                .timbre
                .synthesize(crate::shared::SAMPLE_RATE)
                .unwrap_or_else(|e| panic!("{} failed: {e}", spec.name));
            assert!(!buf.is_empty(), "{} rendered empty", spec.name);
        }
    }

    #[test]
    fn override_keys_are_unique_stems() {
        let keys: HashSet<&str> = TRACKS.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), TRACKS.len());
        for spec in &TRACKS {
            assert!(!spec.key.is_empty());
            assert!(!spec.key.contains('.'), "{} key has an extension", spec.name);
        }
    }
}
