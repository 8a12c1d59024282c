// Types that cross the layer boundaries: the TUI resolves raw key presses
// into semantic InputEvents, the clock reports back with UiEvents, and the
// view renders a DisplayState snapshot every frame.

/// Steps per pattern cycle (sixteenth notes).
pub const NUM_STEPS: usize = 16;
/// Fixed instrument lanes.
pub const NUM_TRACKS: usize = 8;

/// Synthesis rate; buffers are resampled to the device rate on load.
pub const SAMPLE_RATE: u32 = 44_100;

pub const BPM_MIN: u32 = 60;
pub const BPM_MAX: u32 = 200;
/// Genre-typical startup tempo.
pub const DEFAULT_BPM: u32 = 145;

/// Requests flowing UI surface -> core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Flip one cell of the pattern grid.
    ToggleCell { step: usize, track: usize },

    /// Play if stopped, stop if playing.
    PlayToggle,

    /// Clear the whole pattern and rewind the step cursor to 0.
    Clear,

    /// Relative tempo change in whole BPM; the app loop clamps the result
    /// into the accepted range before applying it.
    TempoNudge(i32),

    /// Relative master volume change.
    VolumeNudge(f32),

    Quit,
}

/// Notifications flowing core -> UI surface. Pushed by the clock with
/// try_send; the frame loop drains them, so delivery is fire-and-forget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// A step just fired; move the playhead highlight here.
    StepAdvance(u8),
    /// Transport stopped; clear the playhead highlight.
    Stopped,
}

/// Everything the view needs for one frame. The app loop assembles this from
/// the pattern store, clock, and dispatcher each tick; the TUI only reads it.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub grid: [[bool; NUM_TRACKS]; NUM_STEPS],
    /// Step column to highlight while the transport runs.
    pub playhead: Option<u8>,
    pub playing: bool,
    pub bpm: u32,
    pub master_volume: f32,
    /// Tracks with a registered sound; unloaded lanes render dimmed.
    pub loaded: [bool; NUM_TRACKS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bpm_is_in_accepted_range() {
        assert!((BPM_MIN..=BPM_MAX).contains(&DEFAULT_BPM));
    }
}
