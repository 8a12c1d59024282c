//! Terminal front end: raw-mode key handling and a ratatui grid view.
//!
//! Keys are resolved here into the semantic `InputEvent`s the core
//! understands; the core never sees key codes, and the view only ever
//! reads a `DisplayState` snapshot.

pub mod grid;
pub mod input;
pub mod view;

use psybox::shared::{NUM_STEPS, NUM_TRACKS};

/// Edit cursor over the pattern grid, moved with the arrow keys. Wraps at
/// every edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub step: usize,
    pub track: usize,
}

impl Cursor {
    pub fn left(&mut self) {
        self.step = (self.step + NUM_STEPS - 1) % NUM_STEPS;
    }

    pub fn right(&mut self) {
        self.step = (self.step + 1) % NUM_STEPS;
    }

    pub fn up(&mut self) {
        self.track = (self.track + NUM_TRACKS - 1) % NUM_TRACKS;
    }

    pub fn down(&mut self) {
        self.track = (self.track + 1) % NUM_TRACKS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_at_every_edge() {
        let mut c = Cursor::default();
        c.left();
        assert_eq!(c.step, NUM_STEPS - 1);
        c.right();
        assert_eq!(c.step, 0);
        c.up();
        assert_eq!(c.track, NUM_TRACKS - 1);
        c.down();
        assert_eq!(c.track, 0);
    }
}
