use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use psybox::shared::InputEvent;

use super::Cursor;

/// Whole BPM per tempo nudge keypress.
const TEMPO_STEP: i32 = 5;
/// Master volume change per nudge keypress.
const VOLUME_STEP: f32 = 0.05;

/// Poll for input, moving the cursor locally and resolving everything else
/// into semantic events for the app loop.
pub fn poll_input(timeout: Duration, cursor: &mut Cursor) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, cursor));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, cursor: &mut Cursor) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayToggle],
        KeyCode::Char('c') => vec![InputEvent::Clear],
        KeyCode::Enter => vec![InputEvent::ToggleCell {
            step: cursor.step,
            track: cursor.track,
        }],

        KeyCode::Left => {
            cursor.left();
            vec![]
        }
        KeyCode::Right => {
            cursor.right();
            vec![]
        }
        KeyCode::Up => {
            cursor.up();
            vec![]
        }
        KeyCode::Down => {
            cursor.down();
            vec![]
        }

        KeyCode::Char('-') => vec![InputEvent::TempoNudge(-TEMPO_STEP)],
        KeyCode::Char('=') | KeyCode::Char('+') => vec![InputEvent::TempoNudge(TEMPO_STEP)],
        KeyCode::Char('[') => vec![InputEvent::VolumeNudge(-VOLUME_STEP)],
        KeyCode::Char(']') => vec![InputEvent::VolumeNudge(VOLUME_STEP)],

        _ => vec![],
    }
}
