use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use psybox::kit::TRACKS;
use psybox::shared::{DisplayState, NUM_STEPS};

use super::Cursor;

const LABEL_WIDTH: usize = 12;

/// Draw the 16x8 pattern grid with the playhead column, the edit cursor,
/// and per-lane accent colors. Unloaded lanes render dimmed.
pub fn draw_grid(frame: &mut Frame, area: Rect, state: &DisplayState, cursor: Cursor) {
    let mut lines: Vec<Line> = Vec::with_capacity(TRACKS.len() + 1);
    lines.push(header_line(state));

    for (track, spec) in TRACKS.iter().enumerate() {
        let (r, g, b) = spec.color;
        let accent = Color::Rgb(r, g, b);
        let label_style = if state.loaded[track] {
            Style::default().fg(accent)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let label = format!("{:<width$}", spec.name, width = LABEL_WIDTH);
        let mut spans = vec![Span::styled(label, label_style)];

        for step in 0..NUM_STEPS {
            let active = state.grid[step][track];
            let on_playhead = state.playhead == Some(step as u8);
            let under_cursor = cursor.step == step && cursor.track == track;

            let text = if active { "[#]" } else { " . " };
            let mut style = if active {
                Style::default().fg(accent)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            if on_playhead {
                style = style.bg(Color::Rgb(0x20, 0x50, 0x30));
            }
            if under_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL).title(" pattern ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Step numbers, with the playhead column lit and downbeats brighter.
fn header_line(state: &DisplayState) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for step in 0..NUM_STEPS {
        let style = if state.playhead == Some(step as u8) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(0x00, 0xff, 0x88))
        } else if step % 4 == 0 {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{:>2} ", step + 1), style));
    }
    Line::from(spans)
}
