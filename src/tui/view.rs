use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use psybox::shared::{DisplayState, NUM_TRACKS};

use super::{Cursor, grid};

const ACCENT: Color = Color::Rgb(0x00, 0xff, 0x88);

pub fn render(frame: &mut Frame, state: &DisplayState, cursor: Cursor) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                    // transport strip
            Constraint::Min(NUM_TRACKS as u16 + 3),   // pattern grid
            Constraint::Length(1),                    // key help
        ])
        .split(frame.area());

    draw_transport(frame, sections[0], state);
    grid::draw_grid(frame, sections[1], state, cursor);
    draw_help(frame, sections[2]);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let status = if state.playing {
        Span::styled(
            " PLAYING ",
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" STOPPED ", Style::default().fg(Color::DarkGray))
    };

    let line = Line::from(vec![
        Span::styled(
            "PSYBOX",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        status,
        Span::raw(format!("  {:>3} BPM", state.bpm)),
        Span::raw(format!("  vol {:>3.0}%", state.master_volume * 100.0)),
    ]);

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help =
        "space play/stop   enter toggle   arrows move   c clear   -/= tempo   [/] volume   q quit";
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
