use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use textwrap::Options;

use crate::app::App;
use crate::conversation::{Conversation, TurnOutcome, TurnState};
use crate::models::Sender;

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn draw_chat(f: &mut Frame<'_>, area: Rect, app: &App) {
    let tab = app.controller.tabs().active();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ]
            .as_ref(),
        )
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(tab.name.as_str())
        .style(Style::default().fg(Color::White));
    let inner = block.inner(chunks[0]);

    // Lines come back already wrapped, so one line is one screen row.
    let lines = message_lines(&tab.conversation, inner.width);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let bottom = total.saturating_sub(inner.height);
    let offset = bottom.saturating_sub(app.scroll);

    let messages = Paragraph::new(lines).block(block).scroll((offset, 0));
    f.render_widget(messages, chunks[0]);

    f.render_widget(status_line(&tab.conversation, app.spinner_frame), chunks[1]);

    // Render input box
    let enabled = app.input_enabled();
    let (title, style) = if enabled {
        ("Message", Style::default().fg(Color::LightYellow))
    } else {
        ("Waiting for reply", Style::default().fg(Color::DarkGray))
    };
    let input = Paragraph::new(app.input.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, chunks[2]);

    if enabled {
        let x = chunks[2].x + app.input.chars().count() as u16 + 1;
        f.set_cursor_position((x.min(chunks[2].right().saturating_sub(2)), chunks[2].y + 1));
    }
}

/// Renders every message as rows no wider than `width`.
fn message_lines(conversation: &Conversation, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    for message in conversation.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        let (prefix, color) = match message.sender {
            Sender::User => ("You: ", Color::LightGreen),
            Sender::Bot => ("AI: ", Color::LightBlue),
        };
        let prefix_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let text = if message.text.is_empty() {
            "…"
        } else {
            message.text.as_str()
        };
        for (i, line) in text.lines().enumerate() {
            let indent = if i == 0 { prefix } else { "  " };
            let options = Options::new(width)
                .initial_indent(indent)
                .subsequent_indent("  ");
            for (j, row) in textwrap::wrap(line, options).into_iter().enumerate() {
                if i == 0 && j == 0 {
                    let rest = row.strip_prefix(prefix).unwrap_or_default().to_string();
                    lines.push(Line::from(vec![
                        Span::styled(prefix, prefix_style),
                        Span::raw(rest),
                    ]));
                } else {
                    lines.push(Line::from(row.into_owned()));
                }
            }
        }
    }
    lines
}

fn status_line(conversation: &Conversation, frame: usize) -> Paragraph<'static> {
    let spinner = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
    let (text, color) = match conversation.state() {
        TurnState::AwaitingFirstByte => (format!("{} Waiting for reply...", spinner), Color::DarkGray),
        TurnState::Streaming => (format!("{} Streaming...", spinner), Color::DarkGray),
        // Failed settles to Idle straight away, so both read the outcome.
        TurnState::Failed | TurnState::Idle => match conversation.last_outcome() {
            Some(TurnOutcome::Failed) => ("Last reply failed".to_string(), Color::Red),
            _ => (String::new(), Color::DarkGray),
        },
    };
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
}
