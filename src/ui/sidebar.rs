use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;

/// Draws the conversation list with the active tab highlighted.
pub fn draw_sidebar(f: &mut Frame<'_>, area: Rect, app: &App) {
    let tabs = app.controller.tabs();

    let items: Vec<ListItem> = tabs
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let marker = if tab.conversation.is_streaming() { "● " } else { "  " };
            let item = ListItem::new(format!("{}{}", marker, tab.name));
            if i == tabs.active_index() {
                item.style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                item.style(Style::default().fg(Color::White))
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Conversations")
            .style(Style::default().fg(Color::LightYellow)),
    );

    f.render_widget(list, area);
}
