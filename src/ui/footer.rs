use crate::app::App;
use crate::notifier::NotifyKind;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

const KEY_HELP: &str =
    "Enter send · Ctrl+N new · Ctrl+W close · Ctrl+Y copy · Tab/Shift+Tab switch · Esc quit";

/// Draws the newest toast, or the key help when there is none.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let footer = match app.toasts.current() {
        Some(toast) => {
            let color = match toast.kind {
                NotifyKind::Success => Color::LightGreen,
                NotifyKind::Error => Color::LightRed,
                NotifyKind::Warn => Color::Yellow,
                NotifyKind::Info => Color::LightCyan,
            };
            Paragraph::new(toast.message).style(Style::default().fg(Color::Black).bg(color))
        }
        None => Paragraph::new(KEY_HELP).style(Style::default().fg(Color::DarkGray)),
    };

    f.render_widget(footer.alignment(Alignment::Center), area);
}
