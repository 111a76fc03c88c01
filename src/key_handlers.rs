use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('n') => app.new_chat(),
            KeyCode::Char('w') => app.close_chat(),
            KeyCode::Char('y') => {
                app.copy_reply();
            }
            KeyCode::Char('u') => app.scroll_up(),
            KeyCode::Char('d') => app.scroll_down(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            app.submit_input();
        }
        KeyCode::Tab => app.next_chat(),
        KeyCode::BackTab => app.previous_chat(),
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Backspace => {
            if app.input_enabled() {
                app.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if app.input_enabled() {
                app.input.push(c);
            }
        }
        _ => {}
    }
}
