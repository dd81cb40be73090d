//! Keyboard input dispatch.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, View};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Windows sends both Press and Release.
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('1') => app.view = View::PriceGrid,
        KeyCode::Char('2') => app.view = View::Growth,
        KeyCode::Char('3') => app.view = View::Summary,
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.view = app.view.prev(),
        KeyCode::Tab => app.view = app.view.next(),
        KeyCode::BackTab => app.view = app.view.prev(),
        KeyCode::Char(']') => app.next_group(),
        KeyCode::Char('[') => app.prev_group(),
        _ => {}
    }
}
