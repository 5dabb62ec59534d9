use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::event::EventResult;

pub fn handle_browsing_event(key: KeyEvent, app: &mut App) -> EventResult {
    let quit = app.config.keybindings.quit;
    let handled = match key.code {
        KeyCode::Left | KeyCode::Char('h' | 'H') => app.hover_previous(),
        KeyCode::Right | KeyCode::Char('l' | 'L') => app.hover_next(),
        KeyCode::Enter => app.commit_module(),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&quit) => app.request_quit(),
        _ => false,
    };
    Ok(handled)
}
