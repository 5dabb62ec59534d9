use crossterm::event::KeyEvent;

use crate::app::App;
use crate::confirm::{ConfirmationGate, Decision};
use crate::event::EventResult;

pub fn handle_confirm_event(key: KeyEvent, app: &mut App) -> EventResult {
    let gate = ConfirmationGate::new(&app.config.keybindings);
    let handled = match gate.decide(&key) {
        Some(Decision::Confirm) => app.confirm_quit(),
        Some(Decision::Cancel) => app.cancel_quit(),
        None => false,
    };
    Ok(handled)
}
