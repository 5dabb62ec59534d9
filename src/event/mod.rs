use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::App;
use crate::async_task::Task;
use crate::mode::ModeKind;

pub mod browsing;
pub mod confirm;
pub mod tree;

pub use browsing::handle_browsing_event;
pub use confirm::handle_confirm_event;
pub use tree::handle_tree_event;

pub type EventResult = crate::error::Result<bool>;

/// Route one terminal event. Returns true when the frame needs redrawing.
pub fn handle_event(event: Event, app: &mut App, task_sender: &mpsc::Sender<Task>) -> EventResult {
    let state_before = app.render_fingerprint();

    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // The quit prompt sees every key first and lets nothing through
            if app.mode_kind() == ModeKind::ConfirmPending {
                handle_confirm_event(key, app)?;
                return Ok(app.render_fingerprint() != state_before);
            }

            if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.ui.force_redraw = true;
                app.ui.status_message = "Screen refreshed".to_string();
                return Ok(true);
            }

            match app.mode_kind() {
                ModeKind::Browsing => handle_browsing_event(key, app)?,
                ModeKind::TreeNavigating => handle_tree_event(key, app, task_sender)?,
                ModeKind::ConfirmPending => false,
            };
        }
        Event::Resize(_, _) => return Ok(true),
        _ => {}
    }

    Ok(app.render_fingerprint() != state_before)
}
