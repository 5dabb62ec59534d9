use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::app::App;
use crate::error::Result;
use crate::expansion::ExpansionStore;
use crate::mode::{Mode, ModeKind, ResumeMode};
use crate::navigator::NavigationCursor;
use crate::status::StatusBoard;

/// Serializable picture of the navigation state, used by the headless
/// tooling to save, replay and render sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSnapshot {
    pub mode: ModeKind,
    /// Mode a pending quit prompt returns to
    pub resume_mode: Option<ModeKind>,
    pub hovered_module: usize,
    pub current_module: usize,
    pub cursor: Option<NavigationCursor>,
    pub expansion: ExpansionStore,
    pub status_board: StatusBoard,
    pub status_message: String,
    pub should_quit: bool,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            mode: ModeKind::Browsing,
            resume_mode: None,
            hovered_module: 0,
            current_module: 0,
            cursor: None,
            expansion: ExpansionStore::new(),
            status_board: StatusBoard::new(),
            status_message: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl StateSnapshot {
    pub fn from_app(app: &App) -> Self {
        let resume_mode = match app.mode() {
            Mode::ConfirmPending {
                resume: ResumeMode::Browsing,
            } => Some(ModeKind::Browsing),
            Mode::ConfirmPending {
                resume: ResumeMode::TreeNavigating(_),
            } => Some(ModeKind::TreeNavigating),
            _ => None,
        };

        Self {
            mode: app.mode_kind(),
            resume_mode,
            hovered_module: app.selector.hovered(),
            current_module: app.selector.current(),
            cursor: app.mode().visible_navigator().map(|nav| nav.cursor()),
            expansion: app.expansion.clone(),
            status_board: app.status_board.clone(),
            status_message: app.ui.status_message.clone(),
            should_quit: app.should_quit,
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
