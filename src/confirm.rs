//! Quit confirmation gate.
//!
//! While the gate is open it owns all input. It parks the previous mode
//! inside [`Mode::ConfirmPending`] and hands it back untouched on cancel.

use crossterm::event::{KeyCode, KeyEvent};

use crate::config::KeybindingConfig;
use crate::mode::{Mode, ResumeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    confirm: char,
    cancel: char,
}

impl ConfirmationGate {
    pub fn new(bindings: &KeybindingConfig) -> Self {
        Self {
            confirm: bindings.confirm,
            cancel: bindings.cancel,
        }
    }

    /// Map a key to a decision; `None` means the key is swallowed
    pub fn decide(&self, key: &KeyEvent) -> Option<Decision> {
        match key.code {
            KeyCode::Esc => Some(Decision::Cancel),
            KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.confirm) => Some(Decision::Confirm),
            KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.cancel) => Some(Decision::Cancel),
            _ => None,
        }
    }

    /// Park `mode` behind the prompt. Opening twice keeps the first resume target.
    pub fn open(mode: Mode) -> Mode {
        let resume = match mode {
            Mode::Browsing => ResumeMode::Browsing,
            Mode::TreeNavigating(nav) => ResumeMode::TreeNavigating(nav),
            pending @ Mode::ConfirmPending { .. } => return pending,
        };
        Mode::ConfirmPending { resume }
    }

    /// Restore the parked mode; other modes pass through unchanged
    pub fn cancel(mode: Mode) -> Mode {
        match mode {
            Mode::ConfirmPending { resume } => resume.into(),
            other => other,
        }
    }
}
