use ratatui::style::Color;

use crate::catalog::ConnectionStatus;

/// Colors used across the module bar, tree, details pane and overlays
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub active_border: Color,
    pub inactive_border: Color,

    // Module bar
    pub module_hovered_bg: Color,
    pub module_hovered_fg: Color,
    pub module_current: Color,

    // Tree pane
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_project: Color,
    pub tree_environment: Color,
    pub tree_connection: Color,

    // Connection status
    pub status_connected: Color,
    pub status_disconnected: Color,
    pub status_connecting: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_help_text: Color,
    pub status_bar_mode: Color,
    pub status_bar_module: Color,

    // Confirm overlay
    pub confirm_border: Color,
    pub confirm_text: Color,

    // General UI
    pub panel_title: Color,
    pub text_default: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            active_border: Color::Yellow,
            inactive_border: Color::DarkGray,

            module_hovered_bg: Color::White,
            module_hovered_fg: Color::Black,
            module_current: Color::Yellow,

            tree_selected_bg: Color::White,
            tree_selected_fg: Color::Black,
            tree_project: Color::Blue,
            tree_environment: Color::Cyan,
            tree_connection: Color::Reset,

            status_connected: Color::Green,
            status_disconnected: Color::Red,
            status_connecting: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_help_text: Color::Gray,
            status_bar_mode: Color::Yellow,
            status_bar_module: Color::Blue,

            confirm_border: Color::Yellow,
            confirm_text: Color::White,

            panel_title: Color::Gray,
            text_default: Color::Reset,
        }
    }
}

impl Theme {
    pub fn status_color(&self, status: ConnectionStatus) -> Color {
        match status {
            ConnectionStatus::Connected => self.status_connected,
            ConnectionStatus::Disconnected => self.status_disconnected,
            ConnectionStatus::Connecting => self.status_connecting,
        }
    }
}

/// Get the current theme
pub fn get_theme() -> Theme {
    Theme::default()
}
