use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::catalog::{ConnectionStatus, ModuleKind};
use crate::mode::ModeKind;
use crate::navigator::{build_view_model, Level, TreeRow};
use crate::theme::{get_theme, Theme};

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = get_theme();
    let layout = &app.config.layout;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(layout.module_bar_height),
            Constraint::Min(0),
            Constraint::Length(layout.status_bar_height),
        ])
        .split(frame.area());

    let tree_percent = layout.tree_pane_percent.min(100);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(tree_percent),
            Constraint::Percentage(100 - tree_percent),
        ])
        .split(rows[1]);

    draw_module_bar(frame, app, &theme, rows[0]);
    draw_tree(frame, app, &theme, main[0]);
    draw_details(frame, app, &theme, main[1]);
    draw_status_bar(frame, app, &theme, rows[2]);

    if app.mode_kind() == ModeKind::ConfirmPending {
        draw_confirm_dialog(frame, app, &theme);
    }
}

/// Every panel is framed with double lines
fn panel<'a>() -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
}

fn border_style(theme: &Theme, active: bool) -> Style {
    if active {
        Style::default().fg(theme.active_border)
    } else {
        Style::default().fg(theme.inactive_border)
    }
}

fn draw_module_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = panel()
        .title(" Modules ")
        .border_style(border_style(theme, app.mode_kind() == ModeKind::Browsing));

    let mut spans = Vec::new();
    for (index, module) in app.selector.modules().iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" │ "));
        }
        let is_hovered = index == app.selector.hovered();
        let is_current = index == app.selector.current();

        let label = if is_current {
            format!("[{}]", module.name())
        } else {
            format!(" {} ", module.name())
        };
        let mut style = Style::default();
        if is_current {
            style = style.fg(theme.module_current).add_modifier(Modifier::BOLD);
        }
        if is_hovered && app.mode_kind() == ModeKind::Browsing {
            style = style
                .bg(theme.module_hovered_bg)
                .fg(theme.module_hovered_fg);
        }
        spans.push(Span::styled(label, style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn row_label(app: &App, theme: &Theme, row: &TreeRow) -> Line<'static> {
    let indent = " ".repeat(row.depth * 2);
    match row.status {
        Some(initial) => {
            let status = app.effective_status(&row.key, initial);
            Line::from(vec![
                Span::raw(format!("{}  ", indent)),
                Span::styled(
                    status.glyph().to_string(),
                    Style::default().fg(theme.status_color(status)),
                ),
                Span::raw(" "),
                Span::styled(row.label.clone(), Style::default().fg(theme.tree_connection)),
            ])
        }
        None => {
            let marker = match (row.has_children, row.is_expanded) {
                (true, true) => "▼",
                (true, false) => "▶",
                (false, _) => "·",
            };
            let color = if row.depth == 0 {
                theme.tree_project
            } else {
                theme.tree_environment
            };
            Line::from(vec![
                Span::raw(format!("{}{} ", indent, marker)),
                Span::styled(row.label.clone(), Style::default().fg(color)),
            ])
        }
    }
}

fn draw_tree(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let in_tree = app.mode_kind() == ModeKind::TreeNavigating;
    let Some(module) = app.displayed_module() else {
        let block = panel().title(" Projects ");
        frame.render_widget(Paragraph::new("No modules").block(block), area);
        return;
    };

    let cursor = app.mode().visible_navigator().map(|nav| nav.cursor());
    let view = build_view_model(module, cursor.as_ref(), app.provider(), &app.expansion);

    let block = panel()
        .title(format!(" {} ", module.display_name()))
        .border_style(border_style(theme, in_tree));

    if view.rows.is_empty() {
        let paragraph = Paragraph::new("No projects")
            .block(block)
            .style(Style::default().fg(theme.panel_title));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| ListItem::new(row_label(app, theme, row)))
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(theme.tree_selected_bg)
            .fg(theme.tree_selected_fg)
            .add_modifier(Modifier::BOLD),
    );

    let mut list_state = ListState::default();
    list_state.select(view.cursor_position);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn status_line(theme: &Theme, status: ConnectionStatus, suffix: String) -> Line<'static> {
    Line::from(vec![
        Span::raw("Status: "),
        Span::styled(
            status.label().to_string(),
            Style::default().fg(theme.status_color(status)),
        ),
        Span::raw(suffix),
    ])
}

fn module_summary(app: &App, theme: &Theme, module: ModuleKind) -> Vec<Line<'static>> {
    let profile = module.profile();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} connection settings", module.display_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(module.description().to_string()),
        Line::from(""),
        Line::from(format!("Host: {}", profile.host)),
        Line::from(format!("Port: {}", profile.port)),
    ];
    if let Some(database) = profile.database {
        lines.push(Line::from(format!("Database: {}", database)));
    }
    if let Some(user) = profile.user {
        lines.push(Line::from(format!("User: {}", user)));
    }
    lines.push(Line::from(format!("Auth: {}", profile.auth.label())));
    lines.push(Line::from(""));

    let connections = app.module_connections(module);
    let connected = connections
        .iter()
        .filter(|(key, c)| app.effective_status(key, c.status) == ConnectionStatus::Connected)
        .count();
    lines.push(status_line(
        theme,
        app.module_status(module),
        format!(" ({}/{})", connected, connections.len()),
    ));
    lines.push(Line::from(""));

    lines.push(Line::from("Available connections:"));
    lines.extend(
        connections
            .iter()
            .map(|(_, c)| Line::from(format!("• {} ({})", c.name, c.endpoint))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from("Press Enter to browse"));
    lines
}

fn details_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    let Some(module) = app.displayed_module() else {
        return vec![Line::from("No module selected")];
    };
    let provider = app.provider();

    let Some(nav) = app.mode().visible_navigator() else {
        return module_summary(app, theme, module);
    };

    let cursor = nav.cursor();
    let key = nav.highlighted_key();
    match cursor.level {
        Level::Project => {
            let name = provider
                .list_projects(module)
                .into_iter()
                .nth(cursor.project)
                .map(|p| p.name)
                .unwrap_or_default();
            let environments = provider.list_environments(module, cursor.project).len();
            vec![
                Line::from(format!("Project: {}", name)),
                Line::from(format!("Environments: {}", environments)),
            ]
        }
        Level::Environment => {
            let name = provider
                .list_environments(module, cursor.project)
                .into_iter()
                .nth(cursor.environment)
                .map(|e| e.name)
                .unwrap_or_default();
            let connections = provider
                .list_connections(module, cursor.project, cursor.environment)
                .len();
            vec![
                Line::from(format!("Environment: {}", name)),
                Line::from(format!("Connections: {}", connections)),
            ]
        }
        Level::Connection => {
            let Some(connection) = app.connection_at(&key) else {
                return vec![Line::from("No connection")];
            };
            let status = app.effective_status(&key, connection.status);
            let mut lines = vec![
                Line::from(format!("Connection: {}", connection.name)),
                Line::from(format!("Host: {}", connection.host())),
            ];
            if let Some(port) = connection.port() {
                lines.push(Line::from(format!("Port: {}", port)));
            }
            if let Some(database) = &connection.database {
                lines.push(Line::from(format!("Database: {}", database)));
            }
            if let Some(user) = &connection.user {
                lines.push(Line::from(format!("User: {}", user)));
            }
            lines.push(Line::from(format!("Auth: {}", connection.auth.label())));
            lines.push(status_line(theme, status, String::new()));
            if let Some(entry) = app.status_board.get(&key) {
                lines.push(Line::from(format!(
                    "Changed: {}",
                    entry.changed_at.format("%Y-%m-%d %H:%M:%S")
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Enter: connect / disconnect"));
            lines
        }
    }
}

fn draw_details(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = panel()
        .title(" Details ")
        .border_style(border_style(theme, false));
    let paragraph = Paragraph::new(details_lines(app, theme))
        .block(block)
        .style(Style::default().fg(theme.text_default));
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let message = if app.pending_activations() > 0 {
        format!("Working ({})... | {}", app.pending_activations(), app.ui.status_message)
    } else {
        app.ui.status_message.clone()
    };
    let module = app
        .selector
        .current_module()
        .map_or("-", |module| module.display_name());

    let help_text = match app.mode_kind() {
        ModeKind::Browsing => "←→/H/L: Select module | Enter: Open | q: Quit",
        ModeKind::TreeNavigating => {
            "↑↓: Move | →: Expand | ←: Collapse | Space: Toggle | Enter: Connect | Esc: Back"
        }
        ModeKind::ConfirmPending => "y: Quit | n: Stay",
    };

    let status_line = Line::from(vec![
        Span::styled(
            format!("Mode: {}", app.mode_kind()),
            Style::default().fg(theme.status_bar_mode),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Module: {}", module),
            Style::default().fg(theme.status_bar_module),
        ),
        Span::raw(" | "),
        Span::styled(message, Style::default().fg(theme.status_bar_fg)),
    ]);

    let block = panel().title_bottom(
        Line::from(Span::styled(
            format!(" {} ", help_text),
            Style::default().fg(theme.status_help_text),
        ))
        .right_aligned(),
    );
    let paragraph = Paragraph::new(status_line)
        .block(block)
        .style(Style::default().bg(theme.status_bar_bg));

    frame.render_widget(paragraph, area);
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_confirm_dialog(frame: &mut Frame, app: &App, theme: &Theme) {
    let layout = &app.config.layout;
    let area = centered_rect(layout.confirm_width, layout.confirm_height, frame.area());

    let block = panel()
        .title(" Confirm Exit ")
        .border_style(Style::default().fg(theme.confirm_border));

    let keys = &app.config.keybindings;
    let text = vec![
        Line::from(""),
        Line::from("Are you sure you want to exit?"),
        Line::from(""),
        Line::from(format!(
            "Yes ({}) / No ({})",
            keys.confirm.to_ascii_uppercase(),
            keys.cancel.to_ascii_uppercase()
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.confirm_text));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 30);
        let rect = centered_rect(40, 7, area);
        assert_eq!(rect, Rect::new(30, 11, 40, 7));
    }

    #[test]
    fn test_centered_rect_shrinks_on_small_terminals() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_rect(40, 7, area);
        assert_eq!(rect, Rect::new(0, 0, 20, 5));
    }
}
