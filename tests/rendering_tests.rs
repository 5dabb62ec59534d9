use connection_manager::app::App;
use connection_manager::catalog::{ConnectionStatus, ModuleKind};
use connection_manager::config::Config;
use connection_manager::expansion::NodeKey;
use connection_manager::screenshot::{buffer_to_string, render_to_string};
use connection_manager::ui;
use ratatui::{backend::TestBackend, Terminal};

const WIDTH: u16 = 120;
const HEIGHT: u16 = 30;

fn render(app: &App) -> String {
    render_to_string(app, WIDTH, HEIGHT).expect("render failed")
}

/// Browse into MySQL and stand on the first connection of orders/production
fn app_on_first_mysql_connection() -> App {
    let mut app = App::new(Config::default());
    app.hover_next();
    app.commit_module();
    app.expand();
    app.expand();
    app
}

#[test]
fn test_initial_screen() {
    let app = App::new(Config::default());
    let screen = render(&app);

    assert!(screen.contains(" Modules "));
    assert!(screen.contains("[SSH]"));
    assert!(screen.contains("MySQL"));
    assert!(screen.contains("PostgreSQL"));
    assert!(screen.contains("Redis"));
    assert!(screen.contains("Ready"));
    assert!(screen.contains("q: Quit"));
    assert!(!screen.contains("Confirm Exit"));
}

#[test]
fn test_tree_shows_open_ancestors() {
    let app = app_on_first_mysql_connection();
    let screen = render(&app);

    assert!(screen.contains("[MySQL]"));
    assert!(screen.contains("▼ orders"));
    assert!(screen.contains("▼ production"));
    assert!(screen.contains("MySQL-DB-01"));
    assert!(screen.contains("MySQL-DB-02"));
    assert!(screen.contains("▶ billing"));
    assert!(screen.contains("Esc: Back"));
}

#[test]
fn test_connection_details_pane() {
    let app = app_on_first_mysql_connection();
    let screen = render(&app);

    assert!(screen.contains(" Details "));
    assert!(screen.contains("Connection: MySQL-DB-01"));
    assert!(screen.contains("Host: localhost"));
    assert!(screen.contains("Port: 3306"));
    assert!(screen.contains("Database: myapp"));
    assert!(screen.contains("User: root"));
    assert!(screen.contains("Auth: password"));
    assert!(screen.contains("Status: disconnected"));
    assert!(!screen.contains("Changed:"));
}

#[test]
fn test_connection_details_show_overrides() {
    let mut app = App::new(Config::default());
    for _ in 0..3 {
        app.hover_next();
    }
    app.commit_module();
    app.expand();
    app.expand();
    let screen = render(&app);

    assert!(screen.contains("Connection: Redis-Session"));
    assert!(screen.contains("Database: 1"));
    assert!(screen.contains("Auth: password"));
    assert!(!screen.contains("User:"));
}

#[test]
fn test_module_summary_in_browsing() {
    let app = App::new(Config::default());
    let screen = render(&app);

    assert!(screen.contains("SSH connection settings"));
    assert!(screen.contains("Host: example.com"));
    assert!(screen.contains("Port: 22"));
    assert!(screen.contains("User: user"));
    assert!(screen.contains("Auth: key"));
    assert!(!screen.contains("Database:"));
    assert!(screen.contains("Available connections:"));
    assert!(screen.contains("SSH-Server-01 (192.168.1.10:22)"));
    assert!(screen.contains("jump-host"));
    assert!(screen.contains("Press Enter to browse"));
}

#[test]
fn test_module_summary_after_leaving_tree() {
    let mut app = App::new(Config::default());
    app.hover_next();
    app.hover_next();
    app.commit_module();
    app.exit_tree();
    let screen = render(&app);

    assert!(screen.contains("PostgreSQL connection settings"));
    assert!(screen.contains("Port: 5432"));
    assert!(screen.contains("Database: postgres"));
    assert!(screen.contains("Status: connecting (0/2)"));
}

#[test]
fn test_status_bar_shows_mode_and_module() {
    let mut app = App::new(Config::default());
    let screen = render(&app);
    assert!(screen.contains("Mode: Browsing | Module: SSH | Ready"));

    // hovering alone does not change the committed module
    app.hover_next();
    assert!(render(&app).contains("Module: SSH"));

    app.commit_module();
    let screen = render(&app);
    assert!(screen.contains("Mode: TreeNavigating | Module: MySQL"));

    app.request_quit();
    assert!(render(&app).contains("Mode: ConfirmPending | Module: MySQL"));
}

#[test]
fn test_panels_use_double_borders() {
    let app = App::new(Config::default());
    let screen = render(&app);

    for glyph in ['╔', '╗', '╚', '╝', '═', '║'] {
        assert!(screen.contains(glyph), "missing border glyph {}", glyph);
    }
    assert!(!screen.contains('┌'));
}

#[test]
fn test_status_change_is_rendered() {
    let mut app = app_on_first_mysql_connection();
    let request = app.activate().unwrap();
    let working = render(&app);
    assert!(working.contains("Working (1)"));
    assert!(working.contains("Connecting to MySQL-DB-01..."));

    app.complete_activation(request.key, ConnectionStatus::Connected);
    let screen = render(&app);
    assert!(screen.contains("Status: connected"));
    assert!(screen.contains("Changed:"));
    assert!(screen.contains("MySQL-DB-01 is now connected"));
}

#[test]
fn test_status_glyphs_in_reporting_environment() {
    let mut app = App::new(Config::default());
    app.hover_next();
    app.commit_module();
    app.move_down();
    app.move_down();
    app.expand();
    app.expand();
    let screen = render(&app);

    for status in [
        ConnectionStatus::Connected,
        ConnectionStatus::Disconnected,
        ConnectionStatus::Connecting,
    ] {
        assert!(
            screen.contains(status.glyph()),
            "missing glyph for {}",
            status.label()
        );
    }
    assert!(screen.contains("report-replica-c"));
}

#[test]
fn test_confirm_dialog_overlays_tree() {
    let mut app = app_on_first_mysql_connection();
    app.request_quit();
    let screen = render(&app);

    assert!(screen.contains("Confirm Exit"));
    assert!(screen.contains("Are you sure you want to exit?"));
    assert!(screen.contains("Yes (Y) / No (N)"));
    assert!(screen.contains("y: Quit | n: Stay"));
    // the parked tree stays visible behind the dialog
    assert!(screen.contains("orders"));
}

#[test]
fn test_confirm_dialog_uses_configured_keys() {
    let mut config = Config::default();
    config.keybindings.confirm = 'o';
    config.keybindings.cancel = 'c';
    let mut app = App::new(config);
    app.request_quit();

    assert!(render(&app).contains("Yes (O) / No (C)"));
}

#[test]
fn test_expansion_flag_survives_tree_exit() {
    let mut app = App::new(Config::default());
    app.commit_module();
    app.toggle();
    app.exit_tree();
    assert!(app.expansion.get(&NodeKey::project(ModuleKind::Ssh, 0)));

    let screen = render(&app);
    assert!(screen.contains("Select a module"));
    assert!(screen.contains("web-platform"));
}

#[test]
fn test_small_terminal_does_not_panic() {
    let mut app = app_on_first_mysql_connection();
    app.request_quit();

    let backend = TestBackend::new(20, 6);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| ui::draw(frame, &app)).unwrap();

    let text = buffer_to_string(terminal.backend().buffer());
    assert_eq!(text.lines().count(), 6);
}
