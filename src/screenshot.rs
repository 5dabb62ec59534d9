use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fs;
use std::path::Path;

use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::snapshot::StateSnapshot;
use crate::ui;

/// Render a saved snapshot and print it or write it to `output_path`
pub fn generate_screenshot(
    state_path: &Path,
    output_path: Option<&Path>,
    width: u16,
    height: u16,
    config: Config,
) -> Result<()> {
    let snapshot = StateSnapshot::load_from_file(state_path)?;
    let app = App::from_snapshot(&snapshot, config);
    let screenshot = render_to_string(&app, width, height)?;

    match output_path {
        Some(path) => {
            fs::write(path, screenshot)?;
            println!("Screenshot saved to: {}", path.display());
        }
        None => print!("{}", screenshot),
    }

    Ok(())
}

/// Draw one frame of `app` on an off-screen buffer
pub fn render_to_string(app: &App, width: u16, height: u16) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|frame| ui::draw(frame, app))?;
    Ok(buffer_to_string(terminal.backend().buffer()))
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            let sym = buffer[(x, y)].symbol();
            // Empty cells become spaces to keep columns aligned
            if sym.is_empty() {
                result.push(' ');
            } else {
                result.push_str(sym);
            }
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use tempfile::TempDir;

    #[test]
    fn test_buffer_to_string() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 3, 2));
        buffer.set_string(0, 0, "ab", ratatui::style::Style::default());
        assert_eq!(buffer_to_string(&buffer), "ab \n   \n");
    }

    #[test]
    fn test_render_initial_app() {
        let app = App::new(Config::default());
        let text = render_to_string(&app, 100, 24).unwrap();
        assert!(text.contains("Modules"));
        assert!(text.contains("[SSH]"));
        assert!(text.contains("web-platform"));
        assert_eq!(text.lines().count(), 24);
    }

    #[test]
    fn test_generate_screenshot_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("state.json");
        let output = temp_dir.path().join("shot.txt");
        StateSnapshot::default().save_to_file(&state).unwrap();

        generate_screenshot(&state, Some(&output), 80, 20, Config::default()).unwrap();
        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("Details"));
    }
}
