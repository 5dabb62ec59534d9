// Library module containing testable functions from main.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::App;
use crate::async_task::TaskResult;
use crate::command::Command;
use crate::config::Config;
use crate::error::{ConnectionManagerError, Result};
use crate::executor::Executor;
use crate::snapshot::StateSnapshot;

pub fn handle_task_result(app: &mut App, result: TaskResult) {
    match result {
        TaskResult::StatusChanged { key, status } => {
            log::info!("{} is now {}", key, status.label());
            app.complete_activation(key, status);
        }
        TaskResult::Error { key, message } => {
            log::error!("Activation of {} failed: {}", key, message);
            app.fail_activation(&key, &message);
        }
    }
}

/// Runs `restore` when dropped unless disarmed first. Armed right after
/// raw mode is enabled so a failed setup step still gives the terminal back.
pub struct RestoreGuard<F: FnOnce()> {
    restore: Option<F>,
}

impl<F: FnOnce()> RestoreGuard<F> {
    pub fn new(restore: F) -> Self {
        Self {
            restore: Some(restore),
        }
    }

    pub fn disarm(mut self) {
        self.restore = None;
    }
}

impl<F: FnOnce()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

pub struct ExecuteOptions<'a> {
    pub output_path: Option<&'a Path>,
    pub screenshot: bool,
    pub width: u16,
    pub height: u16,
}

pub fn execute_command(
    state_path: &Path,
    command_str: &str,
    options: ExecuteOptions<'_>,
    config: Config,
) -> Result<()> {
    let snapshot = StateSnapshot::load_from_file(state_path)?;
    let command = Command::from_string(command_str).map_err(ConnectionManagerError::Generic)?;

    let result = Executor::execute(&snapshot, command, config.clone());
    let result_json = serde_json::to_string_pretty(&result.snapshot)?;

    match options.output_path {
        Some(path) => {
            fs::write(path, &result_json)?;
            println!("Result saved to: {}", path.display());
        }
        None => println!("{}", result_json),
    }

    if let Some(status) = &result.status_message {
        eprintln!("Status: {}", status);
    }
    if result.should_quit {
        eprintln!("Command resulted in quit");
    }

    if options.screenshot {
        let screenshot_path = screenshot_path_for(options.output_path);
        let app = App::from_snapshot(&result.snapshot, config);
        let screenshot = crate::screenshot::render_to_string(&app, options.width, options.height)?;
        fs::write(&screenshot_path, screenshot)?;
        eprintln!("Screenshot saved to: {}", screenshot_path.display());
    }

    Ok(())
}

fn screenshot_path_for(output_path: Option<&Path>) -> PathBuf {
    match output_path {
        Some(path) => path.with_extension("screenshot.txt"),
        None => PathBuf::from("command_result_screenshot.txt"),
    }
}

pub fn save_current_state(output_path: Option<&Path>, config: Config) -> Result<()> {
    let app = App::new(config);
    let snapshot = StateSnapshot::from_app(&app);
    let json = serde_json::to_string_pretty(&snapshot)?;

    match output_path {
        Some(path) => {
            fs::write(path, &json)?;
            println!("Current state saved to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
