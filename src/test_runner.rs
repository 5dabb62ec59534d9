use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::app::App;
use crate::async_task::{Task, TaskResult};
use crate::catalog::ModuleKind;
use crate::error::{ConnectionManagerError, Result};
use crate::event::handle_event;
use crate::expansion::NodeKey;
use crate::mode::ModeKind;
use crate::navigator::Level;

/// Headless key scripts.
///
/// Each line is one command:
/// - `key:<keyname>` - Send a key event (e.g., `key:enter`, `key:left`, `key:q`)
/// - `char:<c>` - Send a character
/// - `wait` - Wait until no activation is in flight
/// - `wait:<ms>` - Sleep for a fixed time
/// - `assert:<property>:<value>` - Assert application state
/// - `screenshot:<file>` - Compare the rendered frame with a file
/// - `immediate` / `settle_mode` - Stop / resume settling after each command
/// - `# comment` - Ignored
///
/// ```text
/// key:right
/// key:enter
/// assert:mode:TreeNavigating
/// assert:current_module:MySQL
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCommand {
    pub command_type: CommandType,
    pub value: String,
    pub immediate: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandType {
    Key,
    Char,
    Wait,
    Assert,
    Screenshot,
}

#[derive(Debug, Clone)]
pub struct TestScript {
    pub commands: Vec<TestCommand>,
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    pub script: TestScript,
    pub max_settle_time: Duration,
    pub overwrite_mode: bool,
    pub screenshot_base_dir: Option<PathBuf>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    pub fn new() -> Self {
        TestRunner {
            script: TestScript {
                commands: Vec::new(),
            },
            max_settle_time: Duration::from_secs(5),
            overwrite_mode: false,
            screenshot_base_dir: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut runner = Self::from_string(&content)?;
        runner.screenshot_base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(runner)
    }

    pub fn from_string(content: &str) -> Result<Self> {
        let mut commands = Vec::new();
        let mut immediate_mode = false;

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "immediate" {
                immediate_mode = true;
                continue;
            }
            if line == "settle_mode" {
                immediate_mode = false;
                continue;
            }

            let (command_type, value, immediate) = if let Some(key) = line.strip_prefix("key:") {
                (CommandType::Key, key, immediate_mode)
            } else if let Some(c) = line.strip_prefix("char:") {
                (CommandType::Char, c, immediate_mode)
            } else if line == "wait" || line == "settle" {
                // Wait commands always wait
                (CommandType::Wait, "", false)
            } else if let Some(ms) = line.strip_prefix("wait:") {
                (CommandType::Wait, ms, false)
            } else if let Some(assertion) = line.strip_prefix("assert:") {
                (CommandType::Assert, assertion, immediate_mode)
            } else if let Some(file) = line.strip_prefix("screenshot:") {
                (CommandType::Screenshot, file, immediate_mode)
            } else {
                return Err(ConnectionManagerError::Script {
                    line: line_number,
                    message: format!("Invalid command: {}", line),
                });
            };

            commands.push(TestCommand {
                command_type,
                value: value.to_string(),
                immediate,
                line: line_number,
            });
        }

        let mut runner = Self::new();
        runner.script.commands = commands;
        Ok(runner)
    }

    pub async fn run(
        &mut self,
        app: &mut App,
        task_sender: &mpsc::Sender<Task>,
        mut result_receiver: mpsc::Receiver<TaskResult>,
    ) -> Result<TestResult> {
        let start_time = Instant::now();
        let mut events_processed = 0;
        let mut assertions_passed = 0;
        let mut assertions_failed = 0;
        let mut errors = Vec::new();

        log::info!(
            "🧪 Starting test run with {} commands",
            self.script.commands.len()
        );

        for command in &self.script.commands {
            log::debug!("🧪 Line {}: {:?}", command.line, command.command_type);

            match command.command_type {
                CommandType::Key | CommandType::Char => {
                    let event = match command.command_type {
                        CommandType::Key => parse_key_event(&command.value),
                        _ => parse_char_event(&command.value),
                    }
                    .map_err(|message| ConnectionManagerError::Script {
                        line: command.line,
                        message,
                    })?;
                    match handle_event(event, app, task_sender) {
                        Ok(_) => events_processed += 1,
                        Err(e) => errors.push(format!("Line {}: key event failed: {}", command.line, e)),
                    }
                }
                CommandType::Wait => {
                    if command.value.is_empty() {
                        if let Err(e) = self.wait_for_settlement(app, &mut result_receiver).await {
                            errors.push(format!("Line {}: {}", command.line, e));
                        }
                    } else {
                        let ms: u64 = command.value.parse().map_err(|_| {
                            ConnectionManagerError::Script {
                                line: command.line,
                                message: format!("Invalid wait duration: {}", command.value),
                            }
                        })?;
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                        drain_results(app, &mut result_receiver);
                    }
                }
                CommandType::Assert => match evaluate_assertion(app, &command.value) {
                    Ok(true) => {
                        assertions_passed += 1;
                        log::debug!("🧪 Assertion passed: {}", command.value);
                    }
                    Ok(false) => {
                        assertions_failed += 1;
                        errors.push(format!(
                            "Line {}: assertion failed: {}",
                            command.line, command.value
                        ));
                    }
                    Err(e) => {
                        assertions_failed += 1;
                        errors.push(format!("Line {}: assertion error: {}", command.line, e));
                    }
                },
                CommandType::Screenshot => {
                    if let Err(e) = self.take_screenshot(app, &command.value) {
                        errors.push(format!("Line {}: {}", command.line, e));
                    }
                }
            }

            if !command.immediate && !matches!(command.command_type, CommandType::Wait) {
                if let Err(e) = self.wait_for_settlement(app, &mut result_receiver).await {
                    errors.push(format!("Line {}: {}", command.line, e));
                }
            }
        }

        let duration = start_time.elapsed();
        log::info!("🧪 Test run completed in {:?}", duration);

        let success = assertions_failed == 0 && errors.is_empty();
        Ok(TestResult {
            duration,
            events_processed,
            assertions_passed,
            assertions_failed,
            errors,
            success,
        })
    }

    async fn wait_for_settlement(
        &self,
        app: &mut App,
        result_receiver: &mut mpsc::Receiver<TaskResult>,
    ) -> std::result::Result<(), String> {
        let start = Instant::now();

        while app.pending_activations() > 0 && start.elapsed() < self.max_settle_time {
            match timeout(Duration::from_millis(10), result_receiver.recv()).await {
                Ok(Some(result)) => crate::main_lib::handle_task_result(app, result),
                Ok(None) => break, // worker gone
                Err(_) => {}
            }
        }
        drain_results(app, result_receiver);

        if app.pending_activations() > 0 {
            return Err(format!(
                "Settlement timeout: {} activations still pending",
                app.pending_activations()
            ));
        }
        Ok(())
    }

    fn take_screenshot(&self, app: &App, filename: &str) -> std::result::Result<(), String> {
        let content = crate::screenshot::render_to_string(app, 120, 30).map_err(|e| e.to_string())?;

        let final_path = match &self.screenshot_base_dir {
            Some(base_dir) => base_dir.join(filename),
            None => PathBuf::from(filename),
        };

        if self.overwrite_mode {
            std::fs::write(&final_path, content).map_err(|e| e.to_string())?;
            println!("📸 Screenshot saved to: {}", final_path.display());
            return Ok(());
        }

        match std::fs::read_to_string(&final_path) {
            Ok(existing) if existing == content => {
                println!("✅ Screenshot verification passed: {}", final_path.display());
                Ok(())
            }
            Ok(_) => Err(format!(
                "❌ Screenshot verification failed: {}. Content differs from expected. Use --overwrite to update.",
                final_path.display()
            )),
            Err(_) => Err(format!(
                "❌ Screenshot verification failed: {} does not exist. Use --overwrite to create.",
                final_path.display()
            )),
        }
    }
}

fn drain_results(app: &mut App, result_receiver: &mut mpsc::Receiver<TaskResult>) {
    while let Ok(result) = result_receiver.try_recv() {
        crate::main_lib::handle_task_result(app, result);
    }
}

pub fn parse_key_event(key_str: &str) -> std::result::Result<Event, String> {
    let key_code = match key_str.to_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "ctrl+l" => {
            return Ok(Event::Key(KeyEvent::new(
                KeyCode::Char('l'),
                KeyModifiers::CONTROL,
            )))
        }
        _ => {
            // Single characters keep their case so `key:Y` sends 'Y'
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(format!("Unknown key: {}", key_str)),
            }
        }
    };

    Ok(Event::Key(KeyEvent::new(key_code, KeyModifiers::NONE)))
}

fn parse_char_event(value: &str) -> std::result::Result<Event, String> {
    let c = value
        .chars()
        .next()
        .ok_or_else(|| "Empty character command".to_string())?;
    Ok(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
}

fn parse_bool(property: &str, value: &str) -> std::result::Result<bool, String> {
    value
        .parse::<bool>()
        .map_err(|_| format!("{} expects boolean value", property))
}

fn parse_index(property: &str, value: &str) -> std::result::Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{} expects numeric value", property))
}

pub fn evaluate_assertion(app: &App, assertion: &str) -> std::result::Result<bool, String> {
    let (property, expected) = assertion
        .split_once(':')
        .ok_or("Assertion must be in format 'property:value'")?;
    let cursor = app.mode().visible_navigator().map(|nav| nav.cursor());

    match property {
        "mode" => Ok(app.mode_kind() == expected.parse::<ModeKind>()?),
        "hovered_module" => {
            let expected = expected.parse::<ModuleKind>()?;
            Ok(app.selector.hovered_module() == Some(expected))
        }
        "current_module" => {
            let expected = expected.parse::<ModuleKind>()?;
            Ok(app.selector.current_module() == Some(expected))
        }
        "level" => match cursor {
            Some(cursor) => Ok(cursor.level == expected.parse::<Level>()?),
            None => Ok(expected == "none"),
        },
        "project" => Ok(cursor.map(|c| c.project) == Some(parse_index(property, expected)?)),
        "environment" => Ok(cursor
            .filter(|c| c.level >= Level::Environment)
            .map(|c| c.environment)
            == Some(parse_index(property, expected)?)),
        "connection" => Ok(cursor
            .filter(|c| c.level == Level::Connection)
            .map(|c| c.connection)
            == Some(parse_index(property, expected)?)),
        "expanded" => {
            // expanded:<module>:<path>:<bool>
            let (key, flag) = expected
                .rsplit_once(':')
                .ok_or("expanded expects '<node key>:<bool>'")?;
            let key = key.parse::<NodeKey>()?;
            Ok(app.expansion.get(&key) == parse_bool(property, flag)?)
        }
        "should_quit" => Ok(app.should_quit == parse_bool(property, expected)?),
        "status_contains" => Ok(app.ui.status_message.contains(expected)),
        "pending_activations" => {
            Ok(app.pending_activations() == parse_index(property, expected)?)
        }
        _ => Err(format!("Unknown assertion property: {}", property)),
    }
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub duration: Duration,
    pub events_processed: usize,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    pub errors: Vec<String>,
    pub success: bool,
}

impl TestResult {
    pub fn print_summary(&self) {
        println!("🧪 Test Results:");
        println!("   Duration: {:?}", self.duration);
        println!("   Events processed: {}", self.events_processed);
        println!("   Assertions passed: {}", self.assertions_passed);
        println!("   Assertions failed: {}", self.assertions_failed);

        if !self.errors.is_empty() {
            println!("   Errors:");
            for error in &self.errors {
                println!("     - {}", error);
            }
        }

        if self.success {
            println!("   Status: ✅ PASSED");
        } else {
            println!("   Status: ❌ FAILED");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parse_simple_script() {
        let content = r#"
# Test script
key:down
char:a
wait:100
assert:mode:Browsing
"#;

        let runner = TestRunner::from_string(content).unwrap();
        let commands = &runner.script.commands;
        assert_eq!(commands.len(), 4);

        assert!(matches!(commands[0].command_type, CommandType::Key));
        assert_eq!(commands[0].value, "down");
        assert_eq!(commands[0].line, 3);
        assert!(matches!(commands[1].command_type, CommandType::Char));
        assert!(matches!(commands[2].command_type, CommandType::Wait));
        assert_eq!(commands[2].value, "100");
        assert!(matches!(commands[3].command_type, CommandType::Assert));
        assert_eq!(commands[3].value, "mode:Browsing");
    }

    #[test]
    fn test_parse_immediate_mode() {
        let content = "key:down\nimmediate\nkey:up\nkey:down\nsettle_mode\nkey:enter\n";
        let runner = TestRunner::from_string(content).unwrap();
        let flags: Vec<bool> = runner.script.commands.iter().map(|c| c.immediate).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let err = TestRunner::from_string("key:down\nfly:away\n").unwrap_err();
        match err {
            ConnectionManagerError::Script { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_key_events() {
        assert!(matches!(
            parse_key_event("enter").unwrap(),
            Event::Key(KeyEvent { code: KeyCode::Enter, .. })
        ));
        assert!(matches!(
            parse_key_event("Y").unwrap(),
            Event::Key(KeyEvent { code: KeyCode::Char('Y'), .. })
        ));
        assert!(matches!(
            parse_key_event("ctrl+l").unwrap(),
            Event::Key(KeyEvent { code: KeyCode::Char('l'), modifiers: KeyModifiers::CONTROL, .. })
        ));
        assert!(parse_key_event("hyper").is_err());
    }

    #[test]
    fn test_assertion_evaluation() {
        let mut app = App::new(Config::default());
        app.hover_next();
        app.commit_module();
        app.expand();

        assert!(evaluate_assertion(&app, "mode:TreeNavigating").unwrap());
        assert!(evaluate_assertion(&app, "current_module:MySQL").unwrap());
        assert!(evaluate_assertion(&app, "level:Environment").unwrap());
        assert!(evaluate_assertion(&app, "project:0").unwrap());
        assert!(evaluate_assertion(&app, "environment:0").unwrap());
        assert!(!evaluate_assertion(&app, "connection:0").unwrap());
        assert!(evaluate_assertion(&app, "expanded:mysql:0:true").unwrap());
        assert!(evaluate_assertion(&app, "expanded:mysql:1:false").unwrap());
        assert!(evaluate_assertion(&app, "should_quit:false").unwrap());
        assert!(evaluate_assertion(&app, "pending_activations:0").unwrap());

        assert!(evaluate_assertion(&app, "mode:Sideways").is_err());
        assert!(evaluate_assertion(&app, "colour:blue").is_err());
        assert!(evaluate_assertion(&app, "nonsense").is_err());
    }

    #[tokio::test]
    async fn test_run_script_without_worker() {
        let mut app = App::new(Config::default());
        let (task_tx, _task_rx) = mpsc::channel(8);
        let (_result_tx, result_rx) = mpsc::channel(8);

        let mut runner = TestRunner::from_string(
            "key:l\nkey:enter\nkey:j\nassert:project:1\nkey:q\nassert:mode:ConfirmPending\nkey:n\nassert:level:Project\n",
        )
        .unwrap();
        let result = runner.run(&mut app, &task_tx, result_rx).await.unwrap();

        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.events_processed, 5);
        assert_eq!(result.assertions_passed, 3);
    }
}
