use crate::app::App;
use crate::async_task::next_status;
use crate::command::Command;
use crate::config::Config;
use crate::snapshot::StateSnapshot;

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub snapshot: StateSnapshot,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

/// Executes commands against saved snapshots
pub struct Executor;

impl Executor {
    /// Execute a command against a snapshot and return the resulting state
    pub fn execute(snapshot: &StateSnapshot, command: Command, config: Config) -> ExecutionResult {
        let mut app = App::from_snapshot(snapshot, config);
        let message_before = app.ui.status_message.clone();

        Self::apply(&mut app, &command);

        let status_message =
            (app.ui.status_message != message_before).then(|| app.ui.status_message.clone());
        ExecutionResult {
            snapshot: StateSnapshot::from_app(&app),
            status_message,
            should_quit: app.should_quit,
        }
    }

    /// Apply one command to a live app. Activations complete immediately.
    /// Returns whether anything changed.
    pub fn apply(app: &mut App, command: &Command) -> bool {
        match command {
            Command::HoverPrevious => app.hover_previous(),
            Command::HoverNext => app.hover_next(),
            Command::Commit => app.commit_module(),
            Command::MoveUp => app.move_up(),
            Command::MoveDown => app.move_down(),
            Command::Expand => app.expand(),
            Command::Collapse => app.collapse(),
            Command::Toggle => app.toggle(),
            Command::Activate => match app.activate() {
                Some(request) => {
                    app.complete_activation(request.key, next_status(request.current));
                    true
                }
                None => false,
            },
            Command::ExitTree => app.exit_tree(),
            Command::Quit => app.request_quit(),
            Command::Confirm => app.confirm_quit(),
            Command::Cancel => app.cancel_quit(),
            Command::Sequence(commands) => commands
                .iter()
                .fold(false, |changed, command| Self::apply(app, command) || changed),
        }
    }
}
