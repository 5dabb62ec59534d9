use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::Path;
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use connection_manager::app::App;
use connection_manager::async_task::{self, Task, TaskResult};
use connection_manager::cli::{Cli, Commands};
use connection_manager::config::Config;
use connection_manager::error::{ConnectionManagerError, Result};
use connection_manager::main_lib::{self, ExecuteOptions, RestoreGuard};
use connection_manager::screenshot;
use connection_manager::snapshot::StateSnapshot;
use connection_manager::test_runner::TestRunner;
use connection_manager::{event, ui};

const LOG_ENV_VAR: &str = "CONNECTION_MANAGER_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    // The TUI owns stdout, so logs only go to a file when asked for
    if let Ok(log_file) = std::env::var(LOG_ENV_VAR) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(log::LevelFilter::Debug)
            .init();

        log::info!("Connection manager starting up");
    }

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_interactive(config).await,
        Commands::Screenshot {
            state,
            output,
            width,
            height,
        } => screenshot::generate_screenshot(&state, output.as_deref(), width, height, config),
        Commands::Execute {
            state,
            command,
            output,
            screenshot,
            width,
            height,
        } => main_lib::execute_command(
            &state,
            &command,
            ExecuteOptions {
                output_path: output.as_deref(),
                screenshot,
                width,
                height,
            },
            config,
        ),
        Commands::SaveState { output } => main_lib::save_current_state(output.as_deref(), config),
        Commands::Test {
            script,
            state,
            settle_timeout,
            overwrite,
            verbose,
        } => {
            run_headless_test(
                &script,
                state.as_deref(),
                settle_timeout,
                overwrite,
                verbose,
                config,
            )
            .await
        }
    }
}

async fn run_headless_test(
    script_path: &Path,
    state_path: Option<&Path>,
    settle_timeout: u64,
    overwrite: bool,
    verbose: bool,
    config: Config,
) -> Result<()> {
    if verbose && std::env::var(LOG_ENV_VAR).is_err() {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    log::info!("🧪 Starting headless test run");
    log::info!("🧪 Script: {}", script_path.display());

    let delay = Duration::from_millis(config.ui.activation_delay_ms);
    let mut app = match state_path {
        Some(path) => {
            log::info!("🧪 State: {}", path.display());
            App::from_snapshot(&StateSnapshot::load_from_file(path)?, config)
        }
        None => App::new(config),
    };

    let (task_sender, task_receiver) = mpsc::channel::<Task>(32);
    let (result_sender, result_receiver) = mpsc::channel::<TaskResult>(32);
    let cancel = CancellationToken::new();
    let worker_handle = tokio::spawn(async_task::run_worker(
        task_receiver,
        result_sender,
        delay,
        cancel.clone(),
    ));

    let mut test_runner = TestRunner::from_file(script_path)?;
    test_runner.max_settle_time = Duration::from_secs(settle_timeout);
    test_runner.overwrite_mode = overwrite;

    let test_result = test_runner
        .run(&mut app, &task_sender, result_receiver)
        .await;

    cancel.cancel();
    let _ = worker_handle.await;

    let test_result = test_result?;
    test_result.print_summary();

    if test_result.success {
        log::info!("🧪 Test completed successfully");
        Ok(())
    } else {
        log::error!("🧪 Test failed");
        Err(ConnectionManagerError::from("Test failed"))
    }
}

async fn run_interactive(config: Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let delay = Duration::from_millis(config.ui.activation_delay_ms);
    let mut app = App::new(config);

    enable_raw_mode()?;
    let guard = RestoreGuard::new(|| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    });
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (task_sender, task_receiver) = mpsc::channel::<Task>(32);
    let (result_sender, mut result_receiver) = mpsc::channel::<TaskResult>(32);
    let cancel = CancellationToken::new();
    let worker_handle = tokio::spawn(async_task::run_worker(
        task_receiver,
        result_sender,
        delay,
        cancel.clone(),
    ));

    let outcome = event_loop(
        &mut terminal,
        &mut app,
        &task_sender,
        &mut result_receiver,
        tick_rate,
    );

    cancel.cancel();
    let _ = worker_handle.await;

    // Restore the terminal even when the loop failed
    guard.disarm();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_sender: &mpsc::Sender<Task>,
    result_receiver: &mut mpsc::Receiver<TaskResult>,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        if app.ui.force_redraw {
            terminal.clear()?;
            app.ui.force_redraw = false;
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            if let Err(e) = event::handle_event(event, app, task_sender) {
                app.ui.status_message = format!("Error handling event: {}", e);
            }
        }

        while let Ok(result) = result_receiver.try_recv() {
            log::debug!("📨 main: Received task result: {:?}", result);
            main_lib::handle_task_result(app, result);
        }

        if app.should_quit {
            log::info!("Exiting");
            return Ok(());
        }
    }
}
