use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "connection-manager")]
#[command(about = "A keyboard-driven TUI for browsing SSH, database and cache connections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run,
    /// Render a saved state snapshot as text
    Screenshot {
        /// Path to the JSON state snapshot
        #[arg(short, long)]
        state: PathBuf,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Terminal width for rendering
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Apply a command to a state snapshot and output the result
    Execute {
        /// Path to the JSON state snapshot
        #[arg(short, long)]
        state: PathBuf,
        /// Command to execute (e.g., "hover_next", "down", "sequence:[commit,expand]")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also generate a screenshot of the result
        #[arg(long)]
        screenshot: bool,
        /// Terminal width for screenshot (if enabled)
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for screenshot (if enabled)
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Save the initial state as a JSON snapshot without running the TUI
    SaveState {
        /// Output file for the snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a headless key script with assertions
    Test {
        /// Path to the script file
        #[arg(short = 'f', long)]
        script: PathBuf,
        /// Start from this JSON state snapshot
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Seconds to wait for activations to settle
        #[arg(long, default_value = "5")]
        settle_timeout: u64,
        /// Write screenshots instead of comparing them
        #[arg(long)]
        overwrite: bool,
        /// Log to stderr
        #[arg(short, long)]
        verbose: bool,
    },
}
