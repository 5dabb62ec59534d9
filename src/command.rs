use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic user actions, independent of the keys bound to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Module bar
    HoverPrevious,
    HoverNext,
    Commit,

    // Tree
    MoveUp,
    MoveDown,
    Expand,
    Collapse,
    Toggle,
    Activate,
    ExitTree,

    // Quit confirmation
    Quit,
    Confirm,
    Cancel,

    // Multi-step commands for testing
    Sequence(Vec<Command>),
}

impl Command {
    /// Parse a command from a string representation
    pub fn from_string(s: &str) -> Result<Self, String> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "hover_previous" | "prev_module" => Ok(Command::HoverPrevious),
            "hover_next" | "next_module" => Ok(Command::HoverNext),
            "commit" | "open" => Ok(Command::Commit),

            "move_up" | "up" => Ok(Command::MoveUp),
            "move_down" | "down" => Ok(Command::MoveDown),
            "expand" | "right" => Ok(Command::Expand),
            "collapse" | "left" => Ok(Command::Collapse),
            "toggle" | "space" => Ok(Command::Toggle),
            "activate" | "connect" => Ok(Command::Activate),
            "exit_tree" | "back" => Ok(Command::ExitTree),

            "quit" | "q" => Ok(Command::Quit),
            "confirm" | "y" => Ok(Command::Confirm),
            "cancel" | "n" => Ok(Command::Cancel),

            _ => {
                if let Some(inner) = s
                    .strip_prefix("sequence:[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    if inner.trim().is_empty() {
                        return Ok(Command::Sequence(vec![]));
                    }
                    let commands = inner
                        .split(',')
                        .map(|part| {
                            Command::from_string(part).map_err(|e| {
                                format!("Invalid command in sequence '{}': {}", part.trim(), e)
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Command::Sequence(commands));
                }

                Err(format!("Unknown command: {}", s))
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::HoverPrevious => "hover_previous",
            Command::HoverNext => "hover_next",
            Command::Commit => "commit",
            Command::MoveUp => "move_up",
            Command::MoveDown => "move_down",
            Command::Expand => "expand",
            Command::Collapse => "collapse",
            Command::Toggle => "toggle",
            Command::Activate => "activate",
            Command::ExitTree => "exit_tree",
            Command::Quit => "quit",
            Command::Confirm => "confirm",
            Command::Cancel => "cancel",
            Command::Sequence(commands) => {
                let inner = commands
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                return write!(f, "sequence:[{}]", inner);
            }
        };
        f.write_str(name)
    }
}
