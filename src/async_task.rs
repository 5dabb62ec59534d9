use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::ActivationRequest;
use crate::catalog::ConnectionStatus;
use crate::expansion::NodeKey;

#[derive(Debug, Clone)]
pub enum Task {
    Activate {
        key: NodeKey,
        name: String,
        current: ConnectionStatus,
    },
}

impl From<ActivationRequest> for Task {
    fn from(request: ActivationRequest) -> Self {
        Task::Activate {
            key: request.key,
            name: request.name,
            current: request.current,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TaskResult {
    StatusChanged {
        key: NodeKey,
        status: ConnectionStatus,
    },
    Error {
        key: NodeKey,
        message: String,
    },
}

/// Status a connection ends up in after being activated
pub fn next_status(current: ConnectionStatus) -> ConnectionStatus {
    match current {
        ConnectionStatus::Connected => ConnectionStatus::Disconnected,
        ConnectionStatus::Disconnected => ConnectionStatus::Connected,
        ConnectionStatus::Connecting => ConnectionStatus::Disconnected,
    }
}

/// Process activation requests until cancelled or either channel closes.
/// Nothing is dialled; the transition is simulated after `delay`.
pub async fn run_worker(
    mut task_receiver: mpsc::Receiver<Task>,
    result_sender: mpsc::Sender<TaskResult>,
    delay: Duration,
    cancel: CancellationToken,
) {
    log::debug!("Activation worker started");
    loop {
        let task = tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("Activation worker cancelled");
                break;
            }
            task = task_receiver.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };

        let result = match task {
            Task::Activate { key, name, .. } if key.depth() != 2 => TaskResult::Error {
                message: format!("{} ({}) is not a connection", name, key),
                key,
            },
            Task::Activate { key, name, current } => {
                log::info!("Activating {} ({}) from {}", name, key, current.label());
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
                TaskResult::StatusChanged {
                    key,
                    status: next_status(current),
                }
            }
        };

        if result_sender.send(result).await.is_err() {
            // Receiver dropped, nobody is listening any more
            break;
        }
    }
    log::debug!("Activation worker stopped");
}
