use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::app::App;
use crate::async_task::Task;
use crate::event::EventResult;

pub fn handle_tree_event(
    key: KeyEvent,
    app: &mut App,
    task_sender: &mpsc::Sender<Task>,
) -> EventResult {
    let quit = app.config.keybindings.quit;
    let handled = match key.code {
        KeyCode::Up | KeyCode::Char('k' | 'K') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j' | 'J') => app.move_down(),
        KeyCode::Right | KeyCode::Char('l' | 'L') => app.expand(),
        KeyCode::Left | KeyCode::Char('h' | 'H') => app.collapse(),
        KeyCode::Char(' ') => app.toggle(),
        KeyCode::Enter => match app.activate() {
            Some(request) => {
                let key = request.key.clone();
                if let Err(e) = task_sender.try_send(Task::from(request)) {
                    log::error!("Failed to queue activation for {}: {}", key, e);
                    app.fail_activation(&key, &format!("could not queue activation: {}", e));
                }
                true
            }
            None => false,
        },
        KeyCode::Esc => app.exit_tree(),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&quit) => app.request_quit(),
        _ => false,
    };
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::expansion::NodeKey;
    use crate::catalog::ModuleKind;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tree_app() -> App {
        let mut app = App::new(Config::default());
        app.commit_module();
        app
    }

    #[test]
    fn test_space_toggles_without_moving() {
        let mut app = tree_app();
        let (sender, _rx) = mpsc::channel(1);
        assert!(handle_tree_event(key(KeyCode::Char(' ')), &mut app, &sender).unwrap());
        assert!(app.expansion.get(&NodeKey::project(ModuleKind::Ssh, 0)));
        assert_eq!(app.navigator().unwrap().cursor().index(), 0);
    }

    #[test]
    fn test_shifted_letters_navigate_and_quit() {
        let mut app = tree_app();
        let (sender, _rx) = mpsc::channel(1);
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);

        assert!(handle_tree_event(shifted('L'), &mut app, &sender).unwrap());
        assert_eq!(app.navigator().unwrap().level(), crate::navigator::Level::Environment);
        assert!(handle_tree_event(shifted('J'), &mut app, &sender).unwrap());
        assert!(handle_tree_event(shifted('H'), &mut app, &sender).unwrap());
        assert_eq!(app.navigator().unwrap().level(), crate::navigator::Level::Project);

        assert!(handle_tree_event(shifted('Q'), &mut app, &sender).unwrap());
        assert!(app.mode().is_confirm_pending());
    }

    #[test]
    fn test_enter_above_connection_level_does_nothing() {
        let mut app = tree_app();
        let (sender, mut rx) = mpsc::channel(1);
        assert!(!handle_tree_event(key(KeyCode::Enter), &mut app, &sender).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_releases_the_connection() {
        let mut app = tree_app();
        let (sender, _rx) = mpsc::channel(1);
        sender
            .try_send(Task::Activate {
                key: NodeKey::connection(ModuleKind::Redis, 0, 0, 0),
                name: "filler".to_string(),
                current: crate::catalog::ConnectionStatus::Connected,
            })
            .unwrap();

        for code in [KeyCode::Right, KeyCode::Right, KeyCode::Enter] {
            handle_tree_event(key(code), &mut app, &sender).unwrap();
        }
        assert_eq!(app.pending_activations(), 0);
        assert!(app.ui.status_message.starts_with("Error"));
    }
}
