use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::catalog::{Catalog, Connection, ConnectionStatus, ModuleKind};
use crate::config::Config;
use crate::confirm::ConfirmationGate;
use crate::expansion::{ExpansionStore, NodeKey};
use crate::mode::{Mode, ModeKind, ResumeMode};
use crate::navigator::{HierarchyNavigator, NavOutcome, NavigatorEvent};
use crate::provider::DataProvider;
use crate::selector::ModuleSelector;
use crate::snapshot::StateSnapshot;
use crate::status::StatusBoard;

#[derive(Debug, Clone)]
pub struct UiState {
    pub status_message: String,
    pub force_redraw: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status_message: "Ready".to_string(),
            force_redraw: false,
        }
    }
}

/// A connection the user asked to connect or disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub key: NodeKey,
    pub name: String,
    pub current: ConnectionStatus,
}

/// The single owner of all selector, tree and mode state
pub struct App {
    provider: Box<dyn DataProvider>,
    pub selector: ModuleSelector,
    pub expansion: ExpansionStore,
    mode: Mode,
    pub status_board: StatusBoard,
    in_flight: BTreeSet<NodeKey>,
    pub ui: UiState,
    pub should_quit: bool,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let catalog = Catalog::builtin();
        Self::with_provider(Box::new(catalog), catalog.modules(), config)
    }

    pub fn with_provider(
        provider: Box<dyn DataProvider>,
        modules: Vec<crate::catalog::Module>,
        config: Config,
    ) -> Self {
        Self {
            provider,
            selector: ModuleSelector::new(modules),
            expansion: ExpansionStore::new(),
            mode: Mode::Browsing,
            status_board: StatusBoard::new(),
            in_flight: BTreeSet::new(),
            ui: UiState::default(),
            should_quit: false,
            config,
        }
    }

    pub fn provider(&self) -> &dyn DataProvider {
        self.provider.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn navigator(&self) -> Option<&HierarchyNavigator> {
        self.mode.navigator()
    }

    pub fn pending_activations(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, key: &NodeKey) -> bool {
        self.in_flight.contains(key)
    }

    // Module bar

    pub fn hover_previous(&mut self) -> bool {
        matches!(self.mode, Mode::Browsing) && self.selector.hover_previous()
    }

    pub fn hover_next(&mut self) -> bool {
        matches!(self.mode, Mode::Browsing) && self.selector.hover_next()
    }

    /// Commit the hovered module and drill into its tree with a fresh cursor
    pub fn commit_module(&mut self) -> bool {
        if !matches!(self.mode, Mode::Browsing) {
            return false;
        }
        let Some(module) = self.selector.commit() else {
            return false;
        };
        self.mode = Mode::TreeNavigating(HierarchyNavigator::new(module));
        self.ui.status_message = format!("Browsing {}", module.display_name());
        log::info!("Entered tree for {}", module.display_name());
        true
    }

    // Tree

    fn navigate(&mut self, event: NavigatorEvent) -> NavOutcome {
        let Mode::TreeNavigating(nav) = &mut self.mode else {
            return NavOutcome::Unchanged;
        };
        let outcome = nav.handle_event(event, self.provider.as_ref(), &mut self.expansion);
        if outcome == NavOutcome::ExitTree {
            self.exit_tree();
        }
        outcome
    }

    pub fn move_up(&mut self) -> bool {
        self.navigate(NavigatorEvent::MoveUp).is_changed()
    }

    pub fn move_down(&mut self) -> bool {
        self.navigate(NavigatorEvent::MoveDown).is_changed()
    }

    pub fn expand(&mut self) -> bool {
        self.navigate(NavigatorEvent::ExpandOrDescend).is_changed()
    }

    pub fn collapse(&mut self) -> bool {
        self.navigate(NavigatorEvent::CollapseOrAscend).is_changed()
    }

    pub fn toggle(&mut self) -> bool {
        self.navigate(NavigatorEvent::ToggleExpansion).is_changed()
    }

    /// Activate the highlighted connection. Returns the request to hand to
    /// the worker, or `None` when nothing should be sent.
    pub fn activate(&mut self) -> Option<ActivationRequest> {
        let NavOutcome::Activate(key) = self.navigate(NavigatorEvent::Activate) else {
            return None;
        };
        let connection = self.connection_at(&key)?;

        if self.in_flight.contains(&key) {
            self.ui.status_message = format!("{} is busy, please wait", connection.name);
            return None;
        }

        let current = self.status_board.effective(&key, connection.status);
        self.ui.status_message = match current {
            ConnectionStatus::Disconnected => format!("Connecting to {}...", connection.name),
            ConnectionStatus::Connected => format!("Disconnecting from {}...", connection.name),
            ConnectionStatus::Connecting => format!("Aborting {}...", connection.name),
        };
        log::info!("Activation requested for {} ({})", key, current.label());
        self.in_flight.insert(key.clone());

        Some(ActivationRequest {
            key,
            name: connection.name,
            current,
        })
    }

    pub fn complete_activation(&mut self, key: NodeKey, status: ConnectionStatus) {
        self.in_flight.remove(&key);
        let name = self
            .connection_at(&key)
            .map(|c| c.name)
            .unwrap_or_else(|| key.to_string());
        self.ui.status_message = format!("{} is now {}", name, status.label());
        self.status_board.record(key, status);
    }

    pub fn fail_activation(&mut self, key: &NodeKey, message: &str) {
        self.in_flight.remove(key);
        self.ui.status_message = format!("Error: {}", message);
    }

    /// Leave the tree; expansion flags stay
    pub fn exit_tree(&mut self) -> bool {
        if !matches!(self.mode, Mode::TreeNavigating(_)) {
            return false;
        }
        self.mode = Mode::Browsing;
        self.ui.status_message = "Select a module".to_string();
        log::debug!("Exited tree");
        true
    }

    // Quit confirmation

    pub fn request_quit(&mut self) -> bool {
        if self.mode.is_confirm_pending() {
            return false;
        }
        let mode = std::mem::replace(&mut self.mode, Mode::Browsing);
        self.mode = ConfirmationGate::open(mode);
        log::debug!("Quit confirmation opened");
        true
    }

    pub fn confirm_quit(&mut self) -> bool {
        if !self.mode.is_confirm_pending() {
            return false;
        }
        self.should_quit = true;
        log::info!("Quit confirmed");
        true
    }

    pub fn cancel_quit(&mut self) -> bool {
        if !self.mode.is_confirm_pending() {
            return false;
        }
        let mode = std::mem::replace(&mut self.mode, Mode::Browsing);
        self.mode = ConfirmationGate::cancel(mode);
        log::debug!("Quit cancelled, back to {}", self.mode.kind());
        true
    }

    // Queries for rendering

    pub fn connection_at(&self, key: &NodeKey) -> Option<Connection> {
        match key.path.as_slice() {
            [project, environment, connection] => self
                .provider
                .list_connections(key.module, *project, *environment)
                .into_iter()
                .nth(*connection),
            _ => None,
        }
    }

    /// Status to display: in-flight wins, then the board, then the catalog
    pub fn effective_status(&self, key: &NodeKey, initial: ConnectionStatus) -> ConnectionStatus {
        if self.in_flight.contains(key) {
            ConnectionStatus::Connecting
        } else {
            self.status_board.effective(key, initial)
        }
    }

    /// Every connection of `module` with its key, in tree order
    pub fn module_connections(&self, module: ModuleKind) -> Vec<(NodeKey, Connection)> {
        let provider = self.provider();
        let mut connections = Vec::new();
        for project in 0..provider.list_projects(module).len() {
            for environment in 0..provider.list_environments(module, project).len() {
                let listed = provider.list_connections(module, project, environment);
                for (index, connection) in listed.into_iter().enumerate() {
                    let key = NodeKey::connection(module, project, environment, index);
                    connections.push((key, connection));
                }
            }
        }
        connections
    }

    /// Connected if any connection is, else connecting if any is
    pub fn module_status(&self, module: ModuleKind) -> ConnectionStatus {
        let statuses: Vec<ConnectionStatus> = self
            .module_connections(module)
            .iter()
            .map(|(key, connection)| self.effective_status(key, connection.status))
            .collect();
        if statuses.contains(&ConnectionStatus::Connected) {
            ConnectionStatus::Connected
        } else if statuses.contains(&ConnectionStatus::Connecting) {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        }
    }

    /// Module whose tree is shown in the main panel
    pub fn displayed_module(&self) -> Option<ModuleKind> {
        self.mode
            .visible_navigator()
            .map(|nav| nav.module())
            .or_else(|| self.selector.current_module())
    }

    /// Hash of everything that affects the drawn frame
    pub fn render_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.mode.kind().hash(&mut hasher);
        if let Some(nav) = self.mode.visible_navigator() {
            nav.module().hash(&mut hasher);
            nav.cursor().hash(&mut hasher);
        }
        if let Mode::ConfirmPending { resume } = &self.mode {
            matches!(resume, ResumeMode::TreeNavigating(_)).hash(&mut hasher);
        }
        self.selector.hovered().hash(&mut hasher);
        self.selector.current().hash(&mut hasher);
        for (key, expanded) in self.expansion.iter() {
            key.hash(&mut hasher);
            expanded.hash(&mut hasher);
        }
        self.status_board.len().hash(&mut hasher);
        self.in_flight.hash(&mut hasher);
        self.ui.status_message.hash(&mut hasher);
        self.should_quit.hash(&mut hasher);
        hasher.finish()
    }

    /// Rebuild an app from a saved snapshot against the built-in catalog
    pub fn from_snapshot(snapshot: &StateSnapshot, config: Config) -> Self {
        let mut app = App::new(config);
        app.selector = ModuleSelector::with_indices(
            app.selector.modules().to_vec(),
            snapshot.hovered_module,
            snapshot.current_module,
        );
        app.expansion = snapshot.expansion.clone();
        app.status_board = snapshot.status_board.clone();
        app.ui.status_message = snapshot.status_message.clone();
        app.should_quit = snapshot.should_quit;

        let navigator = || {
            let module = app.selector.current_module()?;
            let cursor = snapshot.cursor.unwrap_or_default();
            Some(HierarchyNavigator::restore(module, cursor, app.provider()))
        };
        let tree_mode = navigator().map(Mode::TreeNavigating).unwrap_or(Mode::Browsing);

        app.mode = match (snapshot.mode, snapshot.resume_mode) {
            (ModeKind::Browsing, _) => Mode::Browsing,
            (ModeKind::TreeNavigating, _) => tree_mode,
            (ModeKind::ConfirmPending, Some(ModeKind::TreeNavigating)) => {
                ConfirmationGate::open(tree_mode)
            }
            (ModeKind::ConfirmPending, _) => ConfirmationGate::open(Mode::Browsing),
        };
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::Level;
    use assert_matches::assert_matches;

    fn app() -> App {
        App::new(Config::default())
    }

    fn drill_into_mysql(app: &mut App) {
        app.hover_next();
        assert!(app.commit_module());
    }

    #[test]
    fn test_new_app_starts_browsing() {
        let app = app();
        assert_eq!(app.mode_kind(), ModeKind::Browsing);
        assert!(app.navigator().is_none());
        assert_eq!(app.selector.current_module(), Some(ModuleKind::Ssh));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_commit_creates_fresh_cursor() {
        let mut app = app();
        drill_into_mysql(&mut app);
        let nav = app.navigator().unwrap();
        assert_eq!(nav.module(), ModuleKind::Mysql);
        assert_eq!(nav.level(), Level::Project);
        assert_eq!(nav.cursor().index(), 0);

        app.move_down();
        app.exit_tree();
        app.commit_module();
        assert_eq!(app.navigator().unwrap().cursor().index(), 0);
    }

    #[test]
    fn test_tree_operations_ignored_while_browsing() {
        let mut app = app();
        assert!(!app.move_down());
        assert!(!app.expand());
        assert!(app.activate().is_none());
        assert!(app.expansion.is_empty());
    }

    #[test]
    fn test_hover_ignored_in_tree() {
        let mut app = app();
        app.commit_module();
        assert!(!app.hover_next());
        assert_eq!(app.selector.hovered(), 0);
    }

    #[test]
    fn test_collapse_at_project_returns_to_browsing() {
        let mut app = app();
        drill_into_mysql(&mut app);
        assert!(app.collapse());
        assert_matches!(app.mode(), Mode::Browsing);
    }

    #[test]
    fn test_expansion_survives_module_switch() {
        let mut app = app();
        drill_into_mysql(&mut app);
        app.expand();
        app.exit_tree();
        app.hover_next();
        app.commit_module();
        app.exit_tree();
        app.hover_previous();
        app.commit_module();
        assert!(app.expansion.get(&NodeKey::project(ModuleKind::Mysql, 0)));
    }

    #[test]
    fn test_quit_prompt_cancel_restores_everything() {
        let mut app = app();
        drill_into_mysql(&mut app);
        app.move_down();
        app.expand();
        let mode_before = app.mode().clone();
        let expansion_before = app.expansion.clone();
        let selector_before = app.selector.clone();

        assert!(app.request_quit());
        assert_matches!(app.mode(), Mode::ConfirmPending { .. });
        assert!(!app.move_down());
        assert!(!app.request_quit());

        assert!(app.cancel_quit());
        assert_eq!(app.mode(), &mode_before);
        assert_eq!(app.expansion, expansion_before);
        assert_eq!(app.selector, selector_before);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_confirm_quit_only_from_prompt() {
        let mut app = app();
        assert!(!app.confirm_quit());
        app.request_quit();
        assert!(app.confirm_quit());
        assert!(app.should_quit);
    }

    #[test]
    fn test_activation_lifecycle() {
        let mut app = app();
        drill_into_mysql(&mut app);
        app.expand();
        app.expand();

        let request = app.activate().unwrap();
        assert_eq!(request.key, NodeKey::connection(ModuleKind::Mysql, 0, 0, 0));
        assert_eq!(request.name, "MySQL-DB-01");
        assert_eq!(request.current, ConnectionStatus::Disconnected);
        assert_eq!(app.pending_activations(), 1);
        assert_eq!(
            app.effective_status(&request.key, ConnectionStatus::Disconnected),
            ConnectionStatus::Connecting
        );

        // a second press while in flight sends nothing
        assert!(app.activate().is_none());
        assert!(app.ui.status_message.contains("busy"));

        app.complete_activation(request.key.clone(), ConnectionStatus::Connected);
        assert_eq!(app.pending_activations(), 0);
        assert_eq!(
            app.effective_status(&request.key, ConnectionStatus::Disconnected),
            ConnectionStatus::Connected
        );
        assert_eq!(app.ui.status_message, "MySQL-DB-01 is now connected");
        assert_eq!(app.navigator().unwrap().level(), Level::Connection);
    }

    #[test]
    fn test_fingerprint_tracks_visible_state() {
        let mut app = app();
        let initial = app.render_fingerprint();
        assert_eq!(initial, app.render_fingerprint());

        app.hover_next();
        let hovered = app.render_fingerprint();
        assert_ne!(initial, hovered);

        app.hover_previous();
        app.hover_previous();
        assert_eq!(initial, app.render_fingerprint());
    }

    #[test]
    fn test_displayed_module_follows_committed_module() {
        let mut app = app();
        app.hover_next();
        assert_eq!(app.displayed_module(), Some(ModuleKind::Ssh));
        app.commit_module();
        app.request_quit();
        assert_eq!(app.displayed_module(), Some(ModuleKind::Mysql));
    }

    #[test]
    fn test_activation_messages_use_provider_names() {
        use crate::catalog::{Environment, Module, Project};
        use crate::provider::MockDataProvider;
        use fake::faker::internet::en::{DomainSuffix, IPv4};
        use fake::faker::lorem::en::Word;
        use fake::Fake;

        let name: String = Word().fake();
        let endpoint = format!("{}:{}", IPv4().fake::<String>(), (1024..65535).fake::<u16>());
        let project: String = format!("{}.{}", Word().fake::<String>(), DomainSuffix().fake::<String>());

        let mut provider = MockDataProvider::new();
        provider
            .expect_list_projects()
            .returning(move |_| vec![Project { name: project.clone() }]);
        provider
            .expect_list_environments()
            .returning(|_, _| vec![Environment { name: "prod".into() }]);
        let (conn_name, conn_endpoint) = (name.clone(), endpoint.clone());
        provider.expect_list_connections().returning(move |_, _, _| {
            vec![Connection::new(&conn_name, &conn_endpoint, ConnectionStatus::Disconnected)]
        });

        let mut app = App::with_provider(
            Box::new(provider),
            vec![Module::new(ModuleKind::Redis)],
            Config::default(),
        );
        app.commit_module();
        app.expand();
        app.expand();

        let request = app.activate().unwrap();
        assert_eq!(request.name, name);
        assert_eq!(app.ui.status_message, format!("Connecting to {}...", name));

        app.complete_activation(request.key, ConnectionStatus::Connected);
        assert_eq!(app.ui.status_message, format!("{} is now connected", name));
    }

    #[test]
    fn test_module_connections_walk_the_whole_tree() {
        let app = app();
        let names: Vec<String> = app
            .module_connections(ModuleKind::Ssh)
            .into_iter()
            .map(|(_, connection)| connection.name)
            .collect();
        assert_eq!(
            names,
            vec!["SSH-Server-01", "SSH-Server-02", "Production-Server", "staging-bastion", "jump-host"]
        );
        assert_eq!(app.module_connections(ModuleKind::Postgresql).len(), 2);
    }

    #[test]
    fn test_module_status_follows_status_board() {
        let mut app = app();
        assert_eq!(app.module_status(ModuleKind::Postgresql), ConnectionStatus::Connecting);

        app.complete_activation(
            NodeKey::connection(ModuleKind::Postgresql, 0, 0, 0),
            ConnectionStatus::Disconnected,
        );
        assert_eq!(app.module_status(ModuleKind::Postgresql), ConnectionStatus::Disconnected);

        app.complete_activation(
            NodeKey::connection(ModuleKind::Postgresql, 0, 1, 0),
            ConnectionStatus::Connected,
        );
        assert_eq!(app.module_status(ModuleKind::Postgresql), ConnectionStatus::Connected);
    }
}
