//! Hierarchy navigator
//!
//! Drives the project → environment → connection cursor for one module.
//! Movement and expansion are separate concerns: moving never touches an
//! expansion flag, and only `expand_or_descend`, `collapse_or_ascend` and
//! `toggle_expansion` write to the [`ExpansionStore`].
//!
//! Lists are re-queried from the [`DataProvider`] on every operation; the
//! navigator owns nothing but the cursor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{ConnectionStatus, ModuleKind};
use crate::expansion::{ExpansionStore, NodeKey};
use crate::provider::DataProvider;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Level {
    #[default]
    Project,
    Environment,
    Connection,
}

impl Level {
    pub fn deeper(self) -> Option<Level> {
        match self {
            Level::Project => Some(Level::Environment),
            Level::Environment => Some(Level::Connection),
            Level::Connection => None,
        }
    }

    pub fn shallower(self) -> Option<Level> {
        match self {
            Level::Project => None,
            Level::Environment => Some(Level::Project),
            Level::Connection => Some(Level::Environment),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Project => "Project",
            Level::Environment => "Environment",
            Level::Connection => "Connection",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(Level::Project),
            "environment" | "env" => Ok(Level::Environment),
            "connection" | "conn" => Ok(Level::Connection),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}

/// Where the highlight sits. Indices below the active level are kept at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NavigationCursor {
    pub level: Level,
    pub project: usize,
    pub environment: usize,
    pub connection: usize,
}

impl NavigationCursor {
    pub fn index(&self) -> usize {
        match self.level {
            Level::Project => self.project,
            Level::Environment => self.environment,
            Level::Connection => self.connection,
        }
    }

    /// Set the index at the active level; descendants go back to 0
    fn set_index(&mut self, index: usize) {
        match self.level {
            Level::Project => {
                self.project = index;
                self.environment = 0;
                self.connection = 0;
            }
            Level::Environment => {
                self.environment = index;
                self.connection = 0;
            }
            Level::Connection => self.connection = index,
        }
    }

    fn descend(&mut self, level: Level) {
        self.level = level;
        self.set_index(0);
    }

    fn ascend(&mut self, level: Level) {
        self.set_index(0);
        self.level = level;
    }

    /// Key of the highlighted node
    pub fn node_key(&self, module: ModuleKind) -> NodeKey {
        match self.level {
            Level::Project => NodeKey::project(module, self.project),
            Level::Environment => NodeKey::environment(module, self.project, self.environment),
            Level::Connection => {
                NodeKey::connection(module, self.project, self.environment, self.connection)
            }
        }
    }
}

/// Events that can be sent to the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    MoveUp,
    MoveDown,
    ExpandOrDescend,
    CollapseOrAscend,
    ToggleExpansion,
    Activate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Unchanged,
    Changed,
    /// Collapse at project level: hand control back to the module bar
    ExitTree,
    /// A connection was activated; the caller forwards it to the worker
    Activate(NodeKey),
}

impl NavOutcome {
    pub fn is_changed(&self) -> bool {
        !matches!(self, NavOutcome::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNavigator {
    module: ModuleKind,
    cursor: NavigationCursor,
}

impl HierarchyNavigator {
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            cursor: NavigationCursor::default(),
        }
    }

    /// Rebuild a navigator from a saved cursor, pulling every index back into
    /// range and dropping to a shallower level when a saved level has no
    /// nodes left
    pub fn restore(
        module: ModuleKind,
        saved: NavigationCursor,
        provider: &dyn DataProvider,
    ) -> Self {
        let mut cursor = NavigationCursor::default();

        let projects = provider.list_projects(module).len();
        cursor.project = saved.project.min(projects.saturating_sub(1));

        if saved.level >= Level::Environment {
            let environments = provider.list_environments(module, cursor.project).len();
            if environments > 0 {
                cursor.level = Level::Environment;
                cursor.environment = saved.environment.min(environments - 1);
            }
        }

        if saved.level == Level::Connection && cursor.level == Level::Environment {
            let connections = provider
                .list_connections(module, cursor.project, cursor.environment)
                .len();
            if connections > 0 {
                cursor.level = Level::Connection;
                cursor.connection = saved.connection.min(connections - 1);
            }
        }

        Self { module, cursor }
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    pub fn cursor(&self) -> NavigationCursor {
        self.cursor
    }

    pub fn level(&self) -> Level {
        self.cursor.level
    }

    pub fn highlighted_key(&self) -> NodeKey {
        self.cursor.node_key(self.module)
    }

    pub fn handle_event(
        &mut self,
        event: NavigatorEvent,
        provider: &dyn DataProvider,
        expansion: &mut ExpansionStore,
    ) -> NavOutcome {
        let before = self.cursor;
        let outcome = match event {
            NavigatorEvent::MoveUp => self.move_up(),
            NavigatorEvent::MoveDown => self.move_down(provider),
            NavigatorEvent::ExpandOrDescend => self.expand_or_descend(provider, expansion),
            NavigatorEvent::CollapseOrAscend => self.collapse_or_ascend(expansion),
            NavigatorEvent::ToggleExpansion => self.toggle_expansion(provider, expansion),
            NavigatorEvent::Activate => self.activate(provider),
        };
        log::debug!(
            "Navigator {:?}: {:?} -> {:?} ({:?})",
            event,
            before,
            self.cursor,
            outcome
        );
        outcome
    }

    pub fn move_up(&mut self) -> NavOutcome {
        let index = self.cursor.index();
        if index > 0 {
            self.cursor.set_index(index - 1);
            return NavOutcome::Changed;
        }

        match self.cursor.level.shallower() {
            Some(parent) => {
                self.cursor.ascend(parent);
                NavOutcome::Changed
            }
            None => NavOutcome::Unchanged,
        }
    }

    pub fn move_down(&mut self, provider: &dyn DataProvider) -> NavOutcome {
        let index = self.cursor.index();
        let siblings = self.count_at(self.cursor.level, provider);
        if index + 1 < siblings {
            self.cursor.set_index(index + 1);
            return NavOutcome::Changed;
        }

        // Last sibling: auto-descend, but only into a level that has nodes
        if siblings == 0 {
            return NavOutcome::Unchanged;
        }
        match self.cursor.level.deeper() {
            Some(child) if self.child_count(provider) > 0 => {
                self.cursor.descend(child);
                NavOutcome::Changed
            }
            _ => NavOutcome::Unchanged,
        }
    }

    pub fn collapse_or_ascend(&mut self, expansion: &mut ExpansionStore) -> NavOutcome {
        match self.cursor.level.shallower() {
            Some(parent) => {
                self.cursor.ascend(parent);
                // The parent is now highlighted; its flag is the one cleared
                expansion.set(self.highlighted_key(), false);
                NavOutcome::Changed
            }
            None => NavOutcome::ExitTree,
        }
    }

    pub fn expand_or_descend(
        &mut self,
        provider: &dyn DataProvider,
        expansion: &mut ExpansionStore,
    ) -> NavOutcome {
        let Some(child) = self.cursor.level.deeper() else {
            return NavOutcome::Unchanged;
        };
        if self.count_at(self.cursor.level, provider) == 0 {
            return NavOutcome::Unchanged;
        }

        let key = self.highlighted_key();
        let was_expanded = expansion.get(&key);
        expansion.set(key, true);

        if self.child_count(provider) > 0 {
            self.cursor.descend(child);
            NavOutcome::Changed
        } else if was_expanded {
            NavOutcome::Unchanged
        } else {
            NavOutcome::Changed
        }
    }

    pub fn toggle_expansion(
        &mut self,
        provider: &dyn DataProvider,
        expansion: &mut ExpansionStore,
    ) -> NavOutcome {
        if self.count_at(self.cursor.level, provider) == 0 {
            return NavOutcome::Unchanged;
        }
        expansion.toggle(self.highlighted_key());
        NavOutcome::Changed
    }

    pub fn activate(&self, provider: &dyn DataProvider) -> NavOutcome {
        if self.cursor.level != Level::Connection {
            return NavOutcome::Unchanged;
        }
        if self.cursor.connection >= self.count_at(Level::Connection, provider) {
            return NavOutcome::Unchanged;
        }
        NavOutcome::Activate(self.highlighted_key())
    }

    /// Number of siblings at `level` along the cursor's ancestor path
    fn count_at(&self, level: Level, provider: &dyn DataProvider) -> usize {
        match level {
            Level::Project => provider.list_projects(self.module).len(),
            Level::Environment => provider
                .list_environments(self.module, self.cursor.project)
                .len(),
            Level::Connection => provider
                .list_connections(self.module, self.cursor.project, self.cursor.environment)
                .len(),
        }
    }

    /// Number of children under the highlighted node
    fn child_count(&self, provider: &dyn DataProvider) -> usize {
        match self.cursor.level {
            Level::Project => provider
                .list_environments(self.module, self.cursor.project)
                .len(),
            Level::Environment => provider
                .list_connections(self.module, self.cursor.project, self.cursor.environment)
                .len(),
            Level::Connection => 0,
        }
    }

    pub fn build_view_model(
        &self,
        provider: &dyn DataProvider,
        expansion: &ExpansionStore,
    ) -> NavigatorViewModel {
        build_view_model(self.module, Some(&self.cursor), provider, expansion)
    }
}

/// A visible row in the tree pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub key: NodeKey,
    pub label: String,
    pub depth: usize,
    pub is_selected: bool,
    pub is_expanded: bool,
    pub has_children: bool,
    pub endpoint: Option<String>,
    pub status: Option<ConnectionStatus>,
}

/// View model for rendering the tree pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorViewModel {
    pub module: ModuleKind,
    pub rows: Vec<TreeRow>,
    pub cursor_position: Option<usize>,
}

/// Flatten the module's hierarchy into visible rows.
///
/// A node shows its children when its expansion flag is set or when it is an
/// ancestor of the highlighted node, so the highlight is never hidden.
pub fn build_view_model(
    module: ModuleKind,
    cursor: Option<&NavigationCursor>,
    provider: &dyn DataProvider,
    expansion: &ExpansionStore,
) -> NavigatorViewModel {
    let mut rows = Vec::new();
    let on_path = |level: Level, project: usize, environment: usize| match cursor {
        Some(c) if c.level > level => match level {
            Level::Project => c.project == project,
            Level::Environment => c.project == project && c.environment == environment,
            Level::Connection => false,
        },
        _ => false,
    };
    let selected = |key: &NodeKey| cursor.map(|c| &c.node_key(module) == key).unwrap_or(false);

    for (p, project) in provider.list_projects(module).into_iter().enumerate() {
        let key = NodeKey::project(module, p);
        let environments = provider.list_environments(module, p);
        let open = expansion.get(&key) || on_path(Level::Project, p, 0);
        rows.push(TreeRow {
            is_selected: selected(&key),
            is_expanded: open,
            has_children: !environments.is_empty(),
            key,
            label: project.name,
            depth: 0,
            endpoint: None,
            status: None,
        });
        if !open {
            continue;
        }

        for (e, environment) in environments.into_iter().enumerate() {
            let key = NodeKey::environment(module, p, e);
            let connections = provider.list_connections(module, p, e);
            let open = expansion.get(&key) || on_path(Level::Environment, p, e);
            rows.push(TreeRow {
                is_selected: selected(&key),
                is_expanded: open,
                has_children: !connections.is_empty(),
                key,
                label: environment.name,
                depth: 1,
                endpoint: None,
                status: None,
            });
            if !open {
                continue;
            }

            for (c, connection) in connections.into_iter().enumerate() {
                let key = NodeKey::connection(module, p, e, c);
                rows.push(TreeRow {
                    is_selected: selected(&key),
                    is_expanded: false,
                    has_children: false,
                    key,
                    label: connection.name,
                    depth: 2,
                    endpoint: Some(connection.endpoint),
                    status: Some(connection.status),
                });
            }
        }
    }

    let cursor_position = rows.iter().position(|row| row.is_selected);
    NavigatorViewModel {
        module,
        rows,
        cursor_position,
    }
}
