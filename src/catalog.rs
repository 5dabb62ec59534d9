use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::provider::DataProvider;

/// Identity of a connection module. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Ssh,
    Mysql,
    Postgresql,
    Redis,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Ssh,
        ModuleKind::Mysql,
        ModuleKind::Postgresql,
        ModuleKind::Redis,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModuleKind::Ssh => "SSH",
            ModuleKind::Mysql => "MySQL",
            ModuleKind::Postgresql => "PostgreSQL",
            ModuleKind::Redis => "Redis",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ModuleKind::Ssh => "ssh",
            ModuleKind::Mysql => "mysql",
            ModuleKind::Postgresql => "postgresql",
            ModuleKind::Redis => "redis",
        }
    }

    /// Short description shown in the details pane
    pub fn description(self) -> &'static str {
        match self {
            ModuleKind::Ssh => "Remote shell sessions",
            ModuleKind::Mysql => "MySQL databases",
            ModuleKind::Postgresql => "PostgreSQL databases",
            ModuleKind::Redis => "Redis cache instances",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug() == s.to_lowercase() || kind.display_name() == s)
            .ok_or_else(|| format!("Unknown module: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub kind: ModuleKind,
}

impl Module {
    pub fn new(kind: ModuleKind) -> Self {
        Self { kind }
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Connecting,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            ConnectionStatus::Connected => '●',
            ConnectionStatus::Disconnected => '○',
            ConnectionStatus::Connecting => '◐',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Key,
    Password,
    #[default]
    None,
}

impl AuthMethod {
    pub fn label(self) -> &'static str {
        match self {
            AuthMethod::Key => "key",
            AuthMethod::Password => "password",
            AuthMethod::None => "none",
        }
    }
}

/// Default connection settings of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProfile {
    pub host: &'static str,
    pub port: u16,
    pub database: Option<&'static str>,
    pub user: Option<&'static str>,
    pub auth: AuthMethod,
}

impl ModuleKind {
    pub fn profile(self) -> ModuleProfile {
        match self {
            ModuleKind::Ssh => ModuleProfile {
                host: "example.com",
                port: 22,
                database: None,
                user: Some("user"),
                auth: AuthMethod::Key,
            },
            ModuleKind::Mysql => ModuleProfile {
                host: "localhost",
                port: 3306,
                database: Some("myapp"),
                user: Some("root"),
                auth: AuthMethod::Password,
            },
            ModuleKind::Postgresql => ModuleProfile {
                host: "localhost",
                port: 5432,
                database: Some("postgres"),
                user: Some("postgres"),
                auth: AuthMethod::Password,
            },
            ModuleKind::Redis => ModuleProfile {
                host: "localhost",
                port: 6379,
                database: Some("0"),
                user: None,
                auth: AuthMethod::None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub name: String,
    /// `host:port`
    pub endpoint: String,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub auth: AuthMethod,
}

impl Connection {
    pub fn new(name: &str, endpoint: &str, status: ConnectionStatus) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            status,
            user: None,
            database: None,
            auth: AuthMethod::None,
        }
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Fill user, database and auth from `profile` where not set
    fn inherit(&mut self, profile: &ModuleProfile) {
        if self.user.is_none() {
            self.user = profile.user.map(str::to_string);
        }
        if self.database.is_none() {
            self.database = profile.database.map(str::to_string);
        }
        if self.auth == AuthMethod::None {
            self.auth = profile.auth;
        }
    }

    pub fn host(&self) -> &str {
        self.endpoint
            .rsplit_once(':')
            .map_or(self.endpoint.as_str(), |(host, _)| host)
    }

    pub fn port(&self) -> Option<u16> {
        self.endpoint
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
    }
}

#[derive(Debug, Clone)]
struct EnvironmentNode {
    environment: Environment,
    connections: Vec<Connection>,
}

#[derive(Debug, Clone)]
struct ProjectNode {
    project: Project,
    environments: Vec<EnvironmentNode>,
}

#[derive(Debug, Clone)]
struct ModuleNode {
    module: Module,
    projects: Vec<ProjectNode>,
}

/// The static, in-memory module catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    modules: Vec<ModuleNode>,
}

lazy_static! {
    static ref BUILTIN_CATALOG: Catalog = Catalog::build_builtin();
}

fn project(name: &str, environments: Vec<EnvironmentNode>) -> ProjectNode {
    ProjectNode {
        project: Project {
            name: name.to_string(),
        },
        environments,
    }
}

fn environment(name: &str, connections: Vec<Connection>) -> EnvironmentNode {
    EnvironmentNode {
        environment: Environment {
            name: name.to_string(),
        },
        connections,
    }
}

impl Catalog {
    /// The shared catalog shipped with the binary
    pub fn builtin() -> &'static Catalog {
        &BUILTIN_CATALOG
    }

    fn build_builtin() -> Self {
        use ConnectionStatus::*;

        let ssh = ModuleNode {
            module: Module::new(ModuleKind::Ssh),
            projects: vec![
                project(
                    "web-platform",
                    vec![
                        environment(
                            "production",
                            vec![
                                Connection::new("SSH-Server-01", "192.168.1.10:22", Connected),
                                Connection::new("SSH-Server-02", "192.168.1.11:22", Connected),
                                Connection::new("Production-Server", "prod.example.com:22", Disconnected),
                            ],
                        ),
                        environment(
                            "staging",
                            vec![Connection::new("staging-bastion", "staging.example.com:22", Disconnected)],
                        ),
                    ],
                ),
                project(
                    "infra-tools",
                    vec![environment(
                        "ops",
                        vec![Connection::new("jump-host", "jump.example.com:2222", Connecting).with_user("ops")],
                    )],
                ),
                project("sandbox", vec![]),
            ],
        };

        let mysql = ModuleNode {
            module: Module::new(ModuleKind::Mysql),
            projects: vec![
                project(
                    "orders",
                    vec![
                        environment(
                            "production",
                            vec![
                                Connection::new("MySQL-DB-01", "localhost:3306", Disconnected),
                                Connection::new("MySQL-DB-02", "db.example.com:3306", Disconnected),
                            ],
                        ),
                        environment(
                            "staging",
                            vec![Connection::new("orders-staging", "staging-db.example.com:3306", Connected)],
                        ),
                    ],
                ),
                project(
                    "billing",
                    vec![environment(
                        "production",
                        vec![Connection::new("billing-primary", "billing.example.com:3306", Connected)
                            .with_database("billing")],
                    )],
                ),
                project(
                    "analytics",
                    vec![environment(
                        "reporting",
                        vec![
                            Connection::new("report-replica-a", "replica-a.example.com:3306", Connected)
                                .with_database("reporting")
                                .with_user("analyst"),
                            Connection::new("report-replica-b", "replica-b.example.com:3306", Disconnected),
                            Connection::new("report-replica-c", "replica-c.example.com:3306", Connecting),
                        ],
                    )],
                ),
            ],
        };

        let postgresql = ModuleNode {
            module: Module::new(ModuleKind::Postgresql),
            projects: vec![
                project(
                    "core-api",
                    vec![
                        environment(
                            "production",
                            vec![Connection::new("PostgreSQL-Main", "localhost:5432", Connecting)],
                        ),
                        environment(
                            "analytics",
                            vec![Connection::new(
                                "PostgreSQL-Analytics",
                                "analytics.example.com:5432",
                                Disconnected,
                            )
                            .with_database("analytics")],
                        ),
                    ],
                ),
                project("legacy", vec![environment("archive", vec![])]),
            ],
        };

        let redis = ModuleNode {
            module: Module::new(ModuleKind::Redis),
            projects: vec![
                project(
                    "sessions",
                    vec![environment(
                        "production",
                        vec![Connection::new("Redis-Session", "session.example.com:6379", Connected)
                            .with_database("1")
                            .with_auth(AuthMethod::Password)],
                    )],
                ),
                project(
                    "caching",
                    vec![
                        environment(
                            "production",
                            vec![Connection::new("Redis-Cache-01", "localhost:6379", Connected)],
                        ),
                        environment("development", vec![]),
                    ],
                ),
            ],
        };

        let mut modules = vec![ssh, mysql, postgresql, redis];
        for node in &mut modules {
            let profile = node.module.kind.profile();
            node.projects
                .iter_mut()
                .flat_map(|p| p.environments.iter_mut())
                .flat_map(|e| e.connections.iter_mut())
                .for_each(|connection| connection.inherit(&profile));
        }

        Self { modules }
    }

    /// Modules in display order
    pub fn modules(&self) -> Vec<Module> {
        self.modules.iter().map(|node| node.module).collect()
    }

    fn module_node(&self, module: ModuleKind) -> Option<&ModuleNode> {
        self.modules.iter().find(|node| node.module.kind == module)
    }

    fn environment_node(
        &self,
        module: ModuleKind,
        project: usize,
        environment: usize,
    ) -> Option<&EnvironmentNode> {
        self.module_node(module)?
            .projects
            .get(project)?
            .environments
            .get(environment)
    }
}

impl DataProvider for Catalog {
    fn list_projects(&self, module: ModuleKind) -> Vec<Project> {
        self.module_node(module)
            .map(|node| node.projects.iter().map(|p| p.project.clone()).collect())
            .unwrap_or_default()
    }

    fn list_environments(&self, module: ModuleKind, project: usize) -> Vec<Environment> {
        self.module_node(module)
            .and_then(|node| node.projects.get(project))
            .map(|p| p.environments.iter().map(|e| e.environment.clone()).collect())
            .unwrap_or_default()
    }

    fn list_connections(
        &self,
        module: ModuleKind,
        project: usize,
        environment: usize,
    ) -> Vec<Connection> {
        self.environment_node(module, project, environment)
            .map(|env| env.connections.clone())
            .unwrap_or_default()
    }
}
