//! Expansion flags addressed by node identity.
//!
//! A node is identified by its module plus the index path leading to it
//! (`[project]`, `[project, environment]` or `[project, environment,
//! connection]`). Keys are plain values; nothing here points into the
//! catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::ModuleKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeKey {
    pub module: ModuleKind,
    pub path: Vec<usize>,
}

impl NodeKey {
    pub fn project(module: ModuleKind, project: usize) -> Self {
        Self {
            module,
            path: vec![project],
        }
    }

    pub fn environment(module: ModuleKind, project: usize, environment: usize) -> Self {
        Self {
            module,
            path: vec![project, environment],
        }
    }

    pub fn connection(
        module: ModuleKind,
        project: usize,
        environment: usize,
        connection: usize,
    ) -> Self {
        Self {
            module,
            path: vec![project, environment, connection],
        }
    }

    /// Depth of the addressed node: 0 for projects, 2 for connections
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{}:{}", self.module, path)
    }
}

impl FromStr for NodeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, path) = s
            .split_once(':')
            .ok_or_else(|| format!("Node key must look like 'module:0/1', got '{}'", s))?;
        let module = module.parse::<ModuleKind>()?;
        let path = path
            .split('/')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| format!("Invalid index '{}' in node key '{}'", part, s))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if path.is_empty() || path.len() > 3 {
            return Err(format!("Node key '{}' must have 1 to 3 indices", s));
        }
        Ok(NodeKey { module, path })
    }
}

impl From<NodeKey> for String {
    fn from(key: NodeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for NodeKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Session-long map of expansion flags; absent means collapsed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionStore {
    flags: BTreeMap<NodeKey, bool>,
}

impl ExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NodeKey) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: NodeKey, expanded: bool) {
        self.flags.insert(key, expanded);
    }

    /// Flip the flag and return the new value
    pub fn toggle(&mut self, key: NodeKey) -> bool {
        let expanded = !self.get(&key);
        self.flags.insert(key, expanded);
        expanded
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, bool)> {
        self.flags.iter().map(|(key, expanded)| (key, *expanded))
    }
}
