//! Read-only source of the project / environment / connection lists.
//!
//! The navigator never caches what it gets back from a provider: every
//! movement re-queries the lists for the current ancestor path. Indices that
//! do not exist answer with an empty list.

use crate::catalog::{Connection, Environment, ModuleKind, Project};

#[cfg_attr(test, mockall::automock)]
pub trait DataProvider {
    fn list_projects(&self, module: ModuleKind) -> Vec<Project>;

    fn list_environments(&self, module: ModuleKind, project: usize) -> Vec<Environment>;

    fn list_connections(
        &self,
        module: ModuleKind,
        project: usize,
        environment: usize,
    ) -> Vec<Connection>;
}

impl<T: DataProvider + ?Sized> DataProvider for &T {
    fn list_projects(&self, module: ModuleKind) -> Vec<Project> {
        (**self).list_projects(module)
    }

    fn list_environments(&self, module: ModuleKind, project: usize) -> Vec<Environment> {
        (**self).list_environments(module, project)
    }

    fn list_connections(
        &self,
        module: ModuleKind,
        project: usize,
        environment: usize,
    ) -> Vec<Connection> {
        (**self).list_connections(module, project, environment)
    }
}
