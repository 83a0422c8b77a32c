//! Objects addressed by slug path.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::models::{
    Change, Component, OperationResult, Project, RepositoryOperation, RepositoryStatus,
    Statistics, Translation,
};
use crate::pagination::Paginated;
use crate::traits::{Changes, Repository};

/// A project, component or translation looked up by `project[/component[/language]]`.
#[derive(Debug, Clone)]
pub enum Object {
    Project(Project),
    Component(Component),
    Translation(Translation),
}

macro_rules! each {
    ($object:expr, $inner:ident => $body:expr) => {
        match $object {
            Object::Project($inner) => $body,
            Object::Component($inner) => $body,
            Object::Translation($inner) => $body,
        }
    };
}

impl Object {
    pub fn kind(&self) -> &'static str {
        each!(self, o => o.kind())
    }

    pub fn url(&self) -> &str {
        each!(self, o => o.url())
    }

    pub fn full_slug(&self) -> Result<String> {
        each!(self, o => o.full_slug())
    }

    /// Fetch the object if only its URL is known.
    pub fn ensure_complete(&mut self) -> Result<()> {
        each!(self, o => o.ensure_complete())
    }

    pub fn refresh(&mut self) -> Result<()> {
        each!(self, o => o.refresh())
    }

    /// Field/value pairs for display.
    pub fn record(&self) -> Vec<(String, Value)> {
        each!(self, o => o.record())
    }

    /// Statistics; a component reports one entry per translation.
    pub fn statistics(&mut self) -> Result<Vec<Statistics>> {
        match self {
            Self::Project(o) => Ok(vec![o.statistics()?]),
            Self::Component(o) => o.statistics()?.collect(),
            Self::Translation(o) => Ok(vec![o.statistics()?]),
        }
    }

    /// Download beneath `dir`; a project downloads every component.
    pub fn download_to(&mut self, dir: &Path, convert: Option<&str>) -> Result<Vec<PathBuf>> {
        match self {
            Self::Project(o) => o.download_to(dir, convert),
            Self::Component(o) => Ok(vec![o.download_to(dir, convert)?]),
            Self::Translation(o) => Ok(vec![o.download_to(dir, convert)?]),
        }
    }

    pub fn delete(self) -> Result<()> {
        each!(self, o => o.delete())
    }
}

impl Repository for Object {
    fn repository(&mut self) -> Result<RepositoryStatus> {
        each!(self, o => o.repository())
    }

    fn repository_operation(&mut self, operation: RepositoryOperation) -> Result<OperationResult> {
        each!(self, o => o.repository_operation(operation))
    }
}

impl Changes for Object {
    fn list_changes(&mut self) -> Result<Paginated<Change>> {
        each!(self, o => o.list_changes())
    }
}

impl From<Project> for Object {
    fn from(project: Project) -> Self {
        Self::Project(project)
    }
}

impl From<Component> for Object {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<Translation> for Object {
    fn from(translation: Translation) -> Self {
        Self::Translation(translation)
    }
}
