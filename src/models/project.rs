//! Project model.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::models::{Category, Component, LanguageStats, Resource, Schema, Statistics};
use crate::pagination::Paginated;
use crate::traits::{HasChanges, HasRepository};

/// Schema of a Weblate project.
///
/// Projects are the top-level containers. Each project holds components,
/// optionally grouped in categories.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSchema;

impl Schema for ProjectSchema {
    const KIND: &'static str = "Project";
    const FIELDS: &'static [&'static str] =
        &["url", "web_url", "name", "slug", "web", "source_language"];
    const OPTIONALS: &'static [&'static str] = &["web_url", "web", "source_language"];
    const ID: &'static str = "slug";
    const NESTED: &'static [(&'static str, &'static str)] = &[("source_language", "code")];
}

impl HasRepository for ProjectSchema {}
impl HasChanges for ProjectSchema {}

/// A Weblate project.
pub type Project = Resource<ProjectSchema>;

impl Resource<ProjectSchema> {
    pub fn slug(&self) -> Result<&str> {
        self.str_field("slug")
    }

    pub fn name(&self) -> Result<&str> {
        self.str_field("name")
    }

    /// Slug path used on the command line (`hello`).
    pub fn full_slug(&self) -> Result<String> {
        Ok(self.slug()?.to_string())
    }

    /// Components of this project.
    pub fn list_components(&mut self) -> Result<Paginated<Component>> {
        self.list_related("components_list_url", "components/")
    }

    /// Categories of this project.
    pub fn list_categories(&mut self) -> Result<Paginated<Category>> {
        self.list_related("categories_url", "categories/")
    }

    /// Per-language statistics.
    pub fn list_languages(&mut self) -> Result<Paginated<LanguageStats>> {
        self.list_related("languages_url", "languages/")
    }

    /// Aggregate statistics.
    pub fn statistics(&mut self) -> Result<Statistics> {
        self.get_related("statistics_url", "statistics/")
    }

    /// Create a component inside this project.
    ///
    /// `params` is sent as the JSON body; the server validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::WeblateError::Validation) with the
    /// server's field messages when the payload is refused.
    pub fn create_component<B: Serialize + ?Sized>(&mut self, params: &B) -> Result<Component> {
        let url = self.link("components_list_url", "components/")?;
        let reply = self.transport().post(&url, params)?;
        Component::from_value(self.transport().clone(), reply)
    }

    /// Download every component beneath `dir`.
    ///
    /// Stops at the first component that fails.
    pub fn download_to(&mut self, dir: &Path, convert: Option<&str>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for component in self.list_components()? {
            written.push(component?.download_to(dir, convert)?);
        }
        Ok(written)
    }
}
