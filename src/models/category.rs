//! Category model.

use crate::error::Result;
use crate::models::{Project, Resource, Schema};

/// Schema of a component category. Categories nest through `category`.
#[derive(Debug, Clone, Copy)]
pub struct CategorySchema;

impl Schema for CategorySchema {
    const KIND: &'static str = "Category";
    const FIELDS: &'static [&'static str] = &["url", "name", "slug", "project", "category"];
    const OPTIONALS: &'static [&'static str] = &["category"];
    const ID: &'static str = "slug";
    const NESTED: &'static [(&'static str, &'static str)] =
        &[("project", "slug"), ("category", "slug")];
}

/// A category grouping components of a project.
pub type Category = Resource<CategorySchema>;

impl Resource<CategorySchema> {
    pub fn slug(&self) -> Result<&str> {
        self.str_field("slug")
    }

    pub fn name(&self) -> Result<&str> {
        self.str_field("name")
    }

    /// The owning project.
    pub fn project(&self) -> Result<Project> {
        self.nested("project")
    }

    /// The enclosing category, if this one is nested.
    pub fn parent(&self) -> Result<Option<Category>> {
        match self.data().get("category") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self.nested("category").map(Some),
        }
    }
}
