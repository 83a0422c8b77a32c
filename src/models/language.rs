//! Language model.

use crate::error::Result;
use crate::models::{Resource, Schema};

#[derive(Debug, Clone, Copy)]
pub struct LanguageSchema;

impl Schema for LanguageSchema {
    const KIND: &'static str = "Language";
    const FIELDS: &'static [&'static str] =
        &["url", "web_url", "code", "name", "direction", "population", "aliases"];
    const OPTIONALS: &'static [&'static str] = &["web_url", "population", "aliases"];
    const ID: &'static str = "code";
}

/// A language known to the server.
pub type Language = Resource<LanguageSchema>;

impl Resource<LanguageSchema> {
    pub fn code(&self) -> Result<&str> {
        self.str_field("code")
    }

    pub fn name(&self) -> Result<&str> {
        self.str_field("name")
    }

    /// Text direction, `ltr` or `rtl`.
    pub fn direction(&self) -> Result<&str> {
        self.str_field("direction")
    }
}
