//! Component model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::resource::{join_url, write_beneath};
use crate::models::{Project, Resource, Schema, Screenshot, Statistics, Translation};
use crate::pagination::Paginated;
use crate::sanitize::sanitize_slug_path;
use crate::traits::{HasChanges, HasRepository};
use crate::transport::{decode, Download};

/// Schema of a Weblate component.
///
/// A component is one translatable resource (usually one set of files in a
/// repository) inside a project.
#[derive(Debug, Clone, Copy)]
pub struct ComponentSchema;

impl Schema for ComponentSchema {
    const KIND: &'static str = "Component";
    const FIELDS: &'static [&'static str] = &[
        "url",
        "web_url",
        "name",
        "slug",
        "project",
        "category",
        "source_language",
        "vcs",
        "repo",
        "git_export",
        "branch",
        "filemask",
        "template",
        "new_base",
        "file_format",
        "license",
        "license_url",
    ];
    const OPTIONALS: &'static [&'static str] = &[
        "web_url",
        "category",
        "source_language",
        "git_export",
        "template",
        "new_base",
        "license",
        "license_url",
    ];
    const ID: &'static str = "slug";
    const NESTED: &'static [(&'static str, &'static str)] = &[
        ("project", "slug"),
        ("category", "slug"),
        ("source_language", "code"),
    ];
}

impl HasRepository for ComponentSchema {}
impl HasChanges for ComponentSchema {}

/// A Weblate component.
pub type Component = Resource<ComponentSchema>;

/// Whether a component accepts translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    pub locked: bool,
}

impl Resource<ComponentSchema> {
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

    /// Slug path used on the command line (`hello/weblate`).
    pub fn full_slug(&self) -> Result<String> {
        let project = self.project()?;
        Ok(format!("{}/{}", project.slug()?, self.slug()?))
    }

    /// Translations of this component.
    pub fn list_translations(&mut self) -> Result<Paginated<Translation>> {
        self.list_related("translations_url", "translations/")
    }

    /// Screenshots attached to this component.
    pub fn list_screenshots(&mut self) -> Result<Paginated<Screenshot>> {
        self.list_related("screenshots_url", "screenshots/")
    }

    /// Statistics, one entry per translation.
    pub fn statistics(&mut self) -> Result<Paginated<Statistics>> {
        self.list_related("statistics_url", "statistics/")
    }

    pub fn lock_status(&mut self) -> Result<LockStatus> {
        self.get_related("lock_url", "lock/")
    }

    /// Prevent further translation.
    pub fn lock(&mut self) -> Result<LockStatus> {
        self.set_lock(true)
    }

    pub fn unlock(&mut self) -> Result<LockStatus> {
        self.set_lock(false)
    }

    fn set_lock(&mut self, lock: bool) -> Result<LockStatus> {
        let url = self.link("lock_url", "lock/")?;
        decode(self.transport().post(&url, &json!({ "lock": lock }))?)
    }

    /// Start a new translation for `language_code`.
    pub fn add_translation(&mut self, language_code: &str) -> Result<Translation> {
        let url = self.link("translations_url", "translations/")?;
        let reply = self
            .transport()
            .post(&url, &json!({ "language_code": language_code }))?;
        // Newer servers wrap the created object in "data".
        let object = match reply {
            Value::Object(mut map) if map.contains_key("data") && !map.contains_key("url") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        Translation::from_value(self.transport().clone(), object)
    }

    /// Download all translations as a ZIP archive.
    pub fn download(&self, convert: Option<&str>) -> Result<Download> {
        let url = join_url(self.url(), "file/");
        let query = convert.map(|format| [("format", format)]);
        self.transport().download(&url, query.as_ref())
    }

    /// Download the archive to `dir/<project>/<file name>`.
    ///
    /// The file name is the one the server suggests, else `<component>.zip`.
    /// Every path segment is validated before anything is written.
    pub fn download_to(&self, dir: &Path, convert: Option<&str>) -> Result<PathBuf> {
        let project = self.project()?;
        let download = self.download(convert)?;
        let filename = match download.filename {
            Some(name) => name,
            None => format!("{}.zip", self.slug()?),
        };
        let relative = sanitize_slug_path([project.slug()?, filename.as_str()])?;
        write_beneath(dir, &relative, &download.content)
    }
}
