//! Translation model.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, WeblateError};
use crate::models::resource::write_beneath;
use crate::models::{
    Component, Language, Resource, Schema, Statistics, Unit, UploadOptions, UploadResult,
};
use crate::pagination::Paginated;
use crate::sanitize::sanitize_slug_path;
use crate::traits::{HasChanges, HasRepository};
use crate::transport::{decode, Download};

/// Schema of a Weblate translation (one language of one component).
#[derive(Debug, Clone, Copy)]
pub struct TranslationSchema;

impl Schema for TranslationSchema {
    const KIND: &'static str = "Translation";
    const FIELDS: &'static [&'static str] = &[
        "url",
        "web_url",
        "language",
        "component",
        "language_code",
        "filename",
        "revision",
        "is_template",
        "total",
        "total_words",
        "translated",
        "translated_words",
        "translated_percent",
        "fuzzy",
        "fuzzy_percent",
        "failing_checks",
        "failing_checks_percent",
        "have_suggestion",
        "have_comment",
        "last_change",
        "last_author",
        "share_url",
        "translate_url",
    ];
    const OPTIONALS: &'static [&'static str] = &[
        "web_url",
        "revision",
        "is_template",
        "total_words",
        "translated_words",
        "translated_percent",
        "fuzzy_percent",
        "failing_checks",
        "failing_checks_percent",
        "have_suggestion",
        "have_comment",
        "last_change",
        "last_author",
        "share_url",
        "translate_url",
    ];
    const ID: &'static str = "language_code";
    const NESTED: &'static [(&'static str, &'static str)] =
        &[("language", "code"), ("component", "slug")];
}

impl HasRepository for TranslationSchema {}
impl HasChanges for TranslationSchema {}

/// A Weblate translation.
pub type Translation = Resource<TranslationSchema>;

impl Resource<TranslationSchema> {
    pub fn language_code(&self) -> Result<&str> {
        self.str_field("language_code")
    }

    pub fn language(&self) -> Result<Language> {
        self.nested("language")
    }

    /// The component this translation belongs to.
    pub fn component(&self) -> Result<Component> {
        self.nested("component")
    }

    /// Slug path used on the command line (`hello/weblate/cs`).
    pub fn full_slug(&self) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.component()?.full_slug()?,
            self.language_code()?
        ))
    }

    /// Units, optionally filtered with a search query (`q`).
    pub fn list_units(&mut self, query: Option<&str>) -> Result<Paginated<Unit>> {
        let units = self.list_related("units_list_url", "units/")?;
        Ok(match query {
            Some(q) => units.with_query(vec![("q".to_string(), q.to_string())]),
            None => units,
        })
    }

    pub fn statistics(&mut self) -> Result<Statistics> {
        self.get_related("statistics_url", "statistics/")
    }

    /// Download the translation file, optionally converted by the server.
    pub fn download(&mut self, convert: Option<&str>) -> Result<Download> {
        let url = self.link("file_url", "file/")?;
        let query = convert.map(|format| [("format", format)]);
        self.transport().download(&url, query.as_ref())
    }

    /// Download to `dir/<project>/<component>/<file name>`.
    ///
    /// The file name is the one the server suggests, else the language code
    /// with the extension of the requested format or of the stored file.
    /// Every path segment is validated before anything is written.
    pub fn download_to(&mut self, dir: &Path, convert: Option<&str>) -> Result<PathBuf> {
        let component = self.component()?;
        let project = component.project()?;
        let download = self.download(convert)?;
        let filename = match download.filename {
            Some(name) => name,
            None => self.fallback_filename(convert)?,
        };
        let relative =
            sanitize_slug_path([project.slug()?, component.slug()?, filename.as_str()])?;
        write_beneath(dir, &relative, &download.content)
    }

    fn fallback_filename(&self, convert: Option<&str>) -> Result<String> {
        let code = self.language_code()?;
        let stored = self.data().get("filename").and_then(Value::as_str);
        let extension = convert.or_else(|| {
            stored
                .and_then(|name| Path::new(name).extension())
                .and_then(|ext| ext.to_str())
        });
        Ok(match extension {
            Some(ext) => format!("{code}.{ext}"),
            None => code.to_string(),
        })
    }

    /// Upload a translation file.
    ///
    /// # Errors
    ///
    /// A reply without the expected counts is reported as
    /// [`UploadRejected`](WeblateError::UploadRejected) carrying the server
    /// detail, or the decoding error when there is none.
    pub fn upload(&mut self, content: &[u8], options: &UploadOptions) -> Result<UploadResult> {
        let url = self.link("file_url", "file/")?;
        let filename = self
            .data()
            .get("filename")
            .and_then(Value::as_str)
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let reply =
            self.transport()
                .upload(&url, content, "file", &filename, &options.to_fields())?;
        let detail = reply
            .get("detail")
            .and_then(Value::as_str)
            .map(str::to_string);
        decode(reply).map_err(|err| {
            WeblateError::UploadRejected(detail.unwrap_or_else(|| err.to_string()))
        })
    }
}
