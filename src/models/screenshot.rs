//! Screenshot model.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::resource::write_beneath;
use crate::models::{Resource, Schema};
use crate::sanitize::sanitize_slug_path;
use crate::transport::Download;

#[derive(Debug, Clone, Copy)]
pub struct ScreenshotSchema;

impl Schema for ScreenshotSchema {
    const KIND: &'static str = "Screenshot";
    const FIELDS: &'static [&'static str] =
        &["url", "id", "name", "translation", "file_url", "units"];
    const OPTIONALS: &'static [&'static str] = &["units"];
    const ID: &'static str = "id";
}

/// A screenshot giving context to translators.
pub type Screenshot = Resource<ScreenshotSchema>;

impl Resource<ScreenshotSchema> {
    pub fn name(&self) -> Result<&str> {
        self.str_field("name")
    }

    /// Fetch the image.
    pub fn download(&mut self) -> Result<Download> {
        let url = self.link("file_url", "file/")?;
        self.transport().download::<()>(&url, None)
    }

    /// Save the image in `dir` under the server's file name, else
    /// `screenshot-<id>.png`.
    pub fn download_to(&mut self, dir: &Path) -> Result<PathBuf> {
        let download = self.download()?;
        let filename = match download.filename {
            Some(name) => name,
            None => format!("screenshot-{}.png", self.u64_field("id")?),
        };
        let relative = sanitize_slug_path([filename])?;
        write_beneath(dir, &relative, &download.content)
    }
}
