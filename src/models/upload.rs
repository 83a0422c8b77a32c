//! Translation file upload options and results.

use serde::{Deserialize, Serialize};

/// How uploaded strings are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UploadMethod {
    Translate,
    Approve,
    Suggest,
    Fuzzy,
    Replace,
}

impl UploadMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Approve => "approve",
            Self::Suggest => "suggest",
            Self::Fuzzy => "fuzzy",
            Self::Replace => "replace",
        }
    }
}

/// Handling of strings marked as needing edit in the uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FuzzyMode {
    Process,
    Approve,
}

impl FuzzyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Approve => "approve",
        }
    }
}

/// Which existing translations an upload may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Conflicts {
    Ignore,
    #[value(name = "replace-translated")]
    ReplaceTranslated,
    #[value(name = "replace-reviewed")]
    ReplaceReviewed,
}

impl Conflicts {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::ReplaceTranslated => "replace-translated",
            Self::ReplaceReviewed => "replace-reviewed",
        }
    }
}

/// Options sent along with an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub overwrite: bool,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub method: Option<UploadMethod>,
    pub fuzzy: Option<FuzzyMode>,
    pub conflicts: Option<Conflicts>,
}

impl UploadOptions {
    /// Form fields for the multipart request. Unset options are omitted.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        if self.overwrite {
            fields.push(("overwrite".to_string(), "yes".to_string()));
        }
        if let Some(name) = &self.author_name {
            fields.push(("author_name".to_string(), name.clone()));
        }
        if let Some(email) = &self.author_email {
            fields.push(("author_email".to_string(), email.clone()));
        }
        if let Some(method) = self.method {
            fields.push(("method".to_string(), method.as_str().to_string()));
        }
        if let Some(fuzzy) = self.fuzzy {
            fields.push(("fuzzy".to_string(), fuzzy.as_str().to_string()));
        }
        if let Some(conflicts) = self.conflicts {
            fields.push(("conflicts".to_string(), conflicts.as_str().to_string()));
        }
        fields
    }
}

/// Server summary of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub result: bool,
    /// Strings in the uploaded file.
    pub count: u64,
    /// Strings processed.
    pub total: u64,
    /// Strings imported.
    pub accepted: u64,
    /// Strings without a matching source.
    pub not_found: u64,
    /// Strings left untouched.
    pub skipped: u64,
}
