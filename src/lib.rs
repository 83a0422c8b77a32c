//! Weblate API client library.
//!
//! A Rust library for the Weblate REST API, plus the `wlc` command-line
//! tool built on top of it. Every call is one blocking HTTP round trip.
//!
//! # Quick Start
//!
//! ```no_run
//! use wlc::{Changes, Repository, Weblate};
//!
//! fn main() -> wlc::Result<()> {
//!     let weblate = Weblate::new("https://hosted.weblate.org/api/", "your-api-key")?;
//!
//!     // List all projects, fetching pages as needed
//!     for project in weblate.list_projects() {
//!         let project = project?;
//!         println!("{}", project.name()?);
//!     }
//!
//!     // Look up an object by its slug path
//!     let mut translation = weblate.get_translation("hello", "weblate", "cs")?;
//!     println!("{} strings", translation.u64_field("total")?);
//!
//!     // Repository maintenance and history
//!     translation.commit()?;
//!     for change in translation.list_changes()? {
//!         println!("{}", change?.action_name()?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Transport`] sends requests: scoped API keys, retries and error
//!   classification.
//! - [`Resource`] wraps one JSON object of a kind described by a
//!   [`Schema`]; [`Project`], [`Component`], [`Translation`] and the other
//!   kinds are aliases of it.
//! - [`Repository`] and [`Changes`] are capabilities shared by several kinds.
//! - [`Paginated`] lazily walks list endpoints.
//!
//! # Configuration
//!
//! [`Config::load`] reads `weblate.ini` style files. API keys live in the
//! `[keys]` section and are only ever sent to the URL they are listed for.

pub mod classify;
pub mod cli;
mod client;
pub mod config;
mod error;
mod models;
pub mod output;
mod pagination;
mod retry;
pub mod sanitize;
mod traits;
mod transport;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::Weblate;
pub use config::Config;
pub use error::{ErrorKind, FieldMessage, Result, WeblateError};
pub use pagination::{fetch_page, FromListing, Page, Paginated};
pub use retry::{Failure, RetryPolicy};
pub use transport::{Credential, Credentials, Download, RawResponse, Transport};

// Re-export traits
pub use traits::{Changes, HasChanges, HasRepository, Repository};

// Re-export models
pub use models::{
    // Generic resource
    Resource,
    Schema,
    Object,
    // Resource kinds
    Category,
    CategorySchema,
    Change,
    ChangeSchema,
    Component,
    ComponentSchema,
    Language,
    LanguageSchema,
    Project,
    ProjectSchema,
    Screenshot,
    ScreenshotSchema,
    Translation,
    TranslationSchema,
    Unit,
    UnitSchema,
    UnitState,
    // Action results
    LanguageStats,
    LockStatus,
    OperationResult,
    RepositoryOperation,
    RepositoryStatus,
    Statistics,
    // Uploads
    Conflicts,
    FuzzyMode,
    UploadMethod,
    UploadOptions,
    UploadResult,
};
