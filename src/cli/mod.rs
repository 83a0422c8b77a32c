//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the wlc
//! binary and the dispatcher that runs a parsed command.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_SECTION;
use crate::models::{Conflicts, FuzzyMode, UploadMethod};
use crate::output::Format;

pub use commands::run;

/// Weblate command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "wlc",
    about = "Weblate <https://weblate.org/> command line utility.",
    version
)]
pub struct Cli {
    /// Output format to use.
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Print HTTP communication details to stderr.
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Path to configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Configuration section to use.
    #[arg(short = 's', long, default_value = DEFAULT_SECTION)]
    pub config_section: String,

    /// API key, bound to the API URL in use.
    #[arg(short = 'k', long, env = "WLC_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// API URL.
    #[arg(short = 'u', long, env = "WLC_URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Object a command operates on.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Object on which we should operate (project, project/component or
    /// project/component/language).
    pub object: Option<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prints program version.
    Version {
        /// Print only the version number.
        #[arg(long)]
        bare: bool,
    },

    /// Lists all projects.
    ListProjects,

    /// Lists all components (optionally per project).
    ListComponents(Target),

    /// Lists all translations (optionally per component).
    ListTranslations(Target),

    /// Lists all languages.
    ListLanguages,

    /// Shows translation, component or project.
    Show(Target),

    /// Deletes translation, component or project.
    Delete(Target),

    /// Lists content of translation, component or project.
    Ls(Target),

    /// Commits changes in translation, component or project.
    Commit(Target),

    /// Pushes changes from Weblate to the repository.
    Push(Target),

    /// Pulls changes from the repository to Weblate.
    Pull(Target),

    /// Resets all changes in the Weblate repository to upstream.
    Reset(Target),

    /// Cleans up all untracked changes in the Weblate repository.
    Cleanup(Target),

    /// Displays status of the Weblate repository.
    Repo(Target),

    /// Displays list of changes.
    Changes(Target),

    /// Displays statistics.
    Stats(Target),

    /// Shows component lock status.
    LockStatus(Target),

    /// Locks component from translation.
    Lock(Target),

    /// Unlocks component for translation.
    Unlock(Target),

    /// Downloads translation file.
    Download {
        #[command(flatten)]
        target: Target,

        /// Convert file format on server (defaults to none).
        #[arg(short = 'c', long)]
        convert: Option<String>,

        /// File where to store output (defaults to stdout).
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Directory where to store files, at any object level.
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },

    /// Uploads translation file.
    Upload {
        #[command(flatten)]
        target: Target,

        /// File to upload (defaults to stdin).
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Overwrite existing translations.
        #[arg(long)]
        overwrite: bool,

        /// Author name, to override currently authenticated user.
        #[arg(long)]
        author_name: Option<String>,

        /// Author email, to override currently authenticated user.
        #[arg(long)]
        author_email: Option<String>,

        /// How to merge uploaded strings.
        #[arg(long, value_enum, default_value_t = UploadMethod::Translate)]
        method: UploadMethod,

        /// Handling of strings needing edit.
        #[arg(long, value_enum)]
        fuzzy: Option<FuzzyMode>,

        /// Which existing translations may be replaced.
        #[arg(long, value_enum)]
        conflicts: Option<Conflicts>,
    },
}
