//! Repository status and maintenance results.

use serde::{Deserialize, Serialize};

/// Version control state of a project, component or translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    /// Uncommitted changes are pending in Weblate.
    pub needs_commit: bool,

    /// Upstream changes wait to be merged.
    #[serde(default)]
    pub needs_merge: bool,

    /// Local commits wait to be pushed.
    #[serde(default)]
    pub needs_push: bool,

    /// Output of the VCS status command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Message of the last failed merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_failure: Option<String>,

    /// Remote commit the repository is based on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_commit: Option<String>,

    /// URL of this repository endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Outcome of a repository operation (commit, push, pull, reset, cleanup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub result: bool,

    /// Server explanation, usually present when `result` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Repository maintenance operations understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Commit,
    Push,
    Pull,
    Reset,
    Cleanup,
}

impl RepositoryOperation {
    /// Name sent in the `operation` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Reset => "reset",
            Self::Cleanup => "cleanup",
        }
    }
}
