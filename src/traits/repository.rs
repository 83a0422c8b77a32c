//! Version control operations.

use serde_json::json;

use crate::error::Result;
use crate::models::{OperationResult, RepositoryOperation, RepositoryStatus, Resource, Schema};
use crate::transport::decode;

/// Kinds backed by a repository endpoint.
pub trait HasRepository: Schema {}

/// Repository status and maintenance.
///
/// # Example
///
/// ```no_run
/// use wlc::{Repository, Weblate};
///
/// # fn example() -> wlc::Result<()> {
/// let weblate = Weblate::new("https://hosted.weblate.org/api/", "your-key")?;
/// let mut component = weblate.get_component("hello", "weblate")?;
/// if component.repository()?.needs_commit {
///     component.commit()?;
/// }
/// # Ok(())
/// # }
/// ```
pub trait Repository {
    /// Current repository state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn repository(&mut self) -> Result<RepositoryStatus>;

    /// Run one maintenance operation.
    ///
    /// The server answers with `{"result": bool}`; a `false` result is
    /// returned as-is, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn repository_operation(&mut self, operation: RepositoryOperation) -> Result<OperationResult>;

    /// Commit pending changes.
    fn commit(&mut self) -> Result<OperationResult> {
        self.repository_operation(RepositoryOperation::Commit)
    }

    /// Push commits upstream.
    fn push(&mut self) -> Result<OperationResult> {
        self.repository_operation(RepositoryOperation::Push)
    }

    /// Pull upstream changes.
    fn pull(&mut self) -> Result<OperationResult> {
        self.repository_operation(RepositoryOperation::Pull)
    }

    /// Reset to the upstream state, discarding local changes.
    fn reset(&mut self) -> Result<OperationResult> {
        self.repository_operation(RepositoryOperation::Reset)
    }

    /// Remove untracked files.
    fn cleanup(&mut self) -> Result<OperationResult> {
        self.repository_operation(RepositoryOperation::Cleanup)
    }
}

impl<S: HasRepository> Repository for Resource<S> {
    fn repository(&mut self) -> Result<RepositoryStatus> {
        self.get_related("repository_url", "repository/")
    }

    #[tracing::instrument(skip(self), fields(url = %self.url()))]
    fn repository_operation(&mut self, operation: RepositoryOperation) -> Result<OperationResult> {
        let url = self.link("repository_url", "repository/")?;
        let reply = self
            .transport()
            .post(&url, &json!({ "operation": operation.as_str() }))?;
        decode(reply)
    }
}
