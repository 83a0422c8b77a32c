//! Change history.

use crate::error::Result;
use crate::models::{Change, Resource, Schema};
use crate::pagination::Paginated;

/// Kinds with a change history endpoint.
pub trait HasChanges: Schema {}

/// Access to the change history of an object.
pub trait Changes {
    /// Lazily list changes, newest first as ordered by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be determined.
    fn list_changes(&mut self) -> Result<Paginated<Change>>;
}

impl<S: HasChanges> Changes for Resource<S> {
    fn list_changes(&mut self) -> Result<Paginated<Change>> {
        self.list_related("changes_list_url", "changes/")
    }
}
