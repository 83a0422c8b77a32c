//! Capabilities shared by several resource kinds.
//!
//! A kind opts in by implementing the marker trait on its schema
//! ([`HasRepository`], [`HasChanges`]); the operation trait is then
//! available on its [`Resource`](crate::Resource).

mod changes;
mod repository;

pub use changes::{Changes, HasChanges};
pub use repository::{HasRepository, Repository};
