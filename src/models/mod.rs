//! Weblate API model types.

mod category;
mod change;
mod component;
mod language;
mod object;
mod project;
mod repository;
pub(crate) mod resource;
mod screenshot;
mod statistics;
mod translation;
mod unit;
mod upload;

pub use category::*;
pub use change::*;
pub use component::*;
pub use language::*;
pub use object::*;
pub use project::*;
pub use repository::*;
pub use resource::{Resource, Schema};
pub use screenshot::*;
pub use statistics::*;
pub use translation::*;
pub use unit::*;
pub use upload::*;
