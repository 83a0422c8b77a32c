//! Mock Weblate server for E2E testing.
//!
//! This module provides an in-memory server that simulates the Weblate REST
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server keeps state across requests, so a
//! commit shows up in the repository status and an upload in the changes.
//!
//! # Example
//!
//! ```ignore
//! use wlc::mock_server::MockServer;
//! use wlc::Weblate;
//!
//! #[tokio::test(flavor = "multi_thread")]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let url = server.url().to_string();
//!
//!     // Server comes with default fixtures
//!     let name = tokio::task::spawn_blocking(move || {
//!         let weblate = Weblate::new(&url, "").unwrap();
//!         weblate.get_project("hello").unwrap().name().unwrap().to_string()
//!     })
//!     .await
//!     .unwrap();
//!     assert_eq!(name, "Hello");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{
    ComponentKey, MockChange, MockComponent, MockLanguage, MockProject, MockState,
    MockTranslation, MockUnit, Scope, SharedState, TranslationKey,
};
