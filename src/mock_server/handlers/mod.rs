//! HTTP request handlers for the mock server.

pub mod components;
pub mod objects;
pub mod projects;
pub mod resources;
pub mod translations;

pub use components::*;
pub use objects::*;
pub use projects::*;
pub use resources::*;
pub use translations::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::state::{MockState, Scope};

/// Query parameters accepted by listings and downloads.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub q: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPath {
    pub project: String,
}

#[derive(Debug, Deserialize)]
pub struct ComponentPath {
    pub project: String,
    pub component: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslationPath {
    pub project: String,
    pub component: String,
    pub language: String,
}

impl From<ProjectPath> for Scope {
    fn from(path: ProjectPath) -> Self {
        Scope::Project(path.project)
    }
}

impl From<ComponentPath> for Scope {
    fn from(path: ComponentPath) -> Self {
        Scope::Component(path.project, path.component)
    }
}

impl From<TranslationPath> for Scope {
    fn from(path: TranslationPath) -> Self {
        Scope::Translation(path.project, path.component, path.language)
    }
}

pub(crate) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

/// Validation failure on one field, in the server's error layout.
pub(crate) fn invalid(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "type": "validation_error",
            "errors": [{ "code": "invalid", "detail": message, "attr": field }],
        })),
    )
        .into_response()
}

/// One page of `items` as a JSON response.
pub(crate) fn listing(state: &MockState, path: &str, items: Vec<Value>, query: &ListQuery) -> Response {
    let search: Vec<(&str, &str)> = query.q.as_deref().map(|q| ("q", q)).into_iter().collect();
    Json(state.paginate(path, &search, items, query.page.unwrap_or(1))).into_response()
}
