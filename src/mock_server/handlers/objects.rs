//! Endpoints shared by projects, components and translations.
//!
//! Each handler is generic over the path extractor, so one function serves
//! all three levels of the tree.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{invalid, listing, not_found, ListQuery};
use crate::mock_server::state::{MockState, Scope, SharedState};

fn object_json(state: &MockState, scope: &Scope) -> Option<Value> {
    match scope {
        Scope::Project(project) => state.projects.get(project).map(|p| state.project_json(p)),
        Scope::Component(project, component) => state
            .components
            .get(&(project.clone(), component.clone()))
            .map(|c| state.component_json(c)),
        Scope::Translation(project, component, language) => state
            .translations
            .get(&(project.clone(), component.clone(), language.clone()))
            .map(|t| state.translation_json(t)),
    }
}

/// GET /api/{level}/{...}/
pub async fn get_object<P>(
    State(state): State<SharedState>,
    Path(path): Path<P>,
) -> Response
where
    P: Into<Scope> + DeserializeOwned + Send,
{
    let state = state.read().await;
    match object_json(&state, &path.into()) {
        Some(object) => Json(object).into_response(),
        None => not_found(),
    }
}

/// DELETE /api/{level}/{...}/
pub async fn delete_object<P>(
    State(state): State<SharedState>,
    Path(path): Path<P>,
) -> Response
where
    P: Into<Scope> + DeserializeOwned + Send,
{
    let mut state = state.write().await;
    if state.delete(&path.into()) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

/// GET /api/{level}/{...}/repository/
pub async fn get_repository<P>(
    State(state): State<SharedState>,
    Path(path): Path<P>,
) -> Response
where
    P: Into<Scope> + DeserializeOwned + Send,
{
    let state = state.read().await;
    let scope = path.into();
    if !state.exists(&scope) {
        return not_found();
    }
    Json(state.repository_json(&scope)).into_response()
}

/// POST /api/{level}/{...}/repository/
pub async fn post_repository<P>(
    State(state): State<SharedState>,
    Path(path): Path<P>,
    Json(body): Json<Value>,
) -> Response
where
    P: Into<Scope> + DeserializeOwned + Send,
{
    let mut state = state.write().await;
    let scope = path.into();
    if !state.exists(&scope) {
        return not_found();
    }
    let Some(operation) = body.get("operation").and_then(Value::as_str) else {
        return invalid("operation", "This field is required.");
    };
    Json(state.repository_operation(&scope, operation)).into_response()
}

/// GET /api/{level}/{...}/changes/
pub async fn list_scoped_changes<P>(
    State(state): State<SharedState>,
    Path(path): Path<P>,
    Query(query): Query<ListQuery>,
) -> Response
where
    P: Into<Scope> + DeserializeOwned + Send,
{
    let state = state.read().await;
    let scope = path.into();
    if !state.exists(&scope) {
        return not_found();
    }
    let changes = state.changes_in(Some(&scope));
    listing(&state, &format!("{}changes/", scope.path()), changes, &query)
}
