//! Project endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{invalid, listing, not_found, ListQuery};
use crate::mock_server::state::{MockProject, Scope, SharedState};

/// Parameters for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectParams {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub web: String,
}

/// GET /api/projects/
pub async fn list_projects(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let projects = state.projects.values().map(|p| state.project_json(p)).collect();
    listing(&state, "projects/", projects, &query)
}

/// POST /api/projects/
pub async fn create_project(
    State(state): State<SharedState>,
    Json(params): Json<CreateProjectParams>,
) -> Response {
    let (Some(name), Some(slug)) = (params.name, params.slug) else {
        return invalid("name", "This field is required.");
    };
    let mut state = state.write().await;
    match state.create_project(MockProject {
        name,
        slug,
        web: params.web,
    }) {
        Some(project) => (StatusCode::CREATED, Json(project)).into_response(),
        None => invalid("slug", "Project with this URL slug already exists."),
    }
}

/// GET /api/projects/{project}/components/
pub async fn list_project_components(
    State(state): State<SharedState>,
    Path(project): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.projects.contains_key(&project) {
        return not_found();
    }
    let components = state.components_in(&project);
    listing(&state, &format!("projects/{project}/components/"), components, &query)
}

/// GET /api/projects/{project}/categories/
pub async fn list_project_categories(
    State(state): State<SharedState>,
    Path(project): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.projects.contains_key(&project) {
        return not_found();
    }
    listing(&state, &format!("projects/{project}/categories/"), Vec::new(), &query)
}

/// GET /api/projects/{project}/languages/
///
/// A plain list, not a paginated envelope.
pub async fn list_project_languages(
    State(state): State<SharedState>,
    Path(project): Path<String>,
) -> Response {
    let state = state.read().await;
    if !state.projects.contains_key(&project) {
        return not_found();
    }
    Json(state.project_languages_json(&project)).into_response()
}

/// GET /api/projects/{project}/statistics/
pub async fn project_statistics(
    State(state): State<SharedState>,
    Path(project): Path<String>,
) -> Response {
    let state = state.read().await;
    if !state.projects.contains_key(&project) {
        return not_found();
    }
    Json(state.statistics_json(&Scope::Project(project))).into_response()
}
