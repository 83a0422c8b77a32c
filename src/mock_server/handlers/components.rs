//! Component endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{invalid, listing, not_found, ListQuery};
use crate::mock_server::state::{Scope, SharedState};

/// GET /api/components/
pub async fn list_components(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let components = state
        .components
        .values()
        .map(|c| state.component_json(c))
        .collect();
    listing(&state, "components/", components, &query)
}

/// GET /api/components/{project}/{component}/translations/
pub async fn list_component_translations(
    State(state): State<SharedState>,
    Path((project, component)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.components.contains_key(&(project.clone(), component.clone())) {
        return not_found();
    }
    let translations = state.translations_in(&project, &component);
    listing(
        &state,
        &format!("components/{project}/{component}/translations/"),
        translations,
        &query,
    )
}

/// POST /api/components/{project}/{component}/translations/
///
/// Replies with the new translation wrapped in `data`.
pub async fn add_translation(
    State(state): State<SharedState>,
    Path((project, component)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(code) = body.get("language_code").and_then(Value::as_str) else {
        return invalid("language_code", "This field is required.");
    };
    let mut state = state.write().await;
    if !state.languages.contains_key(code) {
        return invalid("language_code", "No language code found.");
    }
    let key = (project, component);
    if state
        .translations
        .contains_key(&(key.0.clone(), key.1.clone(), code.to_string()))
    {
        return invalid("language_code", "Translation already exists.");
    }
    match state.add_translation(&key, code) {
        Some(translation) => (
            StatusCode::CREATED,
            Json(json!({ "data": translation })),
        )
            .into_response(),
        None => not_found(),
    }
}

/// GET /api/components/{project}/{component}/screenshots/
pub async fn list_component_screenshots(
    State(state): State<SharedState>,
    Path((project, component)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.components.contains_key(&(project.clone(), component.clone())) {
        return not_found();
    }
    listing(
        &state,
        &format!("components/{project}/{component}/screenshots/"),
        Vec::new(),
        &query,
    )
}

/// GET /api/components/{project}/{component}/statistics/
///
/// One statistics object per translation.
pub async fn component_statistics(
    State(state): State<SharedState>,
    Path((project, component)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.components.contains_key(&(project.clone(), component.clone())) {
        return not_found();
    }
    let stats = state
        .translations
        .keys()
        .filter(|key| key.0 == project && key.1 == component)
        .map(|key| {
            state.statistics_json(&Scope::Translation(
                key.0.clone(),
                key.1.clone(),
                key.2.clone(),
            ))
        })
        .collect();
    listing(
        &state,
        &format!("components/{project}/{component}/statistics/"),
        stats,
        &query,
    )
}

/// GET /api/components/{project}/{component}/lock/
pub async fn get_lock(
    State(state): State<SharedState>,
    Path(key): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    match state.components.get(&key) {
        Some(component) => Json(json!({ "locked": component.locked })).into_response(),
        None => not_found(),
    }
}

/// POST /api/components/{project}/{component}/lock/
pub async fn post_lock(
    State(state): State<SharedState>,
    Path(key): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(lock) = body.get("lock").and_then(Value::as_bool) else {
        return invalid("lock", "Must be a valid boolean.");
    };
    let mut state = state.write().await;
    match state.set_locked(&key, lock) {
        Some(locked) => Json(json!({ "locked": locked })).into_response(),
        None => not_found(),
    }
}

/// GET /api/components/{project}/{component}/file/
///
/// All translation files of the component in one archive.
pub async fn download_component(
    State(state): State<SharedState>,
    Path((project, component)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    if !state.components.contains_key(&(project.clone(), component.clone())) {
        return not_found();
    }
    let mut archive = b"PK\x03\x04".to_vec();
    for translation in state
        .translations
        .values()
        .filter(|t| t.project == project && t.component == component)
    {
        archive.extend_from_slice(translation.filename.as_bytes());
        archive.push(0);
        archive.extend_from_slice(&translation.content);
    }
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{project}-{component}.zip\""),
            ),
        ],
        archive,
    )
        .into_response()
}
