//! Languages, units, changes and screenshots.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{invalid, listing, not_found, ListQuery};
use crate::mock_server::state::{MockLanguage, SharedState};

/// Parameters for creating a language.
#[derive(Debug, Deserialize)]
pub struct CreateLanguageParams {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "ltr".to_string()
}

/// Body of a unit update.
#[derive(Debug, Deserialize)]
pub struct UpdateUnitParams {
    pub target: Option<Vec<String>>,
    pub state: Option<u8>,
}

/// GET /api/languages/
pub async fn list_languages(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let languages = state
        .languages
        .values()
        .map(|l| state.language_json(l))
        .collect();
    listing(&state, "languages/", languages, &query)
}

/// GET /api/languages/{code}/
pub async fn get_language(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.languages.get(&code) {
        Some(language) => Json(state.language_json(language)).into_response(),
        None => not_found(),
    }
}

/// POST /api/languages/
pub async fn create_language(
    State(state): State<SharedState>,
    Json(params): Json<CreateLanguageParams>,
) -> Response {
    let (Some(code), Some(name)) = (params.code, params.name) else {
        return invalid("code", "This field is required.");
    };
    let mut state = state.write().await;
    if state.languages.contains_key(&code) {
        return invalid("code", "Language with this code already exists.");
    }
    let language = MockLanguage {
        code,
        name,
        direction: params.direction,
    };
    let value = state.language_json(&language);
    state.languages.insert(language.code.clone(), language);
    (StatusCode::CREATED, Json(value)).into_response()
}

/// GET /api/units/
pub async fn list_units(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let units = state.units.values().map(|u| state.unit_json(u)).collect();
    listing(&state, "units/", units, &query)
}

/// GET /api/units/{id}/
pub async fn get_unit(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let state = state.read().await;
    match state.units.get(&id) {
        Some(unit) => Json(state.unit_json(unit)).into_response(),
        None => not_found(),
    }
}

/// PATCH /api/units/{id}/
pub async fn update_unit(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(params): Json<UpdateUnitParams>,
) -> Response {
    if let Some(code) = params.state {
        if ![0, 10, 20, 30].contains(&code) {
            return invalid("state", &format!("\"{code}\" is not a valid choice."));
        }
    }
    let mut state = state.write().await;
    match state.translate_unit(id, params.target, params.state) {
        Some(unit) => Json(unit).into_response(),
        None => not_found(),
    }
}

/// GET /api/changes/
pub async fn list_changes(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let changes = state.changes_in(None);
    listing(&state, "changes/", changes, &query)
}

/// GET /api/screenshots/
pub async fn list_screenshots(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    listing(&state, "screenshots/", Vec::<Value>::new(), &query)
}
