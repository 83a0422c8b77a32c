//! Translation endpoint handlers.

use std::path::Path as FilePath;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{invalid, listing, not_found, ListQuery};
use crate::mock_server::state::{Scope, SharedState, TranslationKey};

const UPLOAD_METHODS: &[&str] = &["translate", "approve", "suggest", "fuzzy", "replace", "source"];

/// GET /api/translations/
pub async fn list_translations(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let translations = state
        .translations
        .values()
        .map(|t| state.translation_json(t))
        .collect();
    listing(&state, "translations/", translations, &query)
}

/// GET /api/translations/{project}/{component}/{language}/units/
pub async fn list_translation_units(
    State(state): State<SharedState>,
    Path(key): Path<TranslationKey>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.translations.contains_key(&key) {
        return not_found();
    }
    let units = state.units_in(&key, query.q.as_deref());
    let path = format!("translations/{}/{}/{}/units/", key.0, key.1, key.2);
    listing(&state, &path, units, &query)
}

/// GET /api/translations/{project}/{component}/{language}/statistics/
pub async fn translation_statistics(
    State(state): State<SharedState>,
    Path((project, component, language)): Path<TranslationKey>,
) -> Response {
    let state = state.read().await;
    let scope = Scope::Translation(project, component, language);
    if !state.exists(&scope) {
        return not_found();
    }
    Json(state.statistics_json(&scope)).into_response()
}

/// GET /api/translations/{project}/{component}/{language}/file/
///
/// `format` converts the file; the mock only renames it.
pub async fn download_translation(
    State(state): State<SharedState>,
    Path(key): Path<TranslationKey>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let Some(translation) = state.translations.get(&key) else {
        return not_found();
    };
    let basename = FilePath::new(&translation.filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("translation.po");
    let filename = match &query.format {
        Some(format) => format!("{}.{format}", key.2),
        None => basename.to_string(),
    };
    (
        [
            (header::CONTENT_TYPE, "text/x-po; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        translation.content.clone(),
    )
        .into_response()
}

/// POST /api/translations/{project}/{component}/{language}/file/
pub async fn upload_translation(
    State(state): State<SharedState>,
    Path(key): Path<TranslationKey>,
    mut multipart: Multipart,
) -> Response {
    let mut content = None;
    let mut fields = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return invalid("file", &err.body_text()),
        };
        let name = field.name().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => return invalid(&name, &err.body_text()),
        };
        if name == "file" {
            content = Some(data.to_vec());
        } else {
            fields.push((name, String::from_utf8_lossy(&data).into_owned()));
        }
    }

    let Some(content) = content else {
        return invalid("file", "No file was submitted.");
    };
    if let Some((_, method)) = fields.iter().find(|(name, _)| name == "method") {
        if !UPLOAD_METHODS.contains(&method.as_str()) {
            return invalid("method", &format!("\"{method}\" is not a valid choice."));
        }
    }

    let mut state = state.write().await;
    let locked = state
        .components
        .get(&(key.0.clone(), key.1.clone()))
        .is_some_and(|component| component.locked);
    if locked {
        return (
            StatusCode::LOCKED,
            Json(json!({ "detail": "Component is locked." })),
        )
            .into_response();
    }
    match state.upload(&key, content, fields) {
        Some(result) => Json(result).into_response(),
        None => not_found(),
    }
}
