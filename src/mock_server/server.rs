//! Mock Weblate API server.
//!
//! Provides an axum-based HTTP server that simulates the Weblate REST API
//! under `/api/`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers::{self, ComponentPath, ProjectPath, TranslationPath};
use super::state::{MockState, SharedState};

/// A mock Weblate server for testing.
///
/// The server runs in the background on a random port. The library client
/// is blocking, so drive it from `spawn_blocking` or from a thread that is
/// not inside the runtime.
pub struct MockServer {
    /// API root, ending in `/api/`.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with the default fixtures.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_state(mut state: MockState) -> Self {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{addr}/api/");
        state.base_url = url.clone();

        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        tracing::debug!(%url, "mock server listening");
        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// API root of the server, e.g. `http://127.0.0.1:4321/api/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn create_router(state: SharedState) -> Router {
        Router::new()
            // Projects
            .route(
                "/api/projects/",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/api/projects/:project/",
                get(handlers::get_object::<ProjectPath>)
                    .delete(handlers::delete_object::<ProjectPath>),
            )
            .route(
                "/api/projects/:project/components/",
                get(handlers::list_project_components),
            )
            .route(
                "/api/projects/:project/categories/",
                get(handlers::list_project_categories),
            )
            .route(
                "/api/projects/:project/languages/",
                get(handlers::list_project_languages),
            )
            .route(
                "/api/projects/:project/statistics/",
                get(handlers::project_statistics),
            )
            .route(
                "/api/projects/:project/repository/",
                get(handlers::get_repository::<ProjectPath>)
                    .post(handlers::post_repository::<ProjectPath>),
            )
            .route(
                "/api/projects/:project/changes/",
                get(handlers::list_scoped_changes::<ProjectPath>),
            )
            // Components
            .route("/api/components/", get(handlers::list_components))
            .route(
                "/api/components/:project/:component/",
                get(handlers::get_object::<ComponentPath>)
                    .delete(handlers::delete_object::<ComponentPath>),
            )
            .route(
                "/api/components/:project/:component/translations/",
                get(handlers::list_component_translations).post(handlers::add_translation),
            )
            .route(
                "/api/components/:project/:component/screenshots/",
                get(handlers::list_component_screenshots),
            )
            .route(
                "/api/components/:project/:component/statistics/",
                get(handlers::component_statistics),
            )
            .route(
                "/api/components/:project/:component/lock/",
                get(handlers::get_lock).post(handlers::post_lock),
            )
            .route(
                "/api/components/:project/:component/file/",
                get(handlers::download_component),
            )
            .route(
                "/api/components/:project/:component/repository/",
                get(handlers::get_repository::<ComponentPath>)
                    .post(handlers::post_repository::<ComponentPath>),
            )
            .route(
                "/api/components/:project/:component/changes/",
                get(handlers::list_scoped_changes::<ComponentPath>),
            )
            // Translations
            .route("/api/translations/", get(handlers::list_translations))
            .route(
                "/api/translations/:project/:component/:language/",
                get(handlers::get_object::<TranslationPath>)
                    .delete(handlers::delete_object::<TranslationPath>),
            )
            .route(
                "/api/translations/:project/:component/:language/units/",
                get(handlers::list_translation_units),
            )
            .route(
                "/api/translations/:project/:component/:language/statistics/",
                get(handlers::translation_statistics),
            )
            .route(
                "/api/translations/:project/:component/:language/file/",
                get(handlers::download_translation).post(handlers::upload_translation),
            )
            .route(
                "/api/translations/:project/:component/:language/repository/",
                get(handlers::get_repository::<TranslationPath>)
                    .post(handlers::post_repository::<TranslationPath>),
            )
            .route(
                "/api/translations/:project/:component/:language/changes/",
                get(handlers::list_scoped_changes::<TranslationPath>),
            )
            // Everything else
            .route(
                "/api/languages/",
                get(handlers::list_languages).post(handlers::create_language),
            )
            .route("/api/languages/:code/", get(handlers::get_language))
            .route("/api/units/", get(handlers::list_units))
            .route(
                "/api/units/:id/",
                get(handlers::get_unit).patch(handlers::update_unit),
            )
            .route("/api/changes/", get(handlers::list_changes))
            .route("/api/screenshots/", get(handlers::list_screenshots))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
            // Health check, never authenticated
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Reject requests without the configured `Token` authorization.
async fn require_token(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let required = state.read().await.required_token.clone();
    if let Some(token) = required {
        let provided = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let detail = match provided {
            None => Some("Authentication credentials were not provided."),
            Some(value) if value != format!("Token {token}") => Some("Invalid token."),
            Some(_) => None,
        };
        if let Some(detail) = detail {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response();
        }
    }
    next.run(request).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
