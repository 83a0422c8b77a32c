//! Shared wiremock harness.
//!
//! The client is blocking, so the mock server lives on its own runtime and
//! the tests call the client from the plain test thread.

#![allow(dead_code)]

use serde_json::{json, Value};
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

use wlc::{Credential, Credentials, RetryPolicy, Transport, Weblate};

pub struct Harness {
    // Dropped before the runtime.
    pub server: MockServer,
    rt: Runtime,
}

impl Harness {
    pub fn start() -> Self {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// API root of the mock, ending in `/api/`.
    pub fn api(&self) -> String {
        format!("{}/api/", self.server.uri())
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.server.uri())
    }

    pub fn weblate(&self, key: &str) -> Weblate {
        Weblate::new(&self.api(), key).unwrap()
    }

    /// Client with `retries` retries and no backoff.
    pub fn weblate_with_retries(&self, retries: u32) -> Weblate {
        let policy = RetryPolicy::with_retries(retries);
        Weblate::with_policy(&self.api(), "", policy).unwrap()
    }

    /// Client holding keys for several hosts.
    pub fn weblate_with_keys(&self, keys: &[(&str, &str)]) -> Weblate {
        let credentials = keys.iter().fold(Credentials::new(), |credentials, (url, key)| {
            credentials.with(Credential::new(url, key).unwrap())
        });
        let transport = Transport::new(&self.api(), credentials, RetryPolicy::default()).unwrap();
        Weblate::from_transport(transport)
    }

    pub fn received(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    /// Wrap `results` in a paginated envelope.
    pub fn page(&self, results: Vec<Value>, next: Option<&str>) -> Value {
        json!({
            "count": results.len(),
            "next": next.map(|path| self.url(path)),
            "previous": null,
            "results": results,
        })
    }

    pub fn project(&self, slug: &str) -> Value {
        json!({
            "name": slug.to_uppercase(),
            "slug": slug,
            "web": "https://example.com/",
            "url": self.url(&format!("projects/{slug}/")),
            "web_url": format!("{}/projects/{slug}/", self.server.uri()),
            "components_list_url": self.url(&format!("projects/{slug}/components/")),
            "repository_url": self.url(&format!("projects/{slug}/repository/")),
            "changes_list_url": self.url(&format!("projects/{slug}/changes/")),
        })
    }

    pub fn component(&self, project: &str, slug: &str) -> Value {
        json!({
            "name": slug,
            "slug": slug,
            "project": self.project(project),
            "vcs": "git",
            "repo": "https://example.com/repo.git",
            "branch": "main",
            "filemask": "po/*.po",
            "file_format": "po",
            "url": self.url(&format!("components/{project}/{slug}/")),
            "translations_url": self.url(&format!("components/{project}/{slug}/translations/")),
            "lock_url": self.url(&format!("components/{project}/{slug}/lock/")),
            "repository_url": self.url(&format!("components/{project}/{slug}/repository/")),
        })
    }

    pub fn translation(&self, project: &str, component: &str, language: &str) -> Value {
        let path = format!("translations/{project}/{component}/{language}/");
        json!({
            "language": { "code": language, "name": language, "direction": "ltr", "url": self.url(&format!("languages/{language}/")) },
            "component": self.component(project, component),
            "language_code": language,
            "filename": format!("po/{language}.po"),
            "total": 4,
            "translated": 2,
            "fuzzy": 0,
            "url": self.url(&path),
            "file_url": self.url(&format!("{path}file/")),
            "units_list_url": self.url(&format!("{path}units/")),
            "repository_url": self.url(&format!("{path}repository/")),
            "statistics_url": self.url(&format!("{path}statistics/")),
        })
    }
}
