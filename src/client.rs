//! Weblate API client.
//!
//! Entry point of the library: builds the [`Transport`] and hands out
//! resources. Operations on a resource live on the resource itself.

use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{Result, WeblateError};
use crate::models::{
    Change, Component, Language, Object, Project, Screenshot, Translation, Unit,
};
use crate::pagination::Paginated;
use crate::retry::RetryPolicy;
use crate::sanitize::{sanitize_relative, validate_segment};
use crate::transport::{Credential, Credentials, Transport};

/// Weblate API client.
///
/// This struct is cheaply cloneable; clones and every resource they return
/// share one connection pool.
///
/// # Example
///
/// ```no_run
/// use wlc::Weblate;
///
/// # fn example() -> wlc::Result<()> {
/// let weblate = Weblate::new("https://hosted.weblate.org/api/", "your-api-key")?;
///
/// let mut component = weblate.get_component("hello", "weblate")?;
/// for translation in component.list_translations()? {
///     let translation = translation?;
///     println!("{}", translation.language_code()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Weblate {
    transport: Transport,
}

impl Weblate {
    /// Create a client for `url` authenticating with `key`.
    ///
    /// An empty key means anonymous access.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: &str, key: &str) -> Result<Self> {
        Self::with_policy(url, key, RetryPolicy::default())
    }

    /// Like [`new`](Self::new) with an explicit retry policy.
    pub fn with_policy(url: &str, key: &str, policy: RetryPolicy) -> Result<Self> {
        let mut credentials = Credentials::new();
        if !key.is_empty() {
            credentials.insert(Credential::new(url, key)?);
        }
        Ok(Self {
            transport: Transport::new(url, credentials, policy)?,
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(&config.url, config.credentials()?, config.retry.clone())?,
        })
    }

    /// Wrap an existing transport.
    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn list<T: crate::pagination::FromListing>(&self, path: &str) -> Paginated<T> {
        Paginated::new(self.transport.clone(), path)
    }

    pub fn list_projects(&self) -> Paginated<Project> {
        self.list("projects/")
    }

    pub fn list_components(&self) -> Paginated<Component> {
        self.list("components/")
    }

    pub fn list_translations(&self) -> Paginated<Translation> {
        self.list("translations/")
    }

    pub fn list_languages(&self) -> Paginated<Language> {
        self.list("languages/")
    }

    pub fn list_changes(&self) -> Paginated<Change> {
        self.list("changes/")
    }

    pub fn list_units(&self) -> Paginated<Unit> {
        self.list("units/")
    }

    pub fn list_screenshots(&self) -> Paginated<Screenshot> {
        self.list("screenshots/")
    }

    /// Get a project by slug.
    #[tracing::instrument(skip(self))]
    pub fn get_project(&self, project: &str) -> Result<Project> {
        Project::fetch(&self.transport, &object_path("projects", &[project])?)
    }

    /// Get a component by project and component slug.
    #[tracing::instrument(skip(self))]
    pub fn get_component(&self, project: &str, component: &str) -> Result<Component> {
        Component::fetch(
            &self.transport,
            &object_path("components", &[project, component])?,
        )
    }

    /// Get a translation by project slug, component slug and language code.
    #[tracing::instrument(skip(self))]
    pub fn get_translation(
        &self,
        project: &str,
        component: &str,
        language: &str,
    ) -> Result<Translation> {
        Translation::fetch(
            &self.transport,
            &object_path("translations", &[project, component, language])?,
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn get_unit(&self, id: u64) -> Result<Unit> {
        Unit::fetch(&self.transport, &format!("units/{id}/"))
    }

    #[tracing::instrument(skip(self))]
    pub fn get_language(&self, code: &str) -> Result<Language> {
        Language::fetch(&self.transport, &object_path("languages", &[code])?)
    }

    /// Look up `project`, `project/component` or
    /// `project/component/language`.
    ///
    /// # Errors
    ///
    /// Returns [`PathValidation`](WeblateError::PathValidation) for any other
    /// number of segments or for an unsafe segment.
    #[tracing::instrument(skip(self))]
    pub fn get_object(&self, path: &str) -> Result<Object> {
        let safe = sanitize_relative(path.trim_matches('/'))?;
        let parts: Vec<&str> = safe.segments().collect();
        match parts.as_slice() {
            [project] => self.get_project(project).map(Object::Project),
            [project, component] => self.get_component(project, component).map(Object::Component),
            [project, component, language] => self
                .get_translation(project, component, language)
                .map(Object::Translation),
            _ => Err(WeblateError::PathValidation {
                segment: path.to_string(),
                reason: "expected project[/component[/language]]",
            }),
        }
    }

    /// Create a project.
    pub fn create_project(&self, name: &str, slug: &str, website: &str) -> Result<Project> {
        let reply = self.transport.post(
            "projects/",
            &json!({ "name": name, "slug": slug, "web": website }),
        )?;
        Project::from_value(self.transport.clone(), reply)
    }

    /// Create a language from arbitrary server-side parameters.
    pub fn create_language<B: Serialize + ?Sized>(&self, params: &B) -> Result<Language> {
        let reply = self.transport.post("languages/", params)?;
        Language::from_value(self.transport.clone(), reply)
    }
}

/// API path for an object; every segment is validated and percent-encoded.
fn object_path(root: &str, segments: &[&str]) -> Result<String> {
    let mut path = format!("{root}/");
    for segment in segments {
        path.push_str(&urlencoding::encode(validate_segment(segment)?));
        path.push('/');
    }
    Ok(path)
}
