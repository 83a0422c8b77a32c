//! Mock server state management.
//!
//! Provides the in-memory Weblate instance served by the mock server. Objects
//! are stored in plain structs and rendered to API JSON on request, with
//! absolute URLs built from [`MockState::base_url`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

/// State shared between handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// Key of a component: project and component slug.
pub type ComponentKey = (String, String);

/// Key of a translation: project slug, component slug and language code.
pub type TranslationKey = (String, String, String);

#[derive(Debug, Clone, PartialEq)]
pub struct MockProject {
    pub name: String,
    pub slug: String,
    pub web: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockComponent {
    pub project: String,
    pub slug: String,
    pub name: String,
    pub filemask: String,
    pub file_format: String,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockTranslation {
    pub project: String,
    pub component: String,
    pub language: String,
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockLanguage {
    pub code: String,
    pub name: String,
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockUnit {
    pub id: u64,
    pub translation: TranslationKey,
    pub source: Vec<String>,
    pub target: Vec<String>,
    /// 0 empty, 10 needs editing, 20 translated, 30 approved.
    pub state: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockChange {
    pub id: u64,
    pub action_name: String,
    pub timestamp: String,
    pub translation: Option<TranslationKey>,
    pub component: Option<ComponentKey>,
}

/// Part of the tree an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Project(String),
    Component(String, String),
    Translation(String, String, String),
}

impl Scope {
    /// Whether the translation lies inside this scope.
    pub fn contains(&self, key: &TranslationKey) -> bool {
        match self {
            Scope::Project(project) => &key.0 == project,
            Scope::Component(project, component) => &key.0 == project && &key.1 == component,
            Scope::Translation(project, component, language) => {
                &key.0 == project && &key.1 == component && &key.2 == language
            }
        }
    }

    fn contains_component(&self, key: &ComponentKey) -> bool {
        match self {
            Scope::Project(project) => &key.0 == project,
            Scope::Component(project, component) => &key.0 == project && &key.1 == component,
            Scope::Translation(..) => false,
        }
    }

    /// API path of the scoped object, relative to the base URL.
    pub fn path(&self) -> String {
        match self {
            Scope::Project(project) => format!("projects/{project}/"),
            Scope::Component(project, component) => format!("components/{project}/{component}/"),
            Scope::Translation(project, component, language) => {
                format!("translations/{project}/{component}/{language}/")
            }
        }
    }
}

/// Shared state for the mock server.
///
/// Wrapped in `Arc<RwLock<_>>` for concurrent access; tests may inspect or
/// change it through [`MockServer::state`](super::MockServer::state).
#[derive(Debug)]
pub struct MockState {
    /// API root, e.g. `http://127.0.0.1:1234/api/`. Set when the server binds.
    pub base_url: String,

    pub projects: BTreeMap<String, MockProject>,
    pub components: BTreeMap<ComponentKey, MockComponent>,
    pub translations: BTreeMap<TranslationKey, MockTranslation>,
    pub languages: BTreeMap<String, MockLanguage>,
    pub units: BTreeMap<u64, MockUnit>,
    pub changes: Vec<MockChange>,

    /// Translations with changes not yet committed.
    pub uncommitted: BTreeSet<TranslationKey>,

    /// Translations with commits not yet pushed.
    pub unpushed: BTreeSet<TranslationKey>,

    /// Every repository operation received, as (object path, operation).
    pub operations: Vec<(String, String)>,

    /// Form fields sent with the last upload, besides the file.
    pub upload_fields: Vec<(String, String)>,

    /// Refuse pushes with a failed operation result.
    pub push_disabled: bool,

    /// Items per listing page.
    pub page_size: usize,

    /// Optional authentication token. If set, requests must include this token.
    pub required_token: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            projects: BTreeMap::new(),
            components: BTreeMap::new(),
            translations: BTreeMap::new(),
            languages: BTreeMap::new(),
            units: BTreeMap::new(),
            changes: Vec::new(),
            uncommitted: BTreeSet::new(),
            unpushed: BTreeSet::new(),
            operations: Vec::new(),
            upload_fields: Vec::new(),
            push_disabled: false,
            page_size: 20,
            required_token: None,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn with_project(mut self, project: MockProject) -> Self {
        self.projects.insert(project.slug.clone(), project);
        self
    }

    pub fn with_component(mut self, component: MockComponent) -> Self {
        self.components.insert(
            (component.project.clone(), component.slug.clone()),
            component,
        );
        self
    }

    pub fn with_translation(mut self, translation: MockTranslation) -> Self {
        self.translations.insert(
            (
                translation.project.clone(),
                translation.component.clone(),
                translation.language.clone(),
            ),
            translation,
        );
        self
    }

    pub fn with_language(mut self, language: MockLanguage) -> Self {
        self.languages.insert(language.code.clone(), language);
        self
    }

    pub fn with_unit(mut self, unit: MockUnit) -> Self {
        self.units.insert(unit.id, unit);
        self
    }

    pub fn with_change(mut self, change: MockChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Set the number of items per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn project_json(&self, project: &MockProject) -> Value {
        let path = Scope::Project(project.slug.clone()).path();
        json!({
            "name": project.name,
            "slug": project.slug,
            "web": project.web,
            "source_language": self.source_language_json(),
            "web_url": format!("{}projects/{}/", self.web_root(), project.slug),
            "url": self.absolute(&path),
            "components_list_url": self.absolute(&format!("{path}components/")),
            "repository_url": self.absolute(&format!("{path}repository/")),
            "statistics_url": self.absolute(&format!("{path}statistics/")),
            "changes_list_url": self.absolute(&format!("{path}changes/")),
            "languages_url": self.absolute(&format!("{path}languages/")),
        })
    }

    pub fn component_json(&self, component: &MockComponent) -> Value {
        let path = Scope::Component(component.project.clone(), component.slug.clone()).path();
        let project = self
            .projects
            .get(&component.project)
            .map_or(Value::Null, |project| self.project_json(project));
        json!({
            "name": component.name,
            "slug": component.slug,
            "project": project,
            "vcs": "git",
            "repo": format!("https://git.example.com/{}.git", component.project),
            "git_export": "",
            "branch": "main",
            "filemask": component.filemask,
            "template": "",
            "new_base": "",
            "file_format": component.file_format,
            "license": "MIT",
            "license_url": "https://spdx.org/licenses/MIT.html",
            "source_language": self.source_language_json(),
            "web_url": format!("{}projects/{}/{}/", self.web_root(), component.project, component.slug),
            "url": self.absolute(&path),
            "repository_url": self.absolute(&format!("{path}repository/")),
            "translations_url": self.absolute(&format!("{path}translations/")),
            "statistics_url": self.absolute(&format!("{path}statistics/")),
            "lock_url": self.absolute(&format!("{path}lock/")),
            "changes_list_url": self.absolute(&format!("{path}changes/")),
            "screenshots_url": self.absolute(&format!("{path}screenshots/")),
        })
    }

    pub fn translation_json(&self, translation: &MockTranslation) -> Value {
        let key = (
            translation.project.clone(),
            translation.component.clone(),
            translation.language.clone(),
        );
        let path = Scope::Translation(key.0.clone(), key.1.clone(), key.2.clone()).path();
        let component = self
            .components
            .get(&(key.0.clone(), key.1.clone()))
            .map_or(Value::Null, |component| self.component_json(component));
        let language = self
            .languages
            .get(&translation.language)
            .map_or(Value::Null, |language| self.language_json(language));
        let mut object = self.counts_json(&Scope::Translation(key.0, key.1, key.2));
        if let Value::Object(map) = &mut object {
            for (name, value) in [
                ("language", language),
                ("component", component),
                ("language_code", json!(translation.language)),
                ("filename", json!(translation.filename)),
                ("revision", json!("")),
                ("is_template", json!(false)),
                ("web_url", json!(format!("{}{}", self.web_root(), path))),
                ("url", json!(self.absolute(&path))),
                ("repository_url", json!(self.absolute(&format!("{path}repository/")))),
                ("file_url", json!(self.absolute(&format!("{path}file/")))),
                ("statistics_url", json!(self.absolute(&format!("{path}statistics/")))),
                ("changes_list_url", json!(self.absolute(&format!("{path}changes/")))),
                ("units_list_url", json!(self.absolute(&format!("{path}units/")))),
            ] {
                map.insert(name.to_string(), value);
            }
        }
        object
    }

    pub fn language_json(&self, language: &MockLanguage) -> Value {
        json!({
            "code": language.code,
            "name": language.name,
            "direction": language.direction,
            "web_url": format!("{}languages/{}/", self.web_root(), language.code),
            "url": self.absolute(&format!("languages/{}/", language.code)),
        })
    }

    pub fn unit_json(&self, unit: &MockUnit) -> Value {
        let (project, component, language) = &unit.translation;
        json!({
            "translation": self.absolute(&format!("translations/{project}/{component}/{language}/")),
            "source": unit.source,
            "previous_source": "",
            "target": unit.target,
            "id_hash": unit.id * 7919,
            "content_hash": unit.id * 104_729,
            "location": "",
            "context": "",
            "note": "",
            "flags": "",
            "state": unit.state,
            "fuzzy": unit.state == 10,
            "translated": unit.state >= 20,
            "approved": unit.state == 30,
            "position": unit.id,
            "has_suggestion": false,
            "has_comment": false,
            "has_failing_check": false,
            "num_words": unit.source.iter().map(|s| s.split_whitespace().count()).sum::<usize>(),
            "priority": 100,
            "id": unit.id,
            "explanation": "",
            "extra_flags": "",
            "web_url": format!("{}translate/{project}/{component}/{language}/?checksum={}", self.web_root(), unit.id),
            "source_unit": self.absolute(&format!("units/{}/", unit.id)),
            "pending": false,
            "timestamp": "2024-03-01T09:30:00Z",
            "url": self.absolute(&format!("units/{}/", unit.id)),
        })
    }

    pub fn change_json(&self, change: &MockChange) -> Value {
        let translation = change.translation.as_ref().map(|(p, c, l)| {
            self.absolute(&format!("translations/{p}/{c}/{l}/"))
        });
        let component = change
            .component
            .clone()
            .or_else(|| {
                change
                    .translation
                    .as_ref()
                    .map(|(p, c, _)| (p.clone(), c.clone()))
            })
            .map(|(p, c)| self.absolute(&format!("components/{p}/{c}/")));
        json!({
            "unit": null,
            "component": component,
            "translation": translation,
            "user": null,
            "author": null,
            "timestamp": change.timestamp,
            "action": 0,
            "target": "",
            "id": change.id,
            "action_name": change.action_name,
            "url": self.absolute(&format!("changes/{}/", change.id)),
        })
    }

    fn source_language_json(&self) -> Value {
        match self.languages.get("en") {
            Some(language) => self.language_json(language),
            None => Value::Null,
        }
    }

    fn web_root(&self) -> String {
        self.base_url.trim_end_matches("api/").to_string()
    }

    /// Unit counts over a scope, in the statistics layout.
    pub fn counts_json(&self, scope: &Scope) -> Value {
        let units: Vec<&MockUnit> = self
            .units
            .values()
            .filter(|unit| scope.contains(&unit.translation))
            .collect();
        let total = units.len() as u64;
        let translated = units.iter().filter(|unit| unit.state >= 20).count() as u64;
        let fuzzy = units.iter().filter(|unit| unit.state == 10).count() as u64;
        let total_words: u64 = units.iter().map(|unit| words(unit)).sum();
        let translated_words: u64 = units
            .iter()
            .filter(|unit| unit.state >= 20)
            .map(|unit| words(unit))
            .sum();
        json!({
            "total": total,
            "total_words": total_words,
            "translated": translated,
            "translated_words": translated_words,
            "translated_percent": percent(translated, total),
            "fuzzy": fuzzy,
            "fuzzy_percent": percent(fuzzy, total),
            "failing_checks": 0,
            "failing_checks_percent": 0.0,
            "have_suggestion": 0,
            "have_comment": 0,
            "last_change": self.last_change(scope),
            "last_author": null,
        })
    }

    /// Statistics object of a scope, with the object's name and URL.
    pub fn statistics_json(&self, scope: &Scope) -> Value {
        let mut stats = self.counts_json(scope);
        if let Value::Object(map) = &mut stats {
            let (name, code) = match scope {
                Scope::Project(project) => (project.clone(), None),
                Scope::Component(project, component) => (format!("{project}/{component}"), None),
                Scope::Translation(_, _, language) => (
                    self.languages
                        .get(language)
                        .map_or_else(|| language.clone(), |l| l.name.clone()),
                    Some(language.clone()),
                ),
            };
            map.insert("name".to_string(), json!(name));
            if let Some(code) = code {
                map.insert("code".to_string(), json!(code));
            }
            map.insert("url".to_string(), json!(self.absolute(&scope.path())));
        }
        stats
    }

    /// Per-language statistics of a project.
    pub fn project_languages_json(&self, project: &str) -> Vec<Value> {
        let codes: BTreeSet<&String> = self
            .translations
            .keys()
            .filter(|key| key.0 == project)
            .map(|key| &key.2)
            .collect();
        codes
            .into_iter()
            .map(|code| {
                let units: Vec<&MockUnit> = self
                    .units
                    .values()
                    .filter(|unit| unit.translation.0 == project && &unit.translation.2 == code)
                    .collect();
                let total = units.len() as u64;
                let translated = units.iter().filter(|unit| unit.state >= 20).count() as u64;
                json!({
                    "language": self.languages.get(code).map_or(code.as_str(), |l| l.name.as_str()),
                    "code": code,
                    "total": total,
                    "translated": translated,
                    "translated_percent": percent(translated, total),
                    "total_words": 0,
                    "translated_words": 0,
                    "words_percent": 0.0,
                })
            })
            .collect()
    }

    fn last_change(&self, scope: &Scope) -> Option<String> {
        self.changes
            .iter()
            .rev()
            .find(|change| {
                change
                    .translation
                    .as_ref()
                    .is_some_and(|key| scope.contains(key))
            })
            .map(|change| change.timestamp.clone())
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Wrap `items` in the paginated envelope for `page` of `path`.
    ///
    /// `query` is repeated in the `next` and `previous` links.
    pub fn paginate(&self, path: &str, query: &[(&str, &str)], items: Vec<Value>, page: usize) -> Value {
        let size = self.page_size.max(1);
        let page = page.max(1);
        let count = items.len();
        let start = (page - 1) * size;
        let results: Vec<Value> = items.into_iter().skip(start).take(size).collect();
        let link = |page: usize| {
            let mut url = self.absolute(path);
            url.push('?');
            for (name, value) in query {
                url.push_str(&format!("{name}={}&", urlencoding::encode(value)));
            }
            url.push_str(&format!("page={page}"));
            url
        };
        json!({
            "count": count,
            "next": (start + size < count).then(|| link(page + 1)),
            "previous": (page > 1).then(|| link(page - 1)),
            "results": results,
        })
    }

    pub fn components_in(&self, project: &str) -> Vec<Value> {
        self.components
            .values()
            .filter(|component| component.project == project)
            .map(|component| self.component_json(component))
            .collect()
    }

    pub fn translations_in(&self, project: &str, component: &str) -> Vec<Value> {
        self.translations
            .values()
            .filter(|t| t.project == project && t.component == component)
            .map(|t| self.translation_json(t))
            .collect()
    }

    /// Units of a translation, optionally filtered by a search string.
    pub fn units_in(&self, key: &TranslationKey, search: Option<&str>) -> Vec<Value> {
        self.units
            .values()
            .filter(|unit| &unit.translation == key)
            .filter(|unit| {
                search.map_or(true, |q| {
                    unit.source.iter().chain(&unit.target).any(|s| s.contains(q))
                })
            })
            .map(|unit| self.unit_json(unit))
            .collect()
    }

    /// Changes recorded inside a scope; `None` lists all of them.
    pub fn changes_in(&self, scope: Option<&Scope>) -> Vec<Value> {
        self.changes
            .iter()
            .filter(|change| match scope {
                None => true,
                Some(scope) => {
                    change.translation.as_ref().is_some_and(|key| scope.contains(key))
                        || change
                            .component
                            .as_ref()
                            .is_some_and(|key| scope.contains_component(key))
                }
            })
            .map(|change| self.change_json(change))
            .collect()
    }

    /// Whether the scoped object exists.
    pub fn exists(&self, scope: &Scope) -> bool {
        match scope {
            Scope::Project(project) => self.projects.contains_key(project),
            Scope::Component(project, component) => self
                .components
                .contains_key(&(project.clone(), component.clone())),
            Scope::Translation(project, component, language) => self.translations.contains_key(&(
                project.clone(),
                component.clone(),
                language.clone(),
            )),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn record_change(&mut self, action_name: &str, translation: Option<TranslationKey>, component: Option<ComponentKey>) {
        let id = self.changes.iter().map(|change| change.id).max().unwrap_or(0) + 1;
        self.changes.push(MockChange {
            id,
            action_name: action_name.to_string(),
            timestamp: "2024-03-01T09:30:00Z".to_string(),
            translation,
            component,
        });
    }

    /// Repository status of a scope.
    pub fn repository_json(&self, scope: &Scope) -> Value {
        let needs_commit = self.uncommitted.iter().any(|key| scope.contains(key));
        let needs_push = self.unpushed.iter().any(|key| scope.contains(key));
        let mut status = json!({
            "needs_commit": needs_commit,
            "needs_merge": false,
            "needs_push": needs_push,
        });
        if !matches!(scope, Scope::Project(_)) {
            if let Value::Object(map) = &mut status {
                map.insert("merge_failure".to_string(), Value::Null);
                map.insert("remote_commit".to_string(), json!("0123456 Initial commit"));
                map.insert("status".to_string(), json!("On branch main\nnothing to commit"));
                map.insert("url".to_string(), json!(self.absolute(&format!("{}repository/", scope.path()))));
            }
        }
        status
    }

    /// Apply a repository operation to a scope.
    pub fn repository_operation(&mut self, scope: &Scope, operation: &str) -> Value {
        self.operations.push((scope.path(), operation.to_string()));
        match operation {
            "commit" => {
                let committed: Vec<TranslationKey> = self
                    .uncommitted
                    .iter()
                    .filter(|key| scope.contains(key))
                    .cloned()
                    .collect();
                for key in committed {
                    self.uncommitted.remove(&key);
                    self.record_change("Committed changes", Some(key.clone()), None);
                    self.unpushed.insert(key);
                }
                json!({ "result": true })
            }
            "push" if self.push_disabled => {
                json!({ "result": false, "detail": "Push is disabled." })
            }
            "push" => {
                self.unpushed.retain(|key| !scope.contains(key));
                json!({ "result": true })
            }
            "reset" => {
                self.uncommitted.retain(|key| !scope.contains(key));
                self.unpushed.retain(|key| !scope.contains(key));
                json!({ "result": true })
            }
            "pull" | "cleanup" => json!({ "result": true }),
            other => json!({ "result": false, "detail": format!("Unsupported operation: {other}") }),
        }
    }

    /// Set the lock flag of a component.
    pub fn set_locked(&mut self, key: &ComponentKey, locked: bool) -> Option<bool> {
        let component = self.components.get_mut(key)?;
        component.locked = locked;
        let action = if locked { "Component locked" } else { "Component unlocked" };
        self.record_change(action, None, Some(key.clone()));
        Some(locked)
    }

    /// Store an uploaded translation file.
    ///
    /// Returns `None` for an unknown translation.
    pub fn upload(
        &mut self,
        key: &TranslationKey,
        content: Vec<u8>,
        fields: Vec<(String, String)>,
    ) -> Option<Value> {
        let translation = self.translations.get_mut(key)?;
        translation.content = content;
        self.upload_fields = fields;
        let total = self.units.values().filter(|unit| &unit.translation == key).count();
        self.uncommitted.insert(key.clone());
        self.record_change("Uploaded file", Some(key.clone()), None);
        Some(json!({
            "result": true,
            "not_found": 0,
            "skipped": 0,
            "accepted": total,
            "total": total,
            "count": total,
        }))
    }

    /// Change the target strings and state of a unit.
    pub fn translate_unit(&mut self, id: u64, target: Option<Vec<String>>, state: Option<u8>) -> Option<Value> {
        let unit = self.units.get_mut(&id)?;
        if let Some(target) = target {
            unit.target = target;
        }
        if let Some(state) = state {
            unit.state = state;
        }
        let key = unit.translation.clone();
        self.uncommitted.insert(key.clone());
        self.record_change("Translation changed", Some(key), None);
        self.units.get(&id).map(|unit| self.unit_json(unit))
    }

    /// Remove an object and everything beneath it.
    pub fn delete(&mut self, scope: &Scope) -> bool {
        if !self.exists(scope) {
            return false;
        }
        if let Scope::Project(project) = scope {
            self.projects.remove(project);
        }
        self.components.retain(|key, _| !scope.contains_component(key));
        self.translations.retain(|key, _| !scope.contains(key));
        self.units.retain(|_, unit| !scope.contains(&unit.translation));
        self.uncommitted.retain(|key| !scope.contains(key));
        self.unpushed.retain(|key| !scope.contains(key));
        true
    }

    /// Create a project; `None` when the slug is taken.
    pub fn create_project(&mut self, project: MockProject) -> Option<Value> {
        if self.projects.contains_key(&project.slug) {
            return None;
        }
        let value = self.project_json(&project);
        self.projects.insert(project.slug.clone(), project);
        Some(value)
    }

    /// Start a new translation of a component.
    pub fn add_translation(&mut self, key: &ComponentKey, language: &str) -> Option<Value> {
        let component = self.components.get(key)?;
        let filename = component.filemask.replace('*', language);
        let translation = MockTranslation {
            project: key.0.clone(),
            component: key.1.clone(),
            language: language.to_string(),
            filename,
            content: Vec::new(),
        };
        let value = self.translation_json(&translation);
        self.translations.insert(
            (key.0.clone(), key.1.clone(), language.to_string()),
            translation,
        );
        Some(value)
    }
}

fn words(unit: &MockUnit) -> u64 {
    unit.source
        .iter()
        .map(|s| s.split_whitespace().count() as u64)
        .sum()
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}
