//! Generic resource wrapper shared by every Weblate object kind.
//!
//! A [`Resource`] holds the JSON object the server returned and the URL it
//! lives at. What differs between kinds (declared fields, identifier, nested
//! objects) is described by a [`Schema`] implemented on a marker type.

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, WeblateError};
use crate::pagination::{FromListing, Paginated};
use crate::sanitize::SafeRelativePath;
use crate::transport::{decode, Transport};

/// Per-kind description of a resource.
pub trait Schema: 'static {
    /// Human readable kind name.
    const KIND: &'static str;
    /// Declared fields, in display order.
    const FIELDS: &'static [&'static str];
    /// Declared fields the server may leave out.
    const OPTIONALS: &'static [&'static str] = &[];
    /// Field that identifies the object to a user.
    const ID: &'static str;
    /// Fields holding inlined objects, with the key that identifies them.
    const NESTED: &'static [(&'static str, &'static str)] = &[];
}

/// One Weblate object.
///
/// Field access never invents values: a field outside the schema, or absent
/// from the data, is an [`WeblateError::AttributeNotFound`].
pub struct Resource<S> {
    transport: Transport,
    url: String,
    data: Map<String, Value>,
    loaded: bool,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Clone for Resource<S> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            url: self.url.clone(),
            data: self.data.clone(),
            loaded: self.loaded,
            _schema: PhantomData,
        }
    }
}

impl<S: Schema> fmt::Debug for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(S::KIND)
            .field("url", &self.url)
            .field("data", &self.data)
            .finish()
    }
}

impl<S> fmt::Display for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.data.clone()))
    }
}

impl<S> Serialize for Resource<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> core::result::Result<Se::Ok, Se::Error> {
        self.data.serialize(serializer)
    }
}

impl<S: Schema> FromListing for Resource<S> {
    fn from_listing(transport: &Transport, value: Value) -> Result<Self> {
        Self::from_value(transport.clone(), value)
    }
}

impl<S: Schema> Resource<S> {
    /// Wrap a decoded response body. The object must carry its `url`.
    pub(crate) fn from_value(transport: Transport, value: Value) -> Result<Self> {
        let Value::Object(data) = value else {
            return Err(WeblateError::Protocol(format!(
                "expected a JSON object for {}",
                S::KIND
            )));
        };
        let url = data
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| WeblateError::Protocol(format!("{} without url", S::KIND)))?
            .to_string();
        Ok(Self {
            transport,
            url,
            data,
            loaded: false,
            _schema: PhantomData,
        })
    }

    /// A resource known only by URL; data arrives on [`refresh`](Self::refresh).
    pub(crate) fn lazy(transport: Transport, url: impl Into<String>) -> Self {
        let url = url.into();
        let mut data = Map::new();
        data.insert("url".to_string(), Value::String(url.clone()));
        Self {
            transport,
            url,
            data,
            loaded: false,
            _schema: PhantomData,
        }
    }

    /// Fetch a resource from `path_or_url`.
    pub(crate) fn fetch(transport: &Transport, path_or_url: &str) -> Result<Self> {
        let value = transport.get(path_or_url)?;
        let mut resource = Self::from_value(transport.clone(), value)?;
        resource.loaded = true;
        Ok(resource)
    }

    /// Kind name from the schema.
    pub fn kind(&self) -> &'static str {
        S::KIND
    }

    /// API URL of this object.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw data as returned by the server.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Whether the full object has been fetched from its own URL.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Read a declared field.
    pub fn field(&self, name: &str) -> Result<&Value> {
        if !S::FIELDS.contains(&name) {
            return Err(self.missing(name));
        }
        self.data.get(name).ok_or_else(|| self.missing(name))
    }

    /// Read a declared field, fetching the object first if it is absent.
    pub fn load_field(&mut self, name: &str) -> Result<&Value> {
        if !S::FIELDS.contains(&name) {
            return Err(self.missing(name));
        }
        self.ensure_loaded(name)?;
        self.field(name)
    }

    /// Read a declared string field.
    pub fn str_field(&self, name: &str) -> Result<&str> {
        let value = self.field(name)?;
        value
            .as_str()
            .ok_or_else(|| self.wrong_type(name, "a string", value))
    }

    /// Read a declared integer field.
    pub fn u64_field(&self, name: &str) -> Result<u64> {
        let value = self.field(name)?;
        value
            .as_u64()
            .ok_or_else(|| self.wrong_type(name, "an integer", value))
    }

    /// Read a declared boolean field.
    pub fn bool_field(&self, name: &str) -> Result<bool> {
        let value = self.field(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.wrong_type(name, "a boolean", value))
    }

    /// Refresh the object when `name` is not known yet.
    pub fn ensure_loaded(&mut self, name: &str) -> Result<()> {
        if !self.data.contains_key(name) && !self.loaded {
            self.refresh()?;
        }
        Ok(())
    }

    /// Make sure the whole object is present, not only its URL.
    pub fn ensure_complete(&mut self) -> Result<()> {
        if !self.loaded && self.data.len() <= 1 {
            self.refresh()?;
        }
        Ok(())
    }

    /// Read the object again from the server, replacing all data.
    #[tracing::instrument(skip(self), fields(kind = S::KIND, url = %self.url))]
    pub fn refresh(&mut self) -> Result<()> {
        let value = self.transport.get(&self.url)?;
        self.replace_data(value)
    }

    fn replace_data(&mut self, value: Value) -> Result<()> {
        let Value::Object(data) = value else {
            return Err(WeblateError::Protocol(format!(
                "expected a JSON object for {}",
                S::KIND
            )));
        };
        self.data = data;
        if !self.data.contains_key("url") {
            self.data
                .insert("url".to_string(), Value::String(self.url.clone()));
        }
        self.loaded = true;
        Ok(())
    }

    /// Declared fields present on this object, in schema order.
    pub fn keys(&self) -> Vec<&'static str> {
        S::FIELDS
            .iter()
            .copied()
            .filter(|name| !S::OPTIONALS.contains(name) || self.data.contains_key(*name))
            .collect()
    }

    /// Field/value pairs for display. Inlined objects are replaced by their
    /// identifying field; missing required fields show as null.
    pub fn record(&self) -> Vec<(String, Value)> {
        self.keys()
            .into_iter()
            .map(|name| {
                let value = self.data.get(name).cloned().unwrap_or(Value::Null);
                let value = match (value, nested_id::<S>(name)) {
                    (Value::Object(object), Some(id)) => {
                        object.get(id).cloned().unwrap_or(Value::Null)
                    }
                    (value, _) => value,
                };
                (name.to_string(), value)
            })
            .collect()
    }

    /// The identifying value (slug, code, id, ...).
    pub fn to_value(&self) -> Result<&Value> {
        self.field(S::ID)
    }

    /// Build the object stored in field `name`, inlined or by URL.
    pub fn nested<T: Schema>(&self, name: &str) -> Result<Resource<T>> {
        match self.field(name)? {
            Value::Object(object) => {
                Resource::from_value(self.transport.clone(), Value::Object(object.clone()))
            }
            Value::String(url) => Ok(Resource::lazy(self.transport.clone(), url.clone())),
            _ => Err(self.missing(name)),
        }
    }

    /// URL of a related endpoint.
    ///
    /// Uses the link the server sent (`link`), loading the object if needed,
    /// and falls back to `suffix` below the object URL.
    pub fn link(&mut self, link: &str, suffix: &str) -> Result<String> {
        self.ensure_loaded(link)?;
        if let Some(url) = self.data.get(link).and_then(Value::as_str) {
            return Ok(url.to_string());
        }
        Ok(join_url(&self.url, suffix))
    }

    /// Lazy listing of a related list endpoint.
    pub fn list_related<T: FromListing>(&mut self, link: &str, suffix: &str) -> Result<Paginated<T>> {
        let url = self.link(link, suffix)?;
        Ok(Paginated::new(self.transport.clone(), url))
    }

    /// Fetch a related endpoint and decode it.
    pub(crate) fn get_related<T: serde::de::DeserializeOwned>(
        &mut self,
        link: &str,
        suffix: &str,
    ) -> Result<T> {
        let url = self.link(link, suffix)?;
        decode(self.transport.get(&url)?)
    }

    /// Send a PATCH with `body` and take the reply as the new data.
    ///
    /// If the reply is not an object the resource is refreshed instead.
    pub fn patch<B: Serialize + ?Sized>(&mut self, body: &B) -> Result<()> {
        let reply = self.transport.patch(&self.url, body)?;
        if reply.is_object() {
            self.replace_data(reply)
        } else {
            self.refresh()
        }
    }

    /// Delete the object on the server.
    pub fn delete(self) -> Result<()> {
        self.transport.delete(&self.url)
    }

    fn missing(&self, name: &str) -> WeblateError {
        WeblateError::AttributeNotFound {
            kind: S::KIND,
            name: name.to_string(),
        }
    }

    fn wrong_type(&self, name: &str, expected: &str, value: &Value) -> WeblateError {
        WeblateError::Protocol(format!(
            "{}.{name} is not {expected}: {value}",
            S::KIND
        ))
    }
}

fn nested_id<S: Schema>(name: &str) -> Option<&'static str> {
    S::NESTED
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, id)| *id)
}

/// Join a path onto a URL with exactly one `/`, keeping a trailing slash.
pub(crate) fn join_url(base: &str, suffix: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    )
}

/// Write `content` to `relative` beneath `root`, creating directories.
pub(crate) fn write_beneath(root: &Path, relative: &SafeRelativePath, content: &[u8]) -> Result<PathBuf> {
    let path = relative.join_under(root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::retry::RetryPolicy;
    use crate::transport::Credentials;

    struct Sample;

    impl Schema for Sample {
        const KIND: &'static str = "Sample";
        const FIELDS: &'static [&'static str] = &["url", "name", "slug", "owner", "extra"];
        const OPTIONALS: &'static [&'static str] = &["extra"];
        const ID: &'static str = "slug";
        const NESTED: &'static [(&'static str, &'static str)] = &[("owner", "code")];
    }

    fn transport() -> Transport {
        Transport::new("http://127.0.0.1:8000/api/", Credentials::new(), RetryPolicy::default())
            .unwrap()
    }

    fn sample() -> Resource<Sample> {
        Resource::from_value(
            transport(),
            serde_json::json!({
                "url": "http://127.0.0.1:8000/api/samples/one/",
                "name": "One",
                "slug": "one",
                "owner": {"code": "cs", "name": "Czech"},
                "components_list_url": "http://127.0.0.1:8000/api/samples/one/parts/"
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_field_access() {
        let resource = sample();
        assert_eq!(resource.str_field("name").unwrap(), "One");
        assert_eq!(resource.to_value().unwrap(), "one");
        assert_eq!(resource.url(), "http://127.0.0.1:8000/api/samples/one/");
    }

    #[test]
    fn test_unknown_and_absent_fields() {
        let resource = sample();
        let err = resource.field("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeNotFound);
        // present in data, but not declared
        let err = resource.field("components_list_url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeNotFound);
        // declared, but absent
        let err = resource.field("extra").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeNotFound);
    }

    #[test]
    fn test_wrong_type_is_protocol_error() {
        let resource = sample();
        assert_eq!(
            resource.u64_field("name").unwrap_err().kind(),
            ErrorKind::Protocol
        );
    }

    #[test]
    fn test_keys_skip_absent_optionals() {
        let resource = sample();
        assert_eq!(resource.keys(), vec!["url", "name", "slug", "owner"]);
    }

    #[test]
    fn test_record_flattens_nested() {
        let record = sample().record();
        let owner = record.iter().find(|(k, _)| k == "owner").unwrap();
        assert_eq!(owner.1, Value::String("cs".to_string()));
    }

    #[test]
    fn test_nested_inline_object() {
        struct Owner;
        impl Schema for Owner {
            const KIND: &'static str = "Owner";
            const FIELDS: &'static [&'static str] = &["url", "code"];
            const ID: &'static str = "code";
        }
        let resource = Resource::<Sample>::from_value(
            transport(),
            serde_json::json!({
                "url": "http://127.0.0.1:8000/api/samples/one/",
                "owner": {"url": "http://127.0.0.1:8000/api/owners/cs/", "code": "cs"}
            }),
        )
        .unwrap();
        let owner: Resource<Owner> = resource.nested("owner").unwrap();
        assert_eq!(owner.str_field("code").unwrap(), "cs");

        let lazy = Resource::<Sample>::from_value(
            transport(),
            serde_json::json!({
                "url": "http://127.0.0.1:8000/api/samples/one/",
                "owner": "http://127.0.0.1:8000/api/owners/cs/"
            }),
        )
        .unwrap();
        let owner: Resource<Owner> = lazy.nested("owner").unwrap();
        assert_eq!(owner.url(), "http://127.0.0.1:8000/api/owners/cs/");
        assert!(!owner.is_loaded());
    }

    #[test]
    fn test_from_value_requires_object_with_url() {
        assert!(Resource::<Sample>::from_value(transport(), serde_json::json!([1])).is_err());
        assert!(Resource::<Sample>::from_value(transport(), serde_json::json!({"slug": "x"}))
            .is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://h/api/projects/hello/", "components/"),
            "http://h/api/projects/hello/components/"
        );
        assert_eq!(
            join_url("http://h/api/projects/hello", "/components/"),
            "http://h/api/projects/hello/components/"
        );
    }

    #[test]
    fn test_serialize_as_data() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["slug"], "one");
    }
}
