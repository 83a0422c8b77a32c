//! HTTP transport for the Weblate API.
//!
//! Low-level client that handles URL resolution, scoped authentication,
//! retries and error classification. Resource-level operations live in the
//! model types.

use std::fmt;
use std::sync::Arc;
use std::thread;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::classify::{classify, classify_transport, decode_json, Reply};
use crate::error::{Result, WeblateError};
use crate::retry::{Failure, RetryPolicy};

const USER_AGENT: &str = concat!("wlc/", env!("CARGO_PKG_VERSION"));

/// An API key bound to one API base URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    base_url: Url,
    key: String,
}

impl Credential {
    /// Bind `key` to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute `http(s)` URL.
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base(base_url)?,
            key: key.to_string(),
        })
    }

    /// The URL this key belongs to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a request to `url` may carry this key.
    ///
    /// The origin (scheme, host, port) must be identical and the request
    /// path must lie below the base path.
    pub fn matches(&self, url: &Url) -> bool {
        self.base_url.origin() == url.origin() && url.path().starts_with(self.base_url.path())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// The set of known per-URL API keys.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    entries: Vec<Credential>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential, replacing any key for the same base URL.
    pub fn insert(&mut self, credential: Credential) {
        self.entries.retain(|c| c.base_url != credential.base_url);
        self.entries.push(credential);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, credential: Credential) -> Self {
        self.insert(credential);
        self
    }

    /// The key registered for the most specific base URL covering `url`.
    pub fn key_for(&self, url: &Url) -> Option<&str> {
        self.entries
            .iter()
            .filter(|c| c.matches(url))
            .max_by_key(|c| c.base_url.path().len())
            .map(|c| c.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A successful response with its body read into memory.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub attempts: u32,
}

/// Downloaded file content.
#[derive(Debug, Clone)]
pub struct Download {
    /// Raw bytes as served.
    pub content: Vec<u8>,
    /// File name suggested by the server, unvalidated.
    pub filename: Option<String>,
    /// Content type reported by the server.
    pub content_type: Option<String>,
}

/// Blocking HTTP transport for the Weblate API.
///
/// This struct is cheaply cloneable; clones share the same connection pool,
/// credentials and retry policy. It is meant for sequential use.
///
/// # Example
///
/// ```no_run
/// use wlc::{Credential, Credentials, RetryPolicy, Transport};
///
/// # fn example() -> wlc::Result<()> {
/// let credentials = Credentials::new()
///     .with(Credential::new("https://hosted.weblate.org/api/", "your-key")?);
/// let transport = Transport::new(
///     "https://hosted.weblate.org/api/",
///     credentials,
///     RetryPolicy::default(),
/// )?;
/// let projects = transport.get("projects/")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Transport {
    http: Client,
    base_url: Arc<Url>,
    credentials: Arc<Credentials>,
    policy: Arc<RetryPolicy>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Create a transport for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, credentials: Credentials, policy: RetryPolicy) -> Result<Self> {
        let base_url = normalize_base(base_url)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(policy.timeout)
            .build()
            .map_err(classify_transport)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            credentials: Arc::new(credentials),
            policy: Arc::new(policy),
        })
    }

    /// Get the base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Whether a key is known for the base URL.
    pub fn has_key(&self) -> bool {
        self.credentials.key_for(&self.base_url).is_some()
    }

    /// Turn an absolute URL or an API-relative path into a full URL.
    ///
    /// Relative paths are joined onto the base URL with exactly one `/`
    /// between them.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url> {
        match Url::parse(path_or_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
            Ok(url) => Err(WeblateError::Protocol(format!(
                "Unsupported URL scheme '{}' in {path_or_url}",
                url.scheme()
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let path = path_or_url.trim_start_matches('/');
                Ok(Url::parse(&format!("{}{path}", self.base_url))?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Make a request and decode the JSON response.
    ///
    /// An empty body decodes to `Value::Null`.
    pub fn request<Q, B>(
        &self,
        method: Method,
        path_or_url: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let response = self.request_raw(method, path_or_url, query, body)?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        decode_json(&response.body)
    }

    /// Make a request and return the raw response.
    pub fn request_raw<Q, B>(
        &self,
        method: Method,
        path_or_url: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path_or_url)?;
        self.execute(method, url, |request| {
            let request = match query {
                Some(q) => request.query(q),
                None => request,
            };
            match body {
                Some(b) => request.json(b),
                None => request,
            }
        })
    }

    /// Make a GET request.
    pub fn get(&self, path_or_url: &str) -> Result<Value> {
        self.request::<(), ()>(Method::GET, path_or_url, None, None)
    }

    /// Make a GET request with query parameters.
    pub fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path_or_url: &str,
        query: &Q,
    ) -> Result<Value> {
        self.request::<Q, ()>(Method::GET, path_or_url, Some(query), None)
    }

    /// Make a GET request and deserialize the body.
    pub fn get_as<T: DeserializeOwned>(&self, path_or_url: &str) -> Result<T> {
        decode(self.get(path_or_url)?)
    }

    /// Make a POST request with JSON body.
    pub fn post<B: Serialize + ?Sized>(&self, path_or_url: &str, body: &B) -> Result<Value> {
        self.request::<(), B>(Method::POST, path_or_url, None, Some(body))
    }

    /// Make a PUT request with JSON body.
    pub fn put<B: Serialize + ?Sized>(&self, path_or_url: &str, body: &B) -> Result<Value> {
        self.request::<(), B>(Method::PUT, path_or_url, None, Some(body))
    }

    /// Make a PATCH request with JSON body.
    pub fn patch<B: Serialize + ?Sized>(&self, path_or_url: &str, body: &B) -> Result<Value> {
        self.request::<(), B>(Method::PATCH, path_or_url, None, Some(body))
    }

    /// Make a DELETE request, discarding the body.
    pub fn delete(&self, path_or_url: &str) -> Result<()> {
        self.request_raw::<(), ()>(Method::DELETE, path_or_url, None, None)?;
        Ok(())
    }

    /// Download raw file content.
    pub fn download<Q: Serialize + ?Sized>(
        &self,
        path_or_url: &str,
        query: Option<&Q>,
    ) -> Result<Download> {
        let response = self.request_raw::<Q, ()>(Method::GET, path_or_url, query, None)?;
        let header = |name: HeaderName| {
            response
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Ok(Download {
            filename: header(CONTENT_DISPOSITION).and_then(|v| content_disposition_filename(&v)),
            content_type: header(CONTENT_TYPE),
            content: response.body,
        })
    }

    /// Upload a file as `multipart/form-data` and decode the JSON reply.
    ///
    /// The form is rebuilt for every attempt.
    pub fn upload(
        &self,
        path_or_url: &str,
        content: &[u8],
        field_name: &str,
        file_name: &str,
        fields: &[(String, String)],
    ) -> Result<Value> {
        let url = self.resolve(path_or_url)?;
        let response = self.execute(Method::POST, url, |request| {
            let part = multipart::Part::bytes(content.to_vec()).file_name(file_name.to_string());
            let form = fields.iter().fold(
                multipart::Form::new().part(field_name.to_string(), part),
                |form, (name, value)| form.text(name.clone(), value.clone()),
            );
            request.multipart(form)
        })?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        decode_json(&response.body)
    }

    /// Send a request, retrying according to the policy.
    fn execute<F>(&self, method: Method, url: Url, build: F) -> Result<RawResponse>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let key = self.credentials.key_for(&url);
        let mut attempt = 1;

        loop {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                tracing::debug!(?delay, attempt, "backing off before retry");
                thread::sleep(delay);
            }

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .timeout(self.policy.timeout)
                .header(ACCEPT, "application/json");
            if let Some(key) = key {
                request = request.header(AUTHORIZATION, format!("Token {key}"));
            }

            tracing::debug!(%method, %url, attempt, authenticated = key.is_some(), "sending request");

            let failure = match build(request).send().and_then(|r| {
                let status = r.status().as_u16();
                let headers = r.headers().clone();
                r.bytes().map(|body| (status, headers, body.to_vec()))
            }) {
                Ok((status, headers, body)) => {
                    tracing::debug!(%url, status, attempt, "received response");
                    let reply = Reply {
                        status,
                        body: &body,
                        url: url.as_str(),
                        attempts: attempt,
                    };
                    let Some(error) = classify(&reply) else {
                        return Ok(RawResponse {
                            status,
                            headers,
                            body,
                            attempts: attempt,
                        });
                    };
                    if !self.policy.should_retry(&method, Failure::Status(status), attempt) {
                        return Err(error);
                    }
                    Failure::Status(status)
                }
                Err(err) => {
                    tracing::debug!(%url, attempt, error = %err, "request failed without response");
                    if err.is_builder()
                        || !self.policy.should_retry(&method, Failure::Connection, attempt)
                    {
                        return Err(classify_transport(err));
                    }
                    Failure::Connection
                }
            };

            tracing::debug!(%method, %url, attempt, ?failure, "retrying request");
            attempt += 1;
        }
    }
}

/// Deserialize a decoded JSON value into a typed struct.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(WeblateError::from)
}

/// Parse an API base URL and make sure it ends with `/`.
fn normalize_base(base_url: &str) -> Result<Url> {
    let base_url_str = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    let url = Url::parse(&base_url_str)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WeblateError::Config(format!(
            "API URL must use http or https: {base_url}"
        )));
    }
    Ok(url)
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987) wins over `filename=`. The result is returned
/// as sent and must be validated before touching the file system.
fn content_disposition_filename(header: &str) -> Option<String> {
    let params: Vec<(String, String)> = split_params(header)
        .into_iter()
        .skip(1)
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            Some((name.trim().to_ascii_lowercase(), unquote(value.trim())))
        })
        .collect();

    if let Some((_, value)) = params.iter().find(|(name, _)| name == "filename*") {
        let encoded = value.split_once("''").map_or(value.as_str(), |(_, rest)| rest);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return Some(decoded.into_owned());
        }
    }

    params
        .into_iter()
        .find(|(name, _)| name == "filename")
        .map(|(_, value)| value)
}

/// Split a header value on `;` outside of quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (index, ch) in header.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&header[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

/// Strip surrounding quotes and resolve backslash escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> Transport {
        Transport::new(base, Credentials::new(), RetryPolicy::default()).unwrap()
    }

    #[test]
    fn test_transport_debug_hides_keys() {
        let credentials =
            Credentials::new().with(Credential::new("https://example.com/api/", "secret-key").unwrap());
        let transport =
            Transport::new("https://example.com/api", credentials, RetryPolicy::default()).unwrap();
        let debug = format!("{:?}", transport);
        assert!(debug.contains("Transport"));
        assert!(debug.contains("base_url"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let t1 = transport("https://example.com/api");
        let t2 = transport("https://example.com/api/");
        assert_eq!(t1.base_url().as_str(), t2.base_url().as_str());
    }

    #[test]
    fn test_resolve_single_slash() {
        let t = transport("https://example.com/api");
        for path in ["projects/", "/projects/", "//projects/"] {
            assert_eq!(
                t.resolve(path).unwrap().as_str(),
                "https://example.com/api/projects/"
            );
        }
    }

    #[test]
    fn test_resolve_absolute_verbatim() {
        let t = transport("https://example.com/api/");
        let url = "https://other.example.org/api/projects/?page=2";
        assert_eq!(t.resolve(url).unwrap().as_str(), url);
        assert!(t.resolve("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_base_url_scheme_checked() {
        assert!(Transport::new("ftp://example.com/", Credentials::new(), RetryPolicy::default())
            .is_err());
    }

    #[test]
    fn test_key_scoped_to_origin() {
        let credentials = Credentials::new()
            .with(Credential::new("https://example.com/api/", "one").unwrap())
            .with(Credential::new("https://other.example.com/api/", "two").unwrap());

        let url = Url::parse("https://example.com/api/projects/").unwrap();
        assert_eq!(credentials.key_for(&url), Some("one"));

        let url = Url::parse("https://other.example.com/api/projects/").unwrap();
        assert_eq!(credentials.key_for(&url), Some("two"));

        for foreign in [
            "http://example.com/api/projects/",
            "https://example.com:8443/api/projects/",
            "https://evil.example.net/api/projects/",
            "https://example.com.evil.net/api/",
        ] {
            let url = Url::parse(foreign).unwrap();
            assert_eq!(credentials.key_for(&url), None, "{foreign}");
        }
    }

    #[test]
    fn test_most_specific_key_wins() {
        let credentials = Credentials::new()
            .with(Credential::new("https://example.com/", "root").unwrap())
            .with(Credential::new("https://example.com/weblate/api/", "nested").unwrap());
        let url = Url::parse("https://example.com/weblate/api/projects/").unwrap();
        assert_eq!(credentials.key_for(&url), Some("nested"));
        let url = Url::parse("https://example.com/other/").unwrap();
        assert_eq!(credentials.key_for(&url), Some("root"));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"weblate-hello-cs.po\""),
            Some("weblate-hello-cs.po".to_string())
        );
        assert_eq!(
            content_disposition_filename("attachment; filename=plain.po"),
            Some("plain.po".to_string())
        );
        assert_eq!(
            content_disposition_filename(
                "attachment; filename=\"fallback.po\"; filename*=UTF-8''%C4%8De%C5%A1tina.po"
            ),
            Some("čeština.po".to_string())
        );
        assert_eq!(
            content_disposition_filename("attachment; filename=\"../evil.po\""),
            Some("../evil.po".to_string())
        );
        assert_eq!(content_disposition_filename("inline"), None);
    }

    #[test]
    fn test_content_disposition_quoted_separators() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"a;b.po\"; size=10"),
            Some("a;b.po".to_string())
        );
        assert_eq!(
            content_disposition_filename(r#"attachment; filename="say \"hi\".po""#),
            Some("say \"hi\".po".to_string())
        );
    }
}
