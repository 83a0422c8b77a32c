//! Client configuration.
//!
//! Settings come from INI files, then from the environment and command line.
//! A file looks like:
//!
//! ```ini
//! [weblate]
//! url = https://hosted.weblate.org/api/
//! retries = 3
//! backoff_factor = 0.5
//! translation = hello/weblate
//!
//! [keys]
//! https://hosted.weblate.org/api/ = APIKEY
//! ```
//!
//! Only `=` separates names from values, so URLs work as names in `[keys]`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WeblateError};
use crate::retry::RetryPolicy;
use crate::transport::{Credential, Credentials};

/// API URL used when nothing is configured.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000/api/";

/// Section read by default.
pub const DEFAULT_SECTION: &str = "weblate";

const KEYS_SECTION: &str = "keys";
const LOCAL_NAMES: [&str; 3] = [".weblate", ".weblate.ini", "weblate.ini"];

/// Parsed INI content: sections with their entries, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
struct Ini {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl Ini {
    fn parse(text: &str, origin: &str) -> Result<Self> {
        let mut ini = Self::default();
        let mut current: Option<usize> = None;
        let mut last_key: Option<usize> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let continuation = raw.starts_with([' ', '\t']);
            if continuation {
                if let (Some(section), Some(key)) = (current, last_key) {
                    let value = &mut ini.sections[section].1[key].1;
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(line);
                    continue;
                }
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(ini.section_index(name.trim()));
                last_key = None;
                continue;
            }

            let Some(section) = current else {
                return Err(WeblateError::Config(format!(
                    "{origin}:{}: entry outside of a section",
                    number + 1
                )));
            };
            let Some((name, value)) = line.split_once('=') else {
                return Err(WeblateError::Config(format!(
                    "{origin}:{}: expected 'name = value'",
                    number + 1
                )));
            };
            let name = if ini.sections[section].0 == KEYS_SECTION {
                name.trim().to_string()
            } else {
                name.trim().to_ascii_lowercase()
            };
            last_key = Some(ini.set(section, name, value.trim().to_string()));
        }
        Ok(ini)
    }

    fn section_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.sections.iter().position(|(n, _)| n == name) {
            return index;
        }
        self.sections.push((name.to_string(), Vec::new()));
        self.sections.len() - 1
    }

    fn set(&mut self, section: usize, name: String, value: String) -> usize {
        let entries = &mut self.sections[section].1;
        if let Some(index) = entries.iter().position(|(n, _)| *n == name) {
            entries[index].1 = value;
            return index;
        }
        entries.push((name, value));
        entries.len() - 1
    }

    /// Later content overrides earlier, entry by entry.
    fn merge(&mut self, other: Ini) {
        for (name, entries) in other.sections {
            let section = self.section_index(&name);
            for (key, value) in entries {
                self.set(section, key, value);
            }
        }
    }

    fn section(&self, name: &str) -> &[(String, String)] {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map_or(&[], |(_, entries)| entries.as_slice())
    }

    fn get(&self, section: &str, name: &str) -> Option<&str> {
        self.section(section)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Effective client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Section the settings were read from.
    pub section: String,
    /// API URL.
    pub url: String,
    /// Retry and timeout settings.
    pub retry: RetryPolicy,
    /// Default object path for commands.
    pub translation: Option<String>,
    /// Per-URL keys from the `[keys]` section.
    pub keys: Vec<(String, String)>,
    /// Key bound to `url` only, from the environment or command line.
    pub key: Option<String>,
    /// Files that were read, in order.
    pub files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION.to_string(),
            url: DEFAULT_URL.to_string(),
            retry: RetryPolicy::default(),
            translation: None,
            keys: Vec::new(),
            key: None,
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `path`, only that file is read. Otherwise every file on the
    /// search path that exists is read, later ones overriding earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` does not exist, or if any file
    /// is malformed.
    pub fn load(path: Option<&Path>, section: &str) -> Result<Self> {
        let files = match path {
            Some(path) if path.is_file() => vec![path.to_path_buf()],
            Some(path) => {
                return Err(WeblateError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => search_paths().into_iter().filter(|p| p.is_file()).collect(),
        };

        let mut ini = Ini::default();
        for file in &files {
            tracing::debug!(path = %file.display(), "reading configuration");
            let text = fs::read_to_string(file)?;
            ini.merge(Ini::parse(&text, &file.display().to_string())?);
        }

        let mut config = Self::from_ini(&ini, section)?;
        config.files = files;
        Ok(config)
    }

    /// Parse configuration from INI text.
    pub fn parse(text: &str, section: &str) -> Result<Self> {
        Self::from_ini(&Ini::parse(text, "<config>")?, section)
    }

    fn from_ini(ini: &Ini, section: &str) -> Result<Self> {
        let mut config = Self {
            section: section.to_string(),
            ..Self::default()
        };

        if let Some(url) = ini.get(section, "url") {
            config.url = url.to_string();
        }
        if ini.get(section, "key").is_some_and(|k| !k.is_empty()) {
            tracing::warn!(
                section,
                "Ignoring unscoped 'key' option, configure it in the [keys] section instead"
            );
        }
        if let Some(value) = ini.get(section, "retries") {
            config.retry.retries = parse_number(section, "retries", value)?;
        }
        if let Some(value) = ini.get(section, "backoff_factor") {
            config.retry.backoff_factor = parse_number(section, "backoff_factor", value)?;
        }
        if let Some(value) = ini.get(section, "timeout") {
            let secs: f64 = parse_number(section, "timeout", value)?;
            config.retry.timeout = Duration::try_from_secs_f64(secs).map_err(|_| {
                WeblateError::Config(format!("[{section}] timeout: invalid value {value:?}"))
            })?;
        }
        if let Some(value) = ini.get(section, "status_forcelist") {
            config.retry.status_forcelist = split_list(value)
                .map(|item| parse_number(section, "status_forcelist", item))
                .collect::<Result<_>>()?;
        }
        if let Some(value) = ini.get(section, "method_whitelist") {
            config.retry.allowed_methods = split_list(value)
                .map(str::to_ascii_uppercase)
                .collect();
        }
        config.translation = ini
            .get(section, "translation")
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        config.keys = ini.section(KEYS_SECTION).to_vec();

        Ok(config)
    }

    /// Apply `--url`/`--key` (or `WLC_URL`/`WLC_KEY`) overrides.
    #[must_use]
    pub fn with_overrides(mut self, url: Option<String>, key: Option<String>) -> Self {
        if let Some(url) = url {
            self.url = url;
        }
        if key.is_some() {
            self.key = key;
        }
        self
    }

    /// Build the credential set.
    ///
    /// Every `[keys]` entry is bound to its own URL; an override key is bound
    /// to the active URL.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut credentials = Credentials::new();
        for (url, key) in &self.keys {
            credentials.insert(Credential::new(url, key)?);
        }
        if let Some(key) = &self.key {
            credentials.insert(Credential::new(&self.url, key)?);
        }
        Ok(credentials)
    }
}

/// Configuration files probed when no explicit path is given, lowest
/// precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(appdata) = env::var_os("APPDATA") {
        paths.push(PathBuf::from(appdata).join("weblate.ini"));
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("weblate"));
        paths.push(dir.join("weblate.ini"));
    }
    if let Some(local) = env::current_dir().ok().and_then(|cwd| find_local(&cwd)) {
        paths.push(local);
    }
    paths
}

/// First local configuration file in `start` or its nearest ancestor.
fn find_local(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        LOCAL_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_number<T: std::str::FromStr>(section: &str, name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WeblateError::Config(format!("[{section}] {name}: invalid number {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use url::Url;

    const SAMPLE: &str = "\
# comment
[weblate]
url = https://hosted.weblate.org/api/
retries = 3
backoff_factor = 0.5
timeout = 10
status_forcelist = 429, 503
method_whitelist = GET
    put
translation = hello/weblate

[keys]
https://hosted.weblate.org/api/ = KEY1
http://127.0.0.1:8000/api/ = KEY2
";

    #[test]
    fn test_defaults() {
        let config = Config::parse("", DEFAULT_SECTION).unwrap();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.translation, None);
        assert!(config.credentials().unwrap().is_empty());
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE, DEFAULT_SECTION).unwrap();
        assert_eq!(config.url, "https://hosted.weblate.org/api/");
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.retry.backoff_factor, 0.5);
        assert_eq!(config.retry.timeout, Duration::from_secs(10));
        assert_eq!(
            config.retry.status_forcelist.iter().copied().collect::<Vec<_>>(),
            vec![429, 503]
        );
        assert_eq!(
            config.retry.allowed_methods.iter().cloned().collect::<Vec<_>>(),
            vec!["GET".to_string(), "PUT".to_string()]
        );
        assert_eq!(config.translation.as_deref(), Some("hello/weblate"));
        assert_eq!(config.keys.len(), 2);
    }

    #[test]
    fn test_url_keys_keep_colons() {
        let config = Config::parse(SAMPLE, DEFAULT_SECTION).unwrap();
        assert_eq!(config.keys[1].0, "http://127.0.0.1:8000/api/");
        assert_eq!(config.keys[1].1, "KEY2");
    }

    #[test]
    fn test_credentials_are_scoped() {
        let config = Config::parse(SAMPLE, DEFAULT_SECTION).unwrap();
        let credentials = config.credentials().unwrap();
        let hosted = Url::parse("https://hosted.weblate.org/api/projects/").unwrap();
        let local = Url::parse("http://127.0.0.1:8000/api/projects/").unwrap();
        let other = Url::parse("https://evil.example.com/api/projects/").unwrap();
        assert_eq!(credentials.key_for(&hosted), Some("KEY1"));
        assert_eq!(credentials.key_for(&local), Some("KEY2"));
        assert_eq!(credentials.key_for(&other), None);
    }

    #[test]
    fn test_unscoped_key_ignored() {
        let config = Config::parse("[weblate]\nkey = LEGACY\n", DEFAULT_SECTION).unwrap();
        assert_eq!(config.key, None);
        assert!(config.credentials().unwrap().is_empty());
    }

    #[test]
    fn test_override_key_bound_to_active_url() {
        let config = Config::parse(SAMPLE, DEFAULT_SECTION)
            .unwrap()
            .with_overrides(Some("https://other.example.com/api/".to_string()), Some("CLI".to_string()));
        let credentials = config.credentials().unwrap();
        let other = Url::parse("https://other.example.com/api/projects/").unwrap();
        let hosted = Url::parse("https://hosted.weblate.org/api/projects/").unwrap();
        assert_eq!(credentials.key_for(&other), Some("CLI"));
        assert_eq!(credentials.key_for(&hosted), Some("KEY1"));
    }

    #[test]
    fn test_custom_section() {
        let text = "[weblate]\nurl = https://a.example.com/api/\n[staging]\nurl = https://b.example.com/api/\n";
        let config = Config::parse(text, "staging").unwrap();
        assert_eq!(config.url, "https://b.example.com/api/");
    }

    #[test]
    fn test_malformed_numbers() {
        for text in [
            "[weblate]\nretries = many\n",
            "[weblate]\nbackoff_factor = x\n",
            "[weblate]\ntimeout = -1\n",
            "[weblate]\nstatus_forcelist = 500, abc\n",
        ] {
            let err = Config::parse(text, DEFAULT_SECTION).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{text}");
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(Config::parse("url = x\n", DEFAULT_SECTION).is_err());
        assert!(Config::parse("[weblate]\njust text\n", DEFAULT_SECTION).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weblate.ini");
        fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(Some(&path), DEFAULT_SECTION).unwrap();
        assert_eq!(config.files, vec![path]);
        assert_eq!(config.retry.retries, 3);

        let missing = dir.path().join("missing.ini");
        assert_eq!(
            Config::load(Some(&missing), DEFAULT_SECTION).unwrap_err().kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_find_local_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".weblate"), "[weblate]\n").unwrap();
        assert_eq!(find_local(&nested), Some(dir.path().join(".weblate")));
    }

    #[test]
    fn test_later_files_override() {
        let mut ini = Ini::parse("[weblate]\nurl = a\nretries = 1\n", "one").unwrap();
        ini.merge(Ini::parse("[weblate]\nurl = b\n", "two").unwrap());
        assert_eq!(ini.get("weblate", "url"), Some("b"));
        assert_eq!(ini.get("weblate", "retries"), Some("1"));
    }
}
