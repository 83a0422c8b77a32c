//! Validation of slugs and file names that end up in local paths or URLs.
//!
//! Slugs and file names come from the server or from the user and are treated
//! as hostile either way. A [`SafeRelativePath`] can only be built from
//! segments that each form exactly one normal path component, so joining it
//! under a directory can never leave that directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, WeblateError};

/// A relative path made only of validated, normal components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeRelativePath(PathBuf);

impl SafeRelativePath {
    /// The relative path itself.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Place this path beneath `root`.
    pub fn join_under(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    /// The validated segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|part| part.to_str())
    }
}

/// Build a safe relative path from individual segments.
///
/// Fails with [`WeblateError::PathValidation`] on the first bad segment, and
/// when no segment is given at all.
pub fn sanitize_slug_path<I, S>(segments: I) -> Result<SafeRelativePath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = PathBuf::new();
    for segment in segments {
        path.push(validate_segment(segment.as_ref())?);
    }
    if path.as_os_str().is_empty() {
        return Err(reject("", "empty path"));
    }
    Ok(SafeRelativePath(path))
}

/// Split `raw` on `/` and validate every piece.
pub fn sanitize_relative(raw: &str) -> Result<SafeRelativePath> {
    sanitize_slug_path(raw.split('/'))
}

/// Check a single segment and return it unchanged.
pub fn validate_segment(segment: &str) -> Result<&str> {
    if segment.is_empty() {
        return Err(reject(segment, "empty segment"));
    }
    if segment == "." || segment == ".." {
        return Err(reject(segment, "relative directory reference"));
    }
    if segment.contains(['/', '\\']) {
        return Err(reject(segment, "contains a path separator"));
    }
    if segment.contains(':') {
        return Err(reject(segment, "contains a drive or volume prefix"));
    }
    if segment.chars().any(char::is_control) {
        return Err(reject(segment, "contains a control character"));
    }
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == segment => Ok(segment),
        _ => Err(reject(segment, "not a plain file name")),
    }
}

fn reject(segment: &str, reason: &'static str) -> WeblateError {
    WeblateError::PathValidation {
        segment: segment.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const HOSTILE: [&str; 12] = [
        "../../etc/passwd",
        "/etc/passwd",
        "a/../../b",
        "",
        ".",
        "..",
        "..\\..\\windows",
        "C:",
        "C:\\evil",
        "\\\\server\\share",
        "nul\0byte",
        "line\nbreak",
    ];

    #[test]
    fn test_hostile_single_segments_rejected() {
        for raw in HOSTILE {
            let err = sanitize_slug_path([raw]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PathValidation, "{raw:?}");
        }
    }

    #[test]
    fn test_hostile_relative_paths_rejected() {
        for raw in HOSTILE {
            assert!(sanitize_relative(raw).is_err(), "{raw:?}");
        }
        assert!(sanitize_relative("hello//cs").is_err());
        assert!(sanitize_relative("hello/weblate/").is_err());
    }

    #[test]
    fn test_result_stays_inside_root() {
        let root = Path::new("/srv/output");
        for raw in ["hello", "hello/weblate", "hello/weblate/cs.po", "..hidden", "a..b"] {
            let safe = sanitize_relative(raw).unwrap();
            let joined = safe.join_under(root);
            assert!(joined.starts_with(root));
            assert_ne!(joined, root);
            assert!(joined
                .strip_prefix(root)
                .unwrap()
                .components()
                .all(|c| matches!(c, Component::Normal(_))));
        }
    }

    #[test]
    fn test_valid_segments_preserved() {
        let safe = sanitize_slug_path(["hello", "weblate", "weblate-cs.po"]).unwrap();
        assert_eq!(safe.as_path(), Path::new("hello/weblate/weblate-cs.po"));
    }

    #[test]
    fn test_segments_round_trip() {
        let safe = sanitize_relative("hello/weblate/cs").unwrap();
        assert_eq!(safe.segments().collect::<Vec<_>>(), ["hello", "weblate", "cs"]);
    }

    #[test]
    fn test_no_segments_is_an_error() {
        assert!(sanitize_slug_path(Vec::<String>::new()).is_err());
    }
}
