//! # DID Paths
//!
//! A `did:web` DID carries an optional path of colon-delimited segments after
//! the domain: `did:web:example.com:user:alice`. Stored documents are named
//! by transliterating that path directly, so `user:alice` is kept in
//! `user:alice.json` and the root identity (no path) in `root.json`.

use std::fmt::{self, Display, Formatter};

use crate::error::{Error, Result};

/// File name reserved for the root DID document.
pub const ROOT_FILENAME: &str = "root.json";

/// Marker terminating every document request path.
pub const DOCUMENT_MARKER: &str = "did.json";

const EXTENSION: &str = ".json";
const ROOT_NAME: &str = "root";

/// The path component of a `did:web` DID, as an ordered list of segments.
///
/// An empty path addresses the root identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DidPath {
    segments: Vec<String>,
}

impl DidPath {
    /// The root (empty) path.
    #[must_use]
    pub const fn root() -> Self {
        Self { segments: vec![] }
    }

    /// Create a path from segments, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if any segment is invalid or the path
    /// would collide with the reserved root document name.
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Result<Self> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            validate(segment)?;
        }
        if segments.len() == 1 && segments[0] == ROOT_NAME {
            return Err(Error::InvalidPath(format!("'{ROOT_NAME}' is a reserved path")));
        }
        Ok(Self { segments })
    }

    /// Derive a path from a URL request path such as `/user/alice/did.json`.
    ///
    /// Empty segments and the trailing `did.json` marker are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if any remaining segment is invalid.
    pub fn from_request_path(path: &str) -> Result<Self> {
        let path = path.strip_suffix(DOCUMENT_MARKER).unwrap_or(path);
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Parse a colon-joined DID path (`user:alice`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if any segment is invalid.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        Self::new(path.split(':'))
    }

    /// Path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the segment is invalid.
    pub fn join(&self, segment: impl Into<String>) -> Result<Self> {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    /// The `did:web` DID for this path under `domain`.
    #[must_use]
    pub fn did(&self, domain: &str) -> String {
        if self.is_root() {
            format!("did:web:{domain}")
        } else {
            format!("did:web:{domain}:{self}")
        }
    }
}

impl Display for DidPath {
    /// Colon-joined segments, empty for the root.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

/// Check a single path segment is safe to use as part of a file name.
///
/// Rejects empty segments, parent-directory traversal (`..`), path separators
/// (`/` and `\`) and colons, which separate segments in the stored name.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] describing the problem.
pub fn validate(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::InvalidPath("path segment is empty".into()));
    }
    if segment.contains("..") {
        return Err(Error::InvalidPath(format!("path segment '{segment}' contains '..'")));
    }
    if segment.contains(['/', '\\']) {
        return Err(Error::InvalidPath(format!("path segment '{segment}' contains a separator")));
    }
    if segment.contains(':') {
        return Err(Error::InvalidPath(format!("path segment '{segment}' contains ':'")));
    }
    Ok(())
}

/// Document file name for a DID path.
#[must_use]
pub fn encode(path: &DidPath) -> String {
    if path.is_root() { ROOT_FILENAME.to_string() } else { format!("{path}{EXTENSION}") }
}

/// DID path for a document file name.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the name is not a document file name or
/// contains invalid segments.
pub fn decode(filename: &str) -> Result<DidPath> {
    if filename == ROOT_FILENAME {
        return Ok(DidPath::root());
    }
    let Some(stem) = filename.strip_suffix(EXTENSION) else {
        return Err(Error::InvalidPath(format!("'{filename}' is not a document file name")));
    };
    if stem.is_empty() {
        return Err(Error::InvalidPath(format!("'{filename}' has an empty path")));
    }
    DidPath::parse(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_segments() {
        for bad in ["..", "a/b", "", "a\\b", "a:b", "x..y"] {
            assert!(matches!(validate(bad), Err(Error::InvalidPath(_))), "{bad:?} should fail");
        }
        for good in ["alice", "user123", "Ab9", "a.b", "did-1"] {
            validate(good).expect("should be valid");
        }
    }

    #[test]
    fn root_filename() {
        assert_eq!(encode(&DidPath::root()), "root.json");
        assert_eq!(decode("root.json").expect("should decode"), DidPath::root());
    }

    #[test]
    fn codec_bijection() {
        let cases: [&[&str]; 4] =
            [&["alice"], &["user", "alice"], &["org", "team", "member42"], &["a.b", "c-d"]];
        for segments in cases {
            let path = DidPath::new(segments.iter().copied()).expect("valid path");
            let filename = encode(&path);
            assert_eq!(decode(&filename).expect("should decode"), path);
            assert_eq!(decode(&filename).expect("should decode").segments(), segments);
        }
    }

    #[test]
    fn filename_is_transliteration() {
        let path = DidPath::new(["user", "alice"]).expect("valid path");
        assert_eq!(encode(&path), "user:alice.json");
        assert_eq!(path.did("example.com"), "did:web:example.com:user:alice");
        assert_eq!(DidPath::root().did("example.com"), "did:web:example.com");
    }

    #[test]
    fn reserved_root_name() {
        assert!(DidPath::new(["root"]).is_err());
        assert!(DidPath::new(["root", "alice"]).is_ok());
    }

    #[test]
    fn request_paths() {
        let path = DidPath::from_request_path("/user/alice/did.json").expect("should parse");
        assert_eq!(path.segments(), ["user", "alice"]);
        assert_eq!(path.to_string(), "user:alice");

        let path = DidPath::from_request_path("/alice/did.json").expect("should parse");
        assert_eq!(path.segments(), ["alice"]);

        assert!(DidPath::from_request_path("/../did.json").is_err());
        assert!(DidPath::from_request_path("/user/../did.json").is_err());
    }

    #[test]
    fn decode_rejects_foreign_names() {
        assert!(decode("alice.txt").is_err());
        assert!(decode(".json").is_err());
        assert!(decode("../x.json").is_err());
    }

    #[test]
    fn join_segments() {
        let path = DidPath::root().join("user").and_then(|p| p.join("abc")).expect("valid");
        assert_eq!(path.to_string(), "user:abc");
        assert!(path.join("..").is_err());
    }
}
