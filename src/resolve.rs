//! # Resolution
//!
//! Maps an inbound document request path to a stored DID document.
//!
//! | Request                  | Resource                     | Stored as          |
//! |--------------------------|------------------------------|--------------------|
//! | `/.well-known/did.json`  | [`Resource::Root`]           | `root.json`        |
//! | `/alice/did.json`        | [`Resource::Single`]         | `alice.json`       |
//! | `/user/alice/did.json`   | [`Resource::Multi`]          | `user:alice.json`  |
//!
//! See <https://w3c-ccg.github.io/did-method-web/#read-resolve>.

use std::io;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::path::{self, DOCUMENT_MARKER, DidPath, ROOT_FILENAME};
use crate::store::DocumentStore;

/// Request path of the root DID document.
pub const ROOT_REQUEST: &str = "/.well-known/did.json";

/// The document addressed by a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// The domain's root DID document.
    Root,

    /// A document one segment below the domain.
    Single(String),

    /// A document two or more segments below the domain.
    Multi(Vec<String>),
}

impl Resource {
    /// Classify a request path. Returns `None` if the path does not request a
    /// DID document.
    ///
    /// Segments are not validated here; [`resolve`] does that before touching
    /// the store.
    #[must_use]
    pub fn classify(request_path: &str) -> Option<Self> {
        if request_path == ROOT_REQUEST {
            return Some(Self::Root);
        }
        let mut segments: Vec<String> =
            request_path.split('/').filter(|s| !s.is_empty()).map(ToString::to_string).collect();
        if segments.pop().as_deref() != Some(DOCUMENT_MARKER) {
            return None;
        }
        match segments.len() {
            0 => None,
            1 => segments.pop().map(Self::Single),
            _ => Some(Self::Multi(segments)),
        }
    }

    /// The DID path of the resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if a segment is invalid.
    pub fn did_path(&self) -> Result<DidPath> {
        match self {
            Self::Root => Ok(DidPath::root()),
            Self::Single(segment) => DidPath::new([segment.as_str()]),
            Self::Multi(segments) => DidPath::new(segments.iter().map(String::as_str)),
        }
    }
}

/// Resolve a resource to its stored DID document.
///
/// # Errors
///
/// - [`Error::InvalidPath`] if a segment is invalid; the store is not touched.
/// - [`Error::NotFound`] if no document is stored for the path.
/// - Any other error if the document exists but cannot be loaded.
pub async fn resolve(store: &impl DocumentStore, resource: &Resource) -> Result<Document> {
    let did_path = resource.did_path()?;
    let filename = path::encode(&did_path);

    if *resource == Resource::Root {
        tracing::debug!("resolving root document");
        return store.load(ROOT_FILENAME).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound("Root DID document not found".into()),
            e => e,
        });
    }

    tracing::debug!("resolving document for path {did_path}");
    if !store.exists(&filename).await? {
        return Err(Error::NotFound(format!("No DID document found for path: {did_path}")));
    }

    // the document existed a moment ago, so failing now is a store problem
    store.load(&filename).await.map_err(|e| match e {
        Error::NotFound(msg) => Error::StoreIo(io::Error::new(io::ErrorKind::NotFound, msg)),
        e => e,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::assemble::assemble;
    use crate::key::{DalekProvider, KeyProvider, Suite};
    use crate::store::FileStore;

    async fn seeded(dir: &TempDir, filename: &str, did: &str) -> FileStore {
        let store = FileStore::new(dir.path(), "example.com");
        let kps: Vec<_> =
            Suite::ALL.iter().map(|s| DalekProvider.generate(*s).expect("should generate")).collect();
        let doc = assemble(did, &kps, vec![]).expect("should assemble");
        store.save(filename, &doc).await.expect("should save");
        store
    }

    #[test]
    fn classify_paths() {
        assert_eq!(Resource::classify("/.well-known/did.json"), Some(Resource::Root));
        assert_eq!(Resource::classify("/alice/did.json"), Some(Resource::Single("alice".into())));
        assert_eq!(
            Resource::classify("/user/alice/did.json"),
            Some(Resource::Multi(vec!["user".into(), "alice".into()]))
        );
        assert_eq!(
            Resource::classify("/a/b/c/did.json"),
            Some(Resource::Multi(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(Resource::classify("/did.json"), None);
        assert_eq!(Resource::classify("/alice/doc.json"), None);
        assert_eq!(Resource::classify("/"), None);
    }

    #[tokio::test]
    async fn root_document() {
        let dir = TempDir::new().expect("temp dir");
        let store = seeded(&dir, "root.json", "did:web:example.com").await;
        let doc = resolve(&store, &Resource::Root).await.expect("should resolve");
        assert_eq!(doc.id, "did:web:example.com");
    }

    #[tokio::test]
    async fn root_missing() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), "example.com");
        let err = resolve(&store, &Resource::Root).await.expect_err("should be missing");
        assert!(matches!(err, Error::NotFound(msg) if msg.contains("Root")));
    }

    #[tokio::test]
    async fn single_segment() {
        let dir = TempDir::new().expect("temp dir");
        let store = seeded(&dir, "alice.json", "did:web:example.com:alice").await;
        let doc = resolve(&store, &Resource::Single("alice".into())).await.expect("should resolve");
        assert_eq!(doc.id, "did:web:example.com:alice");

        let err = resolve(&store, &Resource::Single("bob".into())).await.expect_err("missing");
        assert!(matches!(err, Error::NotFound(msg) if msg.contains("bob")));
    }

    #[tokio::test]
    async fn multi_segment() {
        let dir = TempDir::new().expect("temp dir");
        let store = seeded(&dir, "user:alice.json", "did:web:example.com:user:alice").await;
        let resource = Resource::Multi(vec!["user".into(), "alice".into()]);
        let doc = resolve(&store, &resource).await.expect("should resolve");
        assert_eq!(doc.id, "did:web:example.com:user:alice");

        let missing = Resource::Multi(vec!["user".into(), "nobody".into()]);
        let err = resolve(&store, &missing).await.expect_err("missing");
        assert!(matches!(err, Error::NotFound(msg) if msg.contains("user:nobody")));
    }

    #[tokio::test]
    async fn invalid_segment() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), "example.com");
        for resource in [
            Resource::Single("..".into()),
            Resource::Single("root".into()),
            Resource::Multi(vec!["user".into(), "..".into()]),
        ] {
            let err = resolve(&store, &resource).await.expect_err("should reject");
            assert!(matches!(err, Error::InvalidPath(_)), "{resource:?}");
        }
    }

    #[tokio::test]
    async fn corrupt_after_exists() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("alice.json"), "[1,2").expect("should write");
        let store = FileStore::new(dir.path(), "example.com");
        let err = resolve(&store, &Resource::Single("alice".into())).await.expect_err("corrupt");
        assert_eq!(err.status(), 500);
    }
}
