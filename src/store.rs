//! # Document Store
//!
//! Persistence for DID documents. Documents are stored domain-templated (see
//! [`crate::template`]) so the same files can be served under any domain.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::distributions::{Alphanumeric, DistString};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::{path, template};

/// [`DocumentStore`] is used to persist and retrieve DID documents by file
/// name (see [`crate::path::encode`]).
pub trait DocumentStore: Send + Sync {
    /// Returns `true` if a document is stored under `filename`.
    fn exists(&self, filename: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Load the document stored under `filename`, with the active domain
    /// substituted for the domain token.
    ///
    /// Fails with [`Error::NotFound`] if there is no such document and
    /// [`Error::CorruptDocument`] if it cannot be parsed.
    fn load(&self, filename: &str) -> impl Future<Output = Result<Document>> + Send;

    /// Store a document under `filename`, replacing any existing document.
    ///
    /// Readers never observe a partially written document.
    fn save(&self, filename: &str, document: &Document) -> impl Future<Output = Result<()>> + Send;

    /// Store a document under `filename` only if no document is stored there.
    ///
    /// Fails with [`Error::AlreadyExists`] if the name is taken. The check
    /// and the write are a single atomic step.
    fn create(
        &self, filename: &str, document: &Document,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A [`DocumentStore`] keeping one JSON file per document in a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
    domain: String,
}

impl FileStore {
    /// Create a store over `dir` serving documents for `domain`.
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            domain: domain.into(),
        }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Domain substituted into documents on read.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    // Only names produced by the path codec resolve to a location, so a file
    // name can never address anything outside the store directory.
    fn locate(&self, filename: &str) -> Result<PathBuf> {
        path::decode(filename)?;
        Ok(self.dir.join(filename))
    }

    // Serialize the document, template it and write it to a temporary file
    // alongside its final location.
    async fn write_temp(&self, filename: &str, document: &Document) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(document).map_err(|e| {
            Error::InvalidDocument(format!("issue serializing document: {e}"))
        })?;
        let stored = template::strip(&json, &self.domain);

        tokio::fs::create_dir_all(&self.dir).await?;
        let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 8);
        let temp = self.dir.join(format!(".{filename}.{suffix}.tmp"));
        if let Err(e) = tokio::fs::write(&temp, stored).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(temp)
    }
}

impl DocumentStore for FileStore {
    async fn exists(&self, filename: &str) -> Result<bool> {
        let path = self.locate(filename)?;
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn load(&self, filename: &str) -> Result<Document> {
        let path = self.locate(filename)?;
        let stored = match tokio::fs::read_to_string(&path).await {
            Ok(stored) => stored,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("no document stored as {filename}")));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("loaded {filename}");
        let json = template::apply(&stored, &self.domain);
        serde_json::from_str(&json).map_err(|source| Error::CorruptDocument {
            filename: filename.to_string(),
            source,
        })
    }

    async fn save(&self, filename: &str, document: &Document) -> Result<()> {
        let path = self.locate(filename)?;
        let temp = self.write_temp(filename, document).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!("saved {filename}");
        Ok(())
    }

    async fn create(&self, filename: &str, document: &Document) -> Result<()> {
        let path = self.locate(filename)?;
        let temp = self.write_temp(filename, document).await?;

        // linking fails if the target exists, unlike rename
        let linked = tokio::fs::hard_link(&temp, &path).await;
        let _ = tokio::fs::remove_file(&temp).await;
        match linked {
            Ok(()) => {
                tracing::debug!("created {filename}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(Error::AlreadyExists(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::assemble::{assemble, generation_service};
    use crate::key::{DalekProvider, KeyProvider, Suite};

    const DOMAIN: &str = "example.com";

    fn document(did: &str) -> Document {
        let kps: Vec<_> =
            Suite::ALL.iter().map(|s| DalekProvider.generate(*s).expect("should generate")).collect();
        let svc = generation_service(did, &format!("https://{DOMAIN}/api/did/generate"))
            .expect("should build");
        assemble(did, &kps, vec![svc]).expect("should assemble")
    }

    #[tokio::test]
    async fn round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), DOMAIN);
        let doc = document("did:web:example.com");

        store.save("root.json", &doc).await.expect("should save");
        let loaded = store.load("root.json").await.expect("should load");
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn stored_without_domain() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), DOMAIN);
        store.save("root.json", &document("did:web:example.com")).await.expect("should save");

        let raw = std::fs::read_to_string(dir.path().join("root.json")).expect("should read");
        assert!(raw.contains("did:web:{{DOMAIN}}"));
        assert!(raw.contains("https://{{DOMAIN}}/api/did/generate"));
        assert!(!raw.contains(DOMAIN));
        assert!(raw.starts_with("{\n  \"@context\""));
    }

    #[tokio::test]
    async fn served_under_other_domain() {
        let dir = TempDir::new().expect("temp dir");
        FileStore::new(dir.path(), "dev.local%3A8522")
            .save("user:alice.json", &document("did:web:dev.local%3A8522:user:alice"))
            .await
            .expect("should save");

        let prod = FileStore::new(dir.path(), DOMAIN);
        let doc = prod.load("user:alice.json").await.expect("should load");
        assert_eq!(doc.id, "did:web:example.com:user:alice");
    }

    #[tokio::test]
    async fn port_domain_templated() {
        let dir = TempDir::new().expect("temp dir");
        let did = "did:web:localhost%3A8522";
        let kps: Vec<_> =
            Suite::ALL.iter().map(|s| DalekProvider.generate(*s).expect("should generate")).collect();
        let svc = generation_service(did, "https://localhost:8522/api/did/generate")
            .expect("should build");
        let doc = assemble(did, &kps, vec![svc]).expect("should assemble");

        let dev = FileStore::new(dir.path(), "localhost%3A8522");
        dev.save("root.json", &doc).await.expect("should save");
        let raw = std::fs::read_to_string(dir.path().join("root.json")).expect("should read");
        assert!(!raw.contains("localhost"));
        assert_eq!(dev.load("root.json").await.expect("should load"), doc);

        let prod = FileStore::new(dir.path(), DOMAIN);
        let loaded = prod.load("root.json").await.expect("should load");
        let svc = loaded.service("did:web:example.com#did-generation").expect("service");
        assert_eq!(
            serde_json::to_value(&svc.service_endpoint).expect("should serialize"),
            "https://example.com/api/did/generate"
        );
    }

    #[tokio::test]
    async fn exists_and_missing() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path().join("nested"), DOMAIN);
        assert!(!store.exists("alice.json").await.expect("should check"));

        let err = store.load("alice.json").await.expect_err("should be missing");
        assert!(matches!(err, Error::NotFound(_)));

        store.save("alice.json", &document("did:web:example.com:alice")).await.expect("should save");
        assert!(store.exists("alice.json").await.expect("should check"));
    }

    #[tokio::test]
    async fn corrupt_document() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("alice.json"), "{ not json").expect("should write");

        let store = FileStore::new(dir.path(), DOMAIN);
        let err = store.load("alice.json").await.expect_err("should fail");
        assert!(matches!(err, Error::CorruptDocument { .. }));
    }

    #[tokio::test]
    async fn create_if_absent() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), DOMAIN);
        let first = document("did:web:example.com:user:abc");

        store.create("user:abc.json", &first).await.expect("should create");
        let err = store
            .create("user:abc.json", &document("did:web:example.com:user:abc"))
            .await
            .expect_err("should refuse");
        assert!(matches!(err, Error::AlreadyExists(_)));

        // the original survives and no temp files are left behind
        assert_eq!(store.load("user:abc.json").await.expect("should load"), first);
        let entries = std::fs::read_dir(dir.path()).expect("should list").count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn save_overwrites() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), DOMAIN);
        store.save("root.json", &document("did:web:example.com")).await.expect("should save");
        let second = document("did:web:example.com");
        store.save("root.json", &second).await.expect("should save");
        assert_eq!(store.load("root.json").await.expect("should load"), second);
    }

    #[tokio::test]
    async fn rejects_unsafe_names() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path(), DOMAIN);
        for name in ["../escape.json", "a/b.json", "notes.txt"] {
            let err = store.exists(name).await.expect_err("should reject");
            assert!(matches!(err, Error::InvalidPath(_)), "{name}");
        }
    }
}
