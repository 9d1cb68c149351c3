//! # Identifier Allocation
//!
//! New user DIDs get a random identifier segment, e.g.
//! `did:web:example.com:user:Xb3k9QpL0aZ7mN2c`. Identifiers are drawn from the
//! 62 case-sensitive alphanumeric symbols; at the default length of 16 the
//! space holds 62^16 identifiers, so the retry bound only guards against an
//! unavailable store or a broken randomness source.

use rand::distributions::{Alphanumeric, DistString};

use crate::error::{Error, Result};
use crate::path::{self, DidPath};
use crate::store::DocumentStore;

/// Default identifier length.
pub const DEFAULT_LENGTH: usize = 16;

/// Default number of attempts before giving up.
pub const DEFAULT_RETRIES: usize = 10;

/// Default path segment preceding generated identifiers.
pub const DEFAULT_PREFIX: &str = "user";

/// An identifier not yet present in the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// The full DID.
    pub did: String,

    /// The DID path, e.g. `user:<raw_id>`.
    pub path: DidPath,

    /// Document file name for the path.
    pub filename: String,

    /// The random identifier segment.
    pub raw_id: String,
}

/// Draws random identifiers and checks them against a store.
#[derive(Clone, Debug)]
pub struct Allocator {
    domain: String,
    prefix: DidPath,
    length: usize,
    retries: usize,
}

impl Allocator {
    /// Create an allocator for DIDs under `domain` with default settings.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            prefix: DidPath::new([DEFAULT_PREFIX]).unwrap_or_default(),
            length: DEFAULT_LENGTH,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Path under which identifiers are allocated. Use [`DidPath::root`] for
    /// identifiers directly under the domain.
    #[must_use]
    pub fn prefix(mut self, prefix: DidPath) -> Self {
        self.prefix = prefix;
        self
    }

    /// Length of generated identifiers.
    #[must_use]
    pub const fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Maximum number of candidates tried.
    #[must_use]
    pub const fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// The configured retry bound.
    #[must_use]
    pub const fn max_retries(&self) -> usize {
        self.retries
    }

    /// Draw a random candidate without consulting a store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the configured prefix and length
    /// cannot form a valid path (a zero length).
    pub fn candidate(&self) -> Result<Allocation> {
        let raw_id = Alphanumeric.sample_string(&mut rand::thread_rng(), self.length);
        let path = self.prefix.join(raw_id.clone())?;
        Ok(Allocation {
            did: path.did(&self.domain),
            filename: path::encode(&path),
            path,
            raw_id,
        })
    }

    /// Find an identifier with no stored document.
    ///
    /// Existence is checked, not reserved: a concurrent writer may claim the
    /// same name before the caller saves. Persist with
    /// [`DocumentStore::create`] to detect that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationExhausted`] if every candidate is taken, or
    /// the store's error if the existence check fails.
    pub async fn allocate(&self, store: &impl DocumentStore) -> Result<Allocation> {
        for attempt in 1..=self.retries {
            let allocation = self.candidate()?;
            if !store.exists(&allocation.filename).await? {
                return Ok(allocation);
            }
            tracing::warn!("identifier collision on attempt {attempt}: {}", allocation.filename);
        }
        Err(Error::AllocationExhausted(self.retries))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::document::Document;

    // Store reporting a fixed answer for every existence check.
    struct Occupied {
        taken: bool,
        checks: Mutex<usize>,
    }

    impl Occupied {
        fn new(taken: bool) -> Self {
            Self {
                taken,
                checks: Mutex::new(0),
            }
        }

        fn checks(&self) -> usize {
            *self.checks.lock().expect("lock")
        }
    }

    impl DocumentStore for Occupied {
        async fn exists(&self, _: &str) -> Result<bool> {
            *self.checks.lock().expect("lock") += 1;
            Ok(self.taken)
        }

        async fn load(&self, filename: &str) -> Result<Document> {
            Err(Error::NotFound(filename.to_string()))
        }

        async fn save(&self, _: &str, _: &Document) -> Result<()> {
            Ok(())
        }

        async fn create(&self, _: &str, _: &Document) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn candidate_shape() {
        let allocation = Allocator::new("example.com").candidate().expect("should draw");
        assert_eq!(allocation.raw_id.len(), 16);
        assert!(allocation.raw_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(allocation.path.to_string(), format!("user:{}", allocation.raw_id));
        assert_eq!(allocation.filename, format!("user:{}.json", allocation.raw_id));
        assert_eq!(allocation.did, format!("did:web:example.com:user:{}", allocation.raw_id));
    }

    #[test]
    fn root_prefix() {
        let allocation = Allocator::new("example.com")
            .prefix(DidPath::root())
            .length(8)
            .candidate()
            .expect("should draw");
        assert_eq!(allocation.filename, format!("{}.json", allocation.raw_id));
        assert_eq!(allocation.raw_id.len(), 8);
    }

    #[test]
    fn zero_length_rejected() {
        assert!(Allocator::new("example.com").length(0).candidate().is_err());
    }

    #[test]
    fn candidates_differ() {
        let allocator = Allocator::new("example.com");
        let ids: HashSet<_> =
            (0..100).map(|_| allocator.candidate().expect("should draw").raw_id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[tokio::test]
    async fn first_free_candidate() {
        let store = Occupied::new(false);
        Allocator::new("example.com").allocate(&store).await.expect("should allocate");
        assert_eq!(store.checks(), 1);
    }

    #[tokio::test]
    async fn exhausted() {
        let store = Occupied::new(true);
        let err = Allocator::new("example.com")
            .retries(3)
            .allocate(&store)
            .await
            .expect_err("should exhaust");
        assert!(matches!(err, Error::AllocationExhausted(3)));
        assert_eq!(store.checks(), 3);
    }
}
