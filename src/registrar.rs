//! # Registrar
//!
//! Mints new identities: allocates a DID, generates key material, assembles
//! the DID document and persists it.

use serde::{Deserialize, Serialize};

use crate::allocate::Allocator;
use crate::assemble::{assemble, generation_service};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::key::{DalekProvider, KeyPair, KeyProvider, Suite};
use crate::path::{DidPath, ROOT_FILENAME};
use crate::store::DocumentStore;
use crate::url;

/// Public description of a generated key pair.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyDescriptor {
    /// Verification method id.
    pub id: String,

    /// Key suite.
    #[serde(rename = "type")]
    pub type_: String,

    /// Multibase encoded public key.
    pub public_key_multibase: String,
}

impl KeyDescriptor {
    fn new(did: &str, key_pair: &KeyPair) -> Self {
        Self {
            id: key_pair.key_id(did),
            type_: key_pair.suite().to_string(),
            public_key_multibase: key_pair.public_key_multibase().to_string(),
        }
    }
}

/// Public halves of the key pairs behind a generated document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    /// The signing key.
    pub verification_key: KeyDescriptor,

    /// The key agreement key.
    pub key_agreement_key: KeyDescriptor,
}

/// Outcome of a successful generation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    /// The new DID.
    pub did: String,

    /// The stored document, with the active domain substituted.
    pub document: Document,

    /// URL the document is served from.
    pub access_url: String,

    /// Public keys of the document.
    pub key_pairs: KeySummary,
}

/// Generates and stores DID documents for a domain.
#[derive(Clone, Debug)]
pub struct Registrar<S, K = DalekProvider> {
    domain: String,
    store: S,
    allocator: Allocator,
    keys: K,
}

impl<S: DocumentStore> Registrar<S> {
    /// Create a registrar for `domain` (in DID form, e.g. `localhost%3A8522`)
    /// using the default key provider.
    pub fn new(domain: impl Into<String>, store: S) -> Self {
        let domain = domain.into();
        Self {
            allocator: Allocator::new(domain.clone()),
            domain,
            store,
            keys: DalekProvider,
        }
    }
}

impl<S: DocumentStore, K: KeyProvider> Registrar<S, K> {
    /// Replace the key provider.
    pub fn with_keys<P: KeyProvider>(self, keys: P) -> Registrar<S, P> {
        Registrar {
            domain: self.domain,
            store: self.store,
            allocator: self.allocator,
            keys,
        }
    }

    /// Replace the identifier allocator.
    #[must_use]
    pub fn with_allocator(mut self, allocator: Allocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// The store documents are written to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The root DID of the domain.
    #[must_use]
    pub fn root_did(&self) -> String {
        DidPath::root().did(&self.domain)
    }

    /// Generate a user identity under a fresh random identifier.
    ///
    /// The document is written with an atomic create, so a name claimed
    /// concurrently is never overwritten; the registrar draws another
    /// identifier instead. Taken names and lost races share the allocator's
    /// retry bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationExhausted`] if no identifier could be
    /// claimed within the allocator's retry bound, or the key provider's or
    /// store's error.
    pub async fn generate_user(&self) -> Result<Generated> {
        for attempt in 1..=self.allocator.max_retries() {
            let allocation = self.allocator.candidate()?;
            if self.store.exists(&allocation.filename).await? {
                tracing::warn!("identifier collision on attempt {attempt}: {}", allocation.filename);
                continue;
            }
            let key_pairs = self.key_pairs()?;
            let document = assemble(&allocation.did, &key_pairs, vec![])?;

            match self.store.create(&allocation.filename, &document).await {
                Ok(()) => {
                    tracing::info!("generated {}", allocation.did);
                    return generated(allocation.did, document, &key_pairs);
                }
                Err(Error::AlreadyExists(filename)) => {
                    tracing::warn!("{filename} claimed concurrently on attempt {attempt}");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::AllocationExhausted(self.allocator.max_retries()))
    }

    /// Generate the root identity of the domain, replacing any existing root
    /// document.
    ///
    /// The root document advertises the generation endpoint as a service.
    ///
    /// # Errors
    ///
    /// Returns the key provider's or store's error.
    pub async fn generate_root(&self) -> Result<Generated> {
        let did = self.root_did();
        let key_pairs = self.key_pairs()?;
        let endpoint = format!("https://{}/api/did/generate", url::http_domain(&self.domain));
        let service = generation_service(&did, &endpoint)?;
        let document = assemble(&did, &key_pairs, vec![service])?;

        self.store.save(ROOT_FILENAME, &document).await?;
        tracing::info!("generated root {did}");
        generated(did, document, &key_pairs)
    }

    fn key_pairs(&self) -> Result<[KeyPair; 2]> {
        let verification = self.keys.generate(Suite::Ed25519VerificationKey2020)?;
        let agreement = self.keys.generate(Suite::X25519KeyAgreementKey2020)?;
        Ok([verification, agreement])
    }
}

fn generated(did: String, document: Document, key_pairs: &[KeyPair; 2]) -> Result<Generated> {
    let [verification, agreement] = key_pairs;
    Ok(Generated {
        access_url: url::to_http(&did, "http")?,
        key_pairs: KeySummary {
            verification_key: KeyDescriptor::new(&did, verification),
            key_agreement_key: KeyDescriptor::new(&did, agreement),
        },
        did,
        document,
    })
}
