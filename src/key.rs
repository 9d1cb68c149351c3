//! # Key Material
//!
//! Generation of the asymmetric key pairs referenced by generated DID
//! documents. Key generation sits behind the [`KeyProvider`] trait so further
//! suites can be added without touching document assembly.
//!
//! Public keys are encoded as multibase (base58btc) strings of the
//! multicodec-prefixed key bytes. The fingerprint of a key is the same
//! multibase string: `z6Mk...` for Ed25519 and `z6LS...` for X25519.

use std::fmt::{self, Debug, Display, Formatter};

use curve25519_dalek::MontgomeryPoint;
use ed25519_dalek::SigningKey;
use multibase::Base;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Multicodec prefix for an Ed25519 public key.
pub const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// Multicodec prefix for an X25519 public key.
pub const X25519_CODEC: [u8; 2] = [0xec, 0x01];

/// Cryptographic suites supported when generating key pairs.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Suite {
    /// `Ed25519` verification key, version 2020.
    Ed25519VerificationKey2020,

    /// `X25519` key agreement key, version 2020.
    X25519KeyAgreementKey2020,
}

/// What a generated key is used for inside a DID document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPurpose {
    /// Signing: verification method referenced by authentication, assertion
    /// and capability relationships.
    Verification,

    /// Encryption: embedded in the key agreement relationship.
    KeyAgreement,
}

impl Suite {
    /// All supported suites, in the order keys are generated for a new DID.
    pub const ALL: [Self; 2] = [Self::Ed25519VerificationKey2020, Self::X25519KeyAgreementKey2020];

    /// JSON-LD context defining the suite's terms.
    #[must_use]
    pub const fn context(self) -> &'static str {
        match self {
            Self::Ed25519VerificationKey2020 => "https://w3id.org/security/suites/ed25519-2020/v1",
            Self::X25519KeyAgreementKey2020 => "https://w3id.org/security/suites/x25519-2020/v1",
        }
    }

    /// Multicodec prefix for the suite's public key.
    #[must_use]
    pub const fn codec(self) -> [u8; 2] {
        match self {
            Self::Ed25519VerificationKey2020 => ED25519_CODEC,
            Self::X25519KeyAgreementKey2020 => X25519_CODEC,
        }
    }

    /// The document relationships the suite's keys are wired into.
    #[must_use]
    pub const fn purpose(self) -> KeyPurpose {
        match self {
            Self::Ed25519VerificationKey2020 => KeyPurpose::Verification,
            Self::X25519KeyAgreementKey2020 => KeyPurpose::KeyAgreement,
        }
    }
}

impl Display for Suite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519VerificationKey2020 => write!(f, "Ed25519VerificationKey2020"),
            Self::X25519KeyAgreementKey2020 => write!(f, "X25519KeyAgreementKey2020"),
        }
    }
}

/// Encoded form of a public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyEncoding {
    /// Multibase (base58btc) encoding of the multicodec-prefixed key.
    pub multibase: String,

    /// Stable identifier derived from the encoded key.
    pub fingerprint: String,
}

/// A freshly generated key pair.
///
/// The private half is held only for the lifetime of the value and is never
/// serialized.
#[derive(Clone)]
pub struct KeyPair {
    suite: Suite,
    public_key: [u8; 32],
    encoding: PublicKeyEncoding,
    secret_key: [u8; 32],
}

impl KeyPair {
    /// Assemble a key pair from its parts.
    #[must_use]
    pub const fn new(
        suite: Suite, public_key: [u8; 32], encoding: PublicKeyEncoding, secret_key: [u8; 32],
    ) -> Self {
        Self {
            suite,
            public_key,
            encoding,
            secret_key,
        }
    }

    /// The suite the key pair belongs to.
    #[must_use]
    pub const fn suite(&self) -> Suite {
        self.suite
    }

    /// Raw public key bytes.
    #[must_use]
    pub const fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Multibase encoding of the public key.
    #[must_use]
    pub fn public_key_multibase(&self) -> &str {
        &self.encoding.multibase
    }

    /// Fingerprint of the public key, used as the verification method
    /// fragment.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.encoding.fingerprint
    }

    /// Verification method id for the key within the document for `did`.
    #[must_use]
    pub fn key_id(&self, did: &str) -> String {
        format!("{did}#{}", self.fingerprint())
    }

    /// Raw private key bytes.
    #[must_use]
    pub const fn secret_key(&self) -> &[u8; 32] {
        &self.secret_key
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("suite", &self.suite)
            .field("fingerprint", &self.encoding.fingerprint)
            .finish_non_exhaustive()
    }
}

/// [`KeyProvider`] is used to source key material for new DID documents.
pub trait KeyProvider: Send + Sync {
    /// Generate a new key pair for the given suite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] if key material cannot be produced.
    fn generate(&self, suite: Suite) -> Result<KeyPair>;

    /// Encode a public key, returning its multibase form and fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] if the key cannot be encoded.
    fn encode(&self, suite: Suite, public_key: &[u8]) -> Result<PublicKeyEncoding> {
        if public_key.len() != 32 {
            return Err(Error::KeyGeneration(format!(
                "{suite} public key must be 32 bytes, got {}",
                public_key.len()
            )));
        }
        let mut multi_bytes = suite.codec().to_vec();
        multi_bytes.extend_from_slice(public_key);
        let multibase = multibase::encode(Base::Base58Btc, &multi_bytes);

        Ok(PublicKeyEncoding {
            fingerprint: multibase.clone(),
            multibase,
        })
    }
}

/// Key provider backed by `ed25519-dalek` and `curve25519-dalek`, drawing
/// randomness from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct DalekProvider;

impl KeyProvider for DalekProvider {
    fn generate(&self, suite: Suite) -> Result<KeyPair> {
        let mut secret_key = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut secret_key)
            .map_err(|e| Error::KeyGeneration(format!("issue reading randomness: {e}")))?;

        let public_key = match suite {
            Suite::Ed25519VerificationKey2020 => {
                SigningKey::from_bytes(&secret_key).verifying_key().to_bytes()
            }
            Suite::X25519KeyAgreementKey2020 => {
                MontgomeryPoint::mul_base_clamped(secret_key).to_bytes()
            }
        };
        let encoding = self.encode(suite, &public_key)?;

        Ok(KeyPair::new(suite, public_key, encoding, secret_key))
    }
}
