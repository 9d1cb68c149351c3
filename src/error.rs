//! # Errors
//!
//! Error types for document resolution and generation. Each variant maps to a
//! single HTTP status so the server can translate errors uniformly.

use serde_json::json;
use thiserror::Error;

/// Result type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while resolving, storing or generating DID documents.
#[derive(Debug, Error)]
pub enum Error {
    /// A client-supplied path segment failed validation.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No document is stored for the requested DID path.
    #[error("{0}")]
    NotFound(String),

    /// A stored document could not be parsed.
    #[error("corrupt document {filename}: {source}")]
    CorruptDocument {
        /// Name of the offending document file.
        filename: String,

        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// No free identifier was found within the retry bound.
    #[error("no free identifier found after {0} attempts")]
    AllocationExhausted(usize),

    /// The key material provider failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// An atomic create found the document already present.
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// An assembled document breaks the verification relationship invariant.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Filesystem failure while reading or writing a document.
    #[error("store I/O failure: {0}")]
    StoreIo(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code for the error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidPath(_) => 400,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Returns `true` for errors caused by the client request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status() < 500
    }

    /// Short error label used in the `error` field of JSON responses.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "Invalid path format",
            Self::NotFound(_) => "DID document not found",
            Self::CorruptDocument { .. } => "Failed to load DID document",
            _ => "Internal server error",
        }
    }

    /// Message safe to return to a client.
    ///
    /// Client errors describe what to fix. Server errors are generic and never
    /// carry filesystem paths or underlying error text.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidPath(msg) | Self::NotFound(msg) => msg.clone(),
            Self::CorruptDocument { .. } => "stored DID document could not be read".into(),
            Self::AllocationExhausted(_) | Self::AlreadyExists(_) => {
                "could not allocate a unique identifier".into()
            }
            Self::KeyGeneration(_) => "key generation failed".into(),
            Self::InvalidDocument(_) => "generated DID document was invalid".into(),
            Self::StoreIo(_) => "document store unavailable".into(),
        }
    }

    /// Uniform `{error, message}` JSON body.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.label(),
            "message": self.public_message(),
        })
    }
}
