//! # DID Web Server
//!
//! Serves `did:web` DID documents from a directory of domain-templated JSON
//! files and mints new identities on request.
//!
//! A DID such as `did:web:example.com:user:alice` is resolved from
//! `https://example.com/user/alice/did.json`, backed by the stored file
//! `user:alice.json`. Stored documents carry a `{{DOMAIN}}` placeholder in
//! place of the domain, so the same directory can be served under any domain.
//!
//! See <https://w3c-ccg.github.io/did-method-web>.

pub mod allocate;
pub mod assemble;
pub mod config;
pub mod core;
pub mod document;
mod error;
pub mod key;
pub mod path;
pub mod registrar;
pub mod resolve;
pub mod server;
pub mod store;
pub mod template;
pub mod url;

pub use self::allocate::{Allocation, Allocator};
pub use self::assemble::{assemble, generation_service};
pub use self::config::Config;
pub use self::document::{Document, DocumentBuilder, Service, VerificationMethod};
pub use self::error::{Error, Result};
pub use self::key::{DalekProvider, KeyPair, KeyProvider, Suite};
pub use self::path::DidPath;
pub use self::registrar::{Generated, Registrar};
pub use self::resolve::{Resource, resolve};
pub use self::server::{AppState, create_router, serve};
pub use self::store::{DocumentStore, FileStore};
