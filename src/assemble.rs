//! # Document Assembly
//!
//! Wires generated key pairs into a W3C DID document. Signing keys become
//! verification methods referenced from the authentication, assertion and
//! capability relationships; key agreement keys are embedded in the
//! `keyAgreement` relationship only.

use crate::document::{Document, DocumentBuilder, Service, ServiceBuilder, VerificationMethod};
use crate::error::Result;
use crate::key::{KeyPair, KeyPurpose};

/// Fragment of the root document's generation service.
pub const GENERATION_SERVICE_ID: &str = "did-generation";

/// Type of the root document's generation service.
pub const GENERATION_SERVICE_TYPE: &str = "DIDGenerationService";

/// Build a DID document for `did` from generated key pairs and services.
///
/// The shape of the result depends only on the DID, the suites of the key
/// pairs (in order) and the services.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidDocument`] if the assembled document fails
/// the relationship check.
pub fn assemble(did: &str, key_pairs: &[KeyPair], services: Vec<Service>) -> Result<Document> {
    let mut builder = DocumentBuilder::new(did);

    for key_pair in key_pairs {
        let suite = key_pair.suite();
        let vm = VerificationMethod::from_key_pair(did, key_pair);
        builder = builder.context(suite.context());

        builder = match suite.purpose() {
            KeyPurpose::Verification => {
                let id = vm.id.clone();
                builder
                    .verification_method(vm)
                    .authentication(&id)
                    .assertion_method(&id)
                    .capability_delegation(&id)
                    .capability_invocation(id)
            }
            KeyPurpose::KeyAgreement => builder.key_agreement(vm),
        };
    }

    for service in services {
        builder = builder.service(service);
    }

    builder.build()
}

/// The service advertising the DID generation endpoint on the root document.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidDocument`] if the service cannot be built.
pub fn generation_service(did: &str, endpoint: &str) -> Result<Service> {
    ServiceBuilder::new()
        .id(GENERATION_SERVICE_ID)
        .service_type(GENERATION_SERVICE_TYPE)
        .endpoint(endpoint)
        .build(did)
}
