//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related to a
//! DID.
//!
//! Stored documents may be hand-authored, so unknown members and verification
//! method types are preserved when reading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Kind, OneMany};
use crate::error::{Error, Result};
use crate::key::KeyPair;

/// Base context for every DID document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The DID for a particular DID subject.
    ///
    /// The subject is defined as the entity identified by the DID and described
    /// by the DID document.
    pub id: String,

    /// A set of URIs that are other identifiers for the subject of the above
    /// DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// One or more DIDs permitted to make changes to the DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneMany<String>>,

    /// If set, MUST be a set of verification methods for the DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// The `authentication` verification relationship is used to specify how
    /// the DID subject is expected to be authenticated.
    ///
    /// <https://www.w3.org/TR/did-core/#authentication>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// The `assertion_method` verification relationship is used to specify how
    /// the DID subject is expected to express claims, such as for the
    /// purposes of issuing a Verifiable Credential.
    ///
    /// <https://www.w3.org/TR/did-core/#assertion>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// The `capability_delegation` verification relationship is used to
    /// specify a mechanism that might be used by the DID subject to delegate
    /// a cryptographic capability to another party.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-delegation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// The `capability_invocation` verification relationship is used to
    /// specify a verification method that might be used by the DID subject
    /// to invoke a cryptographic capability, such as the authorization to
    /// update the DID Document.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-invocation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// The `key_agreement` verification relationship is used to specify how an
    /// entity can generate encryption material in order to transmit
    /// confidential information intended for the DID subject.
    ///
    /// <https://www.w3.org/TR/did-core/#key-agreement>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,

    /// A set of services, that express ways of communicating with the DID
    /// subject or related entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    /// Members not modelled above, kept verbatim.
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

impl Document {
    /// Retrieve a service by its ID.
    #[must_use]
    pub fn service(&self, id: &str) -> Option<&Service> {
        self.service.as_ref()?.iter().find(|s| s.id == id)
    }

    /// Retrieve a verification method by its ID.
    ///
    /// Key agreement methods embedded in the `key_agreement` relationship are
    /// included in the search.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        let listed = self.verification_method.iter().flatten();
        let embedded =
            self.key_agreement.iter().flatten().filter_map(Kind::as_object);
        listed.chain(embedded).find(|vm| vm.id == id)
    }

    /// Check every relationship reference resolves to a verification method
    /// in the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] naming the first dangling reference.
    pub fn check_references(&self) -> Result<()> {
        let relationships = [
            ("authentication", &self.authentication),
            ("assertionMethod", &self.assertion_method),
            ("capabilityDelegation", &self.capability_delegation),
            ("capabilityInvocation", &self.capability_invocation),
            ("keyAgreement", &self.key_agreement),
        ];
        for (name, entries) in relationships {
            for id in entries.iter().flatten().filter_map(Kind::as_string) {
                if self.verification_method(id).is_none() {
                    return Err(Error::InvalidDocument(format!(
                        "{name} references unknown verification method {id}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A DID document can express verification methods, such as cryptographic
/// public keys, which can be used to authenticate or authorize interactions
/// with the DID subject or associated parties.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Only used when the verification method uses terms not defined in the
    /// containing document.
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Kind<Value>>,

    /// A DID URL that identifies the verification method.
    pub id: String,

    /// The type of verification method. SHOULD be a registered type in the
    /// [DID Specification Registries](https://www.w3.org/TR/did-spec-registries).
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// The public key encoded as a Multibase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// Other key formats (e.g. `publicKeyJwk`), kept verbatim.
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

impl VerificationMethod {
    /// Describe a generated key pair as a verification method of `did`.
    #[must_use]
    pub fn from_key_pair(did: &str, key_pair: &KeyPair) -> Self {
        Self {
            id: key_pair.key_id(did),
            type_: key_pair.suite().to_string(),
            controller: did.to_string(),
            public_key_multibase: Some(key_pair.public_key_multibase().to_string()),
            ..Self::default()
        }
    }
}

/// A Service is used to express a way of communicating with the DID subject or
/// associated entities.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)]
pub struct Service {
    /// A URI unique to the service.
    pub id: String,

    /// The service type. SHOULD be registered in the DID Specification
    /// Registries.
    #[serde(rename = "type")]
    pub type_: String,

    /// One or more endpoints for the service.
    pub service_endpoint: OneMany<Kind<Value>>,
}

/// Service builder
#[derive(Default)]
pub struct ServiceBuilder {
    id: Option<String>,
    service_type: Option<String>,
    endpoint: Option<Vec<Kind<Value>>>,
}

impl ServiceBuilder {
    /// Creates a new `ServiceBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The service fragment. The full id is `<did>#<id>`.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Specify the service type.
    #[must_use]
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    /// Specify a string-based service endpoint.
    ///
    /// Chain to add multiple endpoints.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint.get_or_insert(vec![]).push(Kind::String(endpoint.into()));
        self
    }

    /// Build the service for `did`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if the id, type or endpoint is
    /// missing.
    pub fn build(self, did: &str) -> Result<Service> {
        let Some(id) = self.id else {
            return Err(Error::InvalidDocument("service has no id".into()));
        };
        let Some(service_type) = self.service_type else {
            return Err(Error::InvalidDocument("service has no type".into()));
        };
        let Some(mut endpoint) = self.endpoint else {
            return Err(Error::InvalidDocument("service has no endpoint".into()));
        };
        let endpoint = if endpoint.len() == 1 {
            OneMany::One(endpoint.remove(0))
        } else {
            OneMany::Many(endpoint)
        };

        Ok(Service {
            id: format!("{did}#{id}"),
            type_: service_type,
            service_endpoint: endpoint,
        })
    }
}

/// DID Document builder.
///
/// Verification relationships added by reference must name a verification
/// method added to the builder; [`DocumentBuilder::build`] enforces this.
pub struct DocumentBuilder {
    did: String,
    context: Vec<String>,
    verification_method: Option<Vec<VerificationMethod>>,
    authentication: Option<Vec<Kind<VerificationMethod>>>,
    assertion_method: Option<Vec<Kind<VerificationMethod>>>,
    capability_delegation: Option<Vec<Kind<VerificationMethod>>>,
    capability_invocation: Option<Vec<Kind<VerificationMethod>>>,
    key_agreement: Option<Vec<Kind<VerificationMethod>>>,
    service: Option<Vec<Service>>,
}

impl DocumentBuilder {
    /// Creates a new `DocumentBuilder` for the given DID.
    #[must_use]
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            context: vec![DID_CONTEXT.to_string()],
            verification_method: None,
            authentication: None,
            assertion_method: None,
            capability_delegation: None,
            capability_invocation: None,
            key_agreement: None,
            service: None,
        }
    }

    /// The DID the document is being built for.
    #[must_use]
    pub fn did(&self) -> &str {
        &self.did
    }

    /// Add a context. Duplicates are ignored.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !self.context.contains(&context) {
            self.context.push(context);
        }
        self
    }

    /// Add a verification method.
    #[must_use]
    pub fn verification_method(mut self, vm: VerificationMethod) -> Self {
        self.verification_method.get_or_insert(vec![]).push(vm);
        self
    }

    /// Add a verification method reference to the `authentication`
    /// relationship.
    #[must_use]
    pub fn authentication(mut self, id: impl Into<String>) -> Self {
        self.authentication.get_or_insert(vec![]).push(Kind::String(id.into()));
        self
    }

    /// Add a verification method reference to the `assertion_method`
    /// relationship.
    #[must_use]
    pub fn assertion_method(mut self, id: impl Into<String>) -> Self {
        self.assertion_method.get_or_insert(vec![]).push(Kind::String(id.into()));
        self
    }

    /// Add a verification method reference to the `capability_delegation`
    /// relationship.
    #[must_use]
    pub fn capability_delegation(mut self, id: impl Into<String>) -> Self {
        self.capability_delegation.get_or_insert(vec![]).push(Kind::String(id.into()));
        self
    }

    /// Add a verification method reference to the `capability_invocation`
    /// relationship.
    #[must_use]
    pub fn capability_invocation(mut self, id: impl Into<String>) -> Self {
        self.capability_invocation.get_or_insert(vec![]).push(Kind::String(id.into()));
        self
    }

    /// Embed a verification method in the `key_agreement` relationship.
    #[must_use]
    pub fn key_agreement(mut self, vm: VerificationMethod) -> Self {
        self.key_agreement.get_or_insert(vec![]).push(Kind::Object(vm));
        self
    }

    /// Add a service endpoint.
    ///
    /// Chain to add multiple service endpoints.
    #[must_use]
    pub fn service(mut self, service: Service) -> Self {
        self.service.get_or_insert(vec![]).push(service);
        self
    }

    /// Build the DID Document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a relationship references a
    /// verification method not present in the document.
    pub fn build(self) -> Result<Document> {
        let document = Document {
            context: self.context.into_iter().map(Kind::String).collect(),
            id: self.did,
            verification_method: self.verification_method,
            authentication: self.authentication,
            assertion_method: self.assertion_method,
            capability_delegation: self.capability_delegation,
            capability_invocation: self.capability_invocation,
            key_agreement: self.key_agreement,
            service: self.service,
            ..Document::default()
        };
        document.check_references()?;
        Ok(document)
    }
}
