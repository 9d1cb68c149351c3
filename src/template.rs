//! # Domain Templating
//!
//! Stored documents never contain the deployment domain. On write every
//! occurrence of the domain is replaced with [`DOMAIN_TOKEN`]; on read the
//! token is replaced with the active domain. The same file is therefore valid
//! under any domain, e.g. a development host and production.
//!
//! A domain with a port has two forms: `localhost%3A8522` inside DIDs and
//! `localhost:8522` inside URLs. Both are stored as the token. A token
//! directly following `://` is read back in URL form, any other token in DID
//! form.
//!
//! Substitution is textual: a domain that happens to occur as a substring of
//! unrelated document content is replaced as well.

use crate::url;

/// Placeholder standing in for the deployment domain in stored documents.
pub const DOMAIN_TOKEN: &str = "{{DOMAIN}}";

const URL_TOKEN: &str = "://{{DOMAIN}}";

/// Replace every token in stored text with `domain` (in DID form).
#[must_use]
pub fn apply(stored: &str, domain: &str) -> String {
    let host = url::http_domain(domain);
    stored.replace(URL_TOKEN, &format!("://{host}")).replace(DOMAIN_TOKEN, domain)
}

/// Replace every occurrence of `domain` (in DID form) and of its URL form
/// with the token for storage.
///
/// An empty domain leaves the text untouched.
#[must_use]
pub fn strip(text: &str, domain: &str) -> String {
    if domain.is_empty() {
        return text.to_string();
    }
    let host = url::http_domain(domain);
    let text = if host == domain {
        text.to_string()
    } else {
        text.replace(&format!("://{host}"), URL_TOKEN)
    };
    text.replace(domain, DOMAIN_TOKEN)
}
