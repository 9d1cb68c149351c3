//! Helper functions for converting between `did:web` DIDs, domains and HTTP
//! URLs.
//!
//! See <https://w3c-ccg.github.io/did-method-web/#read-resolve>.

use crate::error::{Error, Result};

const PREFIX: &str = "did:web:";

/// Encode a host for use in a DID: a port separator becomes `%3A`, including
/// an already encoded lowercase `%3a`.
#[must_use]
pub fn did_domain(domain: &str) -> String {
    domain.replace(':', "%3A").replace("%3a", "%3A")
}

/// Decode a DID host for use in a URL: `%3A` becomes a port separator.
#[must_use]
pub fn http_domain(domain: &str) -> String {
    domain.replace("%3A", ":").replace("%3a", ":")
}

/// Convert a `did:web` DID to the HTTP URL of its DID document.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the DID is not a `did:web` DID.
pub fn to_http(did: &str, scheme: &str) -> Result<String> {
    let Some(id) = did.strip_prefix(PREFIX) else {
        return Err(Error::InvalidPath(format!("{did} is not a did:web DID")));
    };
    if id.is_empty() {
        return Err(Error::InvalidPath(format!("{did} has no domain")));
    }

    // 1. Replace ":" with "/" in the method specific identifier to obtain the fully
    //    qualified domain name and optional path.
    // 2. If the domain contains a port percent decode the colon.
    let location = http_domain(&id.replace(':', "/"));

    // 3. If no path has been specified in the URL, append /.well-known.
    let mut url = format!("{scheme}://{location}");
    if !id.contains(':') {
        url.push_str("/.well-known");
    }

    // 4. Append /did.json to complete the URL.
    url.push_str("/did.json");
    Ok(url)
}
