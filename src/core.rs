//! # Core

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
///
/// Verification relationships use this to hold either a reference to a
/// verification method (its id) or an embedded verification method.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> Kind<T> {
    /// Returns `true` if the `Kind` is a string.
    pub const fn is_string(&self) -> bool {
        match self {
            Self::String(_) => true,
            Self::Object(_) => false,
        }
    }

    /// Returns `true` if the `Kind` is an object.
    pub const fn is_object(&self) -> bool {
        match self {
            Self::String(_) => false,
            Self::Object(_) => true,
        }
    }

    /// Returns the string value, if any.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// Returns the object value, if any.
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::String(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<&str> for Kind<T> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// `OneMany` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T> OneMany<T> {
    /// Returns the length of the `OneMany`.
    pub const fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(many) => many.len(),
        }
    }

    /// Returns `true` if the `OneMany` is an empty `Many`.
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(many) => many.is_empty(),
        }
    }
}

impl<T> From<T> for OneMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_untagged() {
        let kind: Kind<serde_json::Value> =
            serde_json::from_str(r#""did:web:example.com#key-0""#).expect("should deserialize");
        assert!(kind.is_string());
        assert_eq!(kind.as_string(), Some("did:web:example.com#key-0"));

        let kind: Kind<serde_json::Value> =
            serde_json::from_str(r#"{"id":"key-0"}"#).expect("should deserialize");
        assert!(kind.is_object());
    }

    #[test]
    fn one_many_untagged() {
        let one: OneMany<String> = serde_json::from_str(r#""a""#).expect("should deserialize");
        assert_eq!(one.len(), 1);

        let many: OneMany<String> =
            serde_json::from_str(r#"["a","b"]"#).expect("should deserialize");
        assert_eq!(many.len(), 2);
        assert!(!many.is_empty());
    }
}
