//! Image key parsing.
//!
//! Images are identified externally by `NAME:VERSION`. The split is strict:
//! exactly one colon, both sides non-empty. Validation happens here, before
//! any storage backend is involved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error for a malformed `NAME:VERSION` key.
#[derive(Debug, thiserror::Error)]
#[error("image key {0:?} must be formatted as NAME:VERSION with a single separating colon")]
pub struct KeyError(pub String);

/// A parsed `name:version` image identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageKey {
    pub name: String,
    pub version: String,
}

impl ImageKey {
    /// Parse a raw `NAME:VERSION` string.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let mut parts = raw.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(version), None) if !name.is_empty() && !version.is_empty() => {
                Ok(Self {
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(KeyError(raw.to_string())),
        }
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

impl std::str::FromStr for ImageKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_key() {
        let key = ImageKey::parse("my-api:v1.2.3").unwrap();
        assert_eq!(key.name, "my-api");
        assert_eq!(key.version, "v1.2.3");
        assert_eq!(key.to_string(), "my-api:v1.2.3");
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(ImageKey::parse("my-api").is_err());
    }

    #[test]
    fn rejects_extra_colons() {
        assert!(ImageKey::parse("registry:my-api:v1").is_err());
    }

    #[test]
    fn rejects_empty_components() {
        assert!(ImageKey::parse(":v1").is_err());
        assert!(ImageKey::parse("my-api:").is_err());
        assert!(ImageKey::parse(":").is_err());
        assert!(ImageKey::parse("").is_err());
    }
}
