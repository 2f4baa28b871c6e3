use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const DEFAULT_REFERENCE: &str = "latest";

/// An image within a registry, as used by the
/// [pull endpoints](https://github.com/opencontainers/distribution-spec/blob/v1.1.1/spec.md#pulling-manifests).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Namespace scoping manifests, blobs and tags, e.g. `library/ubuntu`
    repository: String,
    /// Tag name or `algorithm:hex` digest
    reference: String,
}

impl ImageReference {
    pub fn new(repository: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            reference: reference.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Same repository, different tag or digest.
    pub fn with_reference(&self, reference: impl Into<String>) -> Self {
        Self::new(self.repository.clone(), reference)
    }
}

/// Parses `repository[:reference]`, defaulting the reference to `latest`.
///
/// A digest reference contains a colon itself, so pass digests through [`ImageReference::new`].
impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [repository] => Ok(Self::new(*repository, DEFAULT_REFERENCE)),
            [repository, reference] => Ok(Self::new(*repository, *reference)),
            _ => Err(Error::InvalidReference(s.to_string())),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_reference() {
        let image: ImageReference = "library/ubuntu".parse().unwrap();
        assert_eq!(image.repository(), "library/ubuntu");
        assert_eq!(image.reference(), "latest");
    }

    #[test]
    fn parse_with_tag() {
        let image: ImageReference = "devcontainers/base:1.2.4-ubuntu-24.04".parse().unwrap();
        assert_eq!(image.repository(), "devcontainers/base");
        assert_eq!(image.reference(), "1.2.4-ubuntu-24.04");
    }

    #[test]
    fn parse_too_many_colons() {
        let err = "library/ubuntu:sha256:abcd".parse::<ImageReference>().unwrap_err();
        assert!(matches!(err, Error::InvalidReference(ref s) if s == "library/ubuntu:sha256:abcd"));
        assert!("a:b:c:d".parse::<ImageReference>().is_err());
    }

    #[test]
    fn with_reference_keeps_repository() {
        let image = ImageReference::new("library/ubuntu", "24.04");
        let digest = image.with_reference("sha256:b59d21599a2b");
        assert_eq!(digest.repository(), "library/ubuntu");
        assert_eq!(digest.reference(), "sha256:b59d21599a2b");
        assert_eq!(image.reference(), "24.04");
    }

    #[test]
    fn display() {
        let image = ImageReference::new("library/ubuntu", "24.04");
        assert_eq!(image.to_string(), "library/ubuntu:24.04");
    }
}
