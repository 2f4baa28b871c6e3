//! Media types understood by the registry client.
//!
//! See [OCI media types](https://github.com/opencontainers/image-spec/blob/v1.0.1/media-types.md)
//! and the [Docker image manifest v2.2](https://github.com/distribution/distribution/blob/v2.8.3/docs/spec/manifest-v2-2.md#image-manifest).

use crate::error::{Error, Result};

pub const OCI_IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const OCI_IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const OCI_LAYER_TAR: &str = "application/vnd.oci.image.layer.v1.tar";
pub const OCI_LAYER_NONDISTRIBUTABLE_TAR: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar";
pub const OCI_LAYER_TAR_GZIP: &str = "application/vnd.oci.image.layer.v1.tar+gzip";
pub const OCI_LAYER_NONDISTRIBUTABLE_TAR_GZIP: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar+gzip";
pub const OCI_LAYER_TAR_ZSTD: &str = "application/vnd.oci.image.layer.v1.tar+zstd";
pub const OCI_LAYER_NONDISTRIBUTABLE_TAR_ZSTD: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar+zstd";

pub const DOCKER_MANIFEST_V1: &str = "application/vnd.docker.distribution.manifest.v1+json";
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
pub const DOCKER_CONTAINER_CONFIG: &str = "application/vnd.docker.container.image.v1+json";
pub const DOCKER_LAYER_TAR_GZIP: &str = "application/vnd.docker.image.rootfs.diff.tar.gzip";
pub const DOCKER_FOREIGN_LAYER_TAR_GZIP: &str =
    "application/vnd.docker.image.rootfs.foreign.diff.tar.gzip";

/// Every media type sent in the `Accept` header of manifest and blob requests.
pub const ACCEPTED: &[&str] = &[
    OCI_IMAGE_INDEX,
    OCI_IMAGE_MANIFEST,
    OCI_LAYER_TAR,
    OCI_LAYER_NONDISTRIBUTABLE_TAR,
    OCI_LAYER_TAR_GZIP,
    OCI_LAYER_NONDISTRIBUTABLE_TAR_GZIP,
    OCI_LAYER_TAR_ZSTD,
    OCI_LAYER_NONDISTRIBUTABLE_TAR_ZSTD,
    DOCKER_MANIFEST_V1,
    DOCKER_MANIFEST_V2,
    DOCKER_MANIFEST_LIST,
    DOCKER_CONTAINER_CONFIG,
    DOCKER_LAYER_TAR_GZIP,
    DOCKER_FOREIGN_LAYER_TAR_GZIP,
];

/// The `Accept` header value listing [`ACCEPTED`].
pub fn accept_header() -> String {
    ACCEPTED.join(",")
}

/// How a layer blob is stored, which decides how its uncompressed size is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCompression {
    /// Plain tar, the manifest size is already the uncompressed size
    Uncompressed,
    Gzip,
    Zstd,
}

impl LayerCompression {
    pub fn from_media_type(media_type: &str) -> Result<Self> {
        match media_type {
            OCI_LAYER_TAR | OCI_LAYER_NONDISTRIBUTABLE_TAR => Ok(LayerCompression::Uncompressed),
            OCI_LAYER_TAR_GZIP
            | OCI_LAYER_NONDISTRIBUTABLE_TAR_GZIP
            | DOCKER_LAYER_TAR_GZIP
            | DOCKER_FOREIGN_LAYER_TAR_GZIP => Ok(LayerCompression::Gzip),
            OCI_LAYER_TAR_ZSTD | OCI_LAYER_NONDISTRIBUTABLE_TAR_ZSTD => Ok(LayerCompression::Zstd),
            other => Err(Error::UnsupportedMediaType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_layers() {
        assert_eq!(
            LayerCompression::from_media_type(OCI_LAYER_NONDISTRIBUTABLE_TAR).unwrap(),
            LayerCompression::Uncompressed
        );
        assert_eq!(
            LayerCompression::from_media_type(DOCKER_FOREIGN_LAYER_TAR_GZIP).unwrap(),
            LayerCompression::Gzip
        );
        assert_eq!(
            LayerCompression::from_media_type(OCI_LAYER_TAR_ZSTD).unwrap(),
            LayerCompression::Zstd
        );
    }

    #[test]
    fn unknown_layer_media_type() {
        let err = LayerCompression::from_media_type("application/vnd.example.layer.v1+lz4")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized media type application/vnd.example.layer.v1+lz4"
        );
    }

    #[test]
    fn accept_header_lists_manifest_types() {
        let accept = accept_header();
        assert!(accept.contains(OCI_IMAGE_INDEX));
        assert!(accept.contains(DOCKER_MANIFEST_V2));
        assert!(!accept.contains(", "));
    }
}
