use serde::{Deserialize, Serialize};

use crate::reference::ImageReference;

//
// Registry documents
//

/// Manifest response, either an index over platform variants or a single image.
///
/// See [image index](https://github.com/opencontainers/image-spec/blob/v1.0.1/image-index.md)
/// and [image manifest](https://github.com/opencontainers/image-spec/blob/v1.0.1/manifest.md).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Manifest {
    List(ManifestList),
    Image(ImageManifest),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestList {
    pub manifests: Vec<ManifestEntry>,
}

impl ManifestList {
    /// First entry built for the given architecture and OS.
    pub fn find(&self, architecture: &str, os: &str) -> Option<&ManifestEntry> {
        self.manifests.iter().find(|entry| {
            entry
                .platform
                .as_ref()
                .map_or(false, |p| p.architecture == architecture && p.os == os)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub digest: String,
    #[serde(default)]
    pub platform: Option<ManifestPlatform>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestPlatform {
    pub architecture: String,
    pub os: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifest {
    pub config: ConfigDescriptor,
    pub layers: Vec<LayerDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigDescriptor {
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub media_type: String,
    /// Compressed size as stored in the registry
    pub size: u64,
    pub digest: String,
}

//
// Statistics
//

/// Sizes of one layer blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSize {
    pub compressed: u64,
    pub uncompressed: u64,
}

/// Per-layer sizes of one image plus a trailing entry for its config blob.
///
/// Built in one go by [`ImageStatistics::new`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStatistics {
    image: ImageReference,
    compressed_sizes: Vec<u64>,
    uncompressed_sizes: Vec<u64>,
}

impl ImageStatistics {
    /// `layers` must be in manifest order. The config blob is stored uncompressed so it
    /// counts the same on both sides.
    pub fn new(image: ImageReference, layers: &[LayerSize], config_size: u64) -> Self {
        let mut compressed_sizes: Vec<u64> = layers.iter().map(|l| l.compressed).collect();
        let mut uncompressed_sizes: Vec<u64> = layers.iter().map(|l| l.uncompressed).collect();
        compressed_sizes.push(config_size);
        uncompressed_sizes.push(config_size);
        Self {
            image,
            compressed_sizes,
            uncompressed_sizes,
        }
    }

    pub fn image(&self) -> &ImageReference {
        &self.image
    }

    pub fn compressed_sizes(&self) -> &[u64] {
        &self.compressed_sizes
    }

    pub fn uncompressed_sizes(&self) -> &[u64] {
        &self.uncompressed_sizes
    }

    /// Layer sizes in manifest order, without the config entry.
    pub fn layers(&self) -> impl Iterator<Item = LayerSize> + '_ {
        let count = self.total_layers();
        self.compressed_sizes
            .iter()
            .zip(&self.uncompressed_sizes)
            .take(count)
            .map(|(&compressed, &uncompressed)| LayerSize {
                compressed,
                uncompressed,
            })
    }

    pub fn config_size(&self) -> u64 {
        self.compressed_sizes.last().copied().unwrap_or(0)
    }

    pub fn total_compressed_size(&self) -> u64 {
        self.compressed_sizes.iter().sum()
    }

    pub fn total_uncompressed_size(&self) -> u64 {
        self.uncompressed_sizes.iter().sum()
    }

    /// Number of layers. The config entry is not a layer, so this is one less than
    /// `compressed_sizes().len()`.
    pub fn total_layers(&self) -> usize {
        self.compressed_sizes.len().saturating_sub(1)
    }

    /// `1 - compressed / uncompressed`, or 0 for an empty image.
    pub fn space_savings(&self) -> f64 {
        let uncompressed = self.total_uncompressed_size();
        if uncompressed == 0 {
            return 0.0;
        }
        1.0 - self.total_compressed_size() as f64 / uncompressed as f64
    }

    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            image: self.image.to_string(),
            layers: self.total_layers(),
            compressed_size: self.total_compressed_size(),
            uncompressed_size: self.total_uncompressed_size(),
            space_savings: self.space_savings(),
        }
    }
}

/// Derived totals of one image, as rendered to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub image: String,
    pub layers: usize,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub space_savings: f64,
}

/// Difference between two images, `after - before`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub before: ImageSummary,
    pub after: ImageSummary,
    pub layers_delta: i64,
    pub compressed_delta: i64,
    pub uncompressed_delta: i64,
    /// Change of space savings in percentage points
    pub savings_delta: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer_stats() -> ImageStatistics {
        ImageStatistics::new(
            ImageReference::new("library/ubuntu", "24.04"),
            &[
                LayerSize {
                    compressed: 29_715_000,
                    uncompressed: 80_624_303,
                },
                LayerSize {
                    compressed: 1_000,
                    uncompressed: 1_000,
                },
            ],
            1_632,
        )
    }

    #[test]
    fn totals_include_config() {
        let stats = two_layer_stats();
        assert_eq!(stats.total_layers(), 2);
        assert_eq!(stats.compressed_sizes().len(), 3);
        assert_eq!(stats.uncompressed_sizes().len(), 3);
        assert_eq!(stats.total_compressed_size(), 29_717_632);
        assert_eq!(stats.total_uncompressed_size(), 80_626_935);
        assert_eq!(stats.config_size(), 1_632);
    }

    #[test]
    fn space_savings() {
        let stats = two_layer_stats();
        let expected = 1.0 - 29_717_632.0 / 80_626_935.0;
        assert!((stats.space_savings() - expected).abs() < 1e-12);
        assert!((stats.space_savings() - 0.6314).abs() < 1e-4);
    }

    #[test]
    fn space_savings_of_empty_image() {
        let stats = ImageStatistics::new(ImageReference::new("scratch", "latest"), &[], 0);
        assert_eq!(stats.total_layers(), 0);
        assert_eq!(stats.space_savings(), 0.0);
    }

    #[test]
    fn layers_skip_config() {
        let stats = two_layer_stats();
        let layers: Vec<_> = stats.layers().collect();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].compressed, 1_000);
    }

    #[test]
    fn manifest_list_document() {
        let doc = r#"{
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.index.v1+json",
            "manifests": [
                {"digest": "sha256:aaa", "size": 424, "platform": {"architecture": "arm64", "os": "linux", "variant": "v8"}},
                {"digest": "sha256:bbb", "size": 424, "platform": {"architecture": "amd64", "os": "linux"}},
                {"digest": "sha256:ccc", "size": 566}
            ]
        }"#;
        let Manifest::List(list) = serde_json::from_str(doc).unwrap() else {
            panic!("expected a manifest list");
        };
        assert_eq!(list.find("amd64", "linux").unwrap().digest, "sha256:bbb");
        assert!(list.find("amd64", "windows").is_none());
    }

    #[test]
    fn image_manifest_document() {
        let doc = r#"{
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "config": {"mediaType": "application/vnd.oci.image.config.v1+json", "size": 2295, "digest": "sha256:cfg"},
            "layers": [
                {"mediaType": "application/vnd.oci.image.layer.v1.tar+gzip", "size": 29715337, "digest": "sha256:l1"}
            ]
        }"#;
        let Manifest::Image(manifest) = serde_json::from_str(doc).unwrap() else {
            panic!("expected an image manifest");
        };
        assert_eq!(manifest.config.size, 2295);
        assert_eq!(manifest.layers[0].size, 29_715_337);
    }

    #[test]
    fn malformed_document() {
        assert!(serde_json::from_str::<Manifest>(r#"{"layers": "nope"}"#).is_err());
    }
}
