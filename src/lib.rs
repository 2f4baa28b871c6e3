//! rocisc
//! ======
//!
//! Compressed and uncompressed size of container images, computed against an OCI registry
//! without pulling the layers. Uncompressed layer sizes come from the gzip trailer or the
//! zstd frame header, fetched with HTTP range requests.

pub mod compare;
pub mod compression;
pub mod error;
pub mod format;
pub mod media_types;
pub mod models;
pub mod platform;
pub mod reference;
pub mod registry;

pub use error::{Error, Result};
pub use models::{Comparison, ImageStatistics, ImageSummary};
pub use platform::Platform;
pub use reference::ImageReference;
pub use registry::{RegistryClient, RegistryConfig};
