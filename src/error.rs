use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    //
    // Invalid user input or registry content
    //
    #[error("Invalid image reference: {0}")]
    InvalidReference(String),
    #[error("Invalid zstd magic number: {0:#010x}")]
    InvalidZstdMagic(u32),
    #[error("Frame content size not available in zstd header")]
    ZstdContentSizeUnavailable,
    #[error("Invalid value for Frame_Content_Size_flag: {0}")]
    InvalidContentSizeFlag(u8),
    #[error("Header truncated: needed {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },
    #[error(transparent)]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    //
    // Content this client does not handle
    //
    #[error("Unrecognized media type {0}")]
    UnsupportedMediaType(String),
    #[error("Manifest for image {0} is not a manifest list")]
    NotAManifestList(String),
    #[error("Manifest {0} is not an image manifest")]
    NotAnImageManifest(String),

    //
    // Resolution against the registry
    //
    #[error("Failed to find manifest for os {os} and architecture {architecture} for image {image}")]
    PlatformNotFound {
        os: String,
        architecture: String,
        image: String,
    },

    //
    // Error from OCI registry
    //
    #[error("Response status for {url}: {status}")]
    HttpStatus { url: String, status: StatusCode },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
