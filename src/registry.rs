//! Client for the pull side of the [OCI distribution API](https://github.com/opencontainers/distribution-spec/blob/v1.1.1/spec.md).

use bytes::Bytes;
use futures::future::try_join_all;
use futures::stream::{FuturesUnordered, TryStreamExt};
use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RANGE, USER_AGENT, WWW_AUTHENTICATE,
};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::compression::{gzip_uncompressed_size, zstd_frame_content_size};
use crate::error::{Error, Result};
use crate::media_types::{accept_header, LayerCompression};
use crate::models::{ImageStatistics, LayerDescriptor, LayerSize, Manifest};
use crate::platform::Platform;
use crate::reference::ImageReference;

const CLIENT_USER_AGENT: &str = concat!("rocisc/", env!("CARGO_PKG_VERSION"));

/// Last 4 bytes of a gzip member hold the original size.
const GZIP_TRAILER_RANGE: &str = "bytes=-4";
/// Enough for the largest zstd frame header.
const ZSTD_HEADER_RANGE: &str = "bytes=0-18";

/// Settings fixed for the lifetime of a [`RegistryClient`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry, e.g. `https://registry-1.docker.io`
    pub registry: Url,
    /// Full `Authorization` header value. Skips the token exchange when set.
    pub authorization: Option<String>,
    /// Log every request at info level
    pub debug: bool,
}

impl RegistryConfig {
    pub fn new(registry: &str) -> Result<Self> {
        Ok(Self {
            registry: Url::parse(registry)?,
            authorization: None,
            debug: false,
        })
    }
}

pub struct RegistryClient {
    client: reqwest::Client,
    registry: Url,
    /// Written by `try_authenticate` only, which needs `&mut self`
    authorization: Option<String>,
    debug: bool,
}

impl RegistryClient {
    /// Registry behind Docker Hub image names.
    pub const DOCKER_HUB: &'static str = "https://registry-1.docker.io";

    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            registry: config.registry,
            authorization: config.authorization,
            debug: config.debug,
        }
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Get a pull token for all given repositories, if the registry asks for one.
    ///
    /// Probes `GET /v2/`. On a `401` with a parseable `WWW-Authenticate` challenge a token is
    /// requested from the challenge realm and kept as the credential of every later request.
    /// Without a challenge the client stays anonymous.
    pub async fn try_authenticate(&mut self, images: &[ImageReference]) -> Result<()> {
        if self.authorization.is_some() {
            return Ok(());
        }

        let url = self.registry.join("/v2/")?;
        let response = self.send(&url, HeaderMap::new()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let challenge = match response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
        {
            Some(header) => match AuthChallenge::from_header(header) {
                Some(challenge) => challenge,
                None => {
                    warn!(%header, "Unsupported WWW-Authenticate header, continuing anonymously");
                    return Ok(());
                }
            },
            None => return Ok(()),
        };

        let mut query: Vec<(&str, String)> = Vec::new();
        for image in images {
            let scope = format!("repository:{}:pull", image.repository());
            if !query.iter().any(|(_, s)| *s == scope) {
                query.push(("scope", scope));
            }
        }
        query.push(("service", challenge.service.clone()));

        let realm = Url::parse(&challenge.realm)?;
        let response = self.client.get(realm.clone()).query(&query).send().await?;
        self.log_response(&realm, false, response.status());
        let response = ensure_success(&realm, response)?;
        let token: Token = serde_json::from_slice(&response.bytes().await?)?;

        debug!(realm = %challenge.realm, scopes = query.len() - 1, "Obtained registry token");
        self.authorization = Some(format!("{} {}", challenge.scheme, token.token));
        Ok(())
    }

    /// Get manifest or manifest list
    ///
    /// ```text
    /// GET /v2/<name>/manifests/<reference>
    /// ```
    pub async fn get_manifest(&self, image: &ImageReference) -> Result<Manifest> {
        let path = format!("/v2/{}/manifests/{}", image.repository(), image.reference());
        let response = self.request(&path, HeaderMap::new()).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// Get blob, `image.reference()` being its digest
    ///
    /// ```text
    /// GET /v2/<name>/blobs/<digest>
    /// ```
    ///
    /// `headers` are sent along, e.g. a `Range` to fetch part of the blob.
    pub async fn get_blob(&self, image: &ImageReference, headers: HeaderMap) -> Result<Bytes> {
        let path = format!("/v2/{}/blobs/{}", image.repository(), image.reference());
        let response = self.request(&path, headers).await?;
        Ok(response.bytes().await?)
    }

    /// Compressed and uncompressed sizes of the `platform` variant of `image`.
    pub async fn get_image_statistics(
        &self,
        platform: &Platform,
        image: &ImageReference,
    ) -> Result<ImageStatistics> {
        let list = match self.get_manifest(image).await? {
            Manifest::List(list) => list,
            Manifest::Image(_) => return Err(Error::NotAManifestList(image.to_string())),
        };
        let entry = list
            .find(platform.architecture(), platform.os())
            .ok_or_else(|| Error::PlatformNotFound {
                os: platform.os().to_string(),
                architecture: platform.architecture().to_string(),
                image: image.to_string(),
            })?;

        let platform_image = image.with_reference(&entry.digest);
        let manifest = match self.get_manifest(&platform_image).await? {
            Manifest::Image(manifest) => manifest,
            Manifest::List(_) => {
                return Err(Error::NotAnImageManifest(platform_image.to_string()))
            }
        };

        let mut lookups: FuturesUnordered<_> = manifest
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| async move {
                let size = self.uncompressed_size(image, layer).await?;
                Ok::<_, Error>((index, size))
            })
            .collect();
        let mut uncompressed = vec![0; manifest.layers.len()];
        while let Some((index, size)) = lookups.try_next().await? {
            uncompressed[index] = size;
        }

        let layers: Vec<LayerSize> = manifest
            .layers
            .iter()
            .zip(uncompressed)
            .map(|(layer, uncompressed)| LayerSize {
                compressed: layer.size,
                uncompressed,
            })
            .collect();

        info!(
            %image,
            %platform,
            digest = %entry.digest,
            layer_count = layers.len(),
            "Resolved image"
        );
        Ok(ImageStatistics::new(image.clone(), &layers, manifest.config.size))
    }

    /// Statistics of several images, in the order they were given.
    pub async fn get_all_image_statistics(
        &self,
        platform: &Platform,
        images: &[ImageReference],
    ) -> Result<Vec<ImageStatistics>> {
        try_join_all(
            images
                .iter()
                .map(|image| self.get_image_statistics(platform, image)),
        )
        .await
    }

    async fn uncompressed_size(
        &self,
        image: &ImageReference,
        layer: &LayerDescriptor,
    ) -> Result<u64> {
        let blob = image.with_reference(&layer.digest);
        match LayerCompression::from_media_type(&layer.media_type)? {
            LayerCompression::Uncompressed => Ok(layer.size),
            LayerCompression::Gzip => {
                let trailer = self.get_blob(&blob, range(GZIP_TRAILER_RANGE)).await?;
                gzip_uncompressed_size(&trailer)
            }
            LayerCompression::Zstd => {
                let header = self.get_blob(&blob, range(ZSTD_HEADER_RANGE)).await?;
                zstd_frame_content_size(&header)
            }
        }
    }

    async fn request(&self, path: &str, headers: HeaderMap) -> Result<Response> {
        let url = self.registry.join(path)?;
        let response = self.send(&url, headers).await?;
        ensure_success(&url, response)
    }

    async fn send(&self, url: &Url, headers: HeaderMap) -> Result<Response> {
        let mut req = self
            .client
            .get(url.clone())
            .headers(headers)
            .header(ACCEPT, accept_header())
            .header(USER_AGENT, CLIENT_USER_AGENT);
        if let Some(authorization) = &self.authorization {
            req = req.header(AUTHORIZATION, authorization);
        }
        let response = req.send().await?;
        self.log_response(url, self.authorization.is_some(), response.status());
        Ok(response)
    }

    fn log_response(&self, url: &Url, authorized: bool, status: StatusCode) {
        if self.debug {
            info!(%url, authorized, %status, "GET");
        } else {
            debug!(%url, authorized, %status, "GET");
        }
    }
}

fn ensure_success(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::HttpStatus {
            url: url.to_string(),
            status,
        })
    }
}

fn range(value: &'static str) -> HeaderMap {
    HeaderMap::from_iter([(RANGE, HeaderValue::from_static(value))])
}

/// Bearer challenge from a `WWW-Authenticate` header.
///
/// ```
/// use rocisc::registry::AuthChallenge;
///
/// let challenge = AuthChallenge::from_header(
///     r#"Bearer realm="https://auth.docker.io/token",service="registry.docker.io""#,
/// )
/// .unwrap();
/// assert_eq!(challenge.scheme, "Bearer");
/// assert_eq!(challenge.realm, "https://auth.docker.io/token");
/// assert_eq!(challenge.service, "registry.docker.io");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub scheme: String,
    pub realm: String,
    pub service: String,
}

impl AuthChallenge {
    /// `None` when the header is not of the form `<scheme> realm="<url>", service="<service>"`.
    pub fn from_header(header: &str) -> Option<Self> {
        static CHALLENGE_RE: OnceLock<Regex> = OnceLock::new();
        let re = CHALLENGE_RE.get_or_init(|| {
            Regex::new(r#"([^ ]*) realm="([^"]*)", *service="([^"]*)""#)
                .expect("challenge pattern is valid")
        });
        let captures = re.captures(header)?;
        Some(Self {
            scheme: captures[1].to_string(),
            realm: captures[2].to_string(),
            service: captures[3].to_string(),
        })
    }
}

#[derive(Deserialize)]
struct Token {
    token: String,
}
