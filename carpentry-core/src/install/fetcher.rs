//! Download with integrity verification.
//!
//! The [`Fetcher`] trait retrieves raw bytes; [`download`] wraps any fetcher
//! with digest verification so mocks and the real HTTP client share the same
//! checks. Nothing here touches the disk.

use async_trait::async_trait;
use futures::StreamExt;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::time::Duration;
use url::Url;

use super::types::{DigestAlgorithm, ExpectedDigest};
use crate::error::{InstallError, Result};
use crate::report::Reporter;

// ============================================================================
// URL Validation
// ============================================================================

/// Validates that a URL is something we can GET.
///
/// Checks:
/// - URL must parse
/// - Scheme must be HTTP or HTTPS
/// - Host must be present
fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)
        .map_err(|e| InstallError::transport(url_str, format!("invalid URL: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(InstallError::transport(
            url_str,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(InstallError::transport(url_str, "URL must have a host"));
    }

    Ok(url)
}

// ============================================================================
// Download Progress
// ============================================================================

/// Upper bound on the buffer reserved from a `Content-Length` header.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Percentage of `total_bytes` received, or `None` if the total is unknown.
fn progress_percent(bytes_downloaded: u64, total_bytes: Option<u64>) -> Option<f32> {
    total_bytes.map(|total| {
        if total > 0 {
            (bytes_downloaded as f32 / total as f32) * 100.0
        } else {
            0.0
        }
    })
}

// ============================================================================
// Artifact + Verification
// ============================================================================

/// Raw bytes of one download. Only lives for the duration of an install.
#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Computes the lowercase hex digest of `bytes`.
pub fn compute_digest(algorithm: DigestAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        DigestAlgorithm::Sha1 => format_hex(&Sha1::digest(bytes)),
        DigestAlgorithm::Sha256 => format_hex(&Sha256::digest(bytes)),
        DigestAlgorithm::Sha512 => format_hex(&Sha512::digest(bytes)),
    }
}

/// Checks every expected digest against `bytes`.
///
/// Comparison is exact: expected digests are stored lowercase.
pub fn verify_digests(
    url: &str,
    bytes: &[u8],
    digests: &[ExpectedDigest],
    reporter: &dyn Reporter,
) -> Result<()> {
    for expected in digests {
        let actual = compute_digest(expected.algorithm, bytes);
        if actual != expected.hex {
            return Err(InstallError::Integrity {
                url: url.to_string(),
                algorithm: expected.algorithm.name().to_string(),
                expected: expected.hex.to_string(),
                actual,
            });
        }
        reporter.debug(&format!(
            "{} for {} matches the expected {}",
            expected.algorithm, url, expected.hex
        ));
    }
    Ok(())
}

fn format_hex(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

// ============================================================================
// Fetcher
// ============================================================================

/// Retrieves the full body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, reporter: &dyn Reporter) -> Result<DownloadedArtifact>;
}

/// Fetches `url` and verifies it against `digests`.
///
/// # Errors
///
/// - `Transport` if the fetcher cannot retrieve the body.
/// - `Integrity` if any digest does not match.
pub async fn download(
    fetcher: &dyn Fetcher,
    url: &str,
    digests: &[ExpectedDigest],
    reporter: &dyn Reporter,
) -> Result<DownloadedArtifact> {
    reporter.debug(&format!("download {}", url));
    let artifact = fetcher.fetch(url, reporter).await?;
    verify_digests(url, &artifact.bytes, digests, reporter)?;
    Ok(artifact)
}

/// Fetcher backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a per-request timeout. Without one the transport default applies.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, reporter: &dyn Reporter) -> Result<DownloadedArtifact> {
        let parsed = validate_url(url)?;

        let mut request = self.client.get(parsed);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InstallError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::transport(
                url,
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ));
        }

        let total_bytes = response.content_length();
        let reserve = total_bytes.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
        let mut bytes = Vec::with_capacity(reserve);
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| InstallError::transport(url, e))?;
            bytes.extend_from_slice(&chunk);

            if let Some(percent) = progress_percent(bytes.len() as u64, total_bytes) {
                reporter.debug(&format!("{}: {:.1}%", url, percent));
            }
        }

        reporter.debug(&format!("downloaded {} bytes from {}", bytes.len(), url));

        Ok(DownloadedArtifact {
            url: url.to_string(),
            bytes,
        })
    }
}
