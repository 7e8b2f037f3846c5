//! Artifact download.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::scratch::ScratchFile;
use crate::{Error, Result};

/// Source of artifact bytes.
///
/// The production implementation is [`HttpFetcher`]; anything that can write a
/// URL's content into a [`ScratchFile`] can stand in for it.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Write the content behind `url` into `dest`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on transport failure,
    /// [`Error::RemoteNotFound`] / [`Error::RemoteError`] for non-success
    /// responses, and [`Error::WriteFailed`] if `dest` cannot be written.
    async fn fetch(&self, url: &str, dest: &mut ScratchFile) -> Result<u64>;
}

/// Plain HTTP(S) GET with no authentication, custom headers, or retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the TLS backend fails to initialize.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| Error::HttpClient { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &mut ScratchFile) -> Result<u64> {
        debug!(%url, "Sending GET request");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::RemoteNotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::RemoteError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::network(url, e))? {
            dest.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        dest.flush()?;

        debug!(%url, bytes = written, "Download complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let mut scratch = ScratchFile::create().unwrap();

        // Port 9 on localhost is the discard port; nothing listens there in CI.
        let result = fetcher
            .fetch("http://127.0.0.1:9/tool.tgz", &mut scratch)
            .await;
        assert!(matches!(result, Err(Error::Network { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let mut scratch = ScratchFile::create().unwrap();

        let result = fetcher.fetch("not a url", &mut scratch).await;
        assert!(matches!(result, Err(Error::Network { .. })));
    }
}
