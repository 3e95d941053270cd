//! Fetching remote artifacts.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::InstallError;

/// Downloads the full body of a URL.
///
/// Abstracted so installs can be exercised against in-memory fetchers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Bytes, InstallError>;
}

/// [`Fetcher`] over HTTP(S) with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, InstallError> {
        let fetch_error = |message: String| InstallError::Fetch {
            url: url.to_string(),
            message,
        };

        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        response.bytes().await.map_err(|e| fetch_error(e.to_string()))
    }
}
