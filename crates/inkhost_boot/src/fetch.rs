//! Asset fetching.
//!
//! The bootstrapper is generic over where bytes come from: HTTP for the
//! hosted playground, the filesystem for local embedding and tests.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::BootstrapError;

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches manifest and asset bytes by URL.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, BootstrapError>> + Send;
}

/// HTTP fetcher backed by a shared reqwest client.
pub struct HttpAssetFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpAssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { client: reqwest::Client::new(), timeout }
    }
}

impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BootstrapError> {
        debug!(url, "Fetching asset");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BootstrapError::fetch(url, e))?
            .error_for_status()
            .map_err(|e| BootstrapError::fetch(url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BootstrapError::fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Filesystem fetcher resolving URLs relative to a root directory.
pub struct FileAssetFetcher {
    root: PathBuf,
}

impl FileAssetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetFetcher for FileAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BootstrapError> {
        let relative = url.strip_prefix("file://").unwrap_or(url);
        let path = self.root.join(relative);
        debug!(url, path = %path.display(), "Reading asset");
        tokio::fs::read(&path)
            .await
            .map_err(|e| BootstrapError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_fetch_success() {
        let mock_server = MockServer::start().await;
        let wasm_content = b"\x00\x61\x73\x6d\x01\x00\x00\x00";

        Mock::given(method("GET"))
            .and(path("/core.wasm"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wasm_content.as_slice()))
            .mount(&mock_server)
            .await;

        let fetcher = HttpAssetFetcher::new();
        let bytes = fetcher
            .fetch(&format!("{}/core.wasm", mock_server.uri()))
            .await
            .expect("fetch");

        assert_eq!(bytes, wasm_content);
    }

    #[tokio::test]
    async fn http_fetch_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.wasm"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpAssetFetcher::new();
        let result = fetcher
            .fetch(&format!("{}/missing.wasm", mock_server.uri()))
            .await;

        match result {
            Err(BootstrapError::Fetch { url, .. }) => assert!(url.ends_with("/missing.wasm")),
            other => panic!("Expected Fetch error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn file_fetch_resolves_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("app.dll"), b"assembly bytes").expect("write");

        let fetcher = FileAssetFetcher::new(dir.path());
        let bytes = fetcher.fetch("app.dll").await.expect("fetch");

        assert_eq!(bytes, b"assembly bytes");
    }

    #[tokio::test]
    async fn file_fetch_missing_is_a_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fetcher = FileAssetFetcher::new(dir.path());

        let result = fetcher.fetch("missing.dll").await;
        assert!(matches!(result, Err(BootstrapError::Fetch { .. })));
    }
}
