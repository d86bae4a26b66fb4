//! Fetching an attachment from the platform into the save directory.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{filename, logging::ThreadLogger, storage::stored_path, Result};

/// Turns an opaque platform file id into a fetchable URL.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Fails with `Error::Platform` for unknown or expired ids.
    async fn resolve_download_url(&self, file_id: &str) -> Result<Url>;
}

/// Streams the body behind a URL into a writer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the number of bytes written.
    async fn fetch(&self, url: &Url, dst: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64>;
}

/// [`Fetcher`] over plain HTTP(S). Timeouts are whatever the client has.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, dst: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
        let mut resp = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            dst.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        dst.flush().await?;
        Ok(written)
    }
}

/// Resolve, name, and store one file. No retries; a failed transfer may
/// leave a truncated file behind.
#[derive(Clone)]
pub struct DownloadPipeline {
    source: Arc<dyn FileSource>,
    fetcher: Arc<dyn Fetcher>,
    save_path: PathBuf,
}

impl DownloadPipeline {
    pub fn new(source: Arc<dyn FileSource>, fetcher: Arc<dyn Fetcher>, save_path: PathBuf) -> Self {
        Self {
            source,
            fetcher,
            save_path,
        }
    }

    /// Returns the generated file name.
    pub async fn download(&self, file_id: &str, log: &ThreadLogger) -> Result<String> {
        let url = self.source.resolve_download_url(file_id).await?;
        let name = filename::generate(url.path());
        let path = stored_path(&self.save_path, &name);
        log.debug(format!("fetching {file_id} into {}", path.display()));

        let mut dst = tokio::fs::File::create(&path).await?;
        let bytes = self.fetcher.fetch(&url, &mut dst).await?;
        dst.sync_all().await?;

        log.info(format!("saved {file_id} as {name} ({bytes} bytes)"));
        Ok(name)
    }
}
