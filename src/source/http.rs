//! Direct HTTP audio download for URLs that already point at an audio file.

use crate::error::{Result, VidscribeError};
use crate::source::media::{AudioDownloader, AudioStream, extension_for_media_type};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

/// Downloads the response body of a plain GET into memory.
///
/// No bitrate is known for such streams, so chunk sizing falls back to the
/// floor rate. The container is taken from the `Content-Type` header.
#[derive(Debug, Clone, Default)]
pub struct HttpAudioDownloader {
    client: Client,
}

impl HttpAudioDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AudioDownloader for HttpAudioDownloader {
    async fn download(&self, url: &str) -> Result<AudioStream> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VidscribeError::Download {
                message: format!("Failed to request {url}: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(VidscribeError::Download {
                message: format!("Download failed with status: {}", response.status()),
            });
        }

        let extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(extension_for_media_type)
            .unwrap_or_else(|| extension_for_media_type(""));

        let expected = response.content_length();
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| VidscribeError::Download {
                message: format!("Failed to read download chunk: {e}"),
            })?;
            bytes.extend_from_slice(&chunk);
            debug!(received = bytes.len(), expected = ?expected, "Download progress");
        }

        info!(bytes = bytes.len(), ext = extension, "Downloaded audio over HTTP");
        Ok(AudioStream::new(bytes, None, extension))
    }
}
