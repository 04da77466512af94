//! Implementation of the `Transport` trait as a tracking-pixel GET (`reqwest`).

#![cfg(feature = "pixel")] // Only compile this module if the pixel feature is enabled

use crate::error::TransportError;
use crate::traits::Transport;
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::header::ACCEPT;

/// Requests the beacon URL as an image, the way a browser loads a pixel.
///
/// Non-2xx statuses count as a failed load. The body is drained and dropped.
#[derive(Debug, Clone)]
pub struct PixelTransport {
    client: reqwest::Client,
}

impl PixelTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nyla/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientSetup(e.to_string()))?;
        Ok(Self { client })
    }

    /// Reuses an existing client (connection pool, proxy settings, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for PixelTransport {
    async fn send(&self, url: &str) -> Result<(), TransportError> {
        debug!("Requesting beacon pixel: {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "image/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        trace!("Beacon pixel loaded ({} bytes)", body.len());
        Ok(())
    }
}
