//! Factory function for creating Transport implementations from an endpoint.

use crate::error::TransportError;
use crate::traits::Transport;
use std::sync::Arc;
use url::Url;

#[cfg(feature = "pixel")]
use crate::pixel::PixelTransport;

/// Creates a shared `Transport` suited to the scheme of `endpoint`.
///
/// Currently supports `http://` and `https://` if the `pixel` feature is enabled.
pub fn create_transport(endpoint: &str) -> Result<Arc<dyn Transport>, TransportError> {
    log::debug!("Attempting to create transport for endpoint: {}", endpoint);
    let parsed = Url::parse(endpoint)?;

    match parsed.scheme() {
        "http" | "https" => {
            #[cfg(feature = "pixel")]
            {
                log::info!("Creating PixelTransport for {}", endpoint);
                Ok(Arc::new(PixelTransport::new()?))
            }
            #[cfg(not(feature = "pixel"))]
            {
                log::error!("HTTP endpoint specified, but 'pixel' feature is not enabled.");
                Err(TransportError::UnsupportedScheme(
                    "HTTP(S) requires the 'pixel' feature.".to_string(),
                ))
            }
        }
        other => {
            log::error!("Unsupported URL scheme found in: {}", endpoint);
            Err(TransportError::UnsupportedScheme(other.to_string()))
        }
    }
}
