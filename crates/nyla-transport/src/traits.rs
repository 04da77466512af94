use crate::error::TransportError;
use async_trait::async_trait;

/// One-way delivery of a beacon to a collection endpoint.
///
/// The response body carries no information; only whether the request
/// settled successfully matters.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Requests `url` and resolves once the request has settled.
    async fn send(&self, url: &str) -> Result<(), TransportError>;
}
