use thiserror::Error;

/// Errors a beacon request can settle with.
#[derive(Error, Debug, Clone, PartialEq, Eq)] // Clone so recorders can hand out copies
pub enum TransportError {
    #[error("Invalid beacon URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Collection endpoint answered with HTTP status {0}")]
    HttpStatus(u16),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    #[error("Beacon rejected: {0}")]
    Rejected(String),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

#[cfg(feature = "pixel")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::HttpStatus(status.as_u16())
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::RequestFailed(err.to_string())
        }
    }
}
