use crate::error::TransportError;
use crate::traits::Transport;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

type FailurePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Records every requested URL in memory instead of touching the network.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<String>>,
    fail_when: Option<FailurePredicate>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settles requests matching `predicate` with [`TransportError::Rejected`].
    pub fn failing_when(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Keeps each request pending for `delay` before it settles.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requested URLs, in the order the requests started.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, url: &str) -> Result<(), TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.fail_when {
            Some(predicate) if predicate(url) => {
                Err(TransportError::Rejected(format!("recording transport refused {}", url)))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("requests", &self.requests())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_requests_in_order() {
        let transport = RecordingTransport::new();
        transport.send("https://a.test/1").await.unwrap();
        transport.send("https://a.test/2").await.unwrap();
        assert_eq!(transport.requests(), vec!["https://a.test/1", "https://a.test/2"]);
    }

    #[tokio::test]
    async fn failed_requests_are_still_recorded() {
        let transport = RecordingTransport::new().failing_when(|url| url.ends_with("/bad"));
        assert!(transport.send("https://a.test/ok").await.is_ok());
        assert!(matches!(
            transport.send("https://a.test/bad").await,
            Err(TransportError::Rejected(_))
        ));
        assert_eq!(transport.request_count(), 2);
    }
}
