//! Turns pageview events into beacon requests.

use crate::capture::now_iso;
use nyla_core::{COLLECT_PATH, Logger, TrackerConfig};
use nyla_interfaces::PageviewEvent;
use nyla_transport::{BeaconId, BeaconSet, Transport};
use std::sync::Arc;
use tokio::runtime::Handle;
use url::form_urlencoded;

const NO_SITE_WARNING: &str = "[nyla] No config or site set, not sending pageview";

/// Builds `{endpoint}/v1/collect?site_id=..&type=pageview&url=..&title=..&referrer=..&timestamp=..`.
///
/// Values are form-urlencoded. A missing referrer is sent empty and a
/// missing or empty timestamp is replaced by the current time. A trailing
/// `/` on the endpoint is dropped so the path never starts with `//`.
pub fn collect_url(config: &TrackerConfig, event: &PageviewEvent) -> String {
    let timestamp = event
        .timestamp
        .clone()
        .filter(|timestamp| !timestamp.is_empty())
        .unwrap_or_else(now_iso);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("site_id", &config.site)
        .append_pair("type", "pageview")
        .append_pair("url", &event.url)
        .append_pair("title", &event.title)
        .append_pair("referrer", event.referrer.as_deref().unwrap_or_default())
        .append_pair("timestamp", &timestamp)
        .finish();
    format!(
        "{}{}?{}",
        config.endpoint().trim_end_matches('/'),
        COLLECT_PATH,
        query
    )
}

// Removes the beacon from the set even if the transport future panics.
struct SettleGuard {
    beacons: Arc<BeaconSet>,
    id: BeaconId,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.beacons.settle(self.id);
    }
}

pub(crate) struct Transmitter {
    transport: Arc<dyn Transport>,
    beacons: Arc<BeaconSet>,
    runtime: Handle,
}

impl Transmitter {
    pub(crate) fn new(transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        Self {
            transport,
            beacons: Arc::new(BeaconSet::new()),
            runtime,
        }
    }

    pub(crate) fn beacons(&self) -> &BeaconSet {
        &self.beacons
    }

    /// Dispatches `event` without waiting for delivery.
    ///
    /// Returns `None` when no site is configured; nothing is requested then.
    pub(crate) fn send(
        &self,
        event: PageviewEvent,
        config: Option<&TrackerConfig>,
        logger: &Logger,
    ) -> Option<BeaconId> {
        let Some(config) = config.filter(|config| config.site_id().is_some()) else {
            logger.warn(NO_SITE_WARNING);
            return None;
        };

        let url = collect_url(config, &event);
        logger.debug(|| {
            format!(
                "[nyla] About to send pageview: endpoint={} url={} event={:?}",
                config.endpoint(),
                url,
                event
            )
        });

        let id = self.beacons.register(&url);
        let guard = SettleGuard {
            beacons: self.beacons.clone(),
            id,
        };
        let transport = self.transport.clone();
        let logger = logger.clone();
        self.runtime.spawn(async move {
            let _guard = guard;
            match transport.send(&url).await {
                Ok(()) => logger.info(&format!(
                    "[nyla] Pageview image loaded successfully: {}",
                    url
                )),
                Err(err) => logger.error(&format!(
                    "[nyla] Pageview image failed to load: {} ({})",
                    url, err
                )),
            }
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyla_core::{LogLevel, MemorySink, SinkChannel};
    use nyla_transport::RecordingTransport;
    use std::collections::HashMap;

    fn event() -> PageviewEvent {
        PageviewEvent {
            url: "https://a.com/p?x=1&y=2".into(),
            title: "A & B".into(),
            referrer: None,
            timestamp: Some("2024-05-01T12:00:00.000Z".into()),
        }
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    #[test]
    fn collect_url_round_trips_field_values() {
        let url = collect_url(&TrackerConfig::new("abc123"), &event());
        assert!(url.starts_with("https://api.getnyla.app/v1/collect?site_id=abc123&type=pageview&"));
        assert!(url.contains("url=https%3A%2F%2Fa.com%2Fp%3Fx%3D1%26y%3D2"), "{url}");
        assert!(url.contains("title=A+%26+B"), "{url}");

        let params = query_of(&url);
        assert_eq!(params["site_id"], "abc123");
        assert_eq!(params["type"], "pageview");
        assert_eq!(params["url"], "https://a.com/p?x=1&y=2");
        assert_eq!(params["title"], "A & B");
        assert_eq!(params["referrer"], "");
        assert_eq!(params["timestamp"], "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn collect_url_uses_endpoint_override() {
        let config = TrackerConfig::new("abc123").with_endpoint("http://localhost:8080/");
        let url = collect_url(&config, &event());
        assert!(url.starts_with("http://localhost:8080/v1/collect?"), "{url}");
    }

    #[test]
    fn collect_url_fills_missing_timestamp() {
        let mut event = event();
        event.timestamp = None;
        let params = query_of(&collect_url(&TrackerConfig::new("abc123"), &event));
        assert!(params["timestamp"].ends_with('Z'));

        event.timestamp = Some(String::new());
        let params = query_of(&collect_url(&TrackerConfig::new("abc123"), &event));
        assert!(params["timestamp"].ends_with('Z'));
    }

    #[tokio::test]
    async fn send_without_site_warns_and_requests_nothing() {
        let transport = Arc::new(RecordingTransport::new());
        let transmitter = Transmitter::new(transport.clone(), Handle::current());
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(LogLevel::Warn, sink.clone());

        assert_eq!(transmitter.send(event(), None, &logger), None);
        assert_eq!(
            transmitter.send(event(), Some(&TrackerConfig::default()), &logger),
            None
        );

        transmitter.beacons().settled().await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(sink.messages(SinkChannel::Warn), vec![NO_SITE_WARNING, NO_SITE_WARNING]);
    }

    #[tokio::test]
    async fn send_registers_until_settled() {
        let transport = Arc::new(RecordingTransport::new().failing_when(|url| url.contains("fail")));
        let transmitter = Transmitter::new(transport.clone(), Handle::current());
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(LogLevel::Info, sink.clone());
        let config = TrackerConfig::new("abc123");

        let ok = transmitter.send(event(), Some(&config), &logger).unwrap();
        let mut failing = event();
        failing.title = "fail".into();
        let bad = transmitter.send(failing, Some(&config), &logger).unwrap();
        assert!(transmitter.beacons().contains(ok));
        assert!(transmitter.beacons().contains(bad));

        transmitter.beacons().settled().await;
        assert!(transmitter.beacons().is_empty());
        assert_eq!(transport.request_count(), 2);
        assert_eq!(sink.messages(SinkChannel::Info).len(), 1);
        let errors = sink.messages(SinkChannel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("[nyla] Pageview image failed to load:"));
    }
}
