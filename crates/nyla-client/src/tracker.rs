//! The tracker facade: one context object per tracked page.

use crate::bootstrap::site_from_attributes;
use crate::capture::capture;
use crate::command::Command;
use crate::error::ClientError;
use crate::transmitter::Transmitter;
use crate::watcher;
use nyla_core::{DiagnosticSink, LogSink, Logger, Settings, TrackerConfig};
use nyla_interfaces::{
    NavigationCallback, NavigationSource, NoNavigation, PageContext, PageviewOverrides,
    SubscriptionId,
};
use nyla_transport::{PixelTransport, Transport, create_transport};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::runtime::Handle;

struct TrackerInner {
    config: OnceLock<TrackerConfig>,
    pending: Mutex<Vec<Command>>,
    page: Arc<dyn PageContext>,
    navigation: Arc<dyn NavigationSource>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    transmitter: Transmitter,
    sink: Arc<dyn DiagnosticSink>,
}

impl TrackerInner {
    /// Logger at the configured verbosity, `warn` until initialized.
    fn logger(&self) -> Logger {
        let level = self
            .config
            .get()
            .map(|config| config.log_level)
            .unwrap_or_default();
        Logger::new(level, self.sink.clone())
    }

    fn track_pageview(&self, overrides: Option<&PageviewOverrides>) {
        let mut event = capture(self.page.as_ref());
        if let Some(overrides) = overrides {
            event = event.merged_with(overrides);
        }
        self.transmitter
            .send(event, self.config.get(), &self.logger());
    }

    fn pending(&self) -> MutexGuard<'_, Vec<Command>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TrackerInner {
    fn drop(&mut self) {
        let subscriptions = self
            .subscriptions
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for id in subscriptions.drain(..) {
            self.navigation.unsubscribe(id);
        }
    }
}

/// Handle to a pageview tracker.
///
/// Cloning is cheap and every clone drives the same tracker. The tracker
/// starts uninitialized: `pageview` commands issued before the first `init`
/// are queued and never replayed. The first `init` stores the configuration,
/// starts watching client-side navigation and records one pageview.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

impl Tracker {
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::default()
    }

    /// Builds a tracker for `host` from loaded settings and initializes it.
    ///
    /// The transport is chosen from the configured endpoint's scheme.
    pub fn from_settings<H>(settings: &Settings, host: Arc<H>) -> Result<Self, ClientError>
    where
        H: PageContext + NavigationSource + 'static,
    {
        let transport = create_transport(settings.tracker.endpoint())?;
        let tracker = Self::builder().host(host).transport(transport).build()?;
        tracker.init(settings.tracker.clone());
        Ok(tracker)
    }

    /// Runs one command. Never fails; problems are reported through the
    /// diagnostic sink.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::Init(config) => self.init(config),
            Command::Pageview(overrides) => self.pageview(overrides),
            Command::Unsupported(_) => {}
        }
    }

    /// The page-snippet form, `nyla(name, ...args)`.
    ///
    /// Arguments that cannot be decoded are logged at `warn` and replaced:
    /// `init` then runs with an empty configuration, `pageview` without
    /// overrides.
    pub fn call(&self, name: &str, args: &[Value]) {
        let command = match Command::from_call(name, args) {
            Ok(command) => command,
            Err(err) => {
                self.inner.logger().warn(&format!("[nyla] {}", err));
                err.fallback()
            }
        };
        self.dispatch(command);
    }

    pub fn init(&self, config: TrackerConfig) {
        // Set under the pending lock so no pageview is queued after this point.
        let stored = {
            let _pending = self.inner.pending();
            self.inner.config.set(config)
        };
        if let Err(rejected) = stored {
            self.inner.logger().info("[nyla] Already initialized");
            log::trace!("Ignored configuration: {:?}", rejected);
            return;
        }

        let logger = self.inner.logger();
        logger.info(&format!(
            "[nyla] Initialized with config: {:?}",
            self.inner.config.get()
        ));

        let weak = Arc::downgrade(&self.inner);
        let on_navigate: NavigationCallback = Arc::new(move |kind| {
            if let Some(inner) = weak.upgrade() {
                inner
                    .logger()
                    .debug(|| format!("[nyla] Navigation detected: {}", kind));
                inner.track_pageview(None);
            }
        });
        let ids = watcher::attach(self.inner.navigation.as_ref(), on_navigate, &logger);
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(ids);

        self.inner.track_pageview(None);
    }

    /// Records a pageview, or queues it when no `init` has run yet.
    ///
    /// The initialization check and the enqueue happen under one lock, so a
    /// pageview racing a concurrent `init` is either queued or sent, never lost.
    pub fn pageview(&self, overrides: Option<PageviewOverrides>) {
        {
            let mut pending = self.inner.pending();
            if !self.is_initialized() {
                pending.push(Command::Pageview(overrides));
                return;
            }
        }
        self.inner.track_pageview(overrides.as_ref());
    }

    /// Auto-initializes from the embedding script element's attributes.
    ///
    /// Returns `true` if a `data-siteid` attribute triggered `init`. Does
    /// nothing once the tracker is initialized.
    pub fn bootstrap<'a, I>(&self, attributes: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if self.is_initialized() {
            return false;
        }
        match site_from_attributes(attributes) {
            Some(site) => {
                self.init(TrackerConfig::new(site));
                true
            }
            None => false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.config.get().is_some()
    }

    pub fn config(&self) -> Option<&TrackerConfig> {
        self.inner.config.get()
    }

    /// Commands queued before initialization, oldest first.
    pub fn pending_commands(&self) -> Vec<Command> {
        self.inner.pending().clone()
    }

    /// Number of beacons whose request has not settled yet.
    pub fn in_flight(&self) -> usize {
        self.inner.transmitter.beacons().len()
    }

    /// Resolves once every dispatched beacon has settled.
    pub async fn settled(&self) {
        self.inner.transmitter.beacons().settled().await;
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.inner.config.get())
            .field("pending", &self.inner.pending().len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Assembles a [`Tracker`] from its host capabilities.
#[derive(Default)]
pub struct TrackerBuilder {
    page: Option<Arc<dyn PageContext>>,
    navigation: Option<Arc<dyn NavigationSource>>,
    transport: Option<Arc<dyn Transport>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    runtime: Option<Handle>,
}

impl TrackerBuilder {
    pub fn page(mut self, page: Arc<dyn PageContext>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationSource>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Uses one object as both page context and navigation source.
    pub fn host<H>(self, host: Arc<H>) -> Self
    where
        H: PageContext + NavigationSource + 'static,
    {
        self.page(host.clone()).navigation(host)
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Runtime beacons are spawned on. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Tracker, ClientError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| ClientError::NoRuntime)?,
        };
        let page = self.page.ok_or(ClientError::MissingPageContext)?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(PixelTransport::new()?),
        };

        Ok(Tracker {
            inner: Arc::new(TrackerInner {
                config: OnceLock::new(),
                pending: Mutex::new(Vec::new()),
                page,
                navigation: self.navigation.unwrap_or_else(|| Arc::new(NoNavigation)),
                subscriptions: Mutex::new(Vec::new()),
                transmitter: Transmitter::new(transport, runtime),
                sink: self.sink.unwrap_or_else(|| Arc::new(LogSink)),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyla_interfaces::{MemoryPage, NavigationKind};
    use nyla_transport::RecordingTransport;

    #[test]
    fn build_requires_a_runtime() {
        let result = Tracker::builder()
            .host(Arc::new(MemoryPage::new("https://example.com/", "Home")))
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(matches!(result, Err(ClientError::NoRuntime)));
    }

    #[tokio::test]
    async fn build_requires_a_page() {
        let result = Tracker::builder()
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(matches!(result, Err(ClientError::MissingPageContext)));
    }

    #[test]
    fn explicit_runtime_handle_works_outside_the_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let tracker = Tracker::builder()
            .host(Arc::new(MemoryPage::new("https://example.com/", "Home")))
            .transport(transport.clone())
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();

        tracker.init(TrackerConfig::new("abc123"));
        runtime.block_on(tracker.settled());
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn pageviews_racing_init_are_queued_or_sent() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let tracker = Tracker::builder()
            .host(Arc::new(MemoryPage::new("https://example.com/", "Home")))
            .transport(transport.clone())
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.pageview(None);
                    }
                })
            })
            .collect();
        tracker.init(TrackerConfig::new("abc123"));
        let queued_at_init = tracker.pending_commands().len();
        for worker in workers {
            worker.join().unwrap();
        }
        runtime.block_on(tracker.settled());

        assert_eq!(tracker.pending_commands().len(), queued_at_init);
        assert_eq!(queued_at_init + transport.request_count(), 4 * 50 + 1);
    }

    #[tokio::test]
    async fn dropping_the_last_handle_unsubscribes() {
        let page = Arc::new(MemoryPage::new("https://example.com/", "Home"));
        let tracker = Tracker::builder()
            .host(page.clone())
            .transport(Arc::new(RecordingTransport::new()))
            .build()
            .unwrap();
        tracker.init(TrackerConfig::new("abc123"));
        assert_eq!(page.listener_count(NavigationKind::HashChange), 1);

        let clone = tracker.clone();
        drop(tracker);
        assert_eq!(page.listener_count(NavigationKind::PushState), 1);
        drop(clone);
        assert_eq!(page.listener_count(NavigationKind::PushState), 0);
        assert_eq!(page.listener_count(NavigationKind::PopState), 0);
        assert_eq!(page.listener_count(NavigationKind::HashChange), 0);
    }
}
