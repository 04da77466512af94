//! # Nyla Client Library
//!
//! This crate provides the pageview tracker: the command facade, the event
//! capture and the beacon transmitter. It ties together the interface, core
//! and transport crates.
//!
//! ```no_run
//! use nyla_client::{MemoryPage, PageviewOverrides, Tracker, TrackerConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), nyla_client::ClientError> {
//! let page = Arc::new(MemoryPage::new("https://example.com/", "Home"));
//! let tracker = Tracker::builder().host(page.clone()).build()?;
//!
//! tracker.init(TrackerConfig::new("abc123"));
//! page.push_state("/pricing"); // tracked automatically
//! tracker.pageview(Some(PageviewOverrides::new().title("Virtual page")));
//!
//! tracker.settled().await;
//! # Ok(())
//! # }
//! ```

// Re-export the host-facing types for user convenience
pub use nyla_core::{
    DEFAULT_ENDPOINT, DiagnosticSink, LogLevel, LogSink, Logger, MemorySink, Settings,
    SinkChannel, TrackerConfig, load_config, setup_logging,
};
pub use nyla_interfaces::{
    MemoryPage, NavigationCallback, NavigationKind, NavigationSource, NoNavigation, PageContext,
    PageviewEvent, PageviewOverrides, SubscriptionId,
};
pub use nyla_transport::{
    BeaconId, PixelTransport, RecordingTransport, Transport, TransportError, create_transport,
};

// Export value for the variadic `call` form
pub use serde_json::Value;

mod bootstrap;
mod capture;
mod command;
mod error;
mod tracker;
mod transmitter;
mod watcher;

pub use bootstrap::{SITE_ID_ATTRIBUTE, site_from_attributes};
pub use capture::{capture, now_iso};
pub use command::Command;
pub use error::{ClientError, CommandError};
pub use tracker::{Tracker, TrackerBuilder};
pub use transmitter::collect_url;
