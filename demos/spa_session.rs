//! Simulates a short single-page-application session.
//!
//! With a site configured (`nyla.toml` or `NYLA_TRACKER__SITE=...`) beacons
//! go to the configured endpoint. Without one, a recording transport is used
//! and the beacon URLs are printed instead.

use nyla::{MemoryPage, PageviewOverrides, RecordingTransport, Tracker, TrackerConfig, load_config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_config(None)?;
    nyla_core::setup_logging(&settings.logging.filter)?;

    let page = Arc::new(
        MemoryPage::new("https://example.com/", "Example Store")
            .with_referrer("https://search.example/?q=store"),
    );

    let recorder = if settings.tracker.site_id().is_some() {
        log::info!("Sending beacons to {}", settings.tracker.endpoint());
        let tracker = Tracker::from_settings(&settings, page.clone())?;
        browse(&tracker, &page).await;
        None
    } else {
        log::info!("No site configured, recording beacons locally");
        let recorder = Arc::new(RecordingTransport::new());
        let tracker = Tracker::builder()
            .host(page.clone())
            .transport(recorder.clone())
            .build()?;
        tracker.init(TrackerConfig::new("demo-site"));
        browse(&tracker, &page).await;
        Some(recorder)
    };

    if let Some(recorder) = recorder {
        for url in recorder.requests() {
            println!("{}", url);
        }
    }
    Ok(())
}

async fn browse(tracker: &Tracker, page: &MemoryPage) {
    page.push_state("/products");
    page.set_title("Products");
    page.push_state("/products/42");
    page.set_hash("reviews");
    page.back();
    tracker.pageview(Some(PageviewOverrides::new().title("Checkout (virtual)")));
    tracker.settled().await;
}
