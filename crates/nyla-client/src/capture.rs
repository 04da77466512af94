use chrono::{SecondsFormat, Utc};
use nyla_interfaces::{PageContext, PageviewEvent};

/// Current UTC time as ISO-8601 with milliseconds, e.g. `2024-05-01T12:00:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads the page's current location, title and referrer into a fresh event.
pub fn capture(page: &dyn PageContext) -> PageviewEvent {
    PageviewEvent {
        url: page.url(),
        title: page.title(),
        referrer: Some(page.referrer()),
        timestamp: Some(now_iso()),
    }
}
