use serde::{Deserialize, Deserializer, Serialize};

/// A single recorded view of a page or client-side route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageviewEvent {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// ISO-8601 UTC timestamp, e.g. `2024-05-01T12:00:00.000Z`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PageviewEvent {
    /// Shallow merge: every field present in `overrides` replaces the captured one.
    pub fn merged_with(self, overrides: &PageviewOverrides) -> Self {
        Self {
            url: overrides.url.clone().unwrap_or(self.url),
            title: overrides.title.clone().unwrap_or(self.title),
            referrer: overrides.referrer.clone().unwrap_or(self.referrer),
            timestamp: overrides.timestamp.clone().unwrap_or(self.timestamp),
        }
    }
}

// Keeps an explicit `null` apart from a missing key: `null` becomes `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Caller-supplied fields for a `pageview` command.
///
/// `referrer` and `timestamp` distinguish "not given" (`None`) from
/// "explicitly cleared" (`Some(None)`). A cleared referrer is sent empty and
/// a cleared timestamp is replaced by the send time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageviewOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub referrer: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Option<String>>,
}

impl PageviewOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(Some(referrer.into()));
        self
    }

    pub fn clear_referrer(mut self) -> Self {
        self.referrer = Some(None);
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(Some(timestamp.into()));
        self
    }

    pub fn clear_timestamp(mut self) -> Self {
        self.timestamp = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> PageviewEvent {
        PageviewEvent {
            url: "https://example.com/a".into(),
            title: "Page A".into(),
            referrer: Some("https://search.example".into()),
            timestamp: Some("2024-05-01T12:00:00.000Z".into()),
        }
    }

    #[test]
    fn override_wins_field_by_field() {
        let merged = captured().merged_with(&PageviewOverrides::new().title("X"));
        assert_eq!(merged.title, "X");
        assert_eq!(merged.url, "https://example.com/a");
        assert_eq!(merged.referrer.as_deref(), Some("https://search.example"));
        assert_eq!(merged.timestamp.as_deref(), Some("2024-05-01T12:00:00.000Z"));
    }

    #[test]
    fn empty_overrides_keep_the_capture() {
        assert!(PageviewOverrides::new().is_empty());
        assert_eq!(captured().merged_with(&PageviewOverrides::new()), captured());
    }

    #[test]
    fn cleared_fields_drop_the_capture() {
        let merged =
            captured().merged_with(&PageviewOverrides::new().clear_referrer().clear_timestamp());
        assert_eq!(merged.referrer, None);
        assert_eq!(merged.timestamp, None);
        assert_eq!(merged.title, "Page A");
    }

    #[test]
    fn explicit_null_differs_from_missing() {
        let overrides: PageviewOverrides =
            serde_json::from_str(r#"{"referrer":null,"title":"T"}"#).unwrap();
        assert_eq!(overrides, PageviewOverrides::new().title("T").clear_referrer());
        assert_eq!(overrides.timestamp, None);
    }

    #[test]
    fn overrides_accept_partial_json() {
        let overrides: PageviewOverrides =
            serde_json::from_str(r#"{"url":"https://example.com/virtual"}"#).unwrap();
        assert_eq!(overrides, PageviewOverrides::new().url("https://example.com/virtual"));
    }
}
