//! Bookkeeping for beacons whose request has started but not yet settled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Identity of one dispatched beacon.
pub type BeaconId = u64;

/// Outstanding beacon requests, keyed by [`BeaconId`].
///
/// Every registered beacon must be settled exactly once; the set is empty
/// whenever no request is outstanding.
#[derive(Debug, Default)]
pub struct BeaconSet {
    beacons: Mutex<HashMap<BeaconId, String>>,
    next_id: AtomicU64,
    idle: Notify,
}

impl BeaconSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a beacon for `url` and returns its id.
    pub fn register(&self, url: &str) -> BeaconId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, url.to_string());
        id
    }

    /// Removes a settled beacon, returning its URL if it was still tracked.
    pub fn settle(&self, id: BeaconId) -> Option<String> {
        let (url, now_idle) = {
            let mut beacons = self.lock();
            let url = beacons.remove(&id);
            (url, beacons.is_empty())
        };
        if now_idle {
            self.idle.notify_waiters();
        }
        url
    }

    pub fn contains(&self, id: BeaconId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Resolves once no beacon is outstanding.
    pub async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            if self.is_empty() {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BeaconId, String>> {
        self.beacons.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn register_and_settle() {
        let set = BeaconSet::new();
        let a = set.register("https://a.test/1");
        let b = set.register("https://a.test/2");
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);

        assert_eq!(set.settle(a).as_deref(), Some("https://a.test/1"));
        assert!(!set.contains(a));
        assert!(set.contains(b));

        // Settling twice is harmless.
        assert_eq!(set.settle(a), None);
        set.settle(b);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn settled_returns_immediately_when_idle() {
        BeaconSet::new().settled().await;
    }

    #[tokio::test]
    async fn settled_waits_for_the_last_beacon() {
        let set = Arc::new(BeaconSet::new());
        let ids: Vec<_> = (0..5).map(|i| set.register(&format!("https://a.test/{i}"))).collect();

        let settler = set.clone();
        tokio::spawn(async move {
            for id in ids {
                tokio::time::sleep(Duration::from_millis(5)).await;
                settler.settle(id);
            }
        });

        tokio::time::timeout(Duration::from_secs(5), set.settled())
            .await
            .expect("beacon set never drained");
        assert!(set.is_empty());
    }
}
