use crate::navigation::{NavigationCallback, NavigationKind, NavigationSource, SubscriptionId};
use crate::page::PageContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Clone)]
struct HistoryEntry {
    url: String,
    title: String,
}

#[derive(Debug)]
struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl History {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }
}

/// An in-memory page with a session history.
///
/// Navigation methods update the page first and then notify subscribers, so
/// a subscriber reading the page sees the new location. Callbacks run on the
/// calling thread with no internal lock held.
pub struct MemoryPage {
    history: Mutex<History>,
    referrer: String,
    supports_history: bool,
    listeners: Mutex<Vec<(SubscriptionId, NavigationKind, NavigationCallback)>>,
    next_id: AtomicU64,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![HistoryEntry {
                    url: url.into(),
                    title: title.into(),
                }],
                index: 0,
            }),
            referrer: String::new(),
            supports_history: true,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    /// A page whose host lacks the history API; only hash changes are observable.
    pub fn without_history(mut self) -> Self {
        self.supports_history = false;
        self
    }

    /// Pushes a new entry, resolving `url` against the current location.
    pub fn push_state(&self, url: &str) {
        {
            let mut history = self.lock_history();
            let current = history.current().clone();
            let resolved = Url::parse(&current.url)
                .and_then(|base| base.join(url))
                .map(String::from)
                .unwrap_or_else(|_| url.to_string());
            log::debug!("MemoryPage: pushState {} -> {}", current.url, resolved);
            history.push(HistoryEntry {
                url: resolved,
                title: current.title,
            });
        }
        self.emit(NavigationKind::PushState);
    }

    /// Replaces the fragment of the current URL with a new history entry.
    pub fn set_hash(&self, fragment: &str) {
        let fragment = fragment.trim_start_matches('#');
        {
            let mut history = self.lock_history();
            let current = history.current().clone();
            let url = match Url::parse(&current.url) {
                Ok(mut parsed) => {
                    parsed.set_fragment(Some(fragment));
                    parsed.to_string()
                }
                Err(_) => {
                    let base = current.url.split('#').next().unwrap_or_default();
                    format!("{}#{}", base, fragment)
                }
            };
            history.push(HistoryEntry {
                url,
                title: current.title,
            });
        }
        self.emit(NavigationKind::HashChange);
    }

    /// Steps back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let moved = {
            let mut history = self.lock_history();
            if history.index == 0 {
                false
            } else {
                history.index -= 1;
                true
            }
        };
        if moved {
            self.emit(NavigationKind::PopState);
        }
        moved
    }

    /// Steps forward one entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        let moved = {
            let mut history = self.lock_history();
            if history.index + 1 >= history.entries.len() {
                false
            } else {
                history.index += 1;
                true
            }
        };
        if moved {
            self.emit(NavigationKind::PopState);
        }
        moved
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let mut history = self.lock_history();
        let index = history.index;
        history.entries[index].title = title.into();
    }

    pub fn history_len(&self) -> usize {
        self.lock_history().entries.len()
    }

    pub fn listener_count(&self, kind: NavigationKind) -> usize {
        self.lock_listeners()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    fn emit(&self, kind: NavigationKind) {
        let callbacks: Vec<NavigationCallback> = self
            .lock_listeners()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(kind);
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(
        &self,
    ) -> MutexGuard<'_, Vec<(SubscriptionId, NavigationKind, NavigationCallback)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageContext for MemoryPage {
    fn url(&self) -> String {
        self.lock_history().current().url.clone()
    }

    fn title(&self) -> String {
        self.lock_history().current().title.clone()
    }

    fn referrer(&self) -> String {
        self.referrer.clone()
    }
}

impl NavigationSource for MemoryPage {
    fn supports_history(&self) -> bool {
        self.supports_history
    }

    fn subscribe(&self, kind: NavigationKind, callback: NavigationCallback) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, kind, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(listener, _, _)| *listener != id);
        listeners.len() != before
    }
}

impl std::fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPage")
            .field("history", &*self.lock_history())
            .field("referrer", &self.referrer)
            .field("supports_history", &self.supports_history)
            .finish_non_exhaustive()
    }
}
