use std::fmt;
use std::sync::Arc;

/// Represents a unique identifier for navigation subscriptions.
pub type SubscriptionId = u64;

/// Client-side navigation signals a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// A new history entry was pushed (after the host applied it).
    PushState,
    /// Back/forward traversal.
    PopState,
    /// The fragment of the current URL changed.
    HashChange,
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationKind::PushState => "pushState",
            NavigationKind::PopState => "popstate",
            NavigationKind::HashChange => "hashchange",
        };
        f.write_str(name)
    }
}

pub type NavigationCallback = Arc<dyn Fn(NavigationKind) + Send + Sync>;

/// Source of route-change notifications for single-page applications.
pub trait NavigationSource: Send + Sync {
    /// Whether the host can mutate history (push-state and back/forward).
    /// Hosts without it only report [`NavigationKind::HashChange`].
    fn supports_history(&self) -> bool;

    /// Registers `callback` for every future signal of `kind`.
    fn subscribe(&self, kind: NavigationKind, callback: NavigationCallback) -> SubscriptionId;

    /// Drops a subscription. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// A host that never navigates client-side.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNavigation;

impl NavigationSource for NoNavigation {
    fn supports_history(&self) -> bool {
        false
    }

    fn subscribe(&self, kind: NavigationKind, _callback: NavigationCallback) -> SubscriptionId {
        log::trace!("NoNavigation: ignoring {} subscription", kind);
        0
    }

    fn unsubscribe(&self, _id: SubscriptionId) -> bool {
        false
    }
}
