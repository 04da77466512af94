use nyla_core::Logger;
use nyla_interfaces::{NavigationCallback, NavigationKind, NavigationSource, SubscriptionId};

/// Subscribes `on_navigate` to the route changes `source` can report.
///
/// Push-state and back/forward are only observed when the host supports
/// history mutation; hash changes always are.
pub(crate) fn attach(
    source: &dyn NavigationSource,
    on_navigate: NavigationCallback,
    logger: &Logger,
) -> Vec<SubscriptionId> {
    let mut kinds = Vec::with_capacity(3);
    if source.supports_history() {
        kinds.push(NavigationKind::PushState);
        kinds.push(NavigationKind::PopState);
    } else {
        logger.debug(|| "[nyla] History API unavailable, tracking hash changes only".to_string());
    }
    kinds.push(NavigationKind::HashChange);

    kinds
        .into_iter()
        .map(|kind| source.subscribe(kind, on_navigate.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyla_core::{LogLevel, MemorySink};
    use nyla_interfaces::{MemoryPage, NoNavigation};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (NavigationCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let callback: NavigationCallback = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    fn logger() -> Logger {
        Logger::new(LogLevel::Debug, Arc::new(MemorySink::new()))
    }

    #[test]
    fn history_hosts_get_all_three_hooks() {
        let page = MemoryPage::new("https://example.com/", "Home");
        let (callback, count) = counting();
        let ids = attach(&page, callback, &logger());
        assert_eq!(ids.len(), 3);

        page.push_state("/a");
        page.back();
        page.set_hash("top");
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn hosts_without_history_only_report_hash_changes() {
        let page = MemoryPage::new("https://example.com/", "Home").without_history();
        let (callback, count) = counting();
        attach(&page, callback, &logger());

        assert_eq!(page.listener_count(NavigationKind::PushState), 0);
        assert_eq!(page.listener_count(NavigationKind::PopState), 0);
        assert_eq!(page.listener_count(NavigationKind::HashChange), 1);

        page.push_state("/a");
        page.set_hash("top");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_navigation_accepts_subscriptions() {
        let (callback, count) = counting();
        assert_eq!(attach(&NoNavigation, callback, &logger()).len(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
