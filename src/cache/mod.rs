//! Rendered page cache with time-based regeneration
//!
//! Each route holds at most one rendered page. A page older than the route's
//! revalidation interval is stale: the next request rebuilds it, and the
//! stale copy is only served when that rebuild fails. Rebuilds are not
//! coalesced, so concurrent requests for a stale route may each rebuild it.
//!
//! Routes generated in the background (the `loading` fallback) are tracked
//! as pending. Routes found to have no content are remembered as missing for
//! a few seconds, so a post published later is picked up on the next request.
//! Expired markers are dropped whenever markers are read or written.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// How long a route stays marked as having no content
pub const NOT_FOUND_TTL: Duration = Duration::from_secs(5);

/// A rendered page
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: String,
    pub generated_at: Instant,
}

/// Result of looking a route up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Rendered within the revalidation interval
    Fresh(String),
    /// Rendered, but older than the revalidation interval
    Stale(String),
    /// Never rendered
    Missing,
}

#[derive(Debug, Default)]
struct Entries {
    pages: HashMap<String, CachedPage>,
    pending: HashSet<String>,
    not_found: HashMap<String, Instant>,
}

/// Cache of rendered pages, keyed by route
#[derive(Debug)]
pub struct PageCache {
    entries: RwLock<Entries>,
    not_found_ttl: Duration,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_not_found_ttl(NOT_FOUND_TTL)
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_not_found_ttl(not_found_ttl: Duration) -> Self {
        Self {
            entries: RwLock::default(),
            not_found_ttl,
        }
    }

    /// Look up `route`, judging staleness against `max_age` at `now`
    pub fn lookup(&self, route: &str, max_age: Duration, now: Instant) -> Lookup {
        let entries = self.read();
        match entries.pages.get(route) {
            Some(page) if now.saturating_duration_since(page.generated_at) < max_age => {
                Lookup::Fresh(page.html.clone())
            }
            Some(page) => Lookup::Stale(page.html.clone()),
            None => Lookup::Missing,
        }
    }

    /// Store a freshly rendered page
    pub fn store(&self, route: &str, html: String, now: Instant) {
        let mut entries = self.write();
        entries.pending.remove(route);
        entries.not_found.remove(route);
        entries.pages.insert(
            route.to_string(),
            CachedPage {
                html,
                generated_at: now,
            },
        );
        tracing::debug!("Cached {}", route);
    }

    /// Number of cached pages
    pub fn len(&self) -> usize {
        self.read().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim background generation of `route`; false if already claimed
    pub fn begin_pending(&self, route: &str) -> bool {
        self.write().pending.insert(route.to_string())
    }

    pub fn is_pending(&self, route: &str) -> bool {
        self.read().pending.contains(route)
    }

    /// Record that `route` has no content, replacing any cached page
    pub fn mark_not_found(&self, route: &str, now: Instant) {
        let mut entries = self.write();
        self.purge_not_found(&mut entries, now);
        entries.pending.remove(route);
        entries.pages.remove(route);
        entries.not_found.insert(route.to_string(), now);
    }

    /// Whether `route` was found to have no content within the marker TTL
    pub fn is_not_found(&self, route: &str, now: Instant) -> bool {
        let mut entries = self.write();
        self.purge_not_found(&mut entries, now);
        entries.not_found.contains_key(route)
    }

    fn purge_not_found(&self, entries: &mut Entries, now: Instant) {
        let ttl = self.not_found_ttl;
        entries
            .not_found
            .retain(|_, at| now.saturating_duration_since(*at) < ttl);
    }

    /// Release a pending claim without storing anything
    pub fn abandon_pending(&self, route: &str) {
        self.write().pending.remove(route);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_fresh_then_stale() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        assert_eq!(cache.lookup("/", MINUTE, t0), Lookup::Missing);

        cache.store("/", "<p>home</p>".to_string(), t0);
        assert_eq!(
            cache.lookup("/", MINUTE, t0 + Duration::from_secs(59)),
            Lookup::Fresh("<p>home</p>".to_string())
        );
        assert_eq!(
            cache.lookup("/", MINUTE, t0 + MINUTE),
            Lookup::Stale("<p>home</p>".to_string())
        );
    }

    #[test]
    fn test_store_replaces_stale_page() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        cache.store("/post/a", "old".to_string(), t0);
        let later = t0 + MINUTE * 2;
        cache.store("/post/a", "new".to_string(), later);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.lookup("/post/a", MINUTE, later),
            Lookup::Fresh("new".to_string())
        );
    }

    #[test]
    fn test_routes_are_independent() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        assert!(cache.is_empty());
        cache.store("/post/a", "a".to_string(), t0);
        assert_eq!(cache.lookup("/post/b", MINUTE, t0), Lookup::Missing);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pending_and_not_found() {
        let cache = PageCache::with_not_found_ttl(MINUTE);
        let t0 = Instant::now();
        assert!(cache.begin_pending("/post/x"));
        assert!(!cache.begin_pending("/post/x"));
        assert!(cache.is_pending("/post/x"));

        cache.mark_not_found("/post/x", t0);
        assert!(!cache.is_pending("/post/x"));
        assert!(cache.is_not_found("/post/x", t0));
        assert!(!cache.is_not_found("/post/x", t0 + MINUTE));

        assert!(cache.begin_pending("/post/y"));
        cache.abandon_pending("/post/y");
        assert!(!cache.is_pending("/post/y"));

        cache.mark_not_found("/post/x", t0);
        cache.store("/post/x", "found".to_string(), t0);
        assert!(!cache.is_not_found("/post/x", t0));
    }

    #[test]
    fn test_expired_not_found_markers_are_dropped() {
        let cache = PageCache::with_not_found_ttl(MINUTE);
        let t0 = Instant::now();
        for i in 0..1000 {
            cache.mark_not_found(&format!("/post/unknown-{}", i), t0);
        }
        assert_eq!(cache.read().not_found.len(), 1000);
        assert!(cache.is_not_found("/post/unknown-7", t0));

        let later = t0 + MINUTE * 60;
        assert!(!cache.is_not_found("/post/unknown-7", later));
        assert!(cache.read().not_found.is_empty());
    }

    #[test]
    fn test_marking_drops_expired_markers() {
        let cache = PageCache::with_not_found_ttl(MINUTE);
        let t0 = Instant::now();
        for i in 0..100 {
            cache.mark_not_found(&format!("/post/unknown-{}", i), t0);
        }

        cache.mark_not_found("/post/fresh", t0 + MINUTE * 2);
        assert_eq!(cache.read().not_found.len(), 1);
    }

    #[test]
    fn test_default_not_found_ttl_is_short() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        cache.mark_not_found("/post/soon", t0);
        assert!(cache.is_not_found("/post/soon", t0 + Duration::from_secs(1)));
        assert!(!cache.is_not_found("/post/soon", t0 + NOT_FOUND_TTL));
    }
}
