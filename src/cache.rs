use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Rendered page key: the route with only the query parameters the page reads, and the viewer.
/// Pages show the viewer's navigation, so guests and each user get their own copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub uri: String,
    pub viewer: Option<i32>,
}

impl PageKey {
    pub fn new(uri: impl Into<String>, viewer: Option<i32>) -> Self {
        Self {
            uri: uri.into(),
            viewer,
        }
    }
}

struct CachedPage {
    stored_at: Instant,
    body: String,
}

/// Memoized HTML responses.
///
/// Entries are NOT invalidated by writes to the store. A cached page stays
/// stale until it expires or `clear` is called.
pub struct PageCache {
    ttl: Duration,
    pages: DashMap<PageKey, CachedPage>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: DashMap::new(),
        }
    }

    /// Returns a live copy of the page, dropping it if it has expired.
    pub fn get(&self, key: &PageKey) -> Option<String> {
        let expired = match self.pages.get(key) {
            Some(page) if page.stored_at.elapsed() < self.ttl => return Some(page.body.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.pages.remove(key);
        }
        None
    }

    pub fn insert(&self, key: PageKey, body: String) {
        if self.ttl.is_zero() {
            return;
        }

        // Sweep expired pages, including keys nobody reads again.
        let ttl = self.ttl;
        self.pages.retain(|_, page| page.stored_at.elapsed() < ttl);

        self.pages.insert(
            key,
            CachedPage {
                stored_at: Instant::now(),
                body,
            },
        );
    }

    /// Drops every cached page.
    pub fn clear(&self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageCache, PageKey};
    use std::time::Duration;

    #[test]
    fn serves_stale_until_cleared() {
        let cache = PageCache::new(Duration::from_secs(60));
        let key = PageKey::new("/", Some(1));
        cache.insert(key.clone(), "first".to_owned());
        assert_eq!(cache.get(&key).as_deref(), Some("first"));

        cache.clear();
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn keyed_by_viewer_and_query() {
        let cache = PageCache::new(Duration::from_secs(60));
        cache.insert(PageKey::new("/", None), "guest".to_owned());
        assert!(cache.get(&PageKey::new("/", Some(1))).is_none());
        assert!(cache.get(&PageKey::new("/?page=2", None)).is_none());
        assert_eq!(cache.get(&PageKey::new("/", None)).as_deref(), Some("guest"));
    }

    #[test]
    fn expires() {
        let cache = PageCache::new(Duration::from_millis(10));
        let key = PageKey::new("/", None);
        cache.insert(key.clone(), "page".to_owned());
        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn insert_evicts_expired_pages() {
        let cache = PageCache::new(Duration::from_millis(10));
        for page in 1..=50 {
            cache.insert(PageKey::new(format!("/?page={}", page), None), "page".to_owned());
        }
        assert_eq!(cache.len(), 50);

        std::thread::sleep(Duration::from_millis(25));
        cache.insert(PageKey::new("/", None), "fresh".to_owned());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&PageKey::new("/", None)).as_deref(), Some("fresh"));
    }

    #[test]
    fn zero_ttl_disables() {
        let cache = PageCache::new(Duration::ZERO);
        cache.insert(PageKey::new("/", None), "page".to_owned());
        assert!(cache.is_empty());
    }
}
