use super::metrics::{CacheMetrics, CacheStats};
use dnsmux_application::ports::ResultCache;
use dnsmux_domain::{Message, Question};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 1024;

struct CacheEntry {
    message: Message,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Bounded LRU store of responses keyed by question.
///
/// Expired entries are dropped lazily, on the load that finds them.
pub struct MessageCache {
    entries: Mutex<LruCache<Question, CacheEntry>>,
    metrics: CacheMetrics,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            metrics: CacheMetrics::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<Question, CacheEntry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert(&self, question: Question, message: Message, expires_at: Option<Instant>) {
        self.lock().put(question, CacheEntry { message, expires_at });
        self.metrics.insertions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResultCache for MessageCache {
    fn load(&self, question: &Question) -> Option<Message> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(question) {
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Some(entry) if !entry.is_expired(now) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.message.clone());
            }
            Some(_) => {}
        }

        entries.pop(question);
        self.metrics.expirations.fetch_add(1, Ordering::Relaxed);
        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        debug!(question = %question, "Cache entry expired");
        None
    }

    fn store(&self, question: Question, message: Message) {
        self.insert(question, message, None);
    }

    fn store_with_expiry(&self, question: Question, message: Message, expires_at: Instant) {
        self.insert(question, message, Some(expires_at));
    }
}
