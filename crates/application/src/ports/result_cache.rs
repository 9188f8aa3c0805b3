use dnsmux_domain::{Message, Question};
use std::time::Instant;

/// Question-keyed store of responses. Must be safe for concurrent callers;
/// concurrent stores for one question resolve as last writer wins.
pub trait ResultCache: Send + Sync {
    /// Entries whose expiry has passed are reported as misses.
    fn load(&self, question: &Question) -> Option<Message>;

    /// Stores without expiry; only capacity eviction removes the entry.
    fn store(&self, question: Question, message: Message);

    fn store_with_expiry(&self, question: Question, message: Message, expires_at: Instant);
}
