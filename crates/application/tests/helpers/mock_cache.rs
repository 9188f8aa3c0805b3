#![allow(dead_code)]

use dnsmux_application::ports::ResultCache;
use dnsmux_domain::{Message, Question};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// In-memory cache that remembers the expiry it was handed.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<Question, (Message, Option<Instant>)>>,
    loads: AtomicUsize,
    stores: AtomicUsize,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, question: &Question) -> Option<(Message, Option<Instant>)> {
        self.entries.lock().unwrap().get(question).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

impl ResultCache for RecordingCache {
    fn load(&self, question: &Question) -> Option<Message> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        let (message, expires_at) = entries.get(question)?;
        match expires_at {
            Some(expires_at) if Instant::now() > *expires_at => None,
            _ => Some(message.clone()),
        }
    }

    fn store(&self, question: Question, message: Message) {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().insert(question, (message, None));
    }

    fn store_with_expiry(&self, question: Question, message: Message, expires_at: Instant) {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(question, (message, Some(expires_at)));
    }
}
