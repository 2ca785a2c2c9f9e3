//! An explicit cache value object owned by its caller — no hidden
//! process-wide state. Invalidated on TTL expiry, on key change, or by an
//! explicit clear.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct ScanCache<T> {
    entry: Option<CacheEntry<T>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expiry: DateTime<Utc>,
    key: String,
}

impl<T> ScanCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// The cached value for `key`, if present and unexpired.
    pub fn get(&self, key: &str) -> Option<&T> {
        let entry = self.entry.as_ref()?;
        if entry.key != key || Utc::now() >= entry.expiry {
            return None;
        }
        Some(&entry.data)
    }

    pub fn put(&mut self, key: impl Into<String>, data: T) {
        self.entry = Some(CacheEntry {
            data,
            expiry: Utc::now() + self.ttl,
            key: key.into(),
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
