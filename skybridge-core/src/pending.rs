//! In-memory store of the first leg of a round trip while its counterpart
//! webhook is pending. Process-lifetime only: a restart loses all unpaired
//! legs and the sender must re-submit both.

use chrono::{DateTime, Duration, Utc};
use skybridge_shared::Booking;
use std::collections::HashMap;

/// One stored leg, keyed by the order display id. Never mutated after
/// creation; it lives until its counterpart arrives or the TTL sweep
/// removes it.
#[derive(Debug, Clone)]
pub struct PendingBooking {
    pub booking: Booking,
    pub flights: Vec<i64>,
    pub first_received_at: DateTime<Utc>,
}

/// Keyed cache of pending legs. At most one entry per correlation key.
///
/// Operations are synchronous on `&mut self`; the coordinator serializes
/// access behind a single lock, which also makes its check-then-act
/// sequences atomic.
#[derive(Debug, Default)]
pub struct PendingStore {
    entries: HashMap<String, PendingBooking>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the entry for `key`, stamped with the current
    /// time. Overwrite only happens after a completed combination has
    /// evicted the prior entry; callers must not put onto an unconsumed key.
    pub fn put(&mut self, key: String, booking: Booking, flights: Vec<i64>) {
        self.entries.insert(
            key,
            PendingBooking {
                booking,
                flights,
                first_received_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&PendingBooking> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Idempotent; removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry older than `ttl` relative to `now`, returning how
    /// many were removed. Driven opportunistically by incoming round-trip
    /// traffic, not by a background timer.
    pub fn sweep(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let initial_count = self.entries.len();

        self.entries.retain(|key, entry| {
            let stale = now - entry.first_received_at > ttl;
            if stale {
                tracing::info!(order_id = %key, "removed stale pending round trip booking");
            }
            !stale
        });

        initial_count - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(key: &str, age: Duration) -> PendingStore {
        let mut store = PendingStore::new();
        store.put(key.to_string(), Booking::default(), vec![516]);
        if let Some(entry) = store.entries.get_mut(key) {
            entry.first_received_at = Utc::now() - age;
        }
        store
    }

    #[test]
    fn test_put_get_has() {
        let store = store_with("BUJP", Duration::zero());
        assert!(store.has("BUJP"));
        let entry = store.get("BUJP").unwrap();
        assert_eq!(entry.flights, vec![516]);
        assert!(!store.has("OTHER"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = store_with("BUJP", Duration::zero());
        store.remove("BUJP");
        assert!(!store.has("BUJP"));
        // Absent key is a no-op, not an error
        store.remove("BUJP");
        assert!(!store.has("BUJP"));
    }

    #[test]
    fn test_sweep_removes_stale_entries() {
        let mut store = store_with("OLD", Duration::hours(2));
        store.put("FRESH".to_string(), Booking::default(), vec![517]);

        let removed = store.sweep(Utc::now(), Duration::hours(1));
        assert_eq!(removed, 1);
        assert!(!store.has("OLD"));
        assert!(store.has("FRESH"));
    }

    #[test]
    fn test_sweep_twice_removes_nothing_on_second_call() {
        let mut store = store_with("OLD", Duration::hours(2));
        assert_eq!(store.sweep(Utc::now(), Duration::hours(1)), 1);
        assert_eq!(store.sweep(Utc::now(), Duration::hours(1)), 0);
    }

    #[test]
    fn test_entry_exactly_at_ttl_survives() {
        let now = Utc::now();
        let mut store = store_with("EDGE", Duration::hours(1));
        if let Some(entry) = store.entries.get_mut("EDGE") {
            entry.first_received_at = now - Duration::hours(1);
        }
        // Strictly older than TTL is evicted; exactly TTL old is kept
        assert_eq!(store.sweep(now, Duration::hours(1)), 0);
        assert!(store.has("EDGE"));
    }
}
