use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Hands out instance ids used to build unique uniform and entry-point names.
///
/// Clones share the same underlying counter. [`InstanceCounter::global`] is the
/// process-wide default; registries and tests can own an isolated counter
/// instead.
#[derive(Debug, Clone, Default)]
pub struct InstanceCounter {
    next: Arc<AtomicU32>,
}

impl InstanceCounter {
    /// Creates a counter whose first id is zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counter shared by every filter built without an explicit one.
    pub fn global() -> InstanceCounter {
        static GLOBAL: OnceLock<InstanceCounter> = OnceLock::new();
        GLOBAL.get_or_init(InstanceCounter::new).clone()
    }

    /// Claims the next id. Returns the value before the increment.
    pub fn next_id(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;

    #[test]
    fn starts_at_zero_and_increments() {
        let counter = InstanceCounter::new();
        assert_eq!(counter.next_id(), 0);
        assert_eq!(counter.next_id(), 1);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn clones_share_state() {
        let counter = InstanceCounter::new();
        let other = counter.clone();
        counter.next_id();
        assert_eq!(other.next_id(), 1);
    }

    #[test]
    fn concurrent_claims_are_distinct() {
        let counter = InstanceCounter::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || (0..250).map(|_| counter.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {id} issued twice");
            }
        }
        assert_eq!(seen.len(), 2000);
        assert_eq!(counter.issued(), 2000);
    }
}
