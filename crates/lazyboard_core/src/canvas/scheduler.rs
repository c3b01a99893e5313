//! Trailing-edge debounce for per-key writes.
//!
//! # Invariants
//! - At most one pending entry per key; scheduling again replaces the payload
//!   and restarts the quiet period.
//! - A fired entry is removed before its write runs, so each schedule burst
//!   yields exactly one write.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Pending<P> {
    payload: P,
    deadline_ms: u64,
}

/// Coalesces bursts of writes per key into the last one.
#[derive(Debug, Clone)]
pub struct DebouncedScheduler<K: Ord + Clone, P> {
    quiet_period_ms: u64,
    pending: BTreeMap<K, Pending<P>>,
}

impl<K: Ord + Clone, P> DebouncedScheduler<K, P> {
    pub fn new(quiet_period_ms: u64) -> Self {
        Self {
            quiet_period_ms,
            pending: BTreeMap::new(),
        }
    }

    pub fn quiet_period_ms(&self) -> u64 {
        self.quiet_period_ms
    }

    /// Replaces any pending entry for `key`; the deadline restarts at `now_ms`.
    pub fn schedule(&mut self, key: K, payload: P, now_ms: u64) {
        self.pending.insert(
            key,
            Pending {
                payload,
                deadline_ms: now_ms.saturating_add(self.quiet_period_ms),
            },
        );
    }

    /// Fires every entry whose deadline is at or before `now_ms`.
    ///
    /// Returns the number of writes issued.
    pub fn run_due<F>(&mut self, now_ms: u64, mut write: F) -> usize
    where
        F: FnMut(K, P),
    {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.deadline_ms <= now_ms)
            .map(|(key, _)| key.clone())
            .collect();

        let mut fired = 0;
        for key in due {
            if let Some(entry) = self.pending.remove(&key) {
                write(key, entry.payload);
                fired += 1;
            }
        }
        fired
    }

    /// Fires everything pending regardless of deadline.
    pub fn flush_all<F>(&mut self, mut write: F) -> usize
    where
        F: FnMut(K, P),
    {
        let pending = std::mem::take(&mut self.pending);
        let fired = pending.len();
        for (key, entry) in pending {
            write(key, entry.payload);
        }
        fired
    }

    /// Drops the pending write for `key`, if any.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.values().map(|entry| entry.deadline_ms).min()
    }

    /// Keys with a pending write, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.pending.keys()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::DebouncedScheduler;

    #[test]
    fn burst_collapses_to_last_payload() {
        let mut scheduler = DebouncedScheduler::new(800);
        for (step, width) in [200, 220, 240, 260].into_iter().enumerate() {
            scheduler.schedule("node-a", width, step as u64 * 100);
        }
        assert_eq!(scheduler.next_deadline(), Some(1100));

        let mut writes = Vec::new();
        assert_eq!(scheduler.run_due(1099, |key, width| writes.push((key, width))), 0);
        assert_eq!(scheduler.run_due(1100, |key, width| writes.push((key, width))), 1);
        assert_eq!(writes, vec![("node-a", 260)]);
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[test]
    fn keys_debounce_independently() {
        let mut scheduler = DebouncedScheduler::new(800);
        scheduler.schedule(1, "a", 0);
        scheduler.schedule(2, "b", 500);

        let mut writes = Vec::new();
        scheduler.run_due(900, |key, payload| writes.push((key, payload)));
        assert_eq!(writes, vec![(1, "a")]);
        assert!(scheduler.is_pending(&2));
        assert_eq!(scheduler.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn flush_and_cancel_empty_the_queue() {
        let mut scheduler = DebouncedScheduler::new(800);
        scheduler.schedule(1, 10, 0);
        scheduler.schedule(2, 20, 0);
        assert!(scheduler.cancel(&1));
        assert!(!scheduler.cancel(&1));

        let mut writes = Vec::new();
        assert_eq!(scheduler.flush_all(|key, payload| writes.push((key, payload))), 1);
        assert_eq!(writes, vec![(2, 20)]);

        scheduler.schedule(3, 30, 0);
        assert_eq!(scheduler.cancel_all(), 1);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
