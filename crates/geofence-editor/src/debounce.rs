//! Trailing-edge debounce keyed by overlay.
//!
//! Every event pushes the key's deadline out by the full window; the key
//! fires once, at the first [`Debouncer::take_due`] after the deadline.
//! Time is passed in explicitly so the map event loop decides when to poll.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<K> {
    window: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Copy + Eq + Hash + Ord> Debouncer<K> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadlines: HashMap::new(),
        }
    }

    /// Records an event for `key` at `now`, resetting its timer.
    pub fn touch(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.window);
    }

    /// Returns `true` if `key` had a pending timer.
    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    #[must_use]
    pub fn is_pending(&self, key: K) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Earliest pending deadline, for scheduling the next poll.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every key whose window has elapsed, in key order.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(k, _)| *k)
            .collect();
        due.sort_unstable();
        for k in &due {
            self.deadlines.remove(k);
        }
        due
    }

    /// Removes and returns every pending key regardless of deadline.
    pub fn take_all(&mut self) -> Vec<K> {
        let mut all: Vec<K> = self.deadlines.drain().map(|(k, _)| k).collect();
        all.sort_unstable();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn fires_once_after_the_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.touch(1u64, start);
        assert!(d.take_due(start + Duration::from_millis(99)).is_empty());
        assert_eq!(d.take_due(start + WINDOW), vec![1]);
        assert!(d.take_due(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn each_event_resets_the_timer() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..10 {
            d.touch(1u64, start + Duration::from_millis(i * 10));
        }
        // Last event at 90 ms, so nothing is due until 190 ms.
        assert!(d.take_due(start + Duration::from_millis(150)).is_empty());
        assert_eq!(d.next_deadline(), Some(start + Duration::from_millis(190)));
        assert_eq!(d.take_due(start + Duration::from_millis(190)), vec![1]);
    }

    #[test]
    fn cancel_drops_the_timer() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.touch(7u64, start);
        assert!(d.cancel(7));
        assert!(!d.is_pending(7));
        assert!(d.take_due(start + WINDOW).is_empty());
        assert!(!d.cancel(7));
    }

    #[test]
    fn keys_are_independent() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.touch(1u64, start);
        d.touch(2u64, start + Duration::from_millis(50));
        assert_eq!(d.take_due(start + WINDOW), vec![1]);
        assert!(d.is_pending(2));
        assert_eq!(d.take_all(), vec![2]);
        assert!(d.next_deadline().is_none());
    }
}
