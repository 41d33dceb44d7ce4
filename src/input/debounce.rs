use std::time::{Duration, Instant};

/// Minimum interval between two actions of the same key.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(180);

/// How many distinct keys are tracked at once.
pub const DEBOUNCE_SLOTS: usize = 8;

/// Suppresses a key that fires again within [`DEBOUNCE_WINDOW`].
///
/// A fixed table of slots scanned linearly: a known key has its timestamp
/// checked, an unknown key takes a free slot or evicts the one with the
/// oldest timestamp.
#[derive(Debug)]
pub struct Debouncer<K> {
    window: Duration,
    slots: [Option<(K, Instant)>; DEBOUNCE_SLOTS],
}

impl<K: Copy + Eq> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: [None; DEBOUNCE_SLOTS],
        }
    }

    /// Returns `true` if `key` may act at `now`, recording the occurrence.
    ///
    /// A suppressed occurrence does not refresh the key's timestamp.
    pub fn allow(&mut self, key: K, now: Instant) -> bool {
        if let Some((_, at)) = self.slots.iter_mut().flatten().find(|(k, _)| *k == key) {
            if now.saturating_duration_since(*at) < self.window {
                return false;
            }
            *at = now;
            return true;
        }

        let slot = match self.slots.iter().position(Option::is_none) {
            Some(free) => free,
            None => self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.map(|(_, at)| (i, at)))
                .min_by_key(|&(_, at)| at)
                .map_or(0, |(i, _)| i),
        };
        self.slots[slot] = Some((key, now));
        true
    }

    pub fn tracked(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

impl<K: Copy + Eq> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn repeat_within_window_is_suppressed() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        assert!(d.allow('q', t0));
        assert!(!d.allow('q', t0 + ms(50)));
        assert!(d.allow('q', t0 + ms(200)));
    }

    #[test]
    fn suppressed_repeat_keeps_original_timestamp() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        assert!(d.allow('x', t0));
        assert!(!d.allow('x', t0 + ms(100)));
        // 190ms after the first press, though only 90ms after the suppressed one.
        assert!(d.allow('x', t0 + ms(190)));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        assert!(d.allow('a', t0));
        assert!(d.allow('b', t0 + ms(10)));
        assert!(!d.allow('a', t0 + ms(20)));
    }

    #[test]
    fn oldest_slot_is_evicted() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        for i in 0..DEBOUNCE_SLOTS as u64 {
            assert!(d.allow(i, t0 + ms(i)));
        }
        assert_eq!(d.tracked(), DEBOUNCE_SLOTS);

        // key 0 holds the oldest timestamp and makes room for key 100.
        assert!(d.allow(100, t0 + ms(20)));
        assert_eq!(d.tracked(), DEBOUNCE_SLOTS);
        assert!(d.allow(0, t0 + ms(21)), "evicted key is treated as new");
        assert!(!d.allow(100, t0 + ms(30)));
    }
}
