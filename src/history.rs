//! Bounded metric history feeding the sparklines.

use std::collections::{vec_deque, VecDeque};

/// How many samples each history keeps.
pub const HISTORY_CAPACITY: usize = 180;

/// A fixed-capacity FIFO; pushing onto a full buffer drops the oldest value.
#[derive(Clone, Debug, PartialEq)]
pub struct RingBuffer<T> {
    capacity: usize,
    buf: VecDeque<T>,
}

// === impl RingBuffer ===

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from the oldest to the newest sample.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.buf.iter()
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the contents out, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.buf.iter().cloned().collect()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn drops_oldest_on_overflow() {
        let mut ring = RingBuffer::new(3);
        for v in 1..=5 {
            ring.push(v);
        }
        assert_eq!(ring.to_vec(), vec![3, 4, 5]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn default_capacity() {
        let ring = RingBuffer::<f64>::default();
        assert_eq!(ring.capacity(), HISTORY_CAPACITY);
        assert!(ring.is_empty());
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut ring = RingBuffer::new(0);
        ring.push(1);
        assert!(ring.is_empty());
    }

    proptest! {
        #[test]
        fn keeps_most_recent_in_order(
            capacity in 1usize..32,
            values in proptest::collection::vec(any::<i32>(), 0..200),
        ) {
            let mut ring = RingBuffer::new(capacity);
            for (i, v) in values.iter().enumerate() {
                ring.push(*v);
                prop_assert!(ring.len() <= capacity);
                prop_assert_eq!(ring.len(), (i + 1).min(capacity));
            }

            let start = values.len().saturating_sub(capacity);
            prop_assert_eq!(ring.to_vec(), values[start..].to_vec());
        }
    }
}
