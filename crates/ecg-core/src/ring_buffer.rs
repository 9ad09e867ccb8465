//! Fixed-capacity FIFO buffer for sample history
//!
//! Every output stream (raw, average, median, exponential) and the short
//! filter window is a `RingBuffer`. Capacity is fixed at construction and the
//! storage is allocated once, so `append` never reallocates: once full, the
//! oldest element is evicted before the new one is stored.

use std::collections::VecDeque;

/// Bounded, append-only sequence with oldest-first eviction
///
/// Invariant: `len() <= capacity()`, and the contents are always the most
/// recently appended elements in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest one if the buffer is full
    pub fn append(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Most recently appended element
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Element at `index`, counted from the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }

    /// Iterate over the `n` most recent elements, oldest first.
    ///
    /// Yields fewer than `n` elements when the buffer holds fewer.
    pub fn iter_last(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    /// Drop every element; capacity is unchanged
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// The `n` most recent elements in chronological order (possibly fewer)
    pub fn slice_last(&self, n: usize) -> Vec<T> {
        self.iter_last(n).cloned().collect()
    }

    /// Copy of the whole buffer, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
