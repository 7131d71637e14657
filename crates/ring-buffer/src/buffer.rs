//! Overwrite-on-full Ring Buffer Implementation

use serde::Serialize;

/// Default buffer capacity (4 records = ~4 s of VE.Direct telemetry at 1 Hz)
pub const DEFAULT_CAPACITY: usize = 4;

/// Occupancy and throughput counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    /// Items pushed since creation
    pub total_written: u64,
    /// Items overwritten before they were read
    pub evicted: u64,
}

/// Fixed-capacity FIFO ring buffer
///
/// Not synchronized; wrap it in a mutex to share between a producer and a consumer.
#[derive(Debug)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[Option<T>]>,
    /// Index of the oldest item
    tail: usize,
    /// Number of stored items
    len: usize,
    total_written: u64,
    evicted: u64,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let storage: Vec<Option<T>> = (0..capacity.max(1)).map(|_| None).collect();
        Self {
            storage: storage.into_boxed_slice(),
            tail: 0,
            len: 0,
            total_written: 0,
            evicted: 0,
        }
    }

    /// Push an item, returning the oldest item if it had to be evicted
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        self.total_written += 1;

        if self.len == capacity {
            let evicted = self.storage[self.tail].replace(item);
            self.tail = (self.tail + 1) % capacity;
            self.evicted += 1;
            evicted
        } else {
            let head = (self.tail + self.len) % capacity;
            self.storage[head] = Some(item);
            self.len += 1;
            None
        }
    }

    /// Remove and return the oldest item
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.storage[self.tail].take();
        self.tail = (self.tail + 1) % self.capacity();
        self.len -= 1;
        item
    }

    /// Get the number of items currently in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            len: self.len,
            capacity: self.capacity(),
            total_written: self.total_written,
            evicted: self.evicted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(4);

        for i in 0..4 {
            assert_eq!(buffer.push(i), None);
        }
        assert_eq!(buffer.len(), buffer.capacity());

        // Fill beyond capacity
        assert_eq!(buffer.push(4), Some(0));
        assert_eq!(buffer.push(5), Some(1));
        assert_eq!(buffer.len(), 4);

        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(3));
        assert_eq!(buffer.pop(), Some(4));
        assert_eq!(buffer.pop(), Some(5));
        assert_eq!(buffer.pop(), None);

        let stats = buffer.stats();
        assert_eq!(stats.total_written, 6);
        assert_eq!(stats.evicted, 2);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut buffer = RingBuffer::new(0);
        buffer.push('a');
        assert_eq!(buffer.push('b'), Some('a'));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.pop(), Some('b'));
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn prop_keeps_newest(capacity in 1usize..16, items in prop::collection::vec(any::<u16>(), 0..64)) {
            let mut buffer = RingBuffer::new(capacity);
            for &item in &items {
                buffer.push(item);
            }

            let keep = items.len().min(capacity);
            let expected: Vec<u16> = items[items.len() - keep..].to_vec();
            let mut drained = Vec::new();
            while let Some(item) = buffer.pop() {
                drained.push(item);
            }
            prop_assert_eq!(drained, expected);
        }
    }
}
