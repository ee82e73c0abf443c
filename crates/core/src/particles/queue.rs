use std::collections::vec_deque::{self, VecDeque};

/// FIFO with a fixed capacity. Pushing onto a full queue evicts the oldest item.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted one if the queue was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
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

    /// Most recent item
    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest first
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Clone> BoundedQueue<T> {
    /// Copy of the contents, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut q = BoundedQueue::new(3);
        assert_eq!(q.push(1), None);
        assert_eq!(q.push(2), None);
        assert_eq!(q.push(3), None);
        assert_eq!(q.push(4), Some(1));
        assert_eq!(q.to_vec(), vec![2, 3, 4]);
        assert_eq!(q.newest(), Some(&4));
        assert_eq!(q.len(), q.capacity());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut q = BoundedQueue::new(0);
        q.push('a');
        q.push('b');
        assert_eq!(q.to_vec(), vec!['b']);
    }

    #[test]
    fn test_clear() {
        let mut q = BoundedQueue::new(2);
        q.push(1);
        q.clear();
        assert!(q.is_empty());
        assert_eq!((&q).into_iter().count(), 0);
    }
}
