//! Bounded sliding window

use std::collections::VecDeque;

/// Fixed-capacity window; pushing onto a full window evicts the oldest item
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create a window holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn back(&self) -> Option<&T> {
        self.data.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl SlidingWindow<f64> {
    /// Arithmetic mean of the window (0.0 when empty)
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut window = SlidingWindow::new(3);
        for i in 0..5 {
            window.push(i);
        }
        assert_eq!(window.len(), 3);
        assert!(window.is_full());
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(window.back(), Some(&4));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = SlidingWindow::new(45);
        for i in 0..1000 {
            window.push(i as f64);
            assert!(window.len() <= 45);
        }
    }

    #[test]
    fn test_mean() {
        let mut window = SlidingWindow::new(4);
        assert_eq!(window.mean(), 0.0);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(v);
        }
        assert!((window.mean() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = SlidingWindow::new(0);
        window.push(1);
        window.push(2);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.back(), Some(&2));
    }
}
