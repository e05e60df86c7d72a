use alloc::vec::Vec;
use core::fmt;

use crate::Key;

/// An element found smaller than its parent by [`MinHeap::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapViolation<K> {
    /// Position of the offending element in the backing array
    pub index: usize,
    /// The offending element
    pub element: K,
    /// Its parent, which should be less than or equal to it
    pub parent: K,
}

impl<K: Key> fmt::Display for HeapViolation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element {} at index {} is smaller than its parent {}",
            self.element, self.index, self.parent
        )
    }
}

/// A binary min-heap stored in a growable array.
///
/// The element at index `i` has its children at `2i + 1` and `2i + 2`; the root
/// always holds the smallest element. Push and pop are O(log n).
#[derive(Debug, Clone)]
pub struct MinHeap<K: Key = i32> {
    elements: Vec<K>,
}

impl<K: Key> Default for MinHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> MinHeap<K> {
    /// Creates an empty heap.
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates an empty heap with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of elements in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the heap is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the smallest element without removing it
    #[inline]
    pub fn peek(&self) -> Option<K> {
        self.elements.first().copied()
    }

    /// Pushes `value` onto the heap and sifts it up into place.
    pub fn push(&mut self, value: K) {
        self.elements.push(value);
        self.up_heap(self.elements.len() - 1);
    }

    /// Removes and returns the smallest element.
    ///
    /// # Returns
    ///
    /// * `Option<K>` - The minimum, or `None` if the heap is empty
    pub fn pop(&mut self) -> Option<K> {
        let tail = self.elements.pop()?;
        if self.elements.is_empty() {
            return Some(tail);
        }

        let root = core::mem::replace(&mut self.elements[0], tail);
        self.down_heap(0);
        Some(root)
    }

    /// Checks that no element is smaller than its parent.
    pub fn check(&self) -> Result<(), HeapViolation<K>> {
        for (index, &element) in self.elements.iter().enumerate().skip(1) {
            let parent = self.elements[parent_index(index)];
            if element < parent {
                return Err(HeapViolation {
                    index,
                    element,
                    parent,
                });
            }
        }
        Ok(())
    }

    /// Panics if the heap property is broken anywhere.
    ///
    /// # Panics
    ///
    /// If [`check`](Self::check) reports a violation.
    pub fn validate(&self) {
        if let Err(violation) = self.check() {
            panic!(
                "heap property violated: {violation}\nelements: {:?}",
                self.elements
            );
        }
    }

    /// Bubbles the element at `current` up until its parent is not larger.
    fn up_heap(&mut self, mut current: usize) {
        while current > 0 {
            let parent = parent_index(current);
            if self.elements[current] >= self.elements[parent] {
                break;
            }
            self.elements.swap(current, parent);
            current = parent;
        }
    }

    /// Buries the element at `current` until it is not larger than either child.
    fn down_heap(&mut self, mut current: usize) {
        let len = self.elements.len();
        loop {
            let left = left_index(current);
            if left >= len {
                break;
            }
            let right = right_index(current);
            // Ties prefer the left child.
            let smaller = if right < len && self.elements[right] < self.elements[left] {
                right
            } else {
                left
            };

            if self.elements[current] <= self.elements[smaller] {
                break;
            }
            self.elements.swap(current, smaller);
            current = smaller;
        }
    }
}

#[inline]
const fn parent_index(n: usize) -> usize {
    (n - 1) / 2
}

#[inline]
const fn left_index(n: usize) -> usize {
    n * 2 + 1
}

#[inline]
const fn right_index(n: usize) -> usize {
    n * 2 + 2
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

    #[test]
    fn test_empty_heap() {
        let mut heap = MinHeap::<i32>::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
        heap.validate();
    }

    #[test]
    fn test_push_keeps_minimum_on_top() {
        let mut heap = MinHeap::new();
        heap.push(5);
        assert_eq!(heap.peek(), Some(5));
        heap.push(3);
        assert_eq!(heap.peek(), Some(3));
        heap.push(8);
        assert_eq!(heap.peek(), Some(3));
        heap.push(-1);
        assert_eq!(heap.peek(), Some(-1));
        assert_eq!(heap.len(), 4);
        heap.validate();
    }

    #[test]
    fn test_pop_single_element() {
        let mut heap = MinHeap::new();
        heap.push(42i64);
        assert_eq!(heap.pop(), Some(42));
        assert!(heap.is_empty());
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_pop_yields_sorted_order() {
        let mut heap = MinHeap::with_capacity(10);
        for value in [9, 4, 7, 1, 8, 2, 6, 3, 5, 0] {
            heap.push(value);
            heap.validate();
        }

        let mut popped = Vec::new();
        while let Some(value) = heap.pop() {
            heap.validate();
            popped.push(value);
        }
        assert_eq!(popped, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut heap = MinHeap::new();
        for value in [2, 1, 2, 1, 2] {
            heap.push(value);
        }
        assert_eq!(heap.len(), 5);

        let popped: Vec<_> = core::iter::from_fn(|| heap.pop()).collect();
        assert_eq!(popped, vec![1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_random_workload_non_decreasing() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut values: Vec<i32> = (0..100).map(|_| rng.random_range(-1000..1000)).collect();
        values.shuffle(&mut rng);

        let mut heap = MinHeap::new();
        for &value in &values {
            heap.push(value);
            heap.validate();
        }
        assert_eq!(heap.len(), values.len());

        let mut previous = i32::MIN;
        for _ in 0..values.len() {
            let current = heap.pop().unwrap();
            assert!(
                previous <= current,
                "previously popped {previous} is greater than {current}"
            );
            heap.validate();
            previous = current;
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut heap = MinHeap::new();
        heap.push(10);
        heap.push(4);
        assert_eq!(heap.pop(), Some(4));
        heap.push(7);
        heap.push(1);
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(7));
        assert_eq!(heap.pop(), Some(10));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_check_reports_corruption() {
        let mut heap = MinHeap::new();
        for value in [1, 2, 3] {
            heap.push(value);
        }
        heap.elements[2] = 0;

        assert_eq!(
            heap.check(),
            Err(HeapViolation {
                index: 2,
                element: 0,
                parent: 1,
            })
        );
    }

    #[test]
    #[should_panic(expected = "heap property violated")]
    fn test_validate_panics_on_corruption() {
        let mut heap = MinHeap::new();
        heap.push(1);
        heap.push(2);
        heap.elements[0] = 3;
        heap.validate();
    }

    #[test]
    fn test_index_arithmetic() {
        assert_eq!(parent_index(1), 0);
        assert_eq!(parent_index(2), 0);
        assert_eq!(parent_index(5), 2);
        assert_eq!(parent_index(6), 2);
        assert_eq!(left_index(2), 5);
        assert_eq!(right_index(2), 6);
    }
}
