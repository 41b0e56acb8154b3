use std::{borrow::Borrow, hash::Hash};

use crate::{
    error::{EmptyQueue, KeyNotFound},
    probing_map::ProbingMap,
};

/// An element of the heap together with its priority
#[derive(Debug, Clone)]
struct HeapEntry<K> {
    /// The queued element
    element: K,
    /// Its current priority; smaller is removed first
    priority: f64,
}

/// Returns the parent of heap index `index`, or `None` for the root
fn parent(index: usize) -> Option<usize> {
    index.checked_sub(1).map(|i| i / 2)
}

/// A min-priority queue of distinct elements, each tagged with an `f64` priority that can be
/// raised or lowered while the element is queued.
///
/// The queue is a binary min-heap stored in a vector, paired with a [`ProbingMap`] from each
/// element to its current index in that vector. Every swap in the heap is followed by rewriting
/// both swapped elements' indices, so a priority change finds its element in O(1) and repairs the
/// heap in O(log N).
///
/// Priorities must not be NaN. Queues holding NaN priorities are not ordered in any specified
/// way.
#[derive(Debug, Clone)]
pub struct MinPQueue<K> {
    /// Binary min-heap: `heap[i].priority >= heap[(i - 1) / 2].priority` for every `i > 0`
    heap: Vec<HeapEntry<K>>,
    /// Maps every queued element to its index in `heap`, and nothing else
    position: ProbingMap<K, usize>,
}

impl<K> Default for MinPQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Extend<(K, f64)> for MinPQueue<K>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, f64)>>(&mut self, iter: T) {
        for (element, priority) in iter {
            self.add_or_update(element, priority);
        }
    }
}

impl<K> FromIterator<(K, f64)> for MinPQueue<K>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<K> MinPQueue<K> {
    /// Creates an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self { heap: Vec::new(), position: ProbingMap::new() }
    }

    /// Returns the number of queued elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no elements are queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns an element with the smallest priority: the one [`remove`](Self::remove) would
    /// return next.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if the queue is empty.
    pub fn peek(&self) -> Result<&K, EmptyQueue> {
        self.heap.first().map(|entry| &entry.element).ok_or(EmptyQueue)
    }

    /// Returns the smallest priority in the queue
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if the queue is empty.
    pub fn min_priority(&self) -> Result<f64, EmptyQueue> {
        self.heap.first().map(|entry| entry.priority).ok_or(EmptyQueue)
    }

    /// Priority stored at heap index `index`
    fn priority_at(&self, index: usize) -> Option<f64> {
        self.heap.get(index).map(|entry| entry.priority)
    }

    /// Whether the entry at `a` has a strictly smaller priority than the entry at `b`
    fn precedes(&self, a: usize, b: usize) -> bool {
        matches!((self.priority_at(a), self.priority_at(b)), (Some(pa), Some(pb)) if pa < pb)
    }

    /// Returns the child of `index` with the smaller priority, or `None` if `index` is a leaf.
    /// The left child wins ties.
    fn lowest_child(&self, index: usize) -> Option<usize> {
        let left = index.checked_mul(2)?.checked_add(1)?;
        if left >= self.heap.len() {
            return None;
        }
        let right = left.saturating_add(1);
        if right < self.heap.len() && self.precedes(right, left) { Some(right) } else { Some(left) }
    }
}

impl<K> MinPQueue<K>
where
    K: Eq + Hash + Clone,
{
    /// Returns true if `element` is queued
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.position.contains_key(element)
    }

    /// Returns the current priority of `element`, or `None` if it is not queued
    pub fn priority<Q>(&self, element: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.position.get(element).ok()?;
        self.priority_at(*index)
    }

    /// Queues `element` with `priority`, or moves it to `priority` if it is already queued.
    ///
    /// Setting an element to exactly the priority it already has changes nothing.
    pub fn add_or_update(&mut self, element: K, priority: f64) {
        match self.position.get(&element) {
            Ok(&index) => self.update(index, priority),
            Err(KeyNotFound) => self.add(element, priority),
        }
    }

    /// Removes and returns an element with the smallest priority. Ties are broken arbitrarily.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if the queue is empty.
    pub fn remove(&mut self) -> Result<K, EmptyQueue> {
        let last = self.heap.len().checked_sub(1).ok_or(EmptyQueue)?;
        self.swap(0, last);

        let removed = self.heap.pop().ok_or(EmptyQueue)?;
        let forgotten = self.position.remove(&removed.element);
        debug_assert!(forgotten.is_ok(), "removed element had no recorded position");

        if !self.heap.is_empty() {
            self.bubble_down(0);
        }

        Ok(removed.element)
    }

    /// Appends an element that is not yet queued and moves it up into place
    fn add(&mut self, element: K, priority: f64) {
        debug_assert!(!self.position.contains_key(&element), "element is already queued");

        let index = self.heap.len();
        self.heap.push(HeapEntry { element: element.clone(), priority });
        self.position.put(element, index);
        self.bubble_up(index);
    }

    /// Changes the priority of the entry at `index` and moves it up or down into place
    #[allow(clippy::float_cmp)]
    fn update(&mut self, index: usize, priority: f64) {
        let Some(entry) = self.heap.get_mut(index) else {
            debug_assert!(false, "recorded position {index} is outside the heap");
            return;
        };

        let current = entry.priority;
        if current == priority {
            return;
        }
        entry.priority = priority;

        if priority < current {
            self.bubble_up(index);
        } else {
            self.bubble_down(index);
        }
    }

    /// Exchanges the entries at `i` and `j`, then records both elements' new indices
    fn swap(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.heap.len() && j < self.heap.len());

        self.heap.swap(i, j);
        for index in [j, i] {
            if let Some(entry) = self.heap.get(index) {
                self.position.put(entry.element.clone(), index);
            }
        }
    }

    /// Swaps the entry at `index` with its parent until the parent's priority is no greater
    fn bubble_up(&mut self, mut index: usize) {
        while let Some(above) = parent(index) {
            if !self.precedes(index, above) {
                break;
            }
            self.swap(index, above);
            index = above;
        }
    }

    /// Swaps the entry at `index` with its lower-priority child until neither child is smaller
    fn bubble_down(&mut self, mut index: usize) {
        while let Some(child) = self.lowest_child(index) {
            if !self.precedes(child, index) {
                break;
            }
            self.swap(index, child);
            index = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fmt::Debug};

    use proptest::prelude::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    /// Checks heap order, position consistency and size agreement
    fn check_invariants<K: Eq + Hash + Clone + Debug>(queue: &MinPQueue<K>) {
        assert_eq!(queue.position.len(), queue.heap.len());
        for (index, entry) in queue.heap.iter().enumerate() {
            assert_eq!(queue.position.get(&entry.element), Ok(&index));
            if let Some(above) = parent(index) {
                assert!(entry.priority >= queue.heap[above].priority);
            }
        }
    }

    fn drain<K: Eq + Hash + Clone>(queue: &mut MinPQueue<K>) -> Vec<K> {
        std::iter::from_fn(|| queue.remove().ok()).collect()
    }

    #[test]
    fn test_empty_at_construction() {
        let queue: MinPQueue<String> = MinPQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_empty_queue_errors() {
        let mut queue: MinPQueue<&str> = MinPQueue::new();
        assert_eq!(queue.peek(), Err(EmptyQueue));
        assert_eq!(queue.min_priority(), Err(EmptyQueue));
        assert_eq!(queue.remove(), Err(EmptyQueue));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_add_single_element() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 10.0);

        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek(), Ok(&"A"));
        assert_eq!(queue.min_priority(), Ok(10.0));
    }

    #[test]
    fn test_peek_returns_smallest_priority() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 10.0);
        queue.add_or_update("B", 5.0);
        queue.add_or_update("C", 7.0);

        assert_eq!(queue.peek(), Ok(&"B"));
        assert_eq!(queue.min_priority(), Ok(5.0));
        assert_eq!(queue.len(), 3);
        check_invariants(&queue);
    }

    #[test]
    fn test_remove_order() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 10.0);
        queue.add_or_update("B", 5.0);
        queue.add_or_update("C", 7.0);

        assert_eq!(queue.remove(), Ok("B"));
        assert_eq!(queue.remove(), Ok("C"));
        assert_eq!(queue.remove(), Ok("A"));
        assert!(queue.is_empty());
        assert!(!queue.contains("A"));
    }

    #[test]
    fn test_priority_increase_bubbles_down() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 1.0);
        queue.add_or_update("B", 2.0);
        queue.add_or_update("C", 3.0);

        queue.add_or_update("A", 10.0);
        assert_eq!(queue.peek(), Ok(&"B"));
        assert_eq!(queue.min_priority(), Ok(2.0));
        assert_eq!(queue.len(), 3);
        check_invariants(&queue);
    }

    #[test]
    fn test_priority_decrease_bubbles_up() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 10.0);
        queue.add_or_update("B", 20.0);
        queue.add_or_update("C", 30.0);

        queue.add_or_update("C", 5.0);
        assert_eq!(queue.peek(), Ok(&"C"));
        assert_eq!(queue.min_priority(), Ok(5.0));
        check_invariants(&queue);
    }

    #[test]
    fn test_update_moves_element_down_past_both_levels() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("a", 5.0);
        queue.add_or_update("b", 10.0);
        queue.add_or_update("c", 8.0);

        queue.add_or_update("a", 15.0);
        assert_eq!(drain(&mut queue), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_update_to_same_priority_is_noop() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 10.0);
        queue.add_or_update("B", 10.0);
        let before = queue.heap.iter().map(|entry| entry.element).collect::<Vec<_>>();

        queue.add_or_update("B", 10.0);

        let after = queue.heap.iter().map(|entry| entry.element).collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Ok(&"A"));
        assert_eq!(queue.min_priority(), Ok(10.0));
    }

    #[test]
    fn test_equal_priorities() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("A", 5.0);
        queue.add_or_update("B", 5.0);
        queue.add_or_update("C", 5.0);

        let first = queue.remove();
        assert!(matches!(first, Ok("A" | "B" | "C")));
        assert_eq!(queue.len(), 2);
        check_invariants(&queue);
    }

    #[test]
    fn test_left_child_wins_ties() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("a", 1.0);
        queue.add_or_update("b", 5.0);
        queue.add_or_update("c", 5.0);
        queue.add_or_update("d", 9.0);

        // `d` moves to the root and sinks towards `b`, the left child
        assert_eq!(queue.remove(), Ok("a"));
        assert_eq!(queue.peek(), Ok(&"b"));
        assert_eq!(queue.heap[1].element, "d");
        check_invariants(&queue);
    }

    #[test]
    fn test_update_deep_node() {
        let mut queue = MinPQueue::new();
        for i in 0..15 {
            queue.add_or_update(i, f64::from(i) + 10.0);
        }

        queue.add_or_update(14, 0.5);
        assert_eq!(queue.peek(), Ok(&14));
        check_invariants(&queue);
    }

    #[test]
    fn test_reuse_element_after_removal() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("a", 5.0);
        assert_eq!(queue.remove(), Ok("a"));

        queue.add_or_update("a", 10.0);
        assert_eq!(queue.peek(), Ok(&"a"));
        assert_eq!(queue.min_priority(), Ok(10.0));
    }

    #[test]
    fn test_contains_and_priority() {
        let mut queue = MinPQueue::new();
        queue.add_or_update("x".to_string(), 3.0);
        queue.add_or_update("y".to_string(), 1.0);

        assert!(queue.contains("x"));
        assert_eq!(queue.priority("x"), Some(3.0));
        assert_eq!(queue.priority("z"), None);

        queue.add_or_update("x".to_string(), 0.0);
        assert_eq!(queue.priority("x"), Some(0.0));
        assert_eq!(queue.peek().map(String::as_str), Ok("x"));
    }

    #[test]
    fn test_descending_inserts_come_out_ascending() {
        let mut queue = MinPQueue::new();
        for i in (1..=1000).rev() {
            queue.add_or_update(format!("k{i}"), f64::from(i));
        }
        check_invariants(&queue);

        let expected: Vec<_> = (1..=1000).map(|i| format!("k{i}")).collect();
        assert_eq!(drain(&mut queue), expected);
    }

    #[test]
    fn test_random_priorities_drain_sorted() {
        let mut rng = StdRng::seed_from_u64(2110);
        let mut queue = MinPQueue::new();
        for i in 0..1000 {
            queue.add_or_update(i, rng.random_range(0.0..1000.0));
        }
        assert_eq!(queue.len(), 1000);

        let mut previous = f64::MIN;
        while let Ok(current) = queue.min_priority() {
            assert!(current >= previous);
            previous = current;
            assert!(queue.remove().is_ok());
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_large_heap_with_updates() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue: MinPQueue<u32> =
            (0..10_000).map(|i| (i, rng.random_range(0.0..10_000.0))).collect();

        for _ in 0..5_000 {
            let element = rng.random_range(0..10_000);
            queue.add_or_update(element, rng.random_range(-100.0..20_000.0));
        }
        check_invariants(&queue);

        for _ in 0..5_000 {
            assert!(queue.remove().is_ok());
        }
        check_invariants(&queue);

        queue.add_or_update(u32::MAX, -1.0e9);
        assert_eq!(queue.peek(), Ok(&u32::MAX));
    }

    proptest! {
        #[test]
        fn prop_matches_model(
            ops in prop::collection::vec((0u8..32, prop::option::of(-1000.0f64..1000.0)), 0..300)
        ) {
            let mut queue = MinPQueue::new();
            let mut model: HashMap<u8, f64> = HashMap::new();

            for (element, op) in ops {
                match op {
                    Some(priority) => {
                        queue.add_or_update(element, priority);
                        model.insert(element, priority);
                    }
                    None => {
                        let lowest = model.values().copied().reduce(f64::min);
                        match queue.remove() {
                            Ok(removed) => {
                                prop_assert_eq!(model.remove(&removed), lowest);
                            }
                            Err(EmptyQueue) => {
                                prop_assert!(model.is_empty());
                            }
                        }
                    }
                }

                check_invariants(&queue);
                prop_assert_eq!(queue.len(), model.len());
                prop_assert_eq!(queue.min_priority().ok(), model.values().copied().reduce(f64::min));
            }
        }

        #[test]
        fn prop_drain_is_sorted(priorities in prop::collection::vec(-1.0e6f64..1.0e6, 0..200)) {
            let mut queue: MinPQueue<usize> = priorities.iter().copied().enumerate().collect();

            let mut drained = Vec::new();
            while let Ok(priority) = queue.min_priority() {
                drained.push(priority);
                prop_assert!(queue.remove().is_ok());
            }

            let mut sorted = priorities.clone();
            sorted.sort_by(f64::total_cmp);
            prop_assert_eq!(drained, sorted);
        }
    }
}
