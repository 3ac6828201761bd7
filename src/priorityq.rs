// Copyright 2025 Lars Brubaker
// License: MIT
//
// Event queue for the sweep.
//
// A two-phase priority queue:
//   Phase 1 (pre-init): inserts go into a key array, sorted once by init().
//   Phase 2 (post-init): inserts go directly into a binary min-heap.
// extract_min() compares the heads of both phases.
//
// Site events are all known up front and land in the sorted array; circle
// events are discovered during the sweep and land in the heap. Invalidated
// circle events are not removed here: their owner marks them stale and drops
// them when they surface.

use std::cmp::Ordering;

/// Comparison function: returns true iff key1 <= key2.
pub type Leq<K> = Box<dyn Fn(&K, &K) -> bool>;

/// A heap-based priority queue (used after initialization).
struct Heap<K> {
    /// Heap positions are 1-based: position p lives at nodes[p - 1].
    nodes: Vec<K>,
    initialized: bool,
}

impl<K: Copy> Heap<K> {
    fn new() -> Self {
        Heap {
            nodes: Vec::new(),
            initialized: false,
        }
    }

    #[inline]
    fn key(&self, pos: usize) -> &K {
        &self.nodes[pos - 1]
    }

    fn float_down(&mut self, mut curr: usize, leq: &dyn Fn(&K, &K) -> bool) {
        let size = self.nodes.len();
        loop {
            let mut child = curr << 1;
            if child > size {
                break;
            }
            if child < size && leq(self.key(child + 1), self.key(child)) {
                child += 1;
            }
            if leq(self.key(curr), self.key(child)) {
                break;
            }
            self.nodes.swap(curr - 1, child - 1);
            curr = child;
        }
    }

    fn float_up(&mut self, mut curr: usize, leq: &dyn Fn(&K, &K) -> bool) {
        while curr > 1 {
            let parent = curr >> 1;
            if leq(self.key(parent), self.key(curr)) {
                break;
            }
            self.nodes.swap(curr - 1, parent - 1);
            curr = parent;
        }
    }

    fn init(&mut self, leq: &dyn Fn(&K, &K) -> bool) {
        for i in (1..=self.nodes.len() / 2).rev() {
            self.float_down(i, leq);
        }
        self.initialized = true;
    }

    fn insert(&mut self, key: K, leq: &dyn Fn(&K, &K) -> bool) {
        self.nodes.push(key);
        if self.initialized {
            let curr = self.nodes.len();
            self.float_up(curr, leq);
        }
    }

    fn extract_min(&mut self, leq: &dyn Fn(&K, &K) -> bool) -> Option<K> {
        if self.nodes.is_empty() {
            return None;
        }
        let min = self.nodes.swap_remove(0);
        if !self.nodes.is_empty() {
            self.float_down(1, leq);
        }
        Some(min)
    }

    #[inline]
    fn minimum(&self) -> Option<&K> {
        self.nodes.first()
    }

    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// The combined priority queue (sort-array + heap).
pub struct PriorityQ<K> {
    heap: Heap<K>,
    /// Pre-init key storage
    keys: Vec<K>,
    /// Indices into keys, sorted descending so the minimum is popped from the end
    order: Vec<usize>,
    initialized: bool,
    leq: Leq<K>,
}

impl<K: Copy> PriorityQ<K> {
    pub fn new(leq: Leq<K>) -> Self {
        PriorityQ {
            heap: Heap::new(),
            keys: Vec::new(),
            order: Vec::new(),
            initialized: false,
            leq,
        }
    }

    /// Sort the keys inserted so far.
    /// Must be called before extract_min/minimum (but after all pre-init inserts).
    pub fn init(&mut self) {
        self.order = (0..self.keys.len()).collect();
        let keys = &self.keys;
        let leq = &self.leq;
        self.order.sort_by(|&a, &b| {
            // descending
            match (leq(&keys[a], &keys[b]), leq(&keys[b], &keys[a])) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, _) => Ordering::Less,
            }
        });
        self.initialized = true;
        self.heap.init(&*self.leq);
    }

    pub fn insert(&mut self, key: K) {
        if self.initialized {
            self.heap.insert(key, &*self.leq);
        } else {
            self.keys.push(key);
        }
    }

    /// Remove and return the minimum key.
    pub fn extract_min(&mut self) -> Option<K> {
        debug_assert!(self.initialized, "extract_min before init");
        let Some(&sort_idx) = self.order.last() else {
            return self.heap.extract_min(&*self.leq);
        };
        let sort_min = self.keys[sort_idx];
        if let Some(heap_min) = self.heap.minimum() {
            if (self.leq)(heap_min, &sort_min) {
                return self.heap.extract_min(&*self.leq);
            }
        }
        self.order.pop();
        Some(sort_min)
    }

    /// Peek at the minimum key without extracting.
    pub fn minimum(&self) -> Option<&K> {
        let sort_min = self.order.last().map(|&i| &self.keys[i]);
        match (sort_min, self.heap.minimum()) {
            (Some(s), Some(h)) => Some(if (self.leq)(h, s) { h } else { s }),
            (s, h) => s.or(h),
        }
    }

    pub fn len(&self) -> usize {
        let pending_sorted = if self.initialized {
            self.order.len()
        } else {
            self.keys.len()
        };
        pending_sorted + self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leq_u32() -> Leq<u32> {
        Box::new(|a: &u32, b: &u32| a <= b)
    }

    #[test]
    fn heap_basic() {
        let leq = leq_u32();
        let mut h = Heap::new();
        h.init(&*leq);
        h.insert(3, &*leq);
        h.insert(1, &*leq);
        h.insert(2, &*leq);
        assert_eq!(h.minimum(), Some(&1));
        assert_eq!(h.extract_min(&*leq), Some(1));
        assert_eq!(h.extract_min(&*leq), Some(2));
        assert_eq!(h.extract_min(&*leq), Some(3));
        assert_eq!(h.extract_min(&*leq), None);
    }

    #[test]
    fn pq_pre_init_insert_then_extract() {
        let mut pq = PriorityQ::new(leq_u32());
        pq.insert(5);
        pq.insert(2);
        pq.insert(8);
        pq.insert(1);
        assert_eq!(pq.len(), 4);
        pq.init();

        assert_eq!(pq.extract_min(), Some(1));
        assert_eq!(pq.extract_min(), Some(2));
        assert_eq!(pq.extract_min(), Some(5));
        assert_eq!(pq.extract_min(), Some(8));
        assert!(pq.is_empty());
        assert_eq!(pq.extract_min(), None);
    }

    #[test]
    fn pq_post_init_insert() {
        let mut pq = PriorityQ::new(leq_u32());
        pq.insert(3);
        pq.init();
        pq.insert(1); // goes into heap
        pq.insert(4);
        assert_eq!(pq.minimum(), Some(&1));
        assert_eq!(pq.extract_min(), Some(1));
        assert_eq!(pq.extract_min(), Some(3));
        assert_eq!(pq.extract_min(), Some(4));
        assert!(pq.is_empty());
    }

    #[test]
    fn ties_prefer_heap_entries() {
        // (priority, tag): the heap entry wins a tie against the sorted entry.
        let leq: Leq<(u32, char)> = Box::new(|a: &(u32, char), b: &(u32, char)| a.0 <= b.0);
        let mut pq = PriorityQ::new(leq);
        pq.insert((2, 's'));
        pq.init();
        pq.insert((2, 'h'));
        assert_eq!(pq.extract_min(), Some((2, 'h')));
        assert_eq!(pq.extract_min(), Some((2, 's')));
    }

    #[test]
    fn many_keys_come_out_sorted() {
        let mut pq = PriorityQ::new(leq_u32());
        for k in [9u32, 4, 7, 1, 8] {
            pq.insert(k);
        }
        pq.init();
        for k in [6u32, 2, 10, 3, 5] {
            pq.insert(k);
        }
        let mut out = Vec::new();
        while let Some(k) = pq.extract_min() {
            out.push(k);
        }
        assert_eq!(out, (1..=10).collect::<Vec<_>>());
    }
}
