// Copyright 2025 Lars Brubaker
// License: MIT
//
// Vec-backed arena with a free list, used for the transient objects of the
// sweep: beach-line arcs and circle events. Freed slots are recycled by the
// next allocation, so indices stay small and no per-object allocation is made.

use std::ops::{Index, IndexMut};

pub struct BucketAlloc<T> {
    items: Vec<T>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl<T: Default> BucketAlloc<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store `value` in a free slot, returning its index.
    pub fn insert(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = value;
            self.live[idx as usize] = true;
            idx
        } else {
            let idx = self.items.len() as u32;
            self.items.push(value);
            self.live.push(true);
            idx
        }
    }

    /// Free an item by index (returns it to the free list).
    pub fn free(&mut self, idx: u32) {
        let i = idx as usize;
        if self.live.get(i).copied().unwrap_or(false) {
            self.items[i] = T::default();
            self.live[i] = false;
            self.free_list.push(idx);
        }
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        if self.is_live(idx) {
            self.items.get(idx as usize)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        if self.is_live(idx) {
            self.items.get_mut(idx as usize)
        } else {
            None
        }
    }

    pub fn is_live(&self, idx: u32) -> bool {
        self.live.get(idx as usize).copied().unwrap_or(false)
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.items.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Default> Default for BucketAlloc<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for BucketAlloc<T> {
    type Output = T;
    #[inline]
    fn index(&self, idx: u32) -> &T {
        &self.items[idx as usize]
    }
}

impl<T> IndexMut<u32> for BucketAlloc<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        &mut self.items[idx as usize]
    }
}
