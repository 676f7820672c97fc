// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Queue + set for breadth-first exploration of residuals and automaton states
//!

use std::{
    collections::{HashSet, VecDeque},
    hash::Hash,
};

///
/// A BfsQueue is a queue that doesn't contain duplicate elements.
/// - the push operation adds an element at the end of the queue
///   if this element hasn't been seen before. Otherwise, it's a no-op.
/// - the pop operations takes the element at the front of the queue
///   if the queue is not empty.
///
/// An element stays in the "seen" set after it's popped, so every element
/// is visited at most once.
#[derive(Debug)]
pub struct BfsQueue<T> {
    queue: VecDeque<T>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> BfsQueue<T> {
    ///
    /// Create a new queue that contains a single element
    ///
    pub fn start(root: T) -> Self {
        let mut q = BfsQueue {
            queue: VecDeque::new(),
            seen: HashSet::new(),
        };
        q.push(root);
        q
    }

    ///
    /// Add an element at the end of the queue if it's not been seen before
    /// - return true if this is a new element
    /// - return false otherwise
    ///
    pub fn push(&mut self, element: T) -> bool {
        if self.seen.insert(element.clone()) {
            self.queue.push_back(element);
            true
        } else {
            false
        }
    }

    ///
    /// Push all elements from an iterator
    ///
    pub fn push_all(&mut self, iter: impl IntoIterator<Item = T>) {
        for x in iter {
            self.push(x);
        }
    }

    ///
    /// Number of distinct elements pushed so far
    ///
    #[cfg(test)]
    pub fn num_seen(&self) -> usize {
        self.seen.len()
    }

    ///
    /// Get the first element in the queue
    /// - return None if the queue is empty
    ///
    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_duplicates() {
        let mut q = BfsQueue::start(1);
        assert!(q.push(2));
        assert!(!q.push(1));
        q.push_all([3, 2, 4]);
        assert_eq!(q.num_seen(), 4);

        let mut order = Vec::new();
        while let Some(x) = q.pop() {
            order.push(x);
            // already visited: ignored
            q.push(x);
        }
        assert_eq!(order, vec![1, 2, 3, 4]);
    }
}
