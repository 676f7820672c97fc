// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Queues for breadth-first exploration of labeled graphs
//!
//! Used to extract shortest witnesses: the labels on the path from the
//! root to the first accepting node found.
//!

use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
};

//
// Record to track predecessor
// the predecessor of a node N is either Root (for the root node)
// or a pair (Label, Node).
//
#[derive(Debug)]
enum Edge<N, L> {
    Root,
    Pred(L, N),
}

///
/// Labeled queue to explore a graph from a root
/// - N: type of nodes
/// - L: type of labels
///
/// For every node that's been visited (except the root), we keep
/// a pair (label, predecessor), where the predecessor is a node
/// on a shortest path from the root.
///
#[derive(Debug)]
pub struct LabeledQueue<N, L> {
    queue: VecDeque<N>,
    map: HashMap<N, Edge<N, L>>,
}

impl<N: Eq + Hash + Clone, L: Clone> LabeledQueue<N, L> {
    ///
    /// Initialize to explore from a root
    ///
    pub fn new(root: N) -> Self {
        let mut queue = VecDeque::new();
        let mut map = HashMap::new();
        queue.push_back(root.clone());
        map.insert(root, Edge::Root);
        LabeledQueue { queue, map }
    }

    ///
    /// Push a successor of a node into the queue
    /// - no effect if the node has been visited before
    /// - otherwise, record that node is reachable from pre via label.
    /// - return true if this node is new, false otherwise
    ///
    pub fn push(&mut self, pre: N, label: L, suc: N) -> bool {
        if self.map.contains_key(&suc) {
            false
        } else {
            self.queue.push_back(suc.clone());
            self.map.insert(suc, Edge::Pred(label, pre));
            true
        }
    }

    ///
    /// Get the node first in the queue
    ///
    pub fn pop(&mut self) -> Option<N> {
        self.queue.pop_front()
    }

    ///
    /// Labels on the path from the root to a node
    /// - return None if the node has not been visited
    /// - the list is empty if node is the root
    ///
    pub fn path(&self, node: &N) -> Option<Vec<L>> {
        let mut edge = self.map.get(node)?;
        let mut result = Vec::new();
        while let Edge::Pred(label, pre) = edge {
            result.push(label.clone());
            edge = self.map.get(pre)?;
        }
        result.reverse();
        Some(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    //
    // Test graph:
    //  0 --a--> 0
    //  0 --b--> 1
    //  0 --c--> 2
    //  1 --a--> 3
    //  1 --c--> 2
    //  2 --b--> 3
    //  2 --c--> 3
    //  3 --a--> 0
    //  3 --b--> 1
    //  3 --c--> 3
    //  4 (isolated)
    //
    fn graph() -> Vec<(u32, char, u32)> {
        vec![
            (0, 'a', 0),
            (0, 'b', 1),
            (0, 'c', 2),
            (1, 'a', 3),
            (1, 'c', 2),
            (2, 'b', 3),
            (2, 'c', 3),
            (3, 'a', 0),
            (3, 'b', 1),
            (3, 'c', 3),
        ]
    }

    fn explore(root: u32) -> LabeledQueue<u32, char> {
        let g = graph();
        let mut queue = LabeledQueue::new(root);
        while let Some(n) = queue.pop() {
            for &(_, l, s) in g.iter().filter(|(x, _, _)| *x == n) {
                queue.push(n, l, s);
            }
        }
        queue
    }

    #[test]
    fn shortest_paths() {
        let q = explore(0);
        for j in 0..5 {
            println!("path to n{j}: {:?}", q.path(&j));
        }
        assert_eq!(q.path(&0), Some(vec![]));
        assert_eq!(q.path(&1), Some(vec!['b']));
        assert_eq!(q.path(&2), Some(vec!['c']));
        assert_eq!(q.path(&3), Some(vec!['b', 'a']));
        assert_eq!(q.path(&4), None);

        let q = explore(2);
        assert_eq!(q.path(&0), Some(vec!['b', 'a']));
    }
}
