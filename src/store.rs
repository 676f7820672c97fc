// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Store for hash-consing.
//!
//! Map keys -> &'static T. Each object gets a unique id, assigned in creation order.
//! Objects are never freed: the store leaks them so that references to them
//! can be freely copied and shared between threads.
//!

use std::{
    collections::{hash_map::Entry, HashMap},
    hash::Hash,
};

///
/// Objects that can be hash-consed must implement this trait
///
/// Key is a key/signature type for the hash-consed objects.
/// Each key must be unique to the object.
/// make(index, &k) must construct a full object of key k with id index.
///
pub trait HashConsed {
    /// Key type
    type Key: Eq + Hash + Clone;
    /// Object constructor
    fn make(index: usize, k: &Self::Key) -> Self;
}

///
/// Store
///
#[derive(Debug)]
pub struct Store<T: HashConsed + 'static> {
    map: HashMap<T::Key, &'static T>,
    counter: usize,
}

impl<T: HashConsed + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HashConsed + 'static> Store<T> {
    /// Create an empty store
    pub fn new() -> Store<T> {
        Store {
            map: HashMap::new(),
            counter: 0,
        }
    }

    /// Number of objects stored. This is also the id of the next new object.
    pub fn len(&self) -> usize {
        self.counter
    }

    /// Check emptiness
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Get the object of key k if it exists
    #[cfg(test)]
    pub fn get(&self, k: &T::Key) -> Option<&'static T> {
        self.map.get(k).copied()
    }

    /// Get the object defined by key k
    ///
    /// Return an existing object if there's one.
    /// Create a fresh object and return it otherwise.
    pub fn make(&mut self, k: T::Key) -> &'static T {
        match self.map.entry(k) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(e) => {
                let new_obj = T::make(self.counter, e.key());
                self.counter += 1;
                *e.insert(Box::leak(Box::new(new_obj)))
            }
        }
    }
}

#[cfg(test)]
mod test_store {
    use super::*;

    type Word = &'static Node;

    // words over a tiny alphabet, built by hash-consed cons cells
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Shape {
        Nil,
        Cons(u8, usize),
    }

    #[derive(Debug)]
    struct Node {
        shape: Shape,
        id: usize,
    }

    impl HashConsed for Node {
        type Key = Shape;

        fn make(index: usize, k: &Shape) -> Self {
            Node {
                shape: k.clone(),
                id: index,
            }
        }
    }

    fn word(store: &mut Store<Node>, s: &[u8]) -> Word {
        let mut w = store.make(Shape::Nil);
        for &c in s.iter().rev() {
            w = store.make(Shape::Cons(c, w.id));
        }
        w
    }

    #[test]
    fn build_a_store() {
        let mut store: Store<Node> = Store::new();
        assert!(store.is_empty());

        let abc = word(&mut store, b"abc");
        assert_eq!(store.len(), 4);

        // shares the suffix "bc"
        let xbc = word(&mut store, b"xbc");
        assert_eq!(store.len(), 5);
        assert_ne!(abc.id, xbc.id);

        let abc2 = word(&mut store, b"abc");
        println!("abc = {:p}, abc2 = {:p}", abc, abc2);
        assert!(std::ptr::eq(abc, abc2));
        assert_eq!(store.len(), 5);

        assert_eq!(store.get(&Shape::Nil).map(|n| n.id), Some(0));
        assert!(store.get(&Shape::Cons(b'z', 0)).is_none());
        if let Shape::Cons(c, _) = abc.shape {
            assert_eq!(c, b'a');
        } else {
            panic!("expected a cons cell");
        }
    }
}
