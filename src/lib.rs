// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Regular expressions and automata over bounded, ordered alphabets
//!
//! # Overview
//!
//! This crate implements regular expressions whose symbols belong to an arbitrary
//! finite, totally ordered alphabet: bytes, `char`, fixed-width integers, or
//! user-defined types such as 9-bit signed integers (see [alphabet]).
//!
//! Module [regular_expressions](crate::regular_expressions) implements regular expression
//! constructs (including intersection and negation), derivatives, membership tests,
//! emptiness and equivalence checks, and conversion to automata. All regular expressions
//! are hash-consed and kept in a canonical form by an
//! [ReManager](crate::regular_expressions::ReManager).
//!
//! Module [automata](crate::automata) provides deterministic finite-state automata
//! whose transitions are labeled by ranges of symbols, with products
//! (union, intersection, difference), complement, emptiness, and equivalence.
//!
//! Module [parser](crate::parser) converts the usual textual syntax of
//! regular expressions to [Regex](crate::regular_expressions::Regex) terms.
//! Module [matcher](crate::matcher) searches for the first match of a pattern
//! in a sequence.
//!
//! # Example
//!
//! ```
//! use bounded_regex::{parser::parse_ascii, regular_expressions::ReManager};
//!
//! let re = &mut ReManager::new();
//! let e = parse_ascii(re, "^(a|b)*abb$").unwrap();
//! let f = parse_ascii(re, "^[ab]*b$").unwrap();
//!
//! assert!(re.is_match(e, b"babb"));
//! assert!(re.includes(f, e));
//! assert!(! re.includes(e, f));
//!
//! let dfa = re.compile(e);
//! assert!(dfa.accepts(b"aabb"));
//! assert_eq!(dfa.sample(), Some(b"abb".to_vec()));
//! ```
//!

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod alphabet;
pub mod automata;
pub mod character_sets;
pub mod errors;
pub mod matcher;
pub mod parser;
pub mod regular_expressions;

mod bfs_queues;
mod labeled_queues;
mod store;
