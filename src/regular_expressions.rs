// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Regular expressions
//!
//! This module defines the abstract syntax of regular expressions [BaseRegex]
//! and the regular expression type [RE]. Regular expressions are built using
//! an [ReManager], which provides hash consing.
//!
//! Input to the manager's methods are static references to [RE] objects
//! (see type [Regex]). The manager also returns objects of type [Regex]
//! when producing regular expressions. Every constructor returns a term in
//! canonical form, so two regular expressions built by the same manager are
//! structurally equal iff they are the same object.
//!
//! [ReManager] also implements the *derivative* operation. The derivative of a regular
//! expression R with respect to a symbol c is another regular expression S that
//! defines all the sequences that can follow c in the language of R. For example,
//! the derivative of regular expression '(abc + cd)\*' with respect to 'a'  is
//! 'bc(abc + cd)\*': all words of '(abc + cd)\*' that start with 'a' are of the
//! form 'a.w' where 'w' is a word 'bc(abc + cd)\*'.
//!
//! For a regular expression R, we use a [CharPartition] that divides the alphabet into
//! equivalent *derivative classes*. If two symbols `c1` and `c2` are in the same
//! derivative class, then the derivative of R with respect to `c1` and the derivative of R
//! with respect to `c2` are equal. The [ReManager] implements derivative of R with respect
//! to one of its derivative class. More generally, the derivative of R with respect to a
//! character range C is well defined if C is included in a derivative class of R.
//!
//! Derivatives allows one to convert REs to deterministic automata and support
//! other operations such as checking whether a sequence matches an RE.
//!

use std::{collections::HashMap, fmt::Display, hash::Hash, sync::Arc};

use tracing::{debug, trace};

use crate::{
    alphabet::{self, Alphabet},
    automata::{Automaton, AutomatonBuilder},
    bfs_queues::BfsQueue,
    character_sets::*,
    errors::Error,
    labeled_queues::LabeledQueue,
    matcher::{re_search, SearchResult},
    store::{HashConsed, Store},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
///
/// Abstract syntax for regular expressions
///
pub enum BaseRegex<T: Alphabet> {
    /// Empty language
    Empty,

    /// The language that contains only the empty sequence
    Epsilon,

    /// Sequences of length one with symbols in a non-empty range [a, b]
    Char(CharRange<T>),

    /// Concatenation of two languages
    Concat(Regex<T>, Regex<T>),

    /// Union of two or more languages
    Union(Box<[Regex<T>]>),

    /// Intersection of two or more languages
    Intersect(Box<[Regex<T>]>),

    /// Kleene closure
    Star(Regex<T>),

    /// Complement of a language
    Negation(Regex<T>),
}

/// Reference to a Regular Expression descriptor
pub type Regex<T> = &'static RE<T>;

///
/// Regular expression structure
///
/// A regular expression includes an expression of type [BaseRegex],
/// which is an abstract syntax tree.
///
/// In addition, each regular expression e has a
/// unique integer id and two attributes:
/// - e.nullable is true if the language of e contains the empty sequence
/// - e.deriv_class is the list of derivative classes of e.
///
/// The derivative classes are disjoint intervals that cover
/// a subset of the alphabet, and a complementary class that covers the rest.
/// See [CharPartition][crate::character_sets::CharPartition]. The `deriv_class` partition is
/// constructed to ensure that all the symbols in a class produce the same
/// derivative of e: if c1 and c2 are in the same derivative class of e then
/// deriv(e, c1) and deriv(e, c2) are equal.
///
/// Operations on regular expressions use hash-consing and are performed with
/// an [ReManager].
#[derive(Debug)]
pub struct RE<T: Alphabet> {
    /// Abstract syntax tree
    expr: BaseRegex<T>,
    /// Unique id for this RE
    id: usize,
    /// Whether the language contains the empty sequence
    pub nullable: bool,
    /// Partition of the alphabet relevant to this RE
    deriv_class: Arc<CharPartition<T>>,
}

/// Equality on RE is derived from the unique ids.
///
/// Two REs are equal iff they have the same id.
impl<T: Alphabet> PartialEq for RE<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: Alphabet> Eq for RE<T> {}

/// Ordering on REs is based on unique ids.
///
/// We have re1 < re2 iff re1.id < re2.id
impl<T: Alphabet> PartialOrd for RE<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Alphabet> Ord for RE<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// The hash code of a RE is just the hash code of its id.
impl<T: Alphabet> Hash for RE<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<T: Alphabet> BaseRegex<T> {
    /// Check whether the empty sequence is in this language
    fn is_nullable(&self) -> bool {
        match self {
            BaseRegex::Empty => false,
            BaseRegex::Epsilon => true,
            BaseRegex::Char(_) => false,
            BaseRegex::Concat(e1, e2) => e1.nullable && e2.nullable,
            BaseRegex::Union(args) => args.iter().any(|x| x.nullable),
            BaseRegex::Intersect(args) => args.iter().all(|x| x.nullable),
            BaseRegex::Star(_) => true,
            BaseRegex::Negation(e) => !e.nullable,
        }
    }

    /// Check whether this RE is atomic (either Empty, Epsilon, or a Char range)
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            BaseRegex::Empty | BaseRegex::Epsilon | BaseRegex::Char(_)
        )
    }

    /// Compute the derivation classes for this regular expression
    fn deriv_class(&self) -> Arc<CharPartition<T>> {
        fn merge_deriv_classes<T: Alphabet>(a: &[Regex<T>]) -> Arc<CharPartition<T>> {
            Arc::new(merge_partition_list(a.iter().map(|re| re.deriv_class.as_ref())))
        }

        match self {
            BaseRegex::Empty | BaseRegex::Epsilon => Arc::new(CharPartition::new()),
            BaseRegex::Char(c) => Arc::new(CharPartition::from_set(c)),
            BaseRegex::Concat(e1, e2) => {
                if e1.nullable {
                    Arc::new(merge_partitions(&e1.deriv_class, &e2.deriv_class))
                } else {
                    e1.deriv_class.clone()
                }
            }
            BaseRegex::Star(e) | BaseRegex::Negation(e) => e.deriv_class.clone(),
            BaseRegex::Union(args) | BaseRegex::Intersect(args) => merge_deriv_classes(args),
        }
    }

    /// Sub-terms whose derivative is needed to compute the derivative of this term
    fn deriv_dependencies(&self) -> Vec<Regex<T>> {
        match self {
            BaseRegex::Empty | BaseRegex::Epsilon | BaseRegex::Char(_) => Vec::new(),
            BaseRegex::Concat(e1, e2) => {
                if e1.nullable {
                    vec![*e1, *e2]
                } else {
                    vec![*e1]
                }
            }
            BaseRegex::Star(e) | BaseRegex::Negation(e) => vec![*e],
            BaseRegex::Union(args) | BaseRegex::Intersect(args) => args.to_vec(),
        }
    }
}

impl<T: Alphabet> HashConsed for RE<T> {
    type Key = BaseRegex<T>;

    fn make(index: usize, k: &Self::Key) -> Self {
        RE {
            expr: k.clone(),
            id: index,
            nullable: k.is_nullable(),
            deriv_class: k.deriv_class(),
        }
    }
}

impl<T: Alphabet> Display for BaseRegex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // write either e or '(e)' when e is a sub-expression
        fn write_sub<T: Alphabet>(f: &mut std::fmt::Formatter<'_>, e: Regex<T>) -> std::fmt::Result {
            if e.expr.is_atomic() {
                write!(f, "{}", e.expr)
            } else {
                write!(f, "({})", e.expr)
            }
        }

        // write a list of operands separated by an symbol
        fn write_list<T: Alphabet>(
            f: &mut std::fmt::Formatter<'_>,
            l: &[Regex<T>],
            symbol: char,
        ) -> std::fmt::Result {
            for (i, e) in l.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", symbol)?;
                }
                write_sub(f, *e)?;
            }
            Ok(())
        }

        match self {
            BaseRegex::Empty => write!(f, "\u{2205}"), // empty set
            BaseRegex::Epsilon => write!(f, "\u{03B5}"),
            BaseRegex::Char(r) => write!(f, "{}", r),
            BaseRegex::Concat(e1, e2) => {
                let mut v = vec![*e1];
                flatten_concat(*e2, &mut v);
                for e in v {
                    write_sub(f, e)?
                }
                Ok(())
            }
            BaseRegex::Star(e) => {
                write_sub(f, *e)?;
                write!(f, "*")
            }
            BaseRegex::Negation(e) => {
                write!(f, "\u{00AC}")?;
                write_sub(f, *e)
            }
            BaseRegex::Intersect(args) => write_list(f, args, '&'),
            BaseRegex::Union(args) => write_list(f, args, '+'),
        }
    }
}

impl<T: Alphabet> Display for RE<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.expr.fmt(f)
    }
}

impl<T: Alphabet> RE<T> {
    /// Unique id of this RE in its manager
    pub fn id(&self) -> usize {
        self.id
    }

    /// Abstract syntax tree
    pub fn expr(&self) -> &BaseRegex<T> {
        &self.expr
    }

    /// Check whether the empty sequence belongs to this RE
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Check whether the complementary derivative class is empty
    pub fn empty_complement(&self) -> bool {
        self.deriv_class.empty_complement()
    }

    /// Number of derivative classes (not including the complementary class)
    pub fn num_deriv_classes(&self) -> usize {
        self.deriv_class.len()
    }

    /// Derivative classes of this RE
    pub fn deriv_classes(&self) -> &CharPartition<T> {
        &self.deriv_class
    }

    /// Check whether cid is a valid class id
    pub fn valid_class_id(&self, cid: ClassId) -> bool {
        self.deriv_class.valid_class_id(cid)
    }

    /// Check whether this RE is equal to the empty RE
    pub fn is_empty(&self) -> bool {
        matches!(self.expr, BaseRegex::Empty)
    }

    /// Derivative class of symbol x
    pub fn class_of_char(&self, x: T) -> ClassId {
        self.deriv_class.class_of_char(x)
    }

    /// Iterator to go through valid class ids
    pub fn class_ids(&self) -> ClassIdIterator<'_, T> {
        self.deriv_class.class_ids()
    }

    /// Iterator to go through the intervals of the derivative classes
    pub fn char_ranges(&self) -> impl Iterator<Item = &CharRange<T>> {
        self.deriv_class.ranges()
    }
}

/// Iterator to go through all sub-terms of a Regex
#[derive(Debug)]
struct ReIterator<T: Alphabet> {
    queue: BfsQueue<Regex<T>>,
}

impl<T: Alphabet> Iterator for ReIterator<T> {
    type Item = Regex<T>;

    /// List all sub-terms in breadth-first order, without duplicates
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.queue.pop()?;
        match &x.expr {
            BaseRegex::Concat(left, right) => {
                self.queue.push(*left);
                self.queue.push(*right);
            }
            BaseRegex::Star(y) | BaseRegex::Negation(y) => {
                self.queue.push(*y);
            }
            BaseRegex::Union(list) | BaseRegex::Intersect(list) => {
                self.queue.push_all(list.iter().copied());
            }
            _ => (),
        }
        Some(x)
    }
}

///
/// Iterator for the sub-terms of r
/// - This enumerates the sub-terms of r, without duplicates,
///   in a breadth-first order. The term r is included.
///   It comes first in the iteration.
///
pub fn sub_terms<T: Alphabet>(r: Regex<T>) -> impl Iterator<Item = Regex<T>> {
    ReIterator {
        queue: BfsQueue::start(r),
    }
}

///
/// Iterator that enumerates the leaves of r
/// - A leaf is an atomic sub-term of r (i.e., a term t such that t.expr is either
///   [BaseRegex::Empty], or [BaseRegex::Epsilon] or [BaseRegex::Char])
/// - All leaves are listed once (no duplicates)
///
pub fn leaves<T: Alphabet>(r: Regex<T>) -> impl Iterator<Item = Regex<T>> {
    sub_terms(r).filter(|&x| x.expr.is_atomic())
}

///
/// Collect a list L = (R_1,...R_n) such that r = concat(R_1,...,R_n)
/// and no R_i is itself of the form concat(...) or epsilon, then
/// add the R_is to vector v.
//
// Concatenations are right-normalized so the left operand
// of a Concat is never a Concat.
//
fn flatten_concat<T: Alphabet>(r: Regex<T>, v: &mut Vec<Regex<T>>) {
    let mut current = r;
    loop {
        match &current.expr {
            BaseRegex::Epsilon => return,
            BaseRegex::Concat(x, y) => {
                debug_assert!(!matches!(x.expr, BaseRegex::Concat(..)));
                v.push(*x);
                current = *y;
            }
            _ => {
                v.push(current);
                return;
            }
        }
    }
}

//
// Operands of a canonical Union (or Intersect) are never Unions (or Intersects)
// so one level of flattening is enough.
//
fn flatten_union<T: Alphabet>(r: Regex<T>, v: &mut Vec<Regex<T>>) {
    match &r.expr {
        BaseRegex::Union(x) => v.extend(x.iter().copied()),
        _ => v.push(r),
    }
}

fn flatten_intersect<T: Alphabet>(r: Regex<T>, v: &mut Vec<Regex<T>>) {
    match &r.expr {
        BaseRegex::Intersect(x) => v.extend(x.iter().copied()),
        _ => v.push(r),
    }
}

/// check whether a sorted slice v contains x
/// this is used for x=empty or x=all or x=epsilon, which have small ids,
/// so if x occurs, that will be at the beginning of v.
fn contains<T: Alphabet>(v: &[Regex<T>], x: Regex<T>) -> bool {
    for &y in v {
        if y == x {
            return true;
        }
        if y > x {
            return false;
        }
    }
    false
}

/// reset a then store x as its unique element
fn set_to_singleton<T: Alphabet>(a: &mut Vec<Regex<T>>, x: Regex<T>) {
    a.clear();
    a.push(x);
}

///
/// Simplification for union and intersection
///
/// This implements the following simplification rules where op is either union
/// or intersection:
///  - op(X, bottom) = X
///  - op(top, X) = top
///  - op(X, negation(X)) = top
///  - op(X, X) = X
///
/// For op=intersection, we must have bottom = all and top = empty
///
/// For op=union, we must have bottom = empty and top = all
//
// X and negation(X) have ids 2k and 2k+1 so after sorting v,
// X and negation(X) occur next to each other in v.
//
fn simplify_set_operation<T: Alphabet>(v: &mut Vec<Regex<T>>, bottom: Regex<T>, top: Regex<T>) {
    if !v.is_empty() {
        v.sort();
        v.dedup();
        if contains(v, top) {
            set_to_singleton(v, top)
        } else {
            let mut j = 0;
            let mut previous = v[0];
            if previous != bottom {
                v[j] = previous;
                j += 1;
            }
            for i in 1..v.len() {
                let current = v[i];
                if current.id == previous.id ^ 1 {
                    set_to_singleton(v, top);
                    return;
                }
                if current != bottom {
                    v[j] = current;
                    previous = current;
                    j += 1;
                }
            }
            v.truncate(j)
        }
    }
}

///
/// Pairs Regex, ClassId used as keys in the derivative cache.
///
#[derive(Debug, PartialEq, Eq, Hash)]
struct DerivKey<T: Alphabet>(Regex<T>, ClassId);

/// A store for constructing regular expressions using hash-consing.
///
/// The store ensures that each regular expression has a unique integer id.
///
/// For all regular expressions e1 and e2 constructed with the same manager,
/// we have e1.expr == e2.expr iff e1.id == e2.id. Regular expressions from
/// different managers must not be mixed.
///
/// # Examples
///
/// This example shows how to create the regular expression `(ac + bc)*` and
/// compute its derivatives.
///
/// ```
/// use bounded_regex::regular_expressions::*;
///
/// let re = &mut ReManager::<u8>::new();
/// let ac = re.sequence(b"ac");    // ac
/// let bc = re.sequence(b"bc");    // bc
/// let sum = re.union(ac, bc);     // ac + bc
/// let e = re.star(sum);           // (ac + bc)*
///
/// let d1 = re.char_derivative(e, b'a'); // derivative of e w.r.t. 'a'
/// let d2 = re.char_derivative(e, b'b'); // derivative of e w.r.t. 'b'
///
/// // by hash-consing: d1 and d2 are equal
/// assert_eq!(d1, d2);
/// assert!(std::ptr::eq(d1, d2));
/// ```
//
// We maintain the invariant that x and negation(x) have ids 2k and 2k+1.
#[derive(Debug)]
pub struct ReManager<T: Alphabet> {
    store: Store<RE<T>>,
    id2re: Vec<Regex<T>>, // map id to RE
    sigma: Regex<T>,      // all one-symbol sequences
    empty: Regex<T>,
    sigma_star: Regex<T>, // negation of empty (all sequences)
    epsilon: Regex<T>,
    sigma_plus: Regex<T>, // negation of epsilon (all sequences of positive length)
    deriv_cache: HashMap<DerivKey<T>, Regex<T>>, // cache of known derivatives
}

impl<T: Alphabet> ReManager<T> {
    /// Create a new ReManager
    ///
    /// # Panics
    ///
    /// If the alphabet `T` is malformed. See [try_new](Self::try_new).
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(manager) => manager,
            Err(e) => panic!("cannot create a regular expression manager: {e}"),
        }
    }

    /// Create a new ReManager
    ///
    /// # Errors
    ///
    /// Return Err([Error::InvalidAlphabet]) if `T::MIN > T::MAX` or
    /// the bounds of `T` are inconsistent with its successor function.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::{alphabet::BoundedInt, errors::Error, regular_expressions::*};
    ///
    /// assert!(ReManager::<BoundedInt<-256, 255>>::try_new().is_ok());
    /// assert_eq!(ReManager::<BoundedInt<3, 2>>::try_new().err(), Some(Error::InvalidAlphabet));
    /// ```
    pub fn try_new() -> Result<Self, Error> {
        alphabet::validate::<T>()?;
        let mut store = Store::new();
        let sigma = store.make(BaseRegex::Char(CharRange::full()));
        let not_sigma = store.make(BaseRegex::Negation(sigma));
        let empty = store.make(BaseRegex::Empty);
        let sigma_star = store.make(BaseRegex::Star(sigma));
        let epsilon = store.make(BaseRegex::Epsilon);
        let sigma_plus = store.make(BaseRegex::Concat(sigma, sigma_star));
        debug_assert_eq!(sigma.id, 0);
        debug_assert_eq!(not_sigma.id, 1);
        debug_assert_eq!(empty.id, 2);
        debug_assert_eq!(sigma_star.id, 3);
        debug_assert_eq!(epsilon.id, 4);
        debug_assert_eq!(sigma_plus.id, 5);
        Ok(ReManager {
            store,
            id2re: vec![sigma, not_sigma, empty, sigma_star, epsilon, sigma_plus],
            sigma,
            empty,
            sigma_star,
            epsilon,
            sigma_plus,
            deriv_cache: HashMap::new(),
        })
    }

    fn id_to_re(&self, id: usize) -> Regex<T> {
        self.id2re[id]
    }

    /// Internal hash-consing constructor
    ///
    /// - When we create X, we also create negation(X) to make
    ///   sure X and negation(X) have consecutive ids.
    fn make(&mut self, ast: BaseRegex<T>) -> Regex<T> {
        match ast {
            BaseRegex::Negation(x) => self.id_to_re(x.id ^ 1),
            _ => {
                let i = self.store.len();
                debug_assert!(i == self.id2re.len());
                let x = self.store.make(ast);
                if x.id == i {
                    // new term
                    let y = self.store.make(BaseRegex::Negation(x));
                    debug_assert!(y.id == i + 1);
                    self.id2re.push(x);
                    self.id2re.push(y);
                }
                x
            }
        }
    }

    /// Number of regular expressions created so far
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Always false: a manager contains at least the predefined terms
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// The empty language
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let e = re.empty();
    ///
    /// // no sequence belongs to e.
    /// assert!(! re.is_match(e, &[0, 1, 2, 9]));
    /// assert!(! re.is_match(e, &[]));
    /// ```
    pub fn empty(&self) -> Regex<T> {
        self.empty
    }

    /// The full language
    ///
    /// This language contains every sequence. It's the negation of [empty](Self::empty)
    /// and it's equal to `Star(Dot)`.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let e = re.all();
    ///
    /// assert!(re.is_match(e, &[0, 1, 2, 9]));
    /// assert_eq!(e, re.negation(re.empty()));
    /// ```
    pub fn all(&self) -> Regex<T> {
        self.sigma_star
    }

    /// The RE that contains only the empty sequence
    pub fn epsilon(&self) -> Regex<T> {
        self.epsilon
    }

    /// All sequences of length one (full-range Char)
    pub fn dot(&self) -> Regex<T> {
        self.sigma
    }

    /// The RE that contains all non-empty sequences
    ///
    /// This is the negation of [epsilon](Self::epsilon).
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let e = re.dot_plus();
    ///
    /// assert!(! re.is_match(e, &[]));
    /// assert!(re.is_match(e, &[97]));
    /// assert_eq!(e, re.negation(re.epsilon()));
    /// ```
    pub fn dot_plus(&self) -> Regex<T> {
        self.sigma_plus
    }

    /// Regular expression defined by a character range
    ///
    /// Return the regular expression that contains all one-symbol
    /// sequences with a symbol in the range. Return [empty](Self::empty)
    /// if the range is empty.
    pub fn char_set(&mut self, set: CharRange<T>) -> Regex<T> {
        if set.is_empty() {
            self.empty
        } else {
            self.make(BaseRegex::Char(set))
        }
    }

    /// One-symbol sequence
    pub fn char(&mut self, x: T) -> Regex<T> {
        self.char_set(CharRange::singleton(x))
    }

    /// Symbols in the range [low, high]
    ///
    /// Return [empty](Self::empty) if `low > high`.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let digits = re.range(b'0', b'9');
    ///
    /// assert!(re.is_match(digits, b"7"));
    /// assert!(! re.is_match(digits, b"a"));
    /// assert_eq!(re.range(5, 4), re.empty());
    /// ```
    pub fn range(&mut self, low: T, high: T) -> Regex<T> {
        self.char_set(CharRange::new(low, high))
    }

    /// Union of a list of character ranges
    ///
    /// Ranges are normalized first: overlapping and adjacent ranges are merged.
    pub fn char_class(&mut self, ranges: &[CharRange<T>]) -> Regex<T> {
        let v: Vec<Regex<T>> = normalize_ranges(ranges)
            .into_iter()
            .map(|r| self.char_set(r))
            .collect();
        self.union_list(v)
    }

    /// One-symbol sequences whose symbol is outside all the ranges
    ///
    /// This is the complement at the level of symbols (as in `[^...]`):
    /// the result is [empty](Self::empty) if the ranges cover the alphabet.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::{character_sets::CharRange, regular_expressions::*};
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let not_digit = re.char_class_complement(&[CharRange::new(b'0', b'9')]);
    ///
    /// assert!(re.is_match(not_digit, b"a"));
    /// assert!(! re.is_match(not_digit, b"5"));
    /// assert!(! re.is_match(not_digit, b"ab"));
    /// assert_eq!(re.char_class_complement(&[CharRange::full()]), re.empty());
    /// ```
    pub fn char_class_complement(&mut self, ranges: &[CharRange<T>]) -> Regex<T> {
        let v: Vec<Regex<T>> = complement_ranges(ranges)
            .into_iter()
            .map(|r| self.char_set(r))
            .collect();
        self.union_list(v)
    }

    /// Sequence of symbols
    pub fn sequence(&mut self, s: &[T]) -> Regex<T> {
        let v: Vec<Regex<T>> = s.iter().map(|&x| self.char(x)).collect();
        self.concat_list(v)
    }

    ///
    /// Complement of a language
    ///
    /// Return the negation of RE `e`. This is a constant-time operation:
    /// negation(negation(e)) is e.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let a_single_digit = re.range(b'0', b'9');
    /// let not_a_digit = re.negation(a_single_digit);
    ///
    /// assert!(re.is_match(a_single_digit, b"7"));
    /// assert!(! re.is_match(not_a_digit, b"7"));
    ///
    /// // any sequence of 2 symbols is not a single digit
    /// assert!(re.is_match(not_a_digit, b"94"));
    /// assert_eq!(re.negation(not_a_digit), a_single_digit);
    /// ```
    pub fn negation(&self, e: Regex<T>) -> Regex<T> {
        self.id_to_re(e.id ^ 1)
    }

    // concatenation of x and y where x is not a concatenation
    fn concat_pair(&mut self, x: Regex<T>, y: Regex<T>) -> Regex<T> {
        match (&x.expr, &y.expr) {
            // empty . R --> empty
            (BaseRegex::Empty, _) | (_, BaseRegex::Empty) => self.empty,
            // epsilon . R --> R
            (BaseRegex::Epsilon, _) => y,
            (_, BaseRegex::Epsilon) => x,
            // S . Sigma^* . R --> Sigma^* . R if S is nullable
            _ if x.nullable && self.starts_with_all(y) => y,
            _ => self.make(BaseRegex::Concat(x, y)),
        }
    }

    fn starts_with_all(&self, e: Regex<T>) -> bool {
        match &e.expr {
            BaseRegex::Concat(x, _) => *x == self.sigma_star,
            _ => e == self.sigma_star,
        }
    }

    /// Concatenation of two languages
    ///
    /// Concatenate languages `e1` and `e2` in that order.
    /// The result is right-normalized: concat(concat(a, b), c) is the same
    /// term as concat(a, concat(b, c)).
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    /// let a_letter = re.range(b'a', b'z');
    /// let a_digit = re.range(b'0', b'9');
    /// let e = re.concat(a_letter, a_digit);
    ///
    /// assert!(re.is_match(e, b"h4"));
    /// ```
    pub fn concat(&mut self, e1: Regex<T>, e2: Regex<T>) -> Regex<T> {
        self.concat_list([e1, e2])
    }

    /// Concatenation of multiple languages
    ///
    /// Build the concatenation of `a[0]`, `a[1]`, ... in this order.
    /// - return [epsilon](Self::epsilon) is `a` is empty.
    /// - return `a[0]` is `a.len() == 1`
    ///
    /// See [concat](Self::concat)
    pub fn concat_list(&mut self, a: impl IntoIterator<Item = Regex<T>>) -> Regex<T> {
        let mut v = Vec::new();
        for x in a {
            flatten_concat(x, &mut v);
        }
        let mut result = self.epsilon;
        for &x in v.iter().rev() {
            result = self.concat_pair(x, result);
        }
        result
    }

    // Intersection of REs in v
    fn make_intersect(&mut self, mut v: Vec<Regex<T>>) -> Regex<T> {
        simplify_set_operation(&mut v, self.sigma_star, self.empty);
        if contains(&v, self.epsilon) {
            // v contains epsilon: the intersection is either epsilon or empty
            if v.iter().all(|&r| r.nullable) {
                self.epsilon
            } else {
                self.empty
            }
        } else {
            match v.len() {
                0 => self.sigma_star,
                1 => v[0],
                _ => self.make(BaseRegex::Intersect(v.into())),
            }
        }
    }

    // Union of REs in v
    fn make_union(&mut self, mut v: Vec<Regex<T>>) -> Regex<T> {
        simplify_set_operation(&mut v, self.empty, self.sigma_star);
        match v.len() {
            0 => self.empty,
            1 => v[0],
            _ => self.make(BaseRegex::Union(v.into())),
        }
    }

    /// Intersection of two languages
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let a = re.char(0);
    /// let b = re.char(1);
    /// let c = re.char(2);
    /// let ab = re.union(a, b);
    /// let bc = re.union(b, c);
    /// let ab_star = re.star(ab);
    /// let bc_star = re.star(bc);
    ///
    /// let e = re.intersect(ab_star, bc_star);
    ///
    /// assert!(re.is_match(e, &[1, 1, 1]));
    /// assert!(! re.is_match(e, &[1, 2]));
    /// ```
    pub fn intersect(&mut self, e1: Regex<T>, e2: Regex<T>) -> Regex<T> {
        let mut v = Vec::new();
        flatten_intersect(e1, &mut v);
        flatten_intersect(e2, &mut v);
        self.make_intersect(v)
    }

    /// Intersection of multiple languages
    ///
    /// This returns the intersection of `a[0]`, `a[1]`, etc.
    /// - return the full language (see [all](Self::all)) if `a` is empty
    /// - return `a[0]` if `a.len() == 1`
    pub fn intersect_list(&mut self, a: impl IntoIterator<Item = Regex<T>>) -> Regex<T> {
        let mut v = Vec::new();
        for r in a {
            flatten_intersect(r, &mut v);
        }
        self.make_intersect(v)
    }

    /// Union of two languages
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let abc = re.sequence(b"abc");
    /// let de = re.sequence(b"de");
    /// let u = re.union(abc, de);
    ///
    /// assert!(re.is_match(u, b"de"));
    /// assert!(re.is_match(u, b"abc"));
    /// assert_eq!(u, re.union(de, abc));
    /// ```
    pub fn union(&mut self, e1: Regex<T>, e2: Regex<T>) -> Regex<T> {
        let mut v = Vec::new();
        flatten_union(e1, &mut v);
        flatten_union(e2, &mut v);
        self.make_union(v)
    }

    /// Union of several languages
    ///
    /// Return the union of `a[0]`, `a[1]`, ...
    /// - return [empty](Self::empty) if `a` is empty
    pub fn union_list(&mut self, a: impl IntoIterator<Item = Regex<T>>) -> Regex<T> {
        let mut v = Vec::new();
        for r in a {
            flatten_union(r, &mut v);
        }
        self.make_union(v)
    }

    /// Difference of two languages
    ///
    /// Return the intersection of `e1` and the negation of `e2`.
    pub fn diff(&mut self, e1: Regex<T>, e2: Regex<T>) -> Regex<T> {
        let c = self.negation(e2);
        self.intersect(e1, c)
    }

    /// Kleene closure
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let letters = re.range(b'a', b'z');
    /// let letter_sequences = re.star(letters);
    ///
    /// assert!(re.is_match(letter_sequences, b"abcd"));
    /// assert!(re.is_match(letter_sequences, b""));
    /// assert!(! re.is_match(letter_sequences, b"abc-def"));
    /// assert_eq!(re.star(letter_sequences), letter_sequences);
    /// ```
    pub fn star(&mut self, e: Regex<T>) -> Regex<T> {
        match &e.expr {
            BaseRegex::Empty | BaseRegex::Epsilon => self.epsilon,
            BaseRegex::Star(_) => e,
            // (epsilon + R)* --> R*
            BaseRegex::Union(args) if contains(args, self.epsilon) => {
                let eps = self.epsilon;
                let rest: Vec<Regex<T>> = args.iter().copied().filter(|&x| x != eps).collect();
                let u = self.union_list(rest);
                self.star(u)
            }
            _ => self.make(BaseRegex::Star(e)),
        }
    }

    /// One or more repetitions: `e . e*`
    pub fn plus(&mut self, e: Regex<T>) -> Regex<T> {
        let s = self.star(e);
        self.concat(e, s)
    }

    /// Option: union of [epsilon](Self::epsilon) and `e`
    pub fn opt(&mut self, e: Regex<T>) -> Regex<T> {
        let eps = self.epsilon;
        self.union(eps, e)
    }

    /// Concatenation of `k` copies of `e`
    pub fn exp(&mut self, e: Regex<T>, k: u32) -> Regex<T> {
        self.concat_list((0..k).map(|_| e))
    }

    /// Bounded or unbounded repetition
    ///
    /// - `repeat(e, n, None)` is `e{n,}`: n or more copies of `e`
    /// - `repeat(e, n, Some(m))` is `e{n,m}`: between n and m copies of `e`
    ///   (the empty language if `m < n`)
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let digit = re.range(b'0', b'9');
    /// let e = re.repeat(digit, 3, Some(5));
    ///
    /// assert!(re.is_match(e, b"12345"));
    /// assert!(! re.is_match(e, b"12"));
    /// assert!(! re.is_match(e, b"123456"));
    /// ```
    pub fn repeat(&mut self, e: Regex<T>, min: u32, max: Option<u32>) -> Regex<T> {
        let prefix = self.exp(e, min);
        match max {
            None => {
                let s = self.star(e);
                self.concat(prefix, s)
            }
            Some(m) if m < min => self.empty,
            Some(m) => {
                // (e (e (e)?)?)? for the optional copies
                let mut tail = self.epsilon;
                for _ in min..m {
                    let x = self.concat(e, tail);
                    tail = self.opt(x);
                }
                self.concat(prefix, tail)
            }
        }
    }

    //
    // DERIVATIVES
    //

    fn cached_deriv(&self, e: Regex<T>, c: T) -> Option<Regex<T>> {
        self.deriv_cache
            .get(&DerivKey(e, e.class_of_char(c)))
            .copied()
    }

    /// Derivative of e with respect to c given the derivatives of its dependencies
    fn compute_derivative(&mut self, e: Regex<T>, c: T, d: &[Regex<T>]) -> Regex<T> {
        match &e.expr {
            BaseRegex::Empty | BaseRegex::Epsilon => self.empty,
            BaseRegex::Char(r) => {
                if r.contains(c) {
                    self.epsilon
                } else {
                    self.empty
                }
            }
            BaseRegex::Concat(_, e2) => {
                let d1 = self.concat(d[0], *e2);
                if d.len() == 2 {
                    self.union(d1, d[1])
                } else {
                    d1
                }
            }
            BaseRegex::Star(_) => self.concat(d[0], e),
            BaseRegex::Negation(_) => self.negation(d[0]),
            BaseRegex::Union(_) => self.union_list(d.iter().copied()),
            BaseRegex::Intersect(_) => self.intersect_list(d.iter().copied()),
        }
    }

    //
    // Derivative with respect to a symbol c using the cache.
    //
    // Sub-terms are processed in post-order with an explicit stack:
    // a term is derived once the derivatives of its dependencies are cached.
    //
    fn deriv(&mut self, e: Regex<T>, c: T) -> Regex<T> {
        if let Some(d) = self.cached_deriv(e, c) {
            return d;
        }
        let mut result = self.empty;
        let mut stack = vec![e];
        while let Some(&r) = stack.last() {
            if self.cached_deriv(r, c).is_some() {
                stack.pop();
                continue;
            }
            let deps = r.expr.deriv_dependencies();
            let mut derivs = Vec::with_capacity(deps.len());
            let mut missing = Vec::new();
            for x in deps {
                match self.cached_deriv(x, c) {
                    Some(d) => derivs.push(d),
                    None => missing.push(x),
                }
            }
            if missing.is_empty() {
                stack.pop();
                let d = self.compute_derivative(r, c, &derivs);
                self.deriv_cache.insert(DerivKey(r, r.class_of_char(c)), d);
                if r == e {
                    result = d;
                }
            } else {
                stack.extend(missing);
            }
        }
        result
    }

    ///
    /// Derivative with respect to a class id
    ///
    /// Compute the derivative of e with respect to a class defined by `cid`
    /// - if `cid` is `Interval(i)`: class = i-th derivative class of `e`
    /// - if `cid` is `Complement`: class = complementary derivative class of `e`
    ///
    /// # Errors
    ///
    /// Return Err([Error::BadClassId]) if the class id is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::{regular_expressions::*, character_sets::*};
    /// # use std::error::Error;
    /// #
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let abc = re.sequence(b"abc");
    /// let efg = re.sequence(b"efg");
    /// let r = re.union(abc, efg); // 'abc' + 'efg': two derivative classes
    ///
    /// assert_eq!(r.num_deriv_classes(), 2);
    ///
    /// let test1 = re.class_derivative(r, ClassId::Interval(0))?;
    /// let test2 = re.class_derivative(r, ClassId::Interval(1))?;
    /// let test3 = re.class_derivative(r, ClassId::Complement)?;
    ///
    /// assert_eq!(test1, re.sequence(b"bc"));
    /// assert_eq!(test2, re.sequence(b"fg"));
    /// assert_eq!(test3, re.empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn class_derivative(&mut self, e: Regex<T>, cid: ClassId) -> Result<Regex<T>, Error> {
        let c = e.deriv_class.pick_in_class(cid)?;
        Ok(self.deriv(e, c))
    }

    ///
    /// Derivative with respect to a character range
    ///
    /// Return the derivative of e with respect to set provided this is well defined.
    ///
    /// # Errors
    ///
    /// The derivative with respect to a non-empty range is well defined either if the
    /// range is included in a derivative class of e or if it is included in the
    /// complementary class. If these conditions do not hold, or if the range is empty,
    /// return Err([Error::UndefinedDerivative]).
    ///
    /// # Example
    /// ```
    /// use bounded_regex::{regular_expressions::*, character_sets::*};
    /// # use std::error::Error;
    /// #
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let mut re = ReManager::<u8>::new();
    ///
    /// let a_to_z = re.range(b'a', b'z');
    /// let e = re.plus(a_to_z);
    ///
    /// let test = re.set_derivative(e, &CharRange::new(b'c', b't'))?;
    /// assert_eq!(test, re.star(a_to_z));
    ///
    /// assert!(re.set_derivative(e, &CharRange::new(0, b'c')).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_derivative(&mut self, e: Regex<T>, set: &CharRange<T>) -> Result<Regex<T>, Error> {
        if set.is_empty() {
            return Err(Error::UndefinedDerivative);
        }
        e.deriv_class
            .class_of_set(set)
            .map_err(|_| Error::UndefinedDerivative)?;
        Ok(self.deriv(e, set.low()))
    }

    ///
    /// Derivative with respect to a symbol
    ///
    /// The derivative of e with respect to c is a regular expression e1 such
    /// every sequence of e that starts with c is formed by concatenating c and
    /// a sequence of e1.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    /// let abc = re.sequence(b"abc");
    /// let acc = re.sequence(b"acc");
    /// let e = re.union(abc, acc);
    ///
    /// // the derivative of 'abc + acc' w.r.t. 'a' is 'bc + cc'
    /// let d = re.char_derivative(e, b'a');
    /// let bc = re.sequence(b"bc");
    /// let cc = re.sequence(b"cc");
    /// assert_eq!(d, re.union(bc, cc));
    /// ```
    pub fn char_derivative(&mut self, e: Regex<T>, c: T) -> Regex<T> {
        self.deriv(e, c)
    }

    ///
    /// Derivative with respect to a sequence
    ///
    /// - if s is empty, deriv(e, s) = e
    /// - if s is of the form a.w, then deriv(e, s) = deriv(deriv(e, a), w)
    ///
    pub fn seq_derivative(&mut self, e: Regex<T>, s: &[T]) -> Regex<T> {
        s.iter().fold(e, |r, &c| self.deriv(r, c))
    }

    /// Construct an iterator to list the derivatives of a regular expression
    ///
    /// The iterator produces `e`, then the derivatives of `e`, then the derivatives
    /// of these derivatives, and so forth. There are finitely many such derivatives.
    /// The iterator produces them without duplicates.
    pub fn iter_derivatives(&mut self, e: Regex<T>) -> DerivativeIterator<'_, T> {
        DerivativeIterator {
            manager: self,
            queue: BfsQueue::start(e),
        }
    }

    ///
    /// Check whether a sequence belongs to the language of a regular expression
    ///
    /// This folds the derivative over the sequence, then checks whether
    /// the result is nullable.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    ///
    /// // (1 2 3*)
    /// let one = re.char(1);
    /// let two = re.char(2);
    /// let three = re.char(3);
    /// let s = re.star(three);
    /// let e = re.concat_list([one, two, s]);
    ///
    /// assert!(re.is_match(e, &[1, 2, 3, 3]));
    /// assert!(! re.is_match(e, &[1, 2, 3, 1]));
    /// ```
    ///
    pub fn is_match(&mut self, e: Regex<T>, s: &[T]) -> bool {
        self.seq_derivative(e, s).nullable
    }

    ///
    /// Check whether a regular expression is empty
    ///
    /// # Example
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    ///
    /// let all = re.all();
    /// let abcd = re.sequence(b"abcd");
    /// let bc = re.sequence(b"bc");
    ///
    /// let a = re.concat(abcd, all); // sequences that start with 'abcd'
    /// let b = re.concat_list([all, bc, all]); // sequences that contain 'bc'
    ///
    /// let test = re.diff(a, b); // start with 'abcd' but don't contain 'bc'
    /// assert!(re.is_empty_re(test));
    /// ```
    pub fn is_empty_re(&mut self, e: Regex<T>) -> bool {
        self.iter_derivatives(e).all(|x| !x.nullable)
    }

    ///
    /// Check whether two regular expressions define the same language
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    /// let a = re.char(b'a');
    /// let a_star = re.star(a);
    /// let aa = re.concat(a, a);
    /// let aa_star = re.star(aa);
    /// let opt_a = re.opt(a);
    /// let e1 = re.concat(aa_star, opt_a);
    ///
    /// assert!(re.equivalent(e1, a_star));
    /// assert!(! re.equivalent(aa_star, a_star));
    /// ```
    pub fn equivalent(&mut self, e1: Regex<T>, e2: Regex<T>) -> bool {
        if e1 == e2 {
            return true;
        }
        let d1 = self.diff(e1, e2);
        let d2 = self.diff(e2, e1);
        let u = self.union(d1, d2);
        self.is_empty_re(u)
    }

    /// Check whether the language of `e2` is included in the language of `e1`
    pub fn includes(&mut self, e1: Regex<T>, e2: Regex<T>) -> bool {
        let d = self.diff(e2, e1);
        self.is_empty_re(d)
    }

    ///
    /// Get a shortest sequence that belongs to a regular expression
    ///
    /// Return None if the regular expression `e` is empty.
    ///
    /// # Example
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    ///
    /// let abc = re.sequence(b"abc");
    /// let bc = re.sequence(b"bc");
    /// let u = re.union(abc, bc);
    ///
    /// assert_eq!(re.sample(u), Some(b"bc".to_vec()));
    /// assert_eq!(re.sample(re.empty()), None);
    /// ```
    pub fn sample(&mut self, e: Regex<T>) -> Option<Vec<T>> {
        let mut queue: LabeledQueue<Regex<T>, T> = LabeledQueue::new(e);
        while let Some(r) = queue.pop() {
            if r.nullable {
                return queue.path(&r);
            }
            for c in r.deriv_class.picks() {
                let d = self.deriv(r, c);
                if !d.is_empty() {
                    queue.push(r, c, d);
                }
            }
        }
        None
    }

    //
    // Explore the residuals of e in breadth-first order and record them in builder.
    // Return false if there are more than max_states residuals.
    //
    fn explore_residuals(
        &mut self,
        e: Regex<T>,
        max_states: usize,
        builder: &mut AutomatonBuilder<Regex<T>, T>,
    ) -> bool {
        let mut queue = BfsQueue::start(e);
        let mut state_count = 0;
        while let Some(r) = queue.pop() {
            if state_count == max_states {
                debug!(max_states, "automaton construction exceeded the state budget");
                return false;
            }
            state_count += 1;
            for set in r.deriv_class.ranges() {
                let d = self.deriv(r, set.low());
                queue.push(d);
                builder.add_transition(&r, set, &d);
            }
            if let Some(c) = r.deriv_class.pick_complement() {
                let d = self.deriv(r, c);
                queue.push(d);
                builder.set_default_successor(&r, &d);
            }
            if r.nullable {
                builder.mark_final(&r);
            }
            trace!(residual = %r, nullable = r.nullable, "automaton state");
        }
        true
    }

    ///
    /// Compile a regular expression to a deterministic finite state automaton
    ///
    /// Each state of the automaton is a derivative (residual) of `e`.
    /// A state is final iff its residual is nullable.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    ///
    /// // (ac + bc)*
    /// let ac = re.sequence(b"ac");
    /// let bc = re.sequence(b"bc");
    /// let sum = re.union(ac, bc);
    /// let e = re.star(sum);
    ///
    /// let auto = re.compile(e);
    /// assert!(auto.accepts(b"acbcbc"));
    /// assert!(! auto.accepts(b"acb"));
    /// ```
    pub fn compile(&mut self, e: Regex<T>) -> Automaton<T> {
        let mut builder = AutomatonBuilder::new(&e);
        self.explore_residuals(e, usize::MAX, &mut builder);
        let automaton = builder.build_unchecked();
        debug!(
            states = automaton.num_states(),
            final_states = automaton.num_final_states(),
            "compiled regular expression"
        );
        automaton
    }

    ///
    /// Compile a regular expression to a DFA of bounded size
    ///
    /// Return None if the DFA has more than `max_states` states.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::*;
    ///
    /// let re = &mut ReManager::<u8>::new();
    ///
    /// // (ac + bc)+
    /// let ac = re.sequence(b"ac");
    /// let bc = re.sequence(b"bc");
    /// let sum = re.union(ac, bc);
    /// let e = re.plus(sum);
    ///
    /// // the DFA has four states
    /// assert!(re.try_compile(e, 3).is_none());
    /// assert!(re.try_compile(e, 4).is_some());
    /// ```
    pub fn try_compile(&mut self, e: Regex<T>, max_states: usize) -> Option<Automaton<T>> {
        let mut builder = AutomatonBuilder::new(&e);
        if self.explore_residuals(e, max_states, &mut builder) {
            Some(builder.build_unchecked())
        } else {
            None
        }
    }

    /// Compile with options
    ///
    /// Same as [compile](Self::compile) if `options.max_states` is None,
    /// and as [try_compile](Self::try_compile) otherwise.
    pub fn compile_with_options(
        &mut self,
        e: Regex<T>,
        options: &CompileOptions,
    ) -> Option<Automaton<T>> {
        match options.max_states {
            None => Some(self.compile(e)),
            Some(n) => self.try_compile(e, n),
        }
    }

    ///
    /// Search for the first sub-sequence of `s` that matches `e`, starting at index k
    ///
    /// - return `Found(i, j)` if `s[i..j]` matches `e`, where i >= k is the smallest
    ///   such index and j is the smallest end for this i.
    /// - the empty match `Found(k, k)` is returned only if `allow_empty` is true
    ///   and `e` is nullable.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::{regular_expressions::*, matcher::SearchResult};
    ///
    /// let re = &mut ReManager::<u8>::new();
    /// let digit = re.range(b'0', b'9');
    /// let number = re.plus(digit);
    ///
    /// assert_eq!(re.find(number, b"abc123de", 0, false), SearchResult::Found(3, 4));
    /// assert_eq!(re.find(number, b"abcde", 0, false), SearchResult::NotFound);
    /// ```
    pub fn find(&mut self, e: Regex<T>, s: &[T], k: usize, allow_empty: bool) -> SearchResult {
        re_search(self, e, s, k, allow_empty)
    }
}

impl<T: Alphabet> Default for ReManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// Options for automaton construction
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximal number of states (no bound if None)
    pub max_states: Option<usize>,
}

impl CompileOptions {
    /// Set the state budget
    pub fn max_states(mut self, n: usize) -> Self {
        self.max_states = Some(n);
        self
    }
}

/// Iterator to enumerate all the derivatives of a regular expression
///
/// See [iter_derivatives](crate::regular_expressions::ReManager::iter_derivatives).
#[derive(Debug)]
pub struct DerivativeIterator<'a, T: Alphabet> {
    queue: BfsQueue<Regex<T>>,
    manager: &'a mut ReManager<T>,
}

impl<'a, T: Alphabet> Iterator for DerivativeIterator<'a, T> {
    type Item = Regex<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let r = self.queue.pop()?;
        for c in r.deriv_class.picks() {
            let d = self.manager.deriv(r, c);
            self.queue.push(d);
        }
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::alphabet::BoundedInt;

    fn print_term<T: Alphabet>(name: &str, r: Regex<T>) {
        println!("term {} = {}", name, r);
        println!("   id:        {}", r.id);
        println!("   nullable:  {}", r.nullable);
        println!("   deriv:     {}", r.deriv_class);
        println!();
    }

    fn build_atoms(re: &mut ReManager<u8>) -> Vec<Regex<u8>> {
        vec![
            re.empty(),
            re.epsilon(),
            re.dot(),
            re.char(b'a'),
            re.char(b'b'),
            re.range(b'0', b'9'),
            re.range(b'A', b'Z'),
        ]
    }

    fn check_equal<T: Alphabet>(re1: Regex<T>, re2: Regex<T>) {
        assert_eq!(re1, re2);
        assert_eq!(re1.id, re2.id);
        assert!(std::ptr::eq(re1, re2));
    }

    // random regular expression over symbols 0..4
    fn random_regex(re: &mut ReManager<u8>, rng: &mut StdRng, depth: u32) -> Regex<u8> {
        if depth == 0 || rng.gen_ratio(1, 4) {
            match rng.gen_range(0..6) {
                0 => re.empty(),
                1 => re.epsilon(),
                2 => re.dot(),
                3 => {
                    let a = rng.gen_range(0..4);
                    let b = rng.gen_range(0..4);
                    re.range(a, b)
                }
                _ => re.char(rng.gen_range(0..4)),
            }
        } else {
            let x = random_regex(re, rng, depth - 1);
            match rng.gen_range(0..7) {
                0 => re.star(x),
                1 => re.negation(x),
                2 => re.opt(x),
                3 => {
                    let y = random_regex(re, rng, depth - 1);
                    re.intersect(x, y)
                }
                4 => {
                    let y = random_regex(re, rng, depth - 1);
                    re.union(x, y)
                }
                _ => {
                    let y = random_regex(re, rng, depth - 1);
                    re.concat(x, y)
                }
            }
        }
    }

    fn random_sequence(rng: &mut StdRng) -> Vec<u8> {
        let n = rng.gen_range(0..6);
        (0..n).map(|_| rng.gen_range(0..5)).collect()
    }

    #[test]
    fn hash_atoms() {
        let re = &mut ReManager::new();

        let v1 = build_atoms(re);
        let v2 = build_atoms(re);

        for (i, &t) in v1.iter().enumerate() {
            print_term(&format!("t{}", i), t);
            check_equal(t, v2[i]);
        }
        assert_eq!(re.range(5, 4), re.empty());
        assert_eq!(re.range(0, 255), re.dot());
        assert_eq!(re.star(re.dot()), re.all());
    }

    #[test]
    fn test_predefined() {
        let re = &mut ReManager::<u8>::new();
        let all = re.all();
        let empty = re.empty();
        let eps = re.epsilon();
        check_equal(re.negation(empty), all);
        check_equal(re.negation(all), empty);
        check_equal(re.negation(eps), re.dot_plus());
        let dot = re.dot();
        let s = re.star(dot);
        let p = re.concat(dot, s);
        check_equal(p, re.dot_plus());
        assert!(!re.dot_plus().nullable);
        assert!(all.nullable);
    }

    #[test]
    fn test_star_rules() {
        let re = &mut ReManager::<u8>::new();
        let eps = re.epsilon();
        let empty = re.empty();
        check_equal(re.star(eps), eps);
        check_equal(re.star(empty), eps);
        for x in build_atoms(re) {
            let s = re.star(x);
            check_equal(re.star(s), s);
            let o = re.opt(x);
            check_equal(re.star(o), s);
        }
    }

    #[test]
    fn test_concat() {
        let re = &mut ReManager::<u8>::new();
        let v = build_atoms(re);
        let eps = re.epsilon();
        let empty = re.empty();
        for &x in &v {
            check_equal(re.concat(empty, x), empty);
            check_equal(re.concat(x, empty), empty);
            check_equal(re.concat(eps, x), x);
            check_equal(re.concat(x, eps), x);
            for &y in &v {
                for &z in &v {
                    let xy = re.concat(x, y);
                    let left = re.concat(xy, z);
                    let yz = re.concat(y, z);
                    let right = re.concat(x, yz);
                    check_equal(left, right);
                }
            }
        }

        // nullable prefix of Sigma^*
        let a = re.char(b'a');
        let a_star = re.star(a);
        let all = re.all();
        check_equal(re.concat(a_star, all), all);
        let b = re.char(b'b');
        let all_b = re.concat(all, b);
        check_equal(re.concat(a_star, all_b), all_b);
    }

    #[test]
    fn test_set_operations() {
        let re = &mut ReManager::<u8>::new();
        let v = build_atoms(re);
        let all = re.all();
        let empty = re.empty();
        for &x in &v {
            check_equal(re.union(x, x), x);
            check_equal(re.union(x, empty), x);
            check_equal(re.union(x, all), all);
            check_equal(re.intersect(x, x), x);
            check_equal(re.intersect(x, empty), empty);
            check_equal(re.intersect(x, all), x);
            let nx = re.negation(x);
            check_equal(re.union(x, nx), all);
            check_equal(re.intersect(x, nx), empty);
            for &y in &v {
                let u1 = re.union(x, y);
                let u2 = re.union(y, x);
                check_equal(u1, u2);
                let i1 = re.intersect(x, y);
                let i2 = re.intersect(y, x);
                check_equal(i1, i2);
            }
        }

        // (epsilon & a*) = epsilon, (epsilon & a) = empty
        let eps = re.epsilon();
        let a = re.char(b'a');
        let a_star = re.star(a);
        check_equal(re.intersect(eps, a_star), eps);
        check_equal(re.intersect(eps, a), empty);

        // regression: sigma_plus (odd id) next to a fresh even id is not a complementary pair
        let dot_plus = re.dot_plus();
        let fresh = re.sequence(b"zz");
        let u = re.union(dot_plus, fresh);
        assert_ne!(u, all);
        assert!(matches!(u.expr(), BaseRegex::Union(_)));
    }

    #[test]
    fn algebraic_laws() {
        let re = &mut ReManager::<u8>::new();
        let rng = &mut StdRng::seed_from_u64(0x5eed);
        let all = re.all();
        let empty = re.empty();
        let eps = re.epsilon();
        for _ in 0..300 {
            let r = random_regex(re, rng, 3);
            let s = random_regex(re, rng, 3);
            let t = random_regex(re, rng, 3);

            let rr = re.star(r);
            check_equal(re.star(rr), rr);
            let nr = re.negation(r);
            check_equal(re.negation(nr), r);

            check_equal(re.concat(empty, r), empty);
            check_equal(re.concat(r, empty), empty);
            check_equal(re.concat(eps, r), r);
            check_equal(re.concat(r, eps), r);
            let rs = re.concat(r, s);
            let st = re.concat(s, t);
            let l = re.concat(rs, t);
            let rt = re.concat(r, st);
            check_equal(l, rt);

            check_equal(re.union(r, r), r);
            let u1 = re.union(r, s);
            check_equal(u1, re.union(s, r));
            let u2 = re.union(u1, t);
            let u3 = re.union(s, t);
            check_equal(u2, re.union(r, u3));
            check_equal(re.union(r, empty), r);
            check_equal(re.union(r, all), all);

            check_equal(re.intersect(r, r), r);
            let i1 = re.intersect(r, s);
            check_equal(i1, re.intersect(s, r));
            check_equal(re.intersect(r, empty), empty);
            check_equal(re.intersect(r, all), r);
        }
    }

    #[test]
    fn derivative_and_automaton_agree() {
        let re = &mut ReManager::<u8>::new();
        let rng = &mut StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let r = random_regex(re, rng, 3);
            let a = re.compile(r);
            for _ in 0..20 {
                let xs = random_sequence(rng);
                let expected = re.is_match(r, &xs);
                assert_eq!(
                    a.accepts(&xs),
                    expected,
                    "regex {} on {:?}: automaton\n{}",
                    r,
                    xs,
                    a
                );
            }
            assert_eq!(re.is_match(r, &[]), r.nullable);
            assert_eq!(a.is_empty(), re.is_empty_re(r));
            if let Some(w) = re.sample(r) {
                assert!(re.is_match(r, &w));
                assert!(a.accepts(&w));
            }
        }
    }

    #[test]
    fn boolean_operations_agree() {
        let re = &mut ReManager::<u8>::new();
        let rng = &mut StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let r = random_regex(re, rng, 2);
            let s = random_regex(re, rng, 2);
            let ar = re.compile(r);
            let as_ = re.compile(s);
            let union = ar.union(&as_);
            let inter = ar.intersection(&as_);
            let neg = ar.complement();
            let u = re.union(r, s);
            let i = re.intersect(r, s);
            let n = re.negation(r);
            for _ in 0..20 {
                let xs = random_sequence(rng);
                assert_eq!(union.accepts(&xs), re.is_match(u, &xs));
                assert_eq!(inter.accepts(&xs), re.is_match(i, &xs));
                assert_eq!(neg.accepts(&xs), re.is_match(n, &xs));
            }
            assert_eq!(ar.equivalent(&as_), re.equivalent(r, s));
        }
    }

    // scenario 1: (1 2) 3*
    #[test]
    fn concat_with_star() {
        let re = &mut ReManager::<u8>::new();
        let one = re.char(1);
        let two = re.char(2);
        let three = re.char(3);
        let c12 = re.concat(one, two);
        let s = re.star(three);
        let r = re.concat(c12, s);
        print_term("r", r);

        let a = re.compile(r);
        for xs in [&[1, 2][..], &[1, 2, 3], &[1, 2, 3, 3]] {
            assert!(re.is_match(r, xs));
            assert!(a.accepts(xs));
        }
        for xs in [&[][..], &[1], &[1, 2, 3, 1]] {
            assert!(!re.is_match(r, xs));
            assert!(!a.accepts(xs));
        }
    }

    // scenario 2: not [0..10]*
    #[test]
    fn negated_star() {
        let re = &mut ReManager::<u8>::new();
        let r0 = re.range(0, 10);
        let s = re.star(r0);
        let r = re.negation(s);
        let a = re.compile(r);
        for xs in [&[][..], &[0, 1, 2], &[10, 10, 10, 10]] {
            assert!(!re.is_match(r, xs));
            assert!(!a.accepts(xs));
        }
        for xs in [&[11, 12][..], &[0, 1, 11]] {
            assert!(re.is_match(r, xs));
            assert!(a.accepts(xs));
        }
    }

    // scenario 5 and 6
    #[test]
    fn intersections() {
        let re = &mut ReManager::<u8>::new();
        let c0 = re.char(0);
        let c1 = re.char(1);
        let c2 = re.char(2);
        let u01 = re.union(c0, c1);
        let u12 = re.union(c1, c2);
        let s01 = re.star(u01);
        let s12 = re.star(u12);
        let i = re.intersect(s01, s12);
        assert!(re.is_match(i, &[1, 1, 1]));
        assert!(!re.is_match(i, &[1, 2]));
        let s1 = re.star(c1);
        assert!(re.equivalent(i, s1));

        let e = re.intersect(c1, c2);
        let a = re.compile(e);
        assert!(a.is_empty());
        assert!(re.is_empty_re(e));
        assert_eq!(a.final_states().count(), 0);
    }

    #[test]
    fn test_deriv() {
        let re = &mut ReManager::<u8>::new();
        let a = re.char(b'a');
        let b = re.char(b'b');
        let ab = re.concat(a, b);
        let e = re.star(ab);
        print_term("e", e);

        let d = re.char_derivative(e, b'a');
        let be = re.concat(b, e);
        check_equal(d, be);
        let d2 = re.char_derivative(d, b'b');
        check_equal(d2, e);
        check_equal(re.char_derivative(e, b'b'), re.empty());
        check_equal(re.seq_derivative(e, b"abab"), e);

        assert_eq!(re.class_derivative(e, ClassId::Interval(3)), Err(Error::BadClassId));
        assert_eq!(
            re.set_derivative(e, &CharRange::new(b'a', b'b')),
            Err(Error::UndefinedDerivative)
        );
        assert_eq!(re.set_derivative(e, &CharRange::new(b'c', b'z')), Ok(re.empty()));
    }

    #[test]
    fn deep_expressions() {
        // long concatenations and deep nesting don't use native recursion
        let re = &mut ReManager::<u8>::new();
        let s: Vec<u8> = (0..20_000).map(|i| (i % 7) as u8).collect();
        let e = re.sequence(&s);
        assert!(re.is_match(e, &s));
        assert!(!re.is_match(e, &s[1..]));

        let mut x = re.char(1);
        for i in 0..5_000 {
            let c = re.char((i % 3) as u8);
            x = if i % 2 == 0 { re.union(x, c) } else { re.concat(c, x) };
            x = re.negation(x);
        }
        let d = re.char_derivative(x, 1);
        println!("derivative has id {}", d.id);
    }

    #[test]
    fn test_derivative_iter() {
        let re = &mut ReManager::<u8>::new();
        let ac = re.sequence(b"ac");
        let bc = re.sequence(b"bc");
        let sum = re.union(ac, bc);
        let e = re.plus(sum);
        let v: Vec<Regex<u8>> = re.iter_derivatives(e).collect();
        for (i, d) in v.iter().enumerate() {
            println!("d{i} = {d}");
        }
        // e, c(ac+bc)*, empty, (ac+bc)*
        assert_eq!(v.len(), 4);
        assert_eq!(v[0], e);
    }

    #[test]
    fn test_bounded_compile() {
        let re = &mut ReManager::<u8>::new();
        let a = re.char(b'a');
        let e = re.exp(a, 5);
        assert!(re.try_compile(e, 6).is_none());
        assert!(re.try_compile(e, 7).is_some());
        assert!(re.try_compile(e, 0).is_none());
        let opts = CompileOptions::default().max_states(3);
        assert!(re.compile_with_options(e, &opts).is_none());
        assert!(re.compile_with_options(e, &CompileOptions::default()).is_some());
    }

    #[test]
    fn test_repeat() {
        let re = &mut ReManager::<u8>::new();
        let a = re.char(b'a');
        let e = re.repeat(a, 2, Some(4));
        for n in 0..7 {
            let s = vec![b'a'; n];
            assert_eq!(re.is_match(e, &s), (2..=4).contains(&n));
        }
        let f = re.repeat(a, 2, None);
        assert!(re.is_match(f, b"aaaaaaa"));
        assert!(!re.is_match(f, b"a"));
        assert_eq!(re.repeat(a, 3, Some(2)), re.empty());
        assert_eq!(re.repeat(a, 0, Some(0)), re.epsilon());
        assert_eq!(re.repeat(a, 0, None), re.star(a));
    }

    #[test]
    fn test_sub_terms() {
        let re = &mut ReManager::<u8>::new();
        let a = re.char(b'a');
        let b = re.char(b'b');
        let u = re.union(a, b);
        let s = re.star(u);
        let e = re.concat(s, a);
        let terms: Vec<Regex<u8>> = sub_terms(e).collect();
        for t in &terms {
            println!("  {t}");
        }
        assert_eq!(terms[0], e);
        assert_eq!(terms.len(), 5);
        let l: Vec<Regex<u8>> = leaves(e).collect();
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn nine_bit_alphabet() {
        type I9 = BoundedInt<-256, 255>;
        let x = |v: i64| I9::new(v).unwrap();
        let re = &mut ReManager::<I9>::new();
        let neg = re.range(I9::MIN, x(-1));
        let pos = re.range(x(0), I9::MAX);
        let u = re.union(neg, pos);
        assert!(re.equivalent(u, re.dot()));

        let e = re.star(neg);
        let a = re.compile(e);
        assert!(a.accepts(&[x(-256), x(-1)]));
        assert!(!a.accepts(&[x(-256), x(0)]));
        let non_negative = re.diff(re.dot(), neg);
        assert_eq!(re.sample(non_negative), Some(vec![x(0)]));
    }

    #[test]
    fn char_alphabet() {
        let re = &mut ReManager::<char>::new();
        let greek = re.range('\u{3b1}', '\u{3c9}');
        let e = re.plus(greek);
        assert!(re.is_match(e, &['\u{3bb}', '\u{3bc}']));
        assert!(!re.is_match(e, &['a']));
        let n = re.negation(e);
        let a = re.compile(n);
        assert!(a.accepts(&['\u{10ffff}']));
        assert!(a.accepts(&[]));
    }

    #[test]
    fn complement_of_full_class() {
        let re = &mut ReManager::<u8>::new();
        let dot = re.dot();
        let not_dot = re.negation(dot);
        println!("negation of {dot} = {not_dot}");
        // sequences of length other than one
        assert_ne!(not_dot, re.empty());
        assert!(re.is_match(not_dot, &[]));
        assert!(re.is_match(not_dot, &[0, 0]));
        assert!(!re.is_match(not_dot, &[0]));
        assert_eq!(re.negation(not_dot), dot);

        // the class complement is the empty language
        let none = re.char_class_complement(&[CharRange::full()]);
        println!("complement of [{}] = {none}", CharRange::<u8>::full());
        assert_eq!(none, re.empty());
        assert_eq!(re.char_class_complement(&[]), dot);
    }
}
