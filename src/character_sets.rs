// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Character ranges and alphabet partitions
//!
//! A character range is a closed interval `[low, high]` of symbols of an [Alphabet].
//! There's no requirement that `low <= high`: a range with `low > high` is empty.
//!
//! A partition is a collection of disjoint, non-empty ranges, sorted in increasing order:
//!
//! [a<sub>0</sub>, b<sub>0</sub>], [a<sub>1</sub>, b<sub>1</sub>], ..., [a<sub>k</sub>, b<sub>k</sub>]
//! where a<sub>i</sub> <= b<sub>i</sub> and b<sub>i</sub> < a<sub>i+1</sub>.
//!
//! A partition defines an equivalence relation over symbols: two symbols are
//! equivalent either if they belong to the same range [a<sub>i</sub>, b<sub>i</sub>] or
//! if they're outside of all the ranges.
//!
//! A partition with n intervals defines then (n+1) classes:
//! C<sub>0</sub>, C<sub>1</sub>, ..., C<sub>n-1</sub> and D.
//! - For i=0,..., n-1, class C<sub>i</sub> is the interval [a<sub>i</sub>, b<sub>i</sub>].
//! - Class D is the complementary class, that is, the complement of Union(C<sub>0</sub>, ..., C<sub>n-1</sub>).
//!
//! Note: the complementary class D may be empty.
//!
//! Each class in a partition can be identified by its [ClassId]:
//! - `ClassId::Interval(i)` denotes the class C<sub>i</sub>, that is, the interval [a<sub>i</sub>, b<sub>i</sub>].
//! - `ClassId::Complement` denotes the complementary class D.
//!
//! Partitions are used to split a possibly huge alphabet into a small number of
//! classes (minterms) that are treated the same way by a regular expression or by an
//! automaton state. See [ReManager](crate::regular_expressions::ReManager).
//!

use std::{
    cmp::{max, min},
    fmt::Display,
};

use crate::{alphabet::Alphabet, errors::Error};

// x must be larger than T::MIN
fn before<T: Alphabet>(x: T) -> T {
    x.predecessor().unwrap_or(x)
}

// x must be smaller than T::MAX
fn after<T: Alphabet>(x: T) -> T {
    x.successor().unwrap_or(x)
}

///
/// Interval [low, high] of symbols
///
/// The range is empty if `low > high`.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct CharRange<T> {
    low: T,
    high: T,
}

impl<T: Alphabet> Display for CharRange<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "\u{2205}")
        } else if self.is_full() {
            write!(f, "\u{03a3}") // Sigma
        } else if self.is_singleton() {
            write!(f, "{:?}", self.low)
        } else {
            write!(f, "[{:?}..{:?}]", self.low, self.high)
        }
    }
}

impl<T: Alphabet> Default for CharRange<T> {
    fn default() -> Self {
        Self::full()
    }
}

impl<T: Alphabet> CharRange<T> {
    /// Construct the interval [low, high]
    ///
    /// The result is empty if `low > high`.
    pub fn new(low: T, high: T) -> Self {
        CharRange { low, high }
    }

    /// Construct the singleton interval [x, x]
    pub fn singleton(x: T) -> Self {
        CharRange { low: x, high: x }
    }

    /// Construct the interval [T::MIN, T::MAX]
    pub fn full() -> Self {
        CharRange {
            low: T::MIN,
            high: T::MAX,
        }
    }

    /// Lower bound
    pub fn low(&self) -> T {
        self.low
    }

    /// Upper bound
    pub fn high(&self) -> T {
        self.high
    }

    /// Check whether this range is empty
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// assert!(CharRange::new(5u8, 4).is_empty());
    /// assert!(! CharRange::new(4u8, 4).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Check whether this range is the full alphabet
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// assert!(CharRange::new(0u8, 255).is_full());
    /// assert!(! CharRange::new(1u8, 255).is_full());
    /// ```
    pub fn is_full(&self) -> bool {
        self.low == T::MIN && self.high == T::MAX
    }

    /// Check whether the range is a singleton
    pub fn is_singleton(&self) -> bool {
        self.low == self.high
    }

    /// Check whether x is in this interval
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// let c = CharRange::new('a', 'z');
    /// assert!(c.contains('g'));
    /// assert!(!c.contains('0'));
    /// ```
    pub fn contains(&self, x: T) -> bool {
        self.low <= x && x <= self.high
    }

    /// Check whether other is a subset of this range
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// let c = CharRange::new(b'a', b'z');
    /// assert!(c.covers(&CharRange::singleton(b'g')));
    /// assert!(c.covers(&CharRange::new(b't', b'z')));
    /// assert!(! c.covers(&CharRange::new(0, b'k')));
    /// ```
    pub fn covers(&self, other: &Self) -> bool {
        other.is_empty() || (self.low <= other.low && other.high <= self.high)
    }

    /// Check whether this range is before x (i.e., high < x)
    pub fn is_before(&self, x: T) -> bool {
        self.high < x
    }

    /// Check whether this range is after x (i.e., x < low)
    pub fn is_after(&self, x: T) -> bool {
        x < self.low
    }

    /// Pick a symbol in the range
    ///
    /// The range must not be empty.
    pub fn pick(&self) -> T {
        debug_assert!(!self.is_empty());
        self.low
    }

    /// Intersection of two ranges
    ///
    /// The result may be empty.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// let c = CharRange::new(b'a', b'z');
    /// let d = CharRange::new(b't', 127);
    ///
    /// assert_eq!(c.intersect(&d), CharRange::new(b't', b'z'));
    /// assert!(c.intersect(&CharRange::new(0, 10)).is_empty());
    /// ```
    pub fn intersect(&self, other: &Self) -> Self {
        CharRange {
            low: max(self.low, other.low),
            high: min(self.high, other.high),
        }
    }

    /// Union of two ranges
    ///
    /// - return None if the union is not an interval
    /// - return Some(c) otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// let c = CharRange::new(b'a', b'z');
    /// let d = CharRange::new(b't', 127);
    /// let e = CharRange::new(b'0', b'9');
    ///
    /// assert_eq!(c.union(&d), Some(CharRange::new(b'a', 127)));
    /// assert_eq!(c.union(&e), None);
    /// ```
    pub fn union(&self, other: &Self) -> Option<Self> {
        if self.is_empty() {
            return Some(*other);
        }
        if other.is_empty() {
            return Some(*self);
        }
        let (first, second) = if self.low <= other.low {
            (self, other)
        } else {
            (other, self)
        };
        // union([a, b], [c, d]) with a <= c is an interval if c <= b+1
        if second.low <= first.high || first.high.successor() == Some(second.low) {
            Some(CharRange {
                low: first.low,
                high: max(first.high, second.high),
            })
        } else {
            None
        }
    }

    /// Complement of this range
    ///
    /// Return a sorted list of 0, 1, or 2 disjoint ranges whose union is the
    /// set of symbols not in this range.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::CharRange;
    ///
    /// let c = CharRange::new(1u8, 10);
    /// assert_eq!(c.complement(), vec![CharRange::new(0, 0), CharRange::new(11, 255)]);
    /// assert!(CharRange::<u8>::full().complement().is_empty());
    /// ```
    pub fn complement(&self) -> Vec<Self> {
        if self.is_empty() {
            return vec![Self::full()];
        }
        let mut result = Vec::with_capacity(2);
        if let Some(x) = self.low.predecessor() {
            result.push(CharRange::new(T::MIN, x));
        }
        if let Some(y) = self.high.successor() {
            result.push(CharRange::new(y, T::MAX));
        }
        result
    }
}

///
/// Normalize a list of ranges
///
/// Remove empty ranges, sort, and merge overlapping or adjacent ranges.
/// The result is a sorted list of disjoint, non-adjacent ranges.
///
pub fn normalize_ranges<T: Alphabet>(ranges: &[CharRange<T>]) -> Vec<CharRange<T>> {
    let mut v: Vec<CharRange<T>> = ranges.iter().filter(|r| !r.is_empty()).copied().collect();
    v.sort_by_key(|r| r.low);
    let mut result: Vec<CharRange<T>> = Vec::with_capacity(v.len());
    for r in v {
        match result.last_mut() {
            Some(last) => match last.union(&r) {
                Some(u) => *last = u,
                None => result.push(r),
            },
            None => result.push(r),
        }
    }
    result
}

///
/// Complement of a union of ranges
///
/// Return the sorted list of disjoint ranges that cover all symbols
/// not in any of the input ranges. The result is empty if the
/// ranges cover the full alphabet.
///
/// # Example
///
/// ```
/// use bounded_regex::character_sets::{complement_ranges, CharRange};
///
/// let v = [CharRange::new(10u8, 20), CharRange::new(0, 4)];
/// assert_eq!(complement_ranges(&v), vec![CharRange::new(5, 9), CharRange::new(21, 255)]);
/// ```
pub fn complement_ranges<T: Alphabet>(ranges: &[CharRange<T>]) -> Vec<CharRange<T>> {
    let mut result = Vec::new();
    let mut next = Some(T::MIN);
    for r in normalize_ranges(ranges) {
        if let Some(x) = next {
            if x < r.low {
                result.push(CharRange::new(x, before(r.low)));
            }
        }
        next = r.high.successor();
    }
    if let Some(x) = next {
        result.push(CharRange::new(x, T::MAX));
    }
    result
}

///
/// Class that covers an interval in a [CharPartition]
///
/// A CoverResult identifies the [CharPartition]'s class that contains
/// an interval [a, b] if any.
///
/// For an interval [a, b] and a partition
///  [a<sub>0</sub>, b<sub>0</sub>], ..., [a<sub>n</sub>, b<sub>n</sub>],
/// CoverResult describes three possible outcomes:
/// - `CoveredBy(i)` means that [a, b] is included in class C<sub>i</sub> = [a<sub>i</sub>, b<sub>i</sub>]
/// - `DisjointFromAll` means that [a, b] does not intersect with any [a<sub>i</sub>, b<sub>i</sub>] so
///   [a, b] is included in the complementary class.
/// - `Overlaps` means that [a, b] and some interval [a<sub>i</sub>, b<sub>i</sub>] intersect,
///   but [a, b] is not contained in this internal.
///
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum CoverResult {
    /// CoveredBy(i) denotes the i-th interval [a<sub>i</sub>, b<sub>i</sub>] in the partition
    CoveredBy(usize),
    /// DisjointFromAll denotes the partition's complementary class
    DisjointFromAll,
    /// Overlaps means that [a, b] intersects some interval [a<sub>i</sub>, b<sub>i</sub>]
    /// but is not fully included in this interval.
    Overlaps,
}

impl Display for CoverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverResult::CoveredBy(i) => write!(f, "CoveredBy({i})"),
            CoverResult::DisjointFromAll => write!(f, "DisjointFromAll"),
            CoverResult::Overlaps => write!(f, "Overlaps"),
        }
    }
}

/// ClassId
///
/// A class id identifies a class defined by a partition.
/// It can either be Interval(i) where i is an index between 0 and the partition length-1 or
/// Complement.
/// - Interval(i) denotes the i-th interval in a partition
/// - Complement denotes the complementary class (not an interval in general)
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ClassId {
    /// Id of a partition interval
    Interval(usize),
    /// Id of the complementary class
    Complement,
}

impl Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassId::Interval(i) => write!(f, "Interval({i})"),
            ClassId::Complement => write!(f, "Complement"),
        }
    }
}

///
/// Collection of disjoint, non-empty ranges sorted in increasing order.
///
/// This divides the alphabet into n+1 classes C<sub>0</sub>, ..., C<sub>n-1</sub>, and D:
/// - C<sub>i</sub> = { x | a<sub>i</sub> <= x <= b<sub>i</sub> }
/// - D = complement of Union(C<sub>0</sub>, ..., C<sub>n-1</sub>)
///
//
// comp_witness is the smallest symbol that doesn't belong to any of the
// intervals, or None if the intervals cover the whole alphabet.
//
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CharPartition<T> {
    list: Vec<CharRange<T>>,
    comp_witness: Option<T>,
}

impl<T: Alphabet> Default for CharPartition<T> {
    fn default() -> Self {
        CharPartition {
            list: Vec::new(),
            comp_witness: Some(T::MIN),
        }
    }
}

impl<T: Alphabet> CharPartition<T> {
    /// Number of intervals in the partition
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check whether the partition is empty (i.e., no intervals)
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Create an empty partition
    pub fn new() -> Self {
        CharPartition::default()
    }

    /// Partition with a single range
    ///
    /// The range must not be empty.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// let p = CharPartition::from_set(&CharRange::new(b'a', b'b'));
    /// assert_eq!(p.len(), 1);
    /// assert_eq!(p.interval(0), CharRange::new(b'a', b'b'));
    /// ```
    pub fn from_set(c: &CharRange<T>) -> Self {
        let mut result = Self::new();
        result.push(c.low, c.high);
        result
    }

    /// Build a partition from an iterator of ranges
    ///
    /// Empty ranges are ignored. Succeeds if the other ranges are pairwise disjoint.
    ///
    /// # Errors
    ///
    /// If some ranges have a non-empty intersection,
    /// return Err([Error::NonDisjointCharSets]).
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// # use std::error::Error;
    /// #
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let v = [
    ///     CharRange::new(120u32, 400),
    ///     CharRange::new(0, 10),
    ///     CharRange::new(1000, 2000)];
    ///
    /// let p = CharPartition::try_from_iter(v.into_iter())?;
    /// assert_eq!(p.len(), 3);
    /// assert_eq!(p.interval(0), CharRange::new(0, 10));
    /// assert_eq!(p.interval(1), CharRange::new(120, 400));
    /// assert_eq!(p.interval(2), CharRange::new(1000, 2000));
    /// # Ok(())
    /// # }
    /// ```
    pub fn try_from_iter(iter: impl Iterator<Item = CharRange<T>>) -> Result<Self, Error> {
        let mut v: Vec<CharRange<T>> = iter.filter(|r| !r.is_empty()).collect();
        v.sort_by_key(|r| r.low);
        let mut result = Self::new();
        for r in v {
            if let Some(last) = result.list.last() {
                if r.low <= last.high {
                    return Err(Error::NonDisjointCharSets);
                }
            }
            result.push(r.low, r.high);
        }
        Ok(result)
    }

    /// Add the interval [low, high] at the end of the partition.
    ///
    /// Requires `low <= high`. If the partition is not empty, `low` must
    /// also be larger than the end of the last interval in the partition.
    pub fn push(&mut self, low: T, high: T) {
        debug_assert!(low <= high);
        debug_assert!(self.list.last().map_or(true, |r| r.high < low));
        self.list.push(CharRange { low, high });
        if let Some(w) = self.comp_witness {
            if low <= w {
                self.comp_witness = high.successor();
            }
        }
    }

    /// Get the i-th interval in the partition
    ///
    /// # Panics
    ///
    /// If i is out of bound, that is, if i >= number of intervals in the partition.
    pub fn interval(&self, i: usize) -> CharRange<T> {
        self.list[i]
    }

    /// Get the i-th interval or None if i is out of bound
    pub fn get(&self, i: usize) -> Option<&CharRange<T>> {
        self.list.get(i)
    }

    /// Pick an element in interval i
    ///
    /// # Panics
    ///
    /// if i >= number of intervals in the partition
    pub fn pick(&self, i: usize) -> T {
        self.list[i].low
    }

    /// Check whether the complementary class is empty
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// let mut p = CharPartition::new();
    /// p.push(0u8, 127);
    /// assert!(! p.empty_complement());
    /// p.push(128, 255);
    /// assert!(p.empty_complement());
    /// ```
    pub fn empty_complement(&self) -> bool {
        self.comp_witness.is_none()
    }

    /// Pick an element in the complementary class
    ///
    /// - return None if the complementary class is empty
    pub fn pick_complement(&self) -> Option<T> {
        self.comp_witness
    }

    /// Check whether a class id is valid
    pub fn valid_class_id(&self, cid: ClassId) -> bool {
        use ClassId::*;
        match cid {
            Interval(i) => i < self.len(),
            Complement => !self.empty_complement(),
        }
    }

    /// Number of classes
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// // partition with two intervals and three classes
    /// let mut p = CharPartition::new();
    /// p.push(b'0', b'9');
    /// p.push(b'Z', b'Z');
    ///
    /// assert_eq!(p.num_classes(), 3);
    /// ```
    pub fn num_classes(&self) -> usize {
        let n = self.len();
        if self.empty_complement() {
            n
        } else {
            n + 1
        }
    }

    /// Pick an element in a class
    ///
    /// # Errors
    ///
    /// Return Err([Error::BadClassId]) if cid is `Interval(i)` with i out of bound,
    /// or if cid is `Complement` and the complementary class is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::{ClassId::*, *};
    ///
    /// let mut p = CharPartition::new();
    /// p.push(b'0', b'9');
    /// p.push(b'Z', b'Z');
    ///
    /// assert_eq!(p.pick_in_class(Interval(1)), Ok(b'Z'));
    /// assert_eq!(p.pick_in_class(Complement), Ok(0));
    /// assert!(p.pick_in_class(Interval(2)).is_err());
    /// ```
    pub fn pick_in_class(&self, cid: ClassId) -> Result<T, Error> {
        use ClassId::*;
        match cid {
            Interval(i) => self.list.get(i).map(|r| r.low).ok_or(Error::BadClassId),
            Complement => self.comp_witness.ok_or(Error::BadClassId),
        }
    }

    /// Iterator to go through all intervals in the partition
    pub fn ranges(&self) -> impl Iterator<Item = &CharRange<T>> {
        self.list.iter()
    }

    /// Ranges that make up the complementary class
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// let mut p = CharPartition::new();
    /// p.push(b'0', b'9');
    /// p.push(b'a', b'z');
    ///
    /// let gaps = p.gaps();
    /// assert_eq!(gaps, vec![CharRange::new(0, b'0' - 1),
    ///                       CharRange::new(b'9' + 1, b'a' - 1),
    ///                       CharRange::new(b'z' + 1, 255)]);
    /// ```
    pub fn gaps(&self) -> Vec<CharRange<T>> {
        complement_ranges(&self.list)
    }

    /// Iterator to go through all valid class ids
    pub fn class_ids(&self) -> ClassIdIterator<'_, T> {
        ClassIdIterator {
            partition: self,
            counter: 0,
        }
    }

    /// Iterator to pick one symbol in each class
    /// (including the complementary class).
    pub fn picks(&self) -> PickIterator<'_, T> {
        PickIterator {
            partition: self,
            counter: 0,
        }
    }

    ///
    /// Search for the class that contains a symbol
    ///
    /// - Return `Interval(i)` if `a_i <= x <= b_i`
    /// - Return `Complement` if x is not in any interval
    ///
    pub fn class_of_char(&self, x: T) -> ClassId {
        let mut i = 0;
        let mut j = self.list.len();
        while i < j {
            let h = i + (j - i) / 2;
            let r = &self.list[h];
            if r.contains(x) {
                return ClassId::Interval(h);
            }
            if r.is_before(x) {
                i = h + 1;
            } else {
                j = h;
            }
        }
        ClassId::Complement
    }

    ///
    /// Search for an interval that covers a range
    ///
    /// The range must not be empty.
    /// - Return `CoverResult::CoveredBy(i)` if [a, b] is included in the i-th
    ///   interval of the partition.
    /// - Return `CoverResult::DisjointFromAll` if [a, b] does not overlap any
    ///   interval in the partition.
    /// - Return `CoverResult::Overlaps` if [a, b] overlaps some interval in
    ///   the partition but it not contained in this interval.
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::character_sets::*;
    ///
    /// let p = CharPartition::from_set(&CharRange::new('0', '9'));
    /// let test1 = CharRange::new('4', '8');
    /// let test2 = CharRange::new('a', 'z');
    /// let test3 = CharRange::new('5', '?');
    ///
    /// assert_eq!(p.interval_cover(&test1), CoverResult::CoveredBy(0));
    /// assert_eq!(p.interval_cover(&test2), CoverResult::DisjointFromAll);
    /// assert_eq!(p.interval_cover(&test3), CoverResult::Overlaps);
    /// ```
    pub fn interval_cover(&self, set: &CharRange<T>) -> CoverResult {
        debug_assert!(!set.is_empty());
        let (a, b) = (set.low, set.high);

        // number of intervals that start at or before a
        let i = self.list.partition_point(|r| r.low <= a);
        if i == 0 {
            return match self.list.first() {
                Some(r) if r.low <= b => CoverResult::Overlaps,
                _ => CoverResult::DisjointFromAll,
            };
        }

        let current = &self.list[i - 1];
        if a <= current.high {
            if b <= current.high {
                CoverResult::CoveredBy(i - 1)
            } else {
                CoverResult::Overlaps
            }
        } else {
            match self.list.get(i) {
                Some(next) if next.low <= b => CoverResult::Overlaps,
                _ => CoverResult::DisjointFromAll,
            }
        }
    }

    /// Get the class id for a range
    ///
    /// - The class id is Interval(i) if the range is covered by interval
    ///   [a<sub>i</sub>, b<sub>i</sub>] of the partition
    /// - The class id is Complement if the range is covered by the partition's
    ///   complementary class
    /// - Otherwise, the class id is not defined.
    ///
    /// # Errors
    ///
    /// If the class id is not defined for s, return Err([Error::AmbiguousCharSet])
    ///
    pub fn class_of_set(&self, s: &CharRange<T>) -> Result<ClassId, Error> {
        use ClassId::*;
        use CoverResult::*;

        match self.interval_cover(s) {
            CoveredBy(i) => Ok(Interval(i)),
            DisjointFromAll => Ok(Complement),
            Overlaps => Err(Error::AmbiguousCharSet),
        }
    }

    /// Check whether range c is included in one class of the partition
    pub fn good_char_set(&self, c: &CharRange<T>) -> bool {
        !matches!(self.interval_cover(c), CoverResult::Overlaps)
    }
}

impl<T: Alphabet> Display for CharPartition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ ")?;
        for r in self.ranges() {
            write!(f, "{r} ")?;
        }
        write!(f, "}}")
    }
}

/// Iterator to go through all valid ClassId's in a partition
#[derive(Debug)]
pub struct ClassIdIterator<'a, T> {
    partition: &'a CharPartition<T>,
    counter: usize,
}

impl<'a, T: Alphabet> Iterator for ClassIdIterator<'a, T> {
    type Item = ClassId;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.counter;
        self.counter += 1;
        if i < self.partition.len() {
            Some(ClassId::Interval(i))
        } else if i == self.partition.len() && !self.partition.empty_complement() {
            Some(ClassId::Complement)
        } else {
            None
        }
    }
}

/// Iterator to pick a symbol in each class of a partition
///
/// If the partition consists of `n` intervals, the iterator will
/// pick an element in each interval first, then it will pick an
/// element in the complementary class if this class is not empty.
#[derive(Debug)]
pub struct PickIterator<'a, T> {
    partition: &'a CharPartition<T>,
    counter: usize,
}

impl<'a, T: Alphabet> Iterator for PickIterator<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let i = self.counter;
        self.counter += 1;
        if i < self.partition.len() {
            Some(self.partition.pick(i))
        } else if i == self.partition.len() {
            self.partition.pick_complement()
        } else {
            None
        }
    }
}

///
/// Merge two partitions p1 and p2
///
/// The result is the coarsest partition p that is a refinement of both p1 and p2.
/// This means that every interval of p1 and every interval of p2 is the union
/// of one or more successive intervals of p.
///
/// # Example
///
/// ```
/// use bounded_regex::character_sets::*;
///
/// // partition p with intervals ['0', '9'] and ['a', 'g']
/// let mut p = CharPartition::new();
/// p.push('0', '9');
/// p.push('a', 'g');
///
/// // partition q with intervals ['5', '5'] and ['c', 'z']
/// let mut q = CharPartition::new();
/// q.push('5', '5');
/// q.push('c', 'z');
///
/// // r = ['0', '4'] ['5', '5'] ['6', '9'] ['a', 'b'] ['c', 'g'] ['h', 'z']
/// let r = merge_partitions(&p, &q);
///
/// assert_eq!(r.len(), 6);
/// assert_eq!(r.interval(0), CharRange::new('0', '4'));
/// assert_eq!(r.interval(1), CharRange::new('5', '5'));
/// assert_eq!(r.interval(2), CharRange::new('6', '9'));
/// assert_eq!(r.interval(3), CharRange::new('a', 'b'));
/// assert_eq!(r.interval(4), CharRange::new('c', 'g'));
/// assert_eq!(r.interval(5), CharRange::new('h', 'z'));
/// ```
#[allow(clippy::many_single_char_names)]
pub fn merge_partitions<T: Alphabet>(p1: &CharPartition<T>, p2: &CharPartition<T>) -> CharPartition<T> {
    // cursor: index of the current interval + the part of this interval not consumed yet
    fn next_interval<T: Alphabet>(p: &CharPartition<T>, i: usize) -> Option<(usize, T, T)> {
        p.get(i).map(|r| (i, r.low, r.high))
    }

    let mut cursor1 = next_interval(p1, 0);
    let mut cursor2 = next_interval(p2, 0);

    let mut result = CharPartition::new();
    loop {
        match (cursor1, cursor2) {
            (None, None) => break,
            (Some((i, a, b)), None) => {
                result.push(a, b);
                cursor1 = next_interval(p1, i + 1);
            }
            (None, Some((j, c, d))) => {
                result.push(c, d);
                cursor2 = next_interval(p2, j + 1);
            }
            (Some((i, a, b)), Some((j, c, d))) => {
                if b < c {
                    // [a, b] < [c, d]
                    result.push(a, b);
                    cursor1 = next_interval(p1, i + 1);
                } else if d < a {
                    // [c, d] < [a, b]
                    result.push(c, d);
                    cursor2 = next_interval(p2, j + 1);
                } else if c < a {
                    // overlap and c < a
                    result.push(c, before(a));
                    cursor2 = Some((j, a, d));
                } else if a < c {
                    // overlap and a < c
                    result.push(a, before(c));
                    cursor1 = Some((i, c, b));
                } else if b < d {
                    // a = c and [a, b] is a prefix of [c, d]
                    result.push(a, b);
                    cursor1 = next_interval(p1, i + 1);
                    cursor2 = Some((j, after(b), d));
                } else if d < b {
                    // a = c and [c, d] is a prefix of [a, b]
                    result.push(c, d);
                    cursor1 = Some((i, after(d), b));
                    cursor2 = next_interval(p2, j + 1);
                } else {
                    result.push(a, b);
                    cursor1 = next_interval(p1, i + 1);
                    cursor2 = next_interval(p2, j + 1);
                }
            }
        }
    }
    result
}

///
/// Merge a list of partitions
///
/// See [merge_partitions]
pub fn merge_partition_list<'a, T: Alphabet>(
    list: impl Iterator<Item = &'a CharPartition<T>>,
) -> CharPartition<T> {
    let mut result = CharPartition::new();
    for p in list {
        result = merge_partitions(&result, p)
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alphabet::BoundedInt;

    fn good_partition<T: Alphabet>(p: &CharPartition<T>) -> bool {
        let mut prev: Option<T> = None;
        for s in p.ranges() {
            if s.is_empty() {
                return false;
            }
            if let Some(x) = prev {
                if s.low <= x {
                    return false;
                }
            }
            if let Some(w) = p.comp_witness {
                if s.contains(w) {
                    return false;
                }
            }
            prev = Some(s.high);
        }
        true
    }

    fn example1() -> CharPartition<u32> {
        let mut p = CharPartition::new();
        p.push('0' as u32, '9' as u32);
        p.push('Z' as u32, 'Z' as u32);
        p.push('f' as u32, 'q' as u32);
        p
    }

    fn example2() -> CharPartition<u32> {
        let mut p = CharPartition::new();
        p.push('0' as u32, '0' as u32);
        p.push('A' as u32, 'G' as u32);
        p.push('H' as u32, 'M' as u32);
        p.push('W' as u32, 'Z' as u32);
        p.push('a' as u32, 'n' as u32);
        p.push('q' as u32, 'r' as u32);
        p
    }

    #[test]
    fn test_ranges() {
        let a = CharRange::new(1u8, 10);
        let full = CharRange::<u8>::full();

        assert!(!a.is_empty());
        assert!(!a.is_full());
        assert!(full.is_full());
        assert_eq!(full, CharRange::default());
        assert!(CharRange::new(5u8, 4).is_empty());
        assert!(a.contains(1) && a.contains(10) && !a.contains(0) && !a.contains(11));

        assert_eq!(a.complement(), vec![CharRange::new(0, 0), CharRange::new(11, 255)]);
        assert!(full.complement().is_empty());
        assert_eq!(CharRange::new(0u8, 10).complement(), vec![CharRange::new(11, 255)]);
        assert_eq!(CharRange::new(10u8, 255).complement(), vec![CharRange::new(0, 9)]);
        assert_eq!(CharRange::new(5u8, 4).complement(), vec![full]);

        // signed alphabet
        let b = CharRange::new(-3i8, 3);
        assert_eq!(
            b.complement(),
            vec![CharRange::new(-128, -4), CharRange::new(4, 127)]
        );

        // 9-bit signed alphabet
        type I9 = BoundedInt<-256, 255>;
        let x = |v: i64| I9::new(v).unwrap();
        let c = CharRange::new(x(-1), x(1));
        assert_eq!(
            c.complement(),
            vec![CharRange::new(x(-256), x(-2)), CharRange::new(x(2), x(255))]
        );
    }

    #[test]
    fn test_simple() {
        let p1 = CharPartition::<u32>::new();
        let p2 = example1();
        let p3 = example1();
        let p4 = example2();
        let p5 = CharPartition::from_set(&CharRange::<u32>::full());

        assert!(good_partition(&p1));
        assert!(good_partition(&p2));
        assert!(good_partition(&p4));
        assert!(good_partition(&p5));

        assert_eq!(p1.pick_complement(), Some(0));
        assert_eq!(p2.pick_complement(), Some(0));
        assert_eq!(p4.pick_complement(), Some(0));
        assert!(p5.empty_complement());

        assert_eq!(&p2, &p3);
        assert_ne!(&p2, &p4);
        assert_ne!(&p1, &p2);
        assert_ne!(&p1, &p5);

        println!("Empty partition: {}", &p1);
        println!("Example1: {}", &p2);
        println!("Example2: {}", &p4);
        println!("All chars: {}", &p5);

        let mut p6 = CharPartition::new();
        p6.push(0u8, 10);
        p6.push(11, 20);
        assert_eq!(p6.pick_complement(), Some(21));
        assert_eq!(p6.gaps(), vec![CharRange::new(21, 255)]);
    }

    #[test]
    fn test_from_list() {
        let v = [
            CharRange::new(120u32, 400),
            CharRange::new(0, 10),
            CharRange::new(1000, 2000),
        ];

        match CharPartition::try_from_iter(v.into_iter()) {
            Ok(p) => {
                println!("From list succeeded: {}", &p);
                assert_eq!(p.len(), 3);
                assert_eq!(p.interval(0), CharRange::new(0, 10));
                assert_eq!(p.interval(1), CharRange::new(120, 400));
                assert_eq!(p.interval(2), CharRange::new(1000, 2000));
                assert!(good_partition(&p));
            }
            Err(e) => panic!("try_from_iter failed with error {}", e),
        }

        let w = [
            CharRange::new(120u32, 400),
            CharRange::new(1000, 2000),
            CharRange::new(0, 10),
            CharRange::new(100, 200),
        ];

        assert_eq!(
            CharPartition::try_from_iter(w.into_iter()),
            Err(Error::NonDisjointCharSets)
        );
    }

    #[test]
    fn test_search() {
        use super::ClassId::*;

        let p = CharPartition::<u32>::new();

        assert_eq!(p.class_of_char('a' as u32), Complement);
        assert_eq!(p.class_of_char(0), Complement);
        assert_eq!(p.class_of_char(u32::MAX), Complement);

        let p2 = example1();

        assert_eq!(p2.class_of_char(10), Complement);
        assert_eq!(p2.class_of_char('0' as u32), Interval(0));
        assert_eq!(p2.class_of_char('5' as u32), Interval(0));
        assert_eq!(p2.class_of_char('9' as u32), Interval(0));
        assert_eq!(p2.class_of_char('A' as u32), Complement);
        assert_eq!(p2.class_of_char('Z' as u32), Interval(1));
        assert_eq!(p2.class_of_char('e' as u32), Complement);
        assert_eq!(p2.class_of_char('g' as u32), Interval(2));
        assert_eq!(p2.class_of_char('z' as u32), Complement);

        let p3 = example2();
        assert_eq!(p3.class_of_char('5' as u32), Complement);
        assert_eq!(p3.class_of_char('G' as u32), Interval(1));
        assert_eq!(p3.class_of_char('H' as u32), Interval(2));
        assert_eq!(p3.class_of_char('O' as u32), Complement);
        assert_eq!(p3.class_of_char('r' as u32), Interval(5));
        assert_eq!(p3.class_of_char('s' as u32), Complement);

        let p4 = CharPartition::from_set(&CharRange::<u32>::full());
        assert_eq!(p4.class_of_char(0), Interval(0));
        assert_eq!(p4.class_of_char(u32::MAX), Interval(0));
    }

    #[test]
    fn test_merge() {
        let v = vec![CharPartition::new(), example1(), example2()];

        for p in &v {
            for q in &v {
                let m = merge_partitions(p, q);
                println!("Merge({}, {}) = {}", p, q, &m);

                assert!(good_partition(&m));

                if p.is_empty() {
                    assert_eq!(&m, q);
                }
                if q.is_empty() {
                    assert_eq!(&m, p);
                }
                if p == q {
                    assert_eq!(&m, p);
                }
            }
        }

        // merging with the full range at the alphabet bounds
        let full = CharPartition::from_set(&CharRange::<u8>::full());
        let mut q = CharPartition::new();
        q.push(0u8, 0);
        q.push(255, 255);
        let m = merge_partitions(&full, &q);
        assert_eq!(m.len(), 3);
        assert_eq!(m.interval(1), CharRange::new(1, 254));
        assert!(m.empty_complement());
    }

    #[test]
    fn test_union() {
        let a = CharRange::singleton(0u32);
        let b = CharRange::new(1, 20);
        let c = CharRange::new(30, 60);
        let d = CharRange::new(0, 30);

        assert_eq!(a.union(&a), Some(a));
        assert_eq!(a.union(&b), Some(CharRange::new(0, 20)));
        assert_eq!(a.union(&c), None);
        assert_eq!(a.union(&d), Some(d));
        assert_eq!(b.union(&a), Some(CharRange::new(0, 20)));
        assert_eq!(b.union(&c), None);
        assert_eq!(c.union(&d), Some(CharRange::new(0, 60)));

        let v = [c, a, b, CharRange::new(10, 5)];
        assert_eq!(normalize_ranges(&v), vec![CharRange::new(0, 20), c]);
    }

    #[test]
    fn test_cover() {
        let v = vec![CharPartition::new(), example1(), example2()];
        let i = vec![
            CharRange::singleton('a' as u32),
            CharRange::new('0' as u32, '9' as u32),
            CharRange::new('a' as u32, 'z' as u32),
            CharRange::new('h' as u32, 'q' as u32),
            CharRange::singleton('f' as u32),
            CharRange::singleton('q' as u32),
            CharRange::full(),
            CharRange::singleton(0),
            CharRange::singleton(u32::MAX),
            CharRange::new(0, 'z' as u32),
            CharRange::new('z' as u32, u32::MAX),
            CharRange::new('[' as u32, '`' as u32),
            CharRange::new('[' as u32, 'f' as u32),
        ];

        fn check_covered(p: &CharPartition<u32>, test: &CharRange<u32>, i: usize) -> bool {
            p.interval(i).covers(test)
        }

        fn check_disjoint(p: &CharPartition<u32>, test: &CharRange<u32>) -> bool {
            p.ranges().all(|set| set.intersect(test).is_empty())
        }

        fn check_overlap(p: &CharPartition<u32>, test: &CharRange<u32>) -> bool {
            p.ranges()
                .any(|set| !set.intersect(test).is_empty() && !set.covers(test))
        }

        for p in &v {
            println!("Partition: {p}");
            for set in &i {
                let c = p.interval_cover(set);
                println!("Cover for {set} = {c}");

                match c {
                    CoverResult::CoveredBy(i) => assert!(check_covered(p, set, i)),
                    CoverResult::DisjointFromAll => assert!(check_disjoint(p, set)),
                    CoverResult::Overlaps => assert!(check_overlap(p, set)),
                }
            }
            println!();
        }
    }
}
