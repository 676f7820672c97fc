// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Deterministic finite-state automata
//!
//! States are indexed by an integer from 0 to N-1 where N is the number of states.
//!
//! The alphabet is divided in equivalence classes such that all symbols in an equivalence
//! class have the same transitions.
//!
//! More precisely, a symbol partition is attached to every state of an automaton.
//! The partition consists of disjoint intervals (see [character_sets](crate::character_sets)).
//! If the i-th interval in the partition of state `s` is interval [a<sub>i</sub>, b<sub>i</sub>] then all
//! symbols in this interval have the same successors `delta(s, i)`.
//! In addition, state `s` may have a default successor, that is, the successor state of `s` for symbols
//! that do not belong to any interval [a<sub>i</sub>, b<sub>i</sub>]. A state without default
//! successor whose intervals do not cover the alphabet rejects the other symbols.
//!
//! Function [combined_char_partition](Automaton::combined_char_partition) constructs a
//! partition of the alphabet that is valid for all states of an automaton. If
//! two symbols `c1` and `c2` are in the same class in the combined partition, then we
//! have `delta(s, c1) = delta(s, c2)` for any state `s` of the automaton.
//!
//! Boolean operations ([complement](Automaton::complement), [union](Automaton::union),
//! [intersection](Automaton::intersection), [difference](Automaton::difference)) use
//! a product construction over the transition ranges of the operands.
//!
use std::{collections::HashMap, fmt::Display, hash::Hash};

use tracing::debug;

use crate::{
    alphabet::Alphabet, bfs_queues::BfsQueue, character_sets::*, errors::*,
    labeled_queues::LabeledQueue,
};

///
/// Deterministic finite state automaton
///
#[derive(Debug)]
pub struct Automaton<T: Alphabet> {
    // number of states
    num_states: usize,
    // number of final states
    num_final_states: usize,
    // index of the initial state
    initial_state: usize,
    // array of states
    states: Box<[State<T>]>,
}

///
/// State of an automaton
///
#[derive(Debug)]
pub struct State<T: Alphabet> {
    // id of a state (an index between 0 and num_states)
    id: usize,
    // whether this state is final
    is_final: bool,
    // symbol classes for which successors are defined
    classes: CharPartition<T>,
    // successor[i] = index of the successor state for the i-th interval in the class partition
    successor: Box<[usize]>,
    // default successor for symbols outside any of the class partition intervals
    default_successor: Option<usize>,
}

///
/// Iterator to list the transitions from a state
/// - successors are given as pairs (class id, reference to successor state)
///
#[derive(Debug)]
pub struct EdgeIterator<'a, T: Alphabet> {
    state_array: &'a [State<T>],
    state: &'a State<T>,
    index: usize,
}

///
/// Iterator to enumerate the final states of an automaton
///
#[derive(Debug)]
pub struct FinalStateIterator<'a, T: Alphabet> {
    state_array: &'a [State<T>],
    index: usize,
}

// Transitions of a state in a product construction. None is a dead state
// that rejects everything.
type Moves<T> = Vec<(CharRange<T>, Option<usize>)>;

//
// Overlay two sorted lists of ranges that both cover the alphabet.
// Return the common refinement with the successors from each list.
//
fn overlay<T: Alphabet>(a: &Moves<T>, b: &Moves<T>) -> Vec<(CharRange<T>, Option<usize>, Option<usize>)> {
    use std::cmp::Ordering::*;

    let mut result = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        let (ra, na) = a[i];
        let (rb, nb) = b[j];
        let r = ra.intersect(&rb);
        if !r.is_empty() {
            result.push((r, na, nb));
        }
        match ra.high().cmp(&rb.high()) {
            Less => i += 1,
            Greater => j += 1,
            Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    result
}

impl<T: Alphabet> Automaton<T> {
    /// Get the initial state
    pub fn initial_state(&self) -> &State<T> {
        &self.states[self.initial_state]
    }

    /// Get a state from its id
    ///
    /// # Panics
    ///
    /// If the id is out of range
    pub fn state(&self, id: usize) -> &State<T> {
        &self.states[id]
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Number of final states
    pub fn num_final_states(&self) -> usize {
        self.num_final_states
    }

    /// Default successor of a state
    pub fn default_successor(&self, s: &State<T>) -> Option<&State<T>> {
        s.default_successor.map(|i| &self.states[i])
    }

    ///
    /// Successor for a symbol class
    ///
    /// Return None if the class id is not valid for `s`, or if `cid` is
    /// `Complement` and `s` has no default successor.
    ///
    pub fn class_next(&self, s: &State<T>, cid: ClassId) -> Option<&State<T>> {
        let i = match cid {
            ClassId::Interval(i) => s.successor.get(i).copied(),
            ClassId::Complement => s.default_successor,
        }?;
        Some(&self.states[i])
    }

    ///
    /// Successor of a state via a range of symbols
    ///
    /// Return Ok(None) if the range maps to no successor.
    ///
    /// # Errors
    ///
    /// If this set overlaps two or more successor classes,
    /// produce [Error::AmbiguousCharSet].
    ///
    pub fn char_set_next(&self, s: &State<T>, set: &CharRange<T>) -> Result<Option<&State<T>>, Error> {
        let cid = s.classes.class_of_set(set)?;
        Ok(self.class_next(s, cid))
    }

    ///
    /// Successor of a state via a symbol
    ///
    /// Return None if `s` has no transition for `c`.
    ///
    pub fn next(&self, s: &State<T>, c: T) -> Option<&State<T>> {
        let cid = s.classes.class_of_char(c);
        self.class_next(s, cid)
    }

    /// Successor of a state via a sequence of symbols
    pub fn seq_next<'a>(&'a self, s: &'a State<T>, seq: &[T]) -> Option<&'a State<T>> {
        seq.iter().try_fold(s, |s1, &c| self.next(s1, c))
    }

    /// Check whether a sequence is accepted
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::{automata::AutomatonBuilder, character_sets::CharRange};
    ///
    /// // sequences of digits
    /// let mut builder = AutomatonBuilder::new(&"start");
    /// builder
    ///     .add_transition(&"start", &CharRange::new(b'0', b'9'), &"start")
    ///     .mark_final(&"start");
    /// let a = builder.build_unchecked();
    ///
    /// assert!(a.accepts(b"2024"));
    /// assert!(a.accepts(b""));
    /// assert!(! a.accepts(b"20x4"));
    /// ```
    pub fn accepts(&self, seq: &[T]) -> bool {
        self.seq_next(self.initial_state(), seq)
            .map_or(false, |s| s.is_final)
    }

    /// Iterator to got through the states
    pub fn states(&self) -> impl Iterator<Item = &State<T>> {
        self.states.iter()
    }

    /// Iterator to list the out edges of a state
    ///
    /// The iterator produces a list of pairs (ClassId, SuccessorState)
    /// for every class in the state's partition.
    ///
    pub fn edges<'a>(&'a self, s: &'a State<T>) -> EdgeIterator<'a, T> {
        EdgeIterator {
            state_array: &self.states,
            state: s,
            index: 0,
        }
    }

    /// Iterator to list the final states
    pub fn final_states(&self) -> FinalStateIterator<'_, T> {
        FinalStateIterator {
            state_array: &self.states,
            index: 0,
        }
    }

    // all transitions from a state of a product: ranges cover the alphabet
    fn moves(&self, s: Option<usize>) -> Moves<T> {
        match s {
            None => vec![(CharRange::full(), None)],
            Some(i) => {
                let state = &self.states[i];
                let mut v: Moves<T> = state
                    .classes
                    .ranges()
                    .zip(state.successor.iter())
                    .map(|(r, &next)| (*r, Some(next)))
                    .collect();
                v.extend(
                    state
                        .classes
                        .gaps()
                        .into_iter()
                        .map(|r| (r, state.default_successor)),
                );
                v.sort_by_key(|x| x.0.low());
                v
            }
        }
    }

    fn is_final_or_dead(&self, s: Option<usize>) -> bool {
        s.map_or(false, |i| self.states[i].is_final)
    }

    ///
    /// Transitions of a state as a list of ranges
    ///
    /// The ranges are sorted, disjoint and cover the alphabet. Each range
    /// is paired with the id of the successor state, or None if the state
    /// rejects the symbols in this range.
    ///
    pub fn transitions(&self, s: &State<T>) -> Vec<(CharRange<T>, Option<usize>)> {
        self.moves(Some(s.id))
    }

    ///
    /// Check whether the automaton accepts no sequence
    ///
    /// This checks whether a final state is reachable from the initial state.
    ///
    pub fn is_empty(&self) -> bool {
        let mut queue = BfsQueue::start(self.initial_state);
        while let Some(i) = queue.pop() {
            let s = self.state(i);
            if s.is_final {
                return false;
            }
            for (_, next) in self.edges(s) {
                queue.push(next.id);
            }
        }
        true
    }

    ///
    /// Shortest accepted sequence
    ///
    /// Return None if the automaton is empty. Among sequences of minimal length,
    /// this picks the smallest symbol of a transition range at each step.
    ///
    pub fn sample(&self) -> Option<Vec<T>> {
        let mut queue = LabeledQueue::new(self.initial_state);
        while let Some(i) = queue.pop() {
            if self.states[i].is_final {
                return queue.path(&i);
            }
            for (r, next) in self.moves(Some(i)) {
                if let Some(j) = next {
                    queue.push(i, r.low(), j);
                }
            }
        }
        None
    }

    //
    // Build an automaton by exploring states of type K from init
    // - successors(k) must return transitions that cover the alphabet
    //
    fn explore<K: Eq + Hash + Clone>(
        init: K,
        mut successors: impl FnMut(&K) -> Vec<(CharRange<T>, K)>,
        is_final: impl Fn(&K) -> bool,
    ) -> Automaton<T> {
        let mut builder = AutomatonBuilder::new(&init);
        let mut queue = BfsQueue::start(init);
        while let Some(k) = queue.pop() {
            for (r, next) in successors(&k) {
                builder.add_transition(&k, &r, &next);
                queue.push(next);
            }
            if is_final(&k) {
                builder.mark_final(&k);
            }
        }
        builder.build_unchecked()
    }

    //
    // Product automaton: the final states are the pairs (s1, s2)
    // such that accept(s1 is final, s2 is final) is true.
    //
    fn product(&self, other: &Automaton<T>, accept: impl Fn(bool, bool) -> bool) -> Automaton<T> {
        let init = (Some(self.initial_state), Some(other.initial_state));
        let result = Self::explore(
            init,
            |&(a, b)| {
                overlay(&self.moves(a), &other.moves(b))
                    .into_iter()
                    .map(|(r, x, y)| (r, (x, y)))
                    .collect()
            },
            |&(a, b)| accept(self.is_final_or_dead(a), other.is_final_or_dead(b)),
        );
        debug!(
            left = self.num_states,
            right = other.num_states,
            states = result.num_states,
            "built product automaton"
        );
        result
    }

    ///
    /// Automaton that accepts the sequences rejected by this automaton
    ///
    pub fn complement(&self) -> Automaton<T> {
        Self::explore(
            Some(self.initial_state),
            |&a| self.moves(a),
            |&a| !self.is_final_or_dead(a),
        )
    }

    /// Automaton that accepts the sequences accepted by `self` or by `other`
    pub fn union(&self, other: &Automaton<T>) -> Automaton<T> {
        self.product(other, |x, y| x || y)
    }

    /// Automaton that accepts the sequences accepted by both `self` and `other`
    pub fn intersection(&self, other: &Automaton<T>) -> Automaton<T> {
        self.product(other, |x, y| x && y)
    }

    /// Automaton that accepts the sequences accepted by `self` but not by `other`
    pub fn difference(&self, other: &Automaton<T>) -> Automaton<T> {
        self.product(other, |x, y| x && !y)
    }

    ///
    /// Check whether two automata accept the same sequences
    ///
    /// # Example
    ///
    /// ```
    /// use bounded_regex::regular_expressions::ReManager;
    ///
    /// let re = &mut ReManager::<u8>::new();
    /// let a = re.char(b'a');
    /// let a_star = re.star(a);
    /// let a_plus = re.plus(a);
    /// let e = re.opt(a_plus);
    ///
    /// let d1 = re.compile(a_star);
    /// let d2 = re.compile(e);
    /// let d3 = re.compile(a_plus);
    /// assert!(d1.equivalent(&d2));
    /// assert!(! d1.equivalent(&d3));
    /// ```
    pub fn equivalent(&self, other: &Automaton<T>) -> bool {
        self.product(other, |x, y| x != y).is_empty()
    }

    ///
    /// Merge the state partitions and return the result.
    /// This returns an abstraction of the automaton's alphabet.
    ///
    /// Every class in the returned partition contains equivalent
    /// symbols: if c1 and c2 are in one class, then
    /// delta(s, c1) = delta(s, c2) for every state s of the automaton.
    ///
    pub fn combined_char_partition(&self) -> CharPartition<T> {
        merge_partition_list(self.states().map(|x| &x.classes))
    }

    /// Get a representative symbol in each class of the combined partition
    pub fn pick_alphabet(&self) -> Vec<T> {
        self.combined_char_partition().picks().collect()
    }
}

impl<T: Alphabet> State<T> {
    /// State id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Check whether a state is final
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Number of transitions, not including the default
    pub fn num_successors(&self) -> usize {
        self.classes.len()
    }

    /// Check whether a state has a default successor
    pub fn has_default_successor(&self) -> bool {
        self.default_successor.is_some()
    }

    /// Get the default successor
    pub fn default_successor(&self) -> Option<usize> {
        self.default_successor
    }

    /// Check whether a class id is valid for this state
    /// - a class id Interval(i) is valid if i < number of transitions
    /// - class id Complement is valid if the complementary class is not empty
    pub fn valid_class_id(&self, cid: ClassId) -> bool {
        self.classes.valid_class_id(cid)
    }

    /// Iterate through all valid class ids for this state
    pub fn char_classes(&self) -> ClassIdIterator<'_, T> {
        self.classes.class_ids()
    }

    /// Return the class id for a symbol
    pub fn class_of_char(&self, x: T) -> ClassId {
        self.classes.class_of_char(x)
    }

    /// Pick a symbol in each class of this state's partition
    pub fn char_picks(&self) -> PickIterator<'_, T> {
        self.classes.picks()
    }

    /// Iterate through the ranges defined for this state.
    ///
    /// Same as [char_classes](Self::char_classes), except that the
    /// complementary class is not included.
    pub fn char_ranges(&self) -> impl Iterator<Item = &CharRange<T>> {
        self.classes.ranges()
    }
}

impl<T: Alphabet> Display for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.id)
    }
}

impl<T: Alphabet> Display for Automaton<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn plural(n: usize) -> &'static str {
            if n == 1 {
                ""
            } else {
                "s"
            }
        }

        writeln!(f, "{} states", self.num_states)?;
        writeln!(f, "initial state: {}", self.initial_state())?;
        write!(f, "final state{}:", plural(self.num_final_states))?;
        for s in self.final_states() {
            write!(f, " {}", &s)?;
        }
        writeln!(f)?;
        writeln!(f, "transitions:")?;
        for s in self.states.iter() {
            for (c, &d) in s.char_ranges().zip(s.successor.iter()) {
                writeln!(f, "  \u{03B4}({s}, {c}) = s{d}")?;
            }
            if let Some(d) = s.default_successor {
                writeln!(f, "  \u{03B4}({s}, ...) = s{d}")?;
            }
        }
        writeln!(f)?;
        Ok(())
    }
}

impl<'a, T: Alphabet> Iterator for EdgeIterator<'a, T> {
    type Item = (ClassId, &'a State<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        let source = self.state;
        if i < source.num_successors() {
            self.index += 1;
            let next_id = source.successor[i];
            Some((ClassId::Interval(i), &self.state_array[next_id]))
        } else if i == source.num_successors() && !source.classes.empty_complement() {
            self.index += 1;
            let next_id = source.default_successor?;
            Some((ClassId::Complement, &self.state_array[next_id]))
        } else {
            None
        }
    }
}

impl<'a, T: Alphabet> Iterator for FinalStateIterator<'a, T> {
    type Item = &'a State<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut i = self.index;
        let a = self.state_array;
        while i < a.len() {
            if a[i].is_final {
                self.index = i + 1;
                return Some(&a[i]);
            }
            i += 1;
        }
        self.index = i;
        None
    }
}

#[derive(Debug)]
struct StateInConstruction<T> {
    is_final: bool,
    default_successor: Option<usize>,
    transitions: Vec<(CharRange<T>, usize)>,
}

impl<T: Alphabet> StateInConstruction<T> {
    fn new() -> Self {
        StateInConstruction {
            is_final: false,
            default_successor: None,
            transitions: Vec::new(),
        }
    }

    fn set_default_successor(&mut self, next_id: usize) {
        self.default_successor = Some(next_id);
    }

    fn add_transition(&mut self, set: &CharRange<T>, next_id: usize) {
        if !set.is_empty() {
            self.transitions.push((*set, next_id))
        }
    }

    // sort the transitions and merge adjacent ranges that have the same successor
    fn coalesce(&mut self) {
        self.transitions.sort_by_key(|x| x.0.low());
        let mut result: Vec<(CharRange<T>, usize)> = Vec::with_capacity(self.transitions.len());
        for &(r, next) in &self.transitions {
            match result.last_mut() {
                Some((last, n)) if *n == next && last.high().successor() == Some(r.low()) => {
                    *last = CharRange::new(last.low(), r.high());
                }
                _ => result.push((r, next)),
            }
        }
        self.transitions = result;
    }

    // choose a default successor for this state if there isn't one already
    // and the transitions cover the alphabet
    fn choose_default_successor(&mut self) {
        // Boyer-Moore maj: first pass
        // assumes s is not empty
        fn maj_candidate<T>(s: &[(CharRange<T>, usize)]) -> usize {
            let mut maj = s[0].1;
            let mut k = 1;
            for &(_, x) in &s[1..] {
                if k == 0 {
                    maj = x;
                    k = 1;
                } else if x == maj {
                    k += 1;
                } else {
                    k -= 1;
                }
            }
            maj
        }

        if self.default_successor.is_none() && !self.transitions.is_empty() {
            let ranges: Vec<CharRange<T>> = self.transitions.iter().map(|x| x.0).collect();
            if complement_ranges(&ranges).is_empty() {
                let m = maj_candidate(&self.transitions);
                let n = self.transitions.iter().filter(|x| x.1 == m).count();
                if n >= self.transitions.len() / 2 {
                    self.set_default_successor(m);
                }
            }
        }
    }

    fn remove_transitions_to_default(&mut self) {
        if let Some(i) = self.default_successor {
            self.transitions.retain(|x| x.1 != i)
        }
    }

    fn cleanup(&mut self) {
        self.coalesce();
        self.choose_default_successor();
        self.remove_transitions_to_default();
    }

    // transitions are sorted
    fn has_overlaps(&self) -> bool {
        self.transitions
            .windows(2)
            .any(|w| w[1].0.low() <= w[0].0.high())
    }

    // keep the first of overlapping transitions
    fn drop_overlaps(&mut self) {
        let mut last: Option<T> = None;
        self.transitions.retain(|(r, _)| {
            let keep = last.map_or(true, |h| h < r.low());
            if keep {
                last = Some(r.high());
            }
            keep
        });
    }

    // transitions must be sorted and disjoint
    fn make_state(&self, id: usize) -> State<T> {
        let mut classes = CharPartition::new();
        for (r, _) in &self.transitions {
            classes.push(r.low(), r.high());
        }
        let successor: Box<[usize]> = self.transitions.iter().map(|x| x.1).collect();
        State {
            id,
            is_final: self.is_final,
            classes,
            successor,
            default_successor: self.default_successor,
        }
    }
}

///
/// Automaton builder
///
/// States are identified by keys of type `K`. Each key is mapped to
/// a state id when it's first used. The initial state has id 0.
///
#[derive(Debug)]
pub struct AutomatonBuilder<K, T> {
    size: usize,
    id_map: HashMap<K, usize>,
    states: Vec<StateInConstruction<T>>,
}

impl<K: Eq + Hash + Clone, T: Alphabet> AutomatonBuilder<K, T> {
    fn get_state_id(&mut self, state: &K) -> usize {
        match self.id_map.get(state) {
            Some(i) => *i,
            None => {
                let i = self.size;
                let new_state = StateInConstruction::new();
                self.states.push(new_state);
                self.id_map.insert(state.clone(), i);
                self.size += 1;
                i
            }
        }
    }

    ///
    /// Create a new builder
    ///
    /// - initial_state = initial state for the resulting automaton
    ///
    pub fn new(initial_state: &K) -> Self {
        let mut new = AutomatonBuilder {
            size: 0,
            id_map: HashMap::new(),
            states: Vec::new(),
        };
        new.get_state_id(initial_state);
        new
    }

    ///
    /// Mark a final state
    ///
    pub fn mark_final(&mut self, state: &K) -> &mut Self {
        let i = self.get_state_id(state);
        self.states[i].is_final = true;
        self
    }

    ///
    /// Set the default successor of a state
    ///
    pub fn set_default_successor(&mut self, state: &K, next: &K) -> &mut Self {
        let i = self.get_state_id(state);
        let j = self.get_state_id(next);
        self.states[i].set_default_successor(j);
        self
    }

    ///
    /// Add a transition
    ///
    /// Empty ranges are ignored.
    ///
    pub fn add_transition(&mut self, state: &K, set: &CharRange<T>, next: &K) -> &mut Self {
        let i = self.get_state_id(state);
        let j = self.get_state_id(next);
        self.states[i].add_transition(set, j);
        self
    }

    ///
    /// Construct an automaton
    /// - fails if a state `s` has non-deterministic transitions,
    ///   i.e., if two distinct transitions from s have non-disjoint labels.
    /// - fails if a state `s` has a default successor but its transitions
    ///   already cover the full alphabet.
    /// - fails if a state `s` doesn't have a default successor but its
    ///   transitions do not cover the full alphabet.
    ///
    /// Adjacent ranges with the same successor are merged. If a state has no
    /// default successor and its transitions cover the alphabet, the most
    /// frequent successor becomes the default.
    ///
    pub fn build(&mut self) -> Result<Automaton<T>, Error> {
        let n = self.size;
        let mut num_final_states = 0;
        let mut state_array = Vec::with_capacity(n);
        for (i, s) in self.states.iter_mut().enumerate() {
            s.cleanup();
            if s.has_overlaps() {
                return Err(Error::NonDisjointCharSets);
            }
            let new_state = s.make_state(i);
            let empty_complement = new_state.classes.empty_complement();
            if s.default_successor.is_some() && empty_complement {
                return Err(Error::EmptyComplementaryClass);
            }
            if s.default_successor.is_none() && !empty_complement {
                return Err(Error::MissingDefaultSuccessor);
            }
            if s.is_final {
                num_final_states += 1;
            }
            state_array.push(new_state);
        }
        Ok(Automaton {
            num_states: n,
            num_final_states,
            initial_state: 0,
            states: state_array.into(),
        })
    }

    ///
    /// Build without checking
    ///
    /// Overlapping transitions are resolved in favor of the range with the
    /// smallest lower bound. Symbols not covered by any transition and
    /// without default successor are rejected.
    ///
    pub fn build_unchecked(&mut self) -> Automaton<T> {
        let num_states = self.size;
        let mut num_final_states = 0;
        let mut state_array = Vec::with_capacity(num_states);
        for (i, s) in self.states.iter_mut().enumerate() {
            s.cleanup();
            s.drop_overlaps();
            if s.is_final {
                num_final_states += 1;
            }
            state_array.push(s.make_state(i));
        }
        Automaton {
            num_states,
            num_final_states,
            initial_state: 0,
            states: state_array.into(),
        }
    }
}
