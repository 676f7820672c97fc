// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Error codes
//!
//! [Error] covers operations on alphabets, partitions, regular expressions,
//! and automata. [ParseError] is returned by the regular expression parser.
//!

use thiserror::Error;

///
/// Error codes produced by operations on partitions, regular expressions, and automata
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum Error {
    /// The derivative of R with respect to a character range C is not defined.
    ///
    /// This means that C is not included in a derivative class of R (i.e., it
    /// overlaps several classes).
    #[error("undefined derivative")]
    UndefinedDerivative,

    /// The complementary class of a regular expression R is empty
    ///
    /// The deriv classes of R consists of a set of disjoint
    /// intervals C<sub>0</sub>, ... C<sub>n-1</sub> and an implicit complementary
    /// class equal to complement (Union(C<sub>0</sub>, ..., C<sub>n-1</sub>)).
    /// It's an error to try to compute the derivative of R with respect
    /// to the complementary class if it is empty.
    #[error("empty complementary class")]
    EmptyComplementaryClass,

    /// The class id of a [CharRange][crate::character_sets::CharRange] `s` in a
    /// [CharPartition][crate::character_sets::CharPartition] `p` is not defined.
    ///
    /// This means that `s` overlaps a class of `p` but is not contained in that class.
    #[error("character range not contained in a single partition class")]
    AmbiguousCharSet,

    /// Bad class id for a [CharPartition][crate::character_sets::CharPartition].
    ///
    /// A bad class id is either of the form `ClassId::Interval(i)` where `i` is out of bound,
    /// or `ClassId::Complement` where the complementary class is empty.
    #[error("bad class id")]
    BadClassId,

    /// Error reported where a list of disjoint ranges is expected.
    #[error("expected disjoint character ranges")]
    NonDisjointCharSets,

    /// No default successor specified for an automaton state when one is required.
    #[error("a default successor is required")]
    MissingDefaultSuccessor,

    /// The alphabet type has inconsistent bounds (e.g., `MIN > MAX`).
    #[error("invalid alphabet: bounds are empty or inconsistent")]
    InvalidAlphabet,
}

///
/// Syntax errors reported by the parser
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ParseErrorKind {
    /// Missing `)` or unexpected `)`
    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,
    /// Missing `]`
    #[error("unterminated character class")]
    UnterminatedClass,
    /// `[]` or `[^]`
    #[error("empty character class")]
    EmptyClass,
    /// `a|` or `|a`
    #[error("empty alternative")]
    EmptyAlternative,
    /// `()`
    #[error("empty group")]
    EmptyGroup,
    /// Quantifier with no operand (e.g., `*`, `(+a)`, `a**`)
    #[error("quantifier without operand")]
    NothingToRepeat,
    /// Bad syntax in `{n,m}`
    #[error("malformed quantifier")]
    MalformedQuantifier,
    /// `{n,m}` with `m < n`
    #[error("invalid repeat bounds {{{min},{max}}}")]
    InvalidRepeatBounds {
        /// lower bound
        min: u32,
        /// upper bound
        max: u32,
    },
    /// Repeat bound larger than the configured limit
    #[error("repeat bound {bound} exceeds the limit {limit}")]
    RepeatTooLarge {
        /// bound in the pattern
        bound: u32,
        /// configured limit
        limit: u32,
    },
    /// Groups nested deeper than the configured limit
    #[error("groups nested deeper than {limit}")]
    NestingTooDeep {
        /// configured limit
        limit: u32,
    },
    /// `[` inside a character class
    #[error("unescaped '[' in character class")]
    UnescapedBracket,
    /// Unknown escape sequence
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    /// `\` at the end of the pattern
    #[error("trailing backslash")]
    TrailingBackslash,
    /// Symbol that can't be mapped to the alphabet
    #[error("symbol {0:?} is outside the alphabet")]
    SymbolOutOfRange(char),
    /// Class range `[b-a]`
    #[error("invalid class range {0:?}-{1:?}")]
    InvalidClassRange(char, char),
    /// `^` or `$` not at the start or end of a top-level branch
    #[error("misplaced anchor")]
    MisplacedAnchor,
    /// The target alphabet is malformed
    #[error("invalid alphabet")]
    InvalidAlphabet,
}

///
/// Parser error: kind and byte offset in the pattern
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("syntax error at offset {position}: {kind}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Byte offset in the pattern
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: usize) -> Self {
        ParseError { kind, position }
    }
}
