// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Parser for the usual textual syntax of regular expressions
//!
//! The grammar is:
//! ```text
//! regex      := branch ('|' branch)*
//! branch     := piece*
//! piece      := atom quantifier?
//! quantifier := '*' | '+' | '?' | '{' INT (',' INT?)? '}'
//! atom       := CHAR | '.' | '(' regex ')' | '[' class ']' | '\' ESCAPE | '^' | '$'
//! class      := '^'? classitem+
//! classitem  := CHAR | CHAR '-' CHAR
//! ```
//!
//! Anchors `^` and `$` may only occur at the start and end of a top-level branch.
//! A branch without `^` can start anywhere in the input sequence and a branch
//! without `$` can end anywhere: the unanchored side is padded with the
//! full language. With [ParseOptions::anchored], all branches must match the
//! entire sequence.
//!
//! Groups may be nested at most [ParseOptions::max_nesting] deep.
//!
//! Symbols of the pattern are mapped to the target alphabet by a projection
//! function. [parse_ascii] and [parse] use the byte and `char` alphabets.
//!
//! # Example
//!
//! ```
//! use bounded_regex::{parser::parse_ascii, regular_expressions::ReManager};
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let re = &mut ReManager::new();
//! let e = parse_ascii(re, r"^\d{3}-\d{4}$")?;
//!
//! assert!(re.is_match(e, b"555-1234"));
//! assert!(! re.is_match(e, b"555-12345"));
//!
//! let e = parse_ascii(re, "(ab)+")?;
//! assert!(re.is_match(e, b"xxababyy"));
//! # Ok(())
//! # }
//! ```

use tracing::{debug, trace};

use crate::{
    alphabet::{self, Alphabet},
    character_sets::{complement_ranges, CharRange},
    errors::{ParseError, ParseErrorKind},
    regular_expressions::{ReManager, Regex},
};

///
/// Parser configuration
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether every branch must match the full sequence (as if
    /// enclosed in `^...$`)
    pub anchored: bool,
    /// Largest bound allowed in `{n,m}`
    pub max_repeat: u32,
    /// Largest number of nested groups
    pub max_nesting: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            anchored: false,
            max_repeat: 1000,
            max_nesting: 250,
        }
    }
}

impl ParseOptions {
    /// Set full-match mode
    pub fn anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    /// Set the repeat limit
    pub fn max_repeat(mut self, limit: u32) -> Self {
        self.max_repeat = limit;
        self
    }

    /// Set the group nesting limit
    pub fn max_nesting(mut self, limit: u32) -> Self {
        self.max_nesting = limit;
        self
    }
}

// Result of an escape sequence: a single symbol or a predefined class
enum Escaped {
    Symbol(char),
    Class {
        letter: char,
        ranges: &'static [(char, char)],
        negated: bool,
    },
}

const DIGITS: &[(char, char)] = &[('0', '9')];
const WORD: &[(char, char)] = &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')];
const SPACE: &[(char, char)] = &[('\t', '\r'), (' ', ' ')];

// A top-level or group alternative before anchoring
struct Branch<T: Alphabet> {
    offset: usize,
    pieces: Vec<Regex<T>>,
    start_anchor: bool,
    end_anchor: bool,
}

impl<T: Alphabet> Branch<T> {
    fn is_empty(&self) -> bool {
        self.pieces.is_empty() && !self.start_anchor && !self.end_anchor
    }
}

///
/// Recursive-descent parser
///
/// - T: target alphabet
/// - F: projection from pattern characters to T
///
struct Parser<'a, T: Alphabet, F> {
    manager: &'a mut ReManager<T>,
    projection: F,
    options: &'a ParseOptions,
    input: Vec<(usize, char)>,
    end: usize,
    pos: usize,
    // number of open groups
    depth: u32,
}

impl<'a, T, F> Parser<'a, T, F>
where
    T: Alphabet,
    F: Fn(char) -> Option<T>,
{
    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).map(|x| x.1)
    }

    fn peek_second(&self) -> Option<char> {
        self.input.get(self.pos + 1).map(|x| x.1)
    }

    // byte offset of the current character
    fn offset(&self) -> usize {
        self.input.get(self.pos).map_or(self.end, |x| x.0)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn symbol(&self, c: char, at: usize) -> Result<T, ParseError> {
        (self.projection)(c).ok_or_else(|| ParseError::new(ParseErrorKind::SymbolOutOfRange(c), at))
    }

    fn project_range(&self, low: char, high: char, at: usize) -> Result<CharRange<T>, ParseError> {
        Ok(CharRange::new(self.symbol(low, at)?, self.symbol(high, at)?))
    }

    // regex := branch ('|' branch)*
    fn parse_regex(&mut self, top: bool) -> Result<Regex<T>, ParseError> {
        let mut branches = vec![self.parse_branch(top)?];
        while self.eat('|') {
            branches.push(self.parse_branch(top)?);
        }
        if branches.len() > 1 {
            if let Some(b) = branches.iter().find(|b| b.is_empty()) {
                return Err(ParseError::new(ParseErrorKind::EmptyAlternative, b.offset));
            }
        }
        let mut alternatives = Vec::with_capacity(branches.len());
        for b in branches {
            alternatives.push(self.finish_branch(b, top));
        }
        Ok(self.manager.union_list(alternatives))
    }

    // branch := piece*
    fn parse_branch(&mut self, top: bool) -> Result<Branch<T>, ParseError> {
        let mut branch = Branch {
            offset: self.offset(),
            pieces: Vec::new(),
            start_anchor: false,
            end_anchor: false,
        };
        loop {
            let at = self.offset();
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some('^') => {
                    if !top || !branch.pieces.is_empty() || branch.start_anchor {
                        return Err(ParseError::new(ParseErrorKind::MisplacedAnchor, at));
                    }
                    self.pos += 1;
                    branch.start_anchor = true;
                }
                Some('$') => {
                    self.pos += 1;
                    if !top || !matches!(self.peek(), None | Some('|')) {
                        return Err(ParseError::new(ParseErrorKind::MisplacedAnchor, at));
                    }
                    branch.end_anchor = true;
                }
                Some('*') | Some('+') | Some('?') | Some('{') => {
                    return Err(ParseError::new(ParseErrorKind::NothingToRepeat, at));
                }
                Some(_) => {
                    let atom = self.parse_atom()?;
                    let piece = self.parse_quantifier(atom)?;
                    branch.pieces.push(piece);
                }
            }
        }
        Ok(branch)
    }

    // concatenate the pieces and pad the unanchored sides of a top-level branch
    fn finish_branch(&mut self, b: Branch<T>, top: bool) -> Regex<T> {
        let body = self.manager.concat_list(b.pieces);
        if !top || self.options.anchored {
            return body;
        }
        let all = self.manager.all();
        let left = if b.start_anchor {
            body
        } else {
            self.manager.concat(all, body)
        };
        if b.end_anchor {
            left
        } else {
            self.manager.concat(left, all)
        }
    }

    fn parse_atom(&mut self) -> Result<Regex<T>, ParseError> {
        let at = self.offset();
        match self.next_char() {
            Some('.') => Ok(self.manager.dot()),
            Some('(') => self.parse_group(at),
            Some('[') => self.parse_class(at),
            Some('\\') => match self.parse_escape(at)? {
                Escaped::Symbol(c) => {
                    let x = self.symbol(c, at)?;
                    Ok(self.manager.char(x))
                }
                Escaped::Class {
                    ranges, negated, ..
                } => {
                    let v = self.project_class(ranges, at)?;
                    if negated {
                        Ok(self.manager.char_class_complement(&v))
                    } else {
                        Ok(self.manager.char_class(&v))
                    }
                }
            },
            Some(c) => {
                let x = self.symbol(c, at)?;
                Ok(self.manager.char(x))
            }
            None => Err(ParseError::new(ParseErrorKind::EmptyAlternative, at)),
        }
    }

    // after '('
    fn parse_group(&mut self, open: usize) -> Result<Regex<T>, ParseError> {
        if self.peek() == Some(')') {
            return Err(ParseError::new(ParseErrorKind::EmptyGroup, open));
        }
        let limit = self.options.max_nesting;
        if self.depth >= limit {
            return Err(ParseError::new(ParseErrorKind::NestingTooDeep { limit }, open));
        }
        self.depth += 1;
        let r = self.parse_regex(false)?;
        self.depth -= 1;
        if self.eat(')') {
            Ok(r)
        } else {
            Err(ParseError::new(ParseErrorKind::UnbalancedParenthesis, open))
        }
    }

    fn project_class(&self, ranges: &[(char, char)], at: usize) -> Result<Vec<CharRange<T>>, ParseError> {
        ranges
            .iter()
            .map(|&(low, high)| self.project_range(low, high, at))
            .collect()
    }

    // after '['
    fn parse_class(&mut self, open: usize) -> Result<Regex<T>, ParseError> {
        let negated = self.eat('^');
        let mut ranges: Vec<CharRange<T>> = Vec::new();
        let mut empty = true;
        loop {
            let at = self.offset();
            let low = match self.next_char() {
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedClass, open)),
                Some(']') => {
                    if empty {
                        return Err(ParseError::new(ParseErrorKind::EmptyClass, open));
                    }
                    break;
                }
                Some('[') => return Err(ParseError::new(ParseErrorKind::UnescapedBracket, at)),
                Some('\\') => match self.parse_escape(at)? {
                    Escaped::Symbol(c) => c,
                    Escaped::Class {
                        ranges: r, negated: n, ..
                    } => {
                        let v = self.project_class(r, at)?;
                        if n {
                            ranges.extend(complement_ranges(&v));
                        } else {
                            ranges.extend(v);
                        }
                        empty = false;
                        continue;
                    }
                },
                Some(c) => c,
            };
            empty = false;
            // a '-' just before ']' is a literal
            if self.peek() == Some('-') && !matches!(self.peek_second(), None | Some(']')) {
                self.pos += 1;
                let high_at = self.offset();
                let high = match self.next_char() {
                    Some('\\') => match self.parse_escape(high_at)? {
                        Escaped::Symbol(c) => c,
                        Escaped::Class { letter, .. } => {
                            return Err(ParseError::new(ParseErrorKind::InvalidEscape(letter), high_at))
                        }
                    },
                    Some('[') => {
                        return Err(ParseError::new(ParseErrorKind::UnescapedBracket, high_at))
                    }
                    Some(c) => c,
                    None => return Err(ParseError::new(ParseErrorKind::UnterminatedClass, open)),
                };
                let range = self.project_range(low, high, at)?;
                if range.is_empty() {
                    return Err(ParseError::new(ParseErrorKind::InvalidClassRange(low, high), at));
                }
                ranges.push(range);
            } else {
                let x = self.symbol(low, at)?;
                ranges.push(CharRange::singleton(x));
            }
        }
        if negated {
            Ok(self.manager.char_class_complement(&ranges))
        } else {
            Ok(self.manager.char_class(&ranges))
        }
    }

    // after '\'
    fn parse_escape(&mut self, at: usize) -> Result<Escaped, ParseError> {
        let c = self
            .next_char()
            .ok_or_else(|| ParseError::new(ParseErrorKind::TrailingBackslash, at))?;
        let class = |ranges, negated| Escaped::Class {
            letter: c,
            ranges,
            negated,
        };
        let result = match c {
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' | '^' | '$'
            | '-' => Escaped::Symbol(c),
            'n' => Escaped::Symbol('\n'),
            't' => Escaped::Symbol('\t'),
            'r' => Escaped::Symbol('\r'),
            'f' => Escaped::Symbol('\x0C'),
            'v' => Escaped::Symbol('\x0B'),
            '0' => Escaped::Symbol('\0'),
            'x' => Escaped::Symbol(self.parse_hex_escape(at)?),
            'u' => Escaped::Symbol(self.parse_unicode_escape(at)?),
            'd' => class(DIGITS, false),
            'D' => class(DIGITS, true),
            'w' => class(WORD, false),
            'W' => class(WORD, true),
            's' => class(SPACE, false),
            'S' => class(SPACE, true),
            _ => return Err(ParseError::new(ParseErrorKind::InvalidEscape(c), at)),
        };
        Ok(result)
    }

    // \xHH: exactly two hex digits
    fn parse_hex_escape(&mut self, at: usize) -> Result<char, ParseError> {
        let mut code = 0;
        for _ in 0..2 {
            let d = self
                .next_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidEscape('x'), at))?;
            code = code * 16 + d;
        }
        char::from_u32(code).ok_or_else(|| ParseError::new(ParseErrorKind::InvalidEscape('x'), at))
    }

    // \u{H..}: one to six hex digits
    fn parse_unicode_escape(&mut self, at: usize) -> Result<char, ParseError> {
        let error = || ParseError::new(ParseErrorKind::InvalidEscape('u'), at);
        if !self.eat('{') {
            return Err(error());
        }
        let mut code: u32 = 0;
        let mut digits = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
            self.pos += 1;
            digits += 1;
            if digits > 6 {
                return Err(error());
            }
            code = code * 16 + d;
        }
        if digits == 0 || !self.eat('}') {
            return Err(error());
        }
        char::from_u32(code).ok_or_else(error)
    }

    fn parse_int(&mut self, open: usize) -> Result<u32, ParseError> {
        let malformed = || ParseError::new(ParseErrorKind::MalformedQuantifier, open);
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            self.pos += 1;
            let v = value.unwrap_or(0);
            value = Some(
                v.checked_mul(10)
                    .and_then(|x| x.checked_add(d))
                    .ok_or_else(malformed)?,
            );
        }
        value.ok_or_else(malformed)
    }

    // after '{': INT (',' INT?)? '}'
    fn parse_bounds(&mut self, open: usize) -> Result<(u32, Option<u32>), ParseError> {
        let min = self.parse_int(open)?;
        if self.eat('}') {
            return Ok((min, Some(min)));
        }
        if !self.eat(',') {
            return Err(ParseError::new(ParseErrorKind::MalformedQuantifier, open));
        }
        if self.eat('}') {
            return Ok((min, None));
        }
        let max = self.parse_int(open)?;
        if self.eat('}') {
            Ok((min, Some(max)))
        } else {
            Err(ParseError::new(ParseErrorKind::MalformedQuantifier, open))
        }
    }

    fn parse_quantifier(&mut self, atom: Regex<T>) -> Result<Regex<T>, ParseError> {
        let at = self.offset();
        let result = match self.peek() {
            Some('*') => {
                self.pos += 1;
                self.manager.star(atom)
            }
            Some('+') => {
                self.pos += 1;
                self.manager.plus(atom)
            }
            Some('?') => {
                self.pos += 1;
                self.manager.opt(atom)
            }
            Some('{') => {
                self.pos += 1;
                let (min, max) = self.parse_bounds(at)?;
                if let Some(m) = max {
                    if m < min {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidRepeatBounds { min, max: m },
                            at,
                        ));
                    }
                }
                let limit = self.options.max_repeat;
                let bound = max.unwrap_or(min).max(min);
                if bound > limit {
                    return Err(ParseError::new(
                        ParseErrorKind::RepeatTooLarge { bound, limit },
                        at,
                    ));
                }
                self.manager.repeat(atom, min, max)
            }
            _ => atom,
        };
        Ok(result)
    }
}

///
/// Parse a regular expression with a projection and options
///
/// Every character of the pattern (including characters obtained from escape
/// sequences and the ends of class ranges) is mapped to the alphabet `T` by
/// `projection`. A character mapped to None is a syntax error.
///
/// # Errors
///
/// Return a [ParseError] that gives the kind and byte offset of the first error.
///
/// # Example
///
/// ```
/// use bounded_regex::{parser::*, regular_expressions::ReManager};
///
/// let re = &mut ReManager::<u8>::new();
/// let options = ParseOptions::default().anchored(true);
/// let e = parse_with_options(re, "a+b", |c| u8::try_from(c).ok(), &options).unwrap();
///
/// assert!(re.is_match(e, b"aab"));
/// assert!(! re.is_match(e, b"aabc"));
/// ```
pub fn parse_with_options<T, F>(
    manager: &mut ReManager<T>,
    text: &str,
    projection: F,
    options: &ParseOptions,
) -> Result<Regex<T>, ParseError>
where
    T: Alphabet,
    F: Fn(char) -> Option<T>,
{
    trace!(pattern = text, "parse");
    alphabet::validate::<T>().map_err(|_| ParseError::new(ParseErrorKind::InvalidAlphabet, 0))?;
    let mut parser = Parser {
        manager,
        projection,
        options,
        input: text.char_indices().collect(),
        end: text.len(),
        pos: 0,
        depth: 0,
    };
    let result = parser.parse_regex(true).and_then(|r| match parser.peek() {
        None => Ok(r),
        Some(_) => Err(ParseError::new(
            ParseErrorKind::UnbalancedParenthesis,
            parser.offset(),
        )),
    });
    match &result {
        Ok(r) => trace!(pattern = text, regex = %r, "parse done"),
        Err(e) => debug!(pattern = text, error = %e, "rejected pattern"),
    }
    result
}

/// Parse a regular expression with a projection and default options
pub fn parse_with<T, F>(manager: &mut ReManager<T>, text: &str, projection: F) -> Result<Regex<T>, ParseError>
where
    T: Alphabet,
    F: Fn(char) -> Option<T>,
{
    parse_with_options(manager, text, projection, &ParseOptions::default())
}

/// Parse a regular expression over `char`
pub fn parse(manager: &mut ReManager<char>, text: &str) -> Result<Regex<char>, ParseError> {
    parse_with(manager, text, Some)
}

/// Parse a regular expression over bytes
///
/// Only ASCII characters are allowed in the pattern.
pub fn parse_ascii(manager: &mut ReManager<u8>, text: &str) -> Result<Regex<u8>, ParseError> {
    parse_with(manager, text, |c| if c.is_ascii() { Some(c as u8) } else { None })
}
