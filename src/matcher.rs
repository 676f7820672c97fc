// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Search for a pattern in a sequence s. The pattern can be a sequence
//! or a regular expression.
//!

use crate::{alphabet::Alphabet, regular_expressions::*};

///
/// Result of a search for pattern p in sequence s:
///
/// NotFound -> no match
/// Found(i, j) -> s[i .. j-1] matches the pattern p
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// Match at s[i .. j-1]
    Found(usize, usize),
    /// No match
    NotFound,
}

///
/// Search for the first occurrence of pattern in seq starting from index k
///
/// - Return NotFound if pattern does not occur in seq[k ... len(seq) - 1]
/// - Return Found(i, j) if seq[i ... j-1] equals pattern (so j = i+len(pattern))
///   and i is the smallest index >= k that satisfies these conditions
///
/// # Example
///
/// ```
/// use bounded_regex::matcher::*;
///
/// assert_eq!(naive_search(b"na", b"banana", 0), SearchResult::Found(2, 4));
/// assert_eq!(naive_search(b"na", b"banana", 3), SearchResult::Found(4, 6));
/// assert_eq!(naive_search(b"nab", b"banana", 0), SearchResult::NotFound);
/// ```
pub fn naive_search<T: PartialEq>(pattern: &[T], seq: &[T], k: usize) -> SearchResult {
    let p_len = pattern.len();
    let s_len = seq.len();
    let mut i = k;
    while i + p_len <= s_len {
        if seq[i..i + p_len] == *pattern {
            return SearchResult::Found(i, i + p_len);
        }
        i += 1;
    }
    SearchResult::NotFound
}

///
/// Search for the first occurrence of a regular expression in seq starting from index k
/// - If allow_empty is true, an empty match may be returned (if the pattern is nullable)
///
/// - Return NotFound if pattern does not occur in seq[k ... len(seq) - 1]
/// - Return Found(i, j) if seq[i ... j-1] matches the pattern
///   and i is the smallest index >= k that satisfies these conditions,
///   and j is the smallest end for this i
///
pub fn re_search<T: Alphabet>(
    manager: &mut ReManager<T>,
    pattern: Regex<T>,
    seq: &[T],
    k: usize,
    allow_empty: bool,
) -> SearchResult {
    if allow_empty && pattern.nullable && k <= seq.len() {
        return SearchResult::Found(k, k);
    }
    let s_len = seq.len();
    for i in k..s_len {
        // check for a non-empty match starting at index i
        let mut p = pattern;
        for (j, &c) in seq.iter().enumerate().skip(i) {
            // p = derivative(pattern, seq[i .. j])
            // if p is nullable: found a match
            // if p is empty: no extension of seq[i .. j] can match
            p = manager.char_derivative(p, c);
            if p.nullable {
                return SearchResult::Found(i, j + 1);
            }
            if p.is_empty() {
                break;
            }
        }
    }
    SearchResult::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_sequences() {
        let s = [1, 2, 3, 1, 2, 3, 4];
        assert_eq!(naive_search(&[2, 3], &s, 0), SearchResult::Found(1, 3));
        assert_eq!(naive_search(&[2, 3], &s, 2), SearchResult::Found(4, 6));
        assert_eq!(naive_search(&[3, 4], &s, 0), SearchResult::Found(5, 7));
        assert_eq!(naive_search(&[4, 1], &s, 0), SearchResult::NotFound);
        assert_eq!(naive_search(&[], &s, 7), SearchResult::Found(7, 7));
        assert_eq!(naive_search(&[1], &s, 9), SearchResult::NotFound);
    }

    #[test]
    fn search_regex() {
        let re = &mut ReManager::<u8>::new();
        let digit = re.range(b'0', b'9');
        let digits = re.star(digit);
        let number = re.plus(digit);
        let s = b"ab12c345";

        for k in 0..s.len() {
            let r = re_search(re, number, s, k, false);
            println!("search from {k}: {r:?}");
        }
        assert_eq!(re_search(re, number, s, 0, false), SearchResult::Found(2, 3));
        assert_eq!(re_search(re, number, s, 4, false), SearchResult::Found(5, 6));
        assert_eq!(re_search(re, digits, s, 1, true), SearchResult::Found(1, 1));
        assert_eq!(re_search(re, digits, s, 0, false), SearchResult::Found(2, 3));

        let ab = re.sequence(b"c3");
        assert_eq!(re.find(ab, s, 0, false), SearchResult::Found(4, 6));
        assert_eq!(re.find(ab, s, 5, false), SearchResult::NotFound);
        assert_eq!(re.find(re.empty(), s, 0, true), SearchResult::NotFound);
    }
}
