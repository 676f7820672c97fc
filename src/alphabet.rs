// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Bounded, ordered alphabets
//!
//! Regular expressions and automata in this crate are defined over an
//! alphabet type `T`. The only requirements on `T` are a total order, a
//! smallest element [Alphabet::MIN], a largest element [Alphabet::MAX],
//! and successor/predecessor functions. All fixed-width integer types and `char`
//! satisfy these requirements. Other alphabets can be defined by implementing
//! [Alphabet]; for example, 9-bit signed integers are available as
//! [BoundedInt]`<-256, 255>`.
//!
//! Types without finite bounds (e.g., arbitrary-precision integers or strings)
//! cannot implement [Alphabet] and are rejected at compile time.
//!

use std::{fmt::Debug, hash::Hash};

use crate::errors::Error;

///
/// Finite, totally ordered symbol type
///
/// Implementations must satisfy:
/// - `MIN <= x <= MAX` for every value `x`
/// - `x.successor()` is the smallest value larger than `x`, or `None` if `x == MAX`
/// - `x.predecessor()` is the largest value smaller than `x`, or `None` if `x == MIN`
///
pub trait Alphabet: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Smallest symbol
    const MIN: Self;
    /// Largest symbol
    const MAX: Self;

    /// Next symbol in increasing order
    fn successor(self) -> Option<Self>;

    /// Previous symbol in increasing order
    fn predecessor(self) -> Option<Self>;
}

macro_rules! integer_alphabet {
    ($($t:ty),*) => {
        $(
            impl Alphabet for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                fn successor(self) -> Option<Self> {
                    self.checked_add(1)
                }

                fn predecessor(self) -> Option<Self> {
                    self.checked_sub(1)
                }
            }
        )*
    };
}

integer_alphabet!(u8, u16, u32, u64, i8, i16, i32, i64);

// surrogate code points are not chars
const LAST_BEFORE_SURROGATES: u32 = 0xD7FF;
const FIRST_AFTER_SURROGATES: u32 = 0xE000;

impl Alphabet for char {
    const MIN: Self = '\0';
    const MAX: Self = char::MAX;

    fn successor(self) -> Option<Self> {
        match self as u32 {
            LAST_BEFORE_SURROGATES => char::from_u32(FIRST_AFTER_SURROGATES),
            x => char::from_u32(x + 1),
        }
    }

    fn predecessor(self) -> Option<Self> {
        match self as u32 {
            0 => None,
            FIRST_AFTER_SURROGATES => char::from_u32(LAST_BEFORE_SURROGATES),
            x => char::from_u32(x - 1),
        }
    }
}

///
/// Integers in the interval `[LO, HI]`
///
/// This is used to define alphabets of odd widths, such as 9-bit signed
/// integers (`BoundedInt<-256, 255>`) or 3-bit unsigned integers (`BoundedInt<0, 7>`).
///
/// # Example
///
/// ```
/// use bounded_regex::alphabet::{Alphabet, BoundedInt};
///
/// type I9 = BoundedInt<-256, 255>;
///
/// assert_eq!(I9::MIN.value(), -256);
/// assert_eq!(I9::MAX.value(), 255);
/// assert!(I9::new(256).is_none());
/// assert_eq!(I9::new(12).and_then(|x| x.successor()), I9::new(13));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedInt<const LO: i64, const HI: i64>(i64);

impl<const LO: i64, const HI: i64> BoundedInt<LO, HI> {
    /// Construct a bounded integer
    ///
    /// Return None if `x` is outside `[LO, HI]`.
    pub fn new(x: i64) -> Option<Self> {
        if LO <= x && x <= HI {
            Some(BoundedInt(x))
        } else {
            None
        }
    }

    /// Integer value
    pub fn value(self) -> i64 {
        self.0
    }
}

impl<const LO: i64, const HI: i64> Debug for BoundedInt<LO, HI> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const LO: i64, const HI: i64> Alphabet for BoundedInt<LO, HI> {
    const MIN: Self = BoundedInt(LO);
    const MAX: Self = BoundedInt(HI);

    fn successor(self) -> Option<Self> {
        if self.0 < HI {
            Some(BoundedInt(self.0 + 1))
        } else {
            None
        }
    }

    fn predecessor(self) -> Option<Self> {
        if self.0 > LO {
            Some(BoundedInt(self.0 - 1))
        } else {
            None
        }
    }
}

///
/// Check that an alphabet type is well formed
///
/// The alphabet must be non-empty (`MIN <= MAX`) and its bounds must be
/// consistent with the successor/predecessor functions.
///
/// # Errors
///
/// Return Err([Error::InvalidAlphabet]) if the check fails.
///
/// # Example
///
/// ```
/// use bounded_regex::alphabet::{validate, BoundedInt};
/// use bounded_regex::errors::Error;
///
/// assert!(validate::<u8>().is_ok());
/// assert_eq!(validate::<BoundedInt<5, 3>>(), Err(Error::InvalidAlphabet));
/// ```
pub fn validate<T: Alphabet>() -> Result<(), Error> {
    if T::MIN <= T::MAX && T::MIN.predecessor().is_none() && T::MAX.successor().is_none() {
        Ok(())
    } else {
        Err(Error::InvalidAlphabet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(u8::MIN.predecessor(), None);
        assert_eq!(u8::MAX.successor(), None);
        assert_eq!(10u8.successor(), Some(11));
        assert_eq!(i16::MIN.predecessor(), None);
        assert_eq!((-1i16).successor(), Some(0));
        assert!(validate::<u8>().is_ok());
        assert!(validate::<i64>().is_ok());
        assert!(validate::<u64>().is_ok());
    }

    #[test]
    fn test_chars() {
        assert_eq!('a'.successor(), Some('b'));
        assert_eq!('\u{D7FF}'.successor(), Some('\u{E000}'));
        assert_eq!('\u{E000}'.predecessor(), Some('\u{D7FF}'));
        assert_eq!(char::MAX.successor(), None);
        assert_eq!('\0'.predecessor(), None);
        assert!(validate::<char>().is_ok());
    }

    #[test]
    fn test_bounded_int() {
        type I9 = BoundedInt<-256, 255>;
        assert!(validate::<I9>().is_ok());
        assert_eq!(I9::MIN.predecessor(), None);
        assert_eq!(I9::MAX.successor(), None);
        assert_eq!(I9::new(-256), Some(I9::MIN));
        assert_eq!(I9::new(-257), None);
        assert_eq!(format!("{:?}", I9::MAX), "255");

        assert_eq!(validate::<BoundedInt<5, 3>>(), Err(Error::InvalidAlphabet));
        assert!(validate::<BoundedInt<0, 0>>().is_ok());
    }
}
