//! Generation counter for the mapping table.
//!
//! A [`Generation`] is a 32-bit logical clock.  Zero identifies a freshly
//! created history and is never handed out again: advancing past
//! `u32::MAX` wraps to 1.  All ordering questions go through
//! [`Generation::in_range_inclusive`] so comparisons stay correct after
//! the counter wraps.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u32);

impl Generation {
    /// The generation of an empty, never-mutated history.
    pub const ZERO: Generation = Generation(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The generation following this one.
    pub const fn next(self) -> Self {
        match self.0.wrapping_add(1) {
            0 => Self(1),
            v => Self(v),
        }
    }

    /// Whether `self` lies between `first` and `last`, both inclusive,
    /// walking forward from `first` (possibly across the wrap point).
    pub fn in_range_inclusive(self, first: Generation, last: Generation) -> bool {
        if first.0 <= last.0 {
            first.0 <= self.0 && self.0 <= last.0
        } else {
            self.0 >= first.0 || self.0 <= last.0
        }
    }

    /// Number of [`next`](Self::next) steps needed to get from `from` to `to`.
    pub fn distance(from: Generation, to: Generation) -> u32 {
        if from.0 <= to.0 {
            to.0 - from.0
        } else {
            // crossing the wrap point skips zero
            to.0.wrapping_sub(from.0) - 1
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Generation {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_advances_by_one() {
        assert_eq!(Generation::ZERO.next(), Generation::new(1));
        assert_eq!(Generation::new(41).next(), Generation::new(42));
    }

    #[test]
    fn next_skips_zero_on_wrap() {
        assert_eq!(Generation::new(u32::MAX).next(), Generation::new(1));
    }

    #[test]
    fn range_check_without_wrap() {
        let first = Generation::new(10);
        let last = Generation::new(20);
        assert!(Generation::new(10).in_range_inclusive(first, last));
        assert!(Generation::new(15).in_range_inclusive(first, last));
        assert!(Generation::new(20).in_range_inclusive(first, last));
        assert!(!Generation::new(9).in_range_inclusive(first, last));
        assert!(!Generation::new(21).in_range_inclusive(first, last));
    }

    #[test]
    fn range_check_across_wrap() {
        let first = Generation::new(u32::MAX - 2);
        let last = Generation::new(3);
        assert!(Generation::new(u32::MAX).in_range_inclusive(first, last));
        assert!(Generation::new(2).in_range_inclusive(first, last));
        assert!(!Generation::new(4).in_range_inclusive(first, last));
        assert!(!Generation::new(1000).in_range_inclusive(first, last));
    }

    #[test]
    fn distance_counts_steps() {
        assert_eq!(Generation::distance(Generation::ZERO, Generation::new(7)), 7);
        assert_eq!(Generation::distance(Generation::new(5), Generation::new(5)), 0);

        let mut g = Generation::new(u32::MAX - 1);
        let start = g;
        for _ in 0..4 {
            g = g.next();
        }
        assert_eq!(g, Generation::new(3));
        assert_eq!(Generation::distance(start, g), 4);
    }
}
