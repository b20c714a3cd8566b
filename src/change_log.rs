//! Bounded record of which names changed, and when.

use std::collections::VecDeque;

use crate::generation::Generation;

/// Default number of changes retained for incremental diffs.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// A fixed-capacity FIFO of changed names covering the generations
/// `start..=current`.
///
/// Entry `i` (counted from the front) is the name touched by the mutation
/// that advanced the history from `start + i` to `start + i + 1`, so the
/// queue always holds exactly `distance(start, current)` names.
#[derive(Debug)]
pub struct ChangeLog {
    capacity: usize,
    start: Generation,
    current: Generation,
    names: VecDeque<String>,
}

impl ChangeLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            start: Generation::ZERO,
            current: Generation::ZERO,
            names: VecDeque::with_capacity(capacity),
        }
    }

    #[cfg(test)]
    pub(crate) fn starting_at(start: Generation, capacity: usize) -> Self {
        Self {
            start,
            current: start,
            ..Self::new(capacity)
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest generation an incremental diff can still be computed from.
    pub fn start(&self) -> Generation {
        self.start
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Record a change to `name` and advance the current generation,
    /// evicting the oldest entry when full.
    pub fn add(&mut self, name: impl Into<String>) {
        self.names.push_back(name.into());
        self.current = self.current.next();
        if self.names.len() > self.capacity {
            self.names.pop_front();
            self.start = self.start.next();
        }
    }

    /// Whether `generation` is still covered by the retained history.
    pub fn contains(&self, generation: Generation) -> bool {
        if generation.is_zero() {
            // zero is only ever the initial generation
            return self.start.is_zero();
        }
        generation.in_range_inclusive(self.start, self.current)
    }

    /// Names changed after `generation`, oldest first, duplicates included.
    ///
    /// Callers must check [`contains`](Self::contains) first.
    pub fn updated_since(&self, generation: Generation) -> impl Iterator<Item = &str> {
        let skip = Generation::distance(self.start, generation) as usize;
        self.names.iter().skip(skip).map(String::as_str)
    }
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_log_is_empty_at_zero() {
        let log = ChangeLog::default();
        assert_eq!(log.start(), Generation::ZERO);
        assert_eq!(log.current(), Generation::ZERO);
        assert!(log.is_empty());
        assert!(log.contains(Generation::ZERO));
        assert!(!log.contains(Generation::new(1)));
    }

    #[test]
    fn add_advances_current_only_until_full() {
        let mut log = ChangeLog::new(3);
        log.add("a");
        log.add("b");
        log.add("c");
        assert_eq!(log.start(), Generation::ZERO);
        assert_eq!(log.current(), Generation::new(3));
        assert_eq!(log.len(), 3);

        log.add("d");
        assert_eq!(log.start(), Generation::new(1));
        assert_eq!(log.current(), Generation::new(4));
        assert_eq!(log.len(), 3);
        assert!(!log.contains(Generation::ZERO));
        assert!(log.contains(Generation::new(1)));
    }

    #[test]
    fn updated_since_skips_older_entries() {
        let mut log = ChangeLog::new(10);
        for name in ["a", "b", "a", "c"] {
            log.add(name);
        }
        let since_zero: Vec<_> = log.updated_since(Generation::ZERO).collect();
        assert_eq!(since_zero, vec!["a", "b", "a", "c"]);
        let since_two: Vec<_> = log.updated_since(Generation::new(2)).collect();
        assert_eq!(since_two, vec!["a", "c"]);
        assert_eq!(log.updated_since(Generation::new(4)).count(), 0);
    }

    #[test]
    fn updated_since_after_eviction() {
        let mut log = ChangeLog::new(2);
        for name in ["a", "b", "c", "d"] {
            log.add(name);
        }
        assert_eq!(log.start(), Generation::new(2));
        let names: Vec<_> = log.updated_since(Generation::new(3)).collect();
        assert_eq!(names, vec!["d"]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut log = ChangeLog::new(5);
        for i in 0..100 {
            log.add(format!("name{i}"));
            assert!(log.len() <= 5);
        }
        assert_eq!(Generation::distance(log.start(), log.current()), 5);
    }

    #[test]
    fn window_across_wrap_point() {
        let mut log = ChangeLog::starting_at(Generation::new(u32::MAX - 3), 3);
        for name in ["a", "b", "c", "d", "e"] {
            log.add(name);
        }
        assert_eq!(log.start(), Generation::new(u32::MAX - 1));
        assert_eq!(log.current(), Generation::new(2));
        assert_eq!(log.len(), 3);

        assert!(log.contains(Generation::new(u32::MAX - 1)));
        assert!(log.contains(Generation::new(u32::MAX)));
        assert!(log.contains(Generation::new(1)));
        assert!(log.contains(Generation::new(2)));
        assert!(!log.contains(Generation::new(u32::MAX - 2)));
        assert!(!log.contains(Generation::new(3)));
        assert!(!log.contains(Generation::ZERO));

        let all: Vec<_> = log.updated_since(Generation::new(u32::MAX - 1)).collect();
        assert_eq!(all, vec!["c", "d", "e"]);
        let since_max: Vec<_> = log.updated_since(Generation::new(u32::MAX)).collect();
        assert_eq!(since_max, vec!["d", "e"]);
        let since_one: Vec<_> = log.updated_since(Generation::new(1)).collect();
        assert_eq!(since_one, vec!["e"]);
        assert_eq!(log.updated_since(Generation::new(2)).count(), 0);
    }

    #[test]
    fn future_generation_is_not_contained() {
        let mut log = ChangeLog::new(5);
        log.add("a");
        assert!(!log.contains(Generation::new(2)));
        assert!(!log.contains(Generation::new(u32::MAX)));
    }
}
