#![forbid(unsafe_code)]

//! Bounded undo/redo over whole-state snapshots.
//!
//! ```text
//! record(s3)
//!   past:   [s0, s1, s2, s3]   current = s3
//!   future: []
//!
//! undo() x2
//!   past:   [s0, s1]           current = s1
//!   future: [s3, s2]
//!
//! record(s4)  (new branch, future dropped)
//!   past:   [s0, s1, s4]       current = s4
//!   future: []
//! ```
//!
//! # Invariants
//!
//! 1. `past` is never empty; its back is the current state.
//! 2. `past.len() <= max_depth` after every operation.
//! 3. `future` is cleared on every [`History::record`].

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    max_depth: usize,
}

impl<T> History<T> {
    /// Start a history at `initial`. A `max_depth` of zero is treated as 1.
    #[must_use]
    pub fn new(initial: T, max_depth: usize) -> Self {
        Self {
            past: VecDeque::from([initial]),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    #[must_use]
    pub fn current(&self) -> &T {
        self.past
            .back()
            .expect("history always holds the current state")
    }

    /// Make `state` current, dropping the redo branch.
    pub fn record(&mut self, state: T) {
        self.future.clear();
        self.past.push_back(state);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }

    /// Overwrite the current state in place, without adding an undo step.
    pub fn replace_current(&mut self, state: T) {
        if let Some(back) = self.past.back_mut() {
            *back = state;
        }
    }

    /// Step back one state. `None` at the oldest retained state.
    pub fn undo(&mut self) -> Option<&T> {
        if self.past.len() < 2 {
            return None;
        }
        let undone = self.past.pop_back()?;
        self.future.push(undone);
        Some(self.current())
    }

    /// Step forward to the most recently undone state.
    pub fn redo(&mut self) -> Option<&T> {
        let state = self.future.pop()?;
        self.past.push_back(state);
        Some(self.current())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of steps [`History::undo`] can take.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len() - 1
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_history_has_nothing_to_undo() {
        let history = History::new(0, 10);
        assert_eq!(*history.current(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn undo_and_redo_walk_the_stack() {
        let mut history = History::new(1, 10);
        history.record(2);
        history.record(3);
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert_eq!(*history.current(), 1);
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn record_drops_redo_branch() {
        let mut history = History::new(1, 10);
        history.record(2);
        history.undo();
        assert!(history.can_redo());
        history.record(4);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut history = History::new(1, 3);
        for n in 2..=5 {
            history.record(n);
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn replace_current_keeps_depth() {
        let mut history = History::new(1, 10);
        history.record(2);
        history.replace_current(20);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&20));
    }

    #[test]
    fn zero_depth_keeps_current() {
        let mut history = History::new("a", 0);
        history.record("b");
        assert_eq!(history.max_depth(), 1);
        assert_eq!(*history.current(), "b");
        assert!(!history.can_undo());
    }
}
