#![forbid(unsafe_code)]

//! The student ⇄ seat mapping.
//!
//! # Invariants
//!
//! 1. A student occupies at most one seat.
//! 2. `by_student` is exactly the inverse of `by_seat`.
//!
//! Every mutation goes through this type, so callers cannot build a
//! mapping that seats one student twice.

use std::collections::BTreeMap;

use crate::roster::StudentId;
use crate::seat::SeatId;

/// Side effects of [`Arrangement::place`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    /// Previous occupant of the target seat, now unseated.
    pub displaced: Option<StudentId>,
    /// Seat the placed student left.
    pub vacated: Option<SeatId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrangement {
    by_seat: BTreeMap<SeatId, StudentId>,
    by_student: BTreeMap<StudentId, SeatId>,
}

impl Arrangement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn occupant(&self, seat: SeatId) -> Option<StudentId> {
        self.by_seat.get(&seat).copied()
    }

    #[must_use]
    pub fn seat_of(&self, student: StudentId) -> Option<SeatId> {
        self.by_student.get(&student).copied()
    }

    #[must_use]
    pub fn is_occupied(&self, seat: SeatId) -> bool {
        self.by_seat.contains_key(&seat)
    }

    #[must_use]
    pub fn is_seated(&self, student: StudentId) -> bool {
        self.by_student.contains_key(&student)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_seat.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_seat.is_empty()
    }

    /// Occupied seats in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (SeatId, StudentId)> + '_ {
        self.by_seat.iter().map(|(seat, student)| (*seat, *student))
    }

    /// Seat `student` at `seat`, moving them out of any previous seat and
    /// unseating whoever sat there.
    pub fn place(&mut self, seat: SeatId, student: StudentId) -> Placement {
        if self.occupant(seat) == Some(student) {
            return Placement::default();
        }
        let vacated = self.remove_student(student);
        let displaced = self.remove_seat(seat);
        self.by_seat.insert(seat, student);
        self.by_student.insert(student, seat);
        Placement { displaced, vacated }
    }

    /// Exchange the occupants of two seats. An empty side makes this a move.
    pub fn swap(&mut self, a: SeatId, b: SeatId) {
        if a == b {
            return;
        }
        let first = self.remove_seat(a);
        let second = self.remove_seat(b);
        if let Some(student) = first {
            self.place(b, student);
        }
        if let Some(student) = second {
            self.place(a, student);
        }
    }

    pub fn remove_seat(&mut self, seat: SeatId) -> Option<StudentId> {
        let student = self.by_seat.remove(&seat)?;
        self.by_student.remove(&student);
        Some(student)
    }

    pub fn remove_student(&mut self, student: StudentId) -> Option<SeatId> {
        let seat = self.by_student.remove(&student)?;
        self.by_seat.remove(&seat);
        Some(seat)
    }

    pub fn clear(&mut self) {
        self.by_seat.clear();
        self.by_student.clear();
    }

    /// Drop every entry for which `keep` is false. Returns the dropped pairs.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<(SeatId, StudentId)>
    where
        F: FnMut(SeatId, StudentId) -> bool,
    {
        let dropped: Vec<_> = self.iter().filter(|(s, id)| !keep(*s, *id)).collect();
        for (seat, _) in &dropped {
            self.remove_seat(*seat);
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    fn ids(n: usize) -> Vec<StudentId> {
        Roster::from_names((0..n).map(|i| format!("s{i}"))).ids().collect()
    }

    fn seat(row: u16, col: u16) -> SeatId {
        SeatId::new(row, col)
    }

    #[test]
    fn place_moves_student_out_of_previous_seat() {
        let s = ids(1);
        let mut arrangement = Arrangement::new();
        arrangement.place(seat(1, 1), s[0]);
        let placement = arrangement.place(seat(2, 2), s[0]);
        assert_eq!(placement.vacated, Some(seat(1, 1)));
        assert_eq!(placement.displaced, None);
        assert!(!arrangement.is_occupied(seat(1, 1)));
        assert_eq!(arrangement.seat_of(s[0]), Some(seat(2, 2)));
        assert_eq!(arrangement.len(), 1);
    }

    #[test]
    fn place_on_occupied_seat_displaces_occupant() {
        let s = ids(2);
        let mut arrangement = Arrangement::new();
        arrangement.place(seat(1, 1), s[0]);
        let placement = arrangement.place(seat(1, 1), s[1]);
        assert_eq!(placement.displaced, Some(s[0]));
        assert!(!arrangement.is_seated(s[0]));
        assert_eq!(arrangement.occupant(seat(1, 1)), Some(s[1]));
    }

    #[test]
    fn swap_exchanges_and_moves() {
        let s = ids(2);
        let mut arrangement = Arrangement::new();
        arrangement.place(seat(1, 1), s[0]);
        arrangement.place(seat(1, 2), s[1]);
        arrangement.swap(seat(1, 1), seat(1, 2));
        assert_eq!(arrangement.occupant(seat(1, 1)), Some(s[1]));
        assert_eq!(arrangement.occupant(seat(1, 2)), Some(s[0]));

        arrangement.swap(seat(1, 2), seat(3, 3));
        assert_eq!(arrangement.seat_of(s[0]), Some(seat(3, 3)));
        assert!(!arrangement.is_occupied(seat(1, 2)));
        assert_eq!(arrangement.len(), 2);
    }

    #[test]
    fn retain_reports_dropped_pairs() {
        let s = ids(3);
        let mut arrangement = Arrangement::new();
        arrangement.place(seat(1, 1), s[0]);
        arrangement.place(seat(4, 1), s[1]);
        arrangement.place(seat(1, 4), s[2]);
        let dropped = arrangement.retain(|seat, _| seat.row <= 2 && seat.col <= 2);
        assert_eq!(dropped, vec![(seat(1, 4), s[2]), (seat(4, 1), s[1])]);
        assert_eq!(arrangement.len(), 1);
        assert!(!arrangement.is_seated(s[1]));
    }
}
