#![forbid(unsafe_code)]

//! Randomized bulk assignment.
//!
//! Two modes, picked from the state of the waiting pool:
//!
//! - **Fill** (someone is waiting): waiting students are dealt at random
//!   onto free, unlocked seats. Seated students do not move.
//! - **Reshuffle** (everyone is seated): the whole roster is dealt onto all
//!   unlocked seats and the previous arrangement is discarded.
//!
//! Both modes shuffle students and seats independently with an unbiased
//! shuffle and pair them up in order. Students that do not fit are listed
//! in [`AssignReport::unplaced`].

use rand::Rng;
use rand::seq::SliceRandom;

use crate::grid::SeatGrid;
use crate::roster::{Roster, StudentId};
use crate::seat::SeatId;
use crate::seating::Arrangement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignMode {
    Fill,
    Reshuffle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignReport {
    pub mode: AssignMode,
    /// New placements, in the order they were dealt.
    pub placed: Vec<(SeatId, StudentId)>,
    /// Students left in the waiting pool for lack of seats.
    pub unplaced: Vec<StudentId>,
}

/// Students of `roster` without a seat, in roster order.
#[must_use]
pub fn waiting_pool(roster: &Roster, arrangement: &Arrangement) -> Vec<StudentId> {
    roster.ids().filter(|id| !arrangement.is_seated(*id)).collect()
}

pub fn random_assign<R: Rng + ?Sized>(
    roster: &Roster,
    grid: &SeatGrid,
    arrangement: &mut Arrangement,
    rng: &mut R,
) -> AssignReport {
    let _span = tracing::debug_span!(
        "seating.assign",
        roster = roster.len(),
        locked = grid.locked_count(),
    )
    .entered();

    let pool = waiting_pool(roster, arrangement);
    let (mode, mut students, mut seats) = if pool.is_empty() {
        let seats: Vec<_> = grid.unlocked_seats().collect();
        (AssignMode::Reshuffle, roster.ids().collect::<Vec<_>>(), seats)
    } else {
        let seats: Vec<_> = grid
            .unlocked_seats()
            .filter(|seat| !arrangement.is_occupied(*seat))
            .collect();
        (AssignMode::Fill, pool, seats)
    };

    students.shuffle(rng);
    seats.shuffle(rng);

    if mode == AssignMode::Reshuffle {
        arrangement.clear();
    }
    let count = students.len().min(seats.len());
    let placed: Vec<_> = seats
        .iter()
        .copied()
        .zip(students.iter().copied())
        .take(count)
        .collect();
    for (seat, student) in &placed {
        arrangement.place(*seat, *student);
    }
    let unplaced = students.split_off(count);

    if unplaced.is_empty() {
        tracing::debug!(target: "seatplan.engine", ?mode, placed = placed.len(), "random assignment");
    } else {
        tracing::warn!(
            target: "seatplan.engine",
            ?mode,
            placed = placed.len(),
            unplaced = unplaced.len(),
            "random assignment left students without a seat"
        );
    }
    AssignReport {
        mode,
        placed,
        unplaced,
    }
}
