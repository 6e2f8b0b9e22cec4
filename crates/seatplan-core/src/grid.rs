#![forbid(unsafe_code)]

//! The rows×cols seat space and its lock set.
//!
//! The grid knows nothing about who sits where. Callers that own an
//! arrangement are expected to skip [`SeatGrid::toggle_lock`] for occupied
//! seats and to reconcile placements after [`SeatGrid::resize`].

use std::collections::BTreeSet;

use crate::error::{Result, SeatingError};
use crate::seat::SeatId;

/// Result of a lock toggle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockChange {
    Locked,
    Unlocked,
    /// Seat outside the grid.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatGrid {
    rows: u16,
    cols: u16,
    locked: BTreeSet<SeatId>,
}

impl SeatGrid {
    /// Create an unlocked grid. Zero dimensions are raised to 1.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            locked: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Total number of seats, locked ones included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    /// Seats not locked.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity() - self.locked.len()
    }

    #[must_use]
    pub fn contains(&self, seat: SeatId) -> bool {
        (1..=self.rows).contains(&seat.row) && (1..=self.cols).contains(&seat.col)
    }

    #[must_use]
    pub fn is_locked(&self, seat: SeatId) -> bool {
        self.locked.contains(&seat)
    }

    /// Locked seats in row-major order.
    pub fn locked(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.locked.iter().copied()
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.locked.len()
    }

    /// Every seat in row-major order.
    pub fn seats(&self) -> impl Iterator<Item = SeatId> + use<> {
        let cols = self.cols;
        (1..=self.rows).flat_map(move |row| (1..=cols).map(move |col| SeatId::new(row, col)))
    }

    /// Every unlocked seat in row-major order.
    pub fn unlocked_seats(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.seats().filter(|seat| !self.locked.contains(seat))
    }

    /// Lock an empty seat or unlock a locked one.
    ///
    /// Locking fails when the remaining seats could no longer hold
    /// `roster_len` students. Unlocking always succeeds.
    pub fn toggle_lock(&mut self, seat: SeatId, roster_len: usize) -> Result<LockChange> {
        if !self.contains(seat) {
            return Ok(LockChange::Ignored);
        }
        if self.locked.remove(&seat) {
            tracing::debug!(target: "seatplan.engine", %seat, "seat unlocked");
            return Ok(LockChange::Unlocked);
        }
        let available = self.capacity().saturating_sub(self.locked.len() + 1);
        if available < roster_len {
            tracing::warn!(
                target: "seatplan.engine",
                %seat,
                roster = roster_len,
                available,
                "lock rejected: not enough seats left"
            );
            return Err(SeatingError::LockCapacity {
                roster: roster_len,
                available,
            });
        }
        self.locked.insert(seat);
        tracing::debug!(target: "seatplan.engine", %seat, "seat locked");
        Ok(LockChange::Locked)
    }

    /// Insert a lock without the capacity check. Used when rebuilding a grid
    /// from a snapshot.
    pub(crate) fn insert_lock(&mut self, seat: SeatId) -> bool {
        self.contains(seat) && self.locked.insert(seat)
    }

    pub(crate) fn remove_lock(&mut self, seat: SeatId) -> bool {
        self.locked.remove(&seat)
    }

    /// Change the grid size and drop locks that fall outside it.
    ///
    /// Returns the dropped locks.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Vec<SeatId> {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
        let (kept, dropped): (BTreeSet<_>, BTreeSet<_>) = std::mem::take(&mut self.locked)
            .into_iter()
            .partition(|seat| seat.row <= self.rows && seat.col <= self.cols);
        self.locked = kept;
        dropped.into_iter().collect()
    }
}
