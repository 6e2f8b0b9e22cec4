#![forbid(unsafe_code)]

//! Seat coordinates and their `"{row}-{col}"` wire form.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A seat address. Rows and columns are 1-based.
///
/// Ordering is row-major, which is also the order seats are listed in
/// snapshots and iterated by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatId {
    pub row: u16,
    pub col: u16,
}

impl SeatId {
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid seat id {input:?}: expected \"row-col\" with 1-based numbers")]
pub struct ParseSeatIdError {
    pub input: String,
}

fn parse_coordinate(part: &str) -> Option<u16> {
    if part.is_empty() || part.starts_with('0') || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for SeatId {
    type Err = ParseSeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeatIdError {
            input: s.to_string(),
        };
        let (row, col) = s.split_once('-').ok_or_else(err)?;
        let row = parse_coordinate(row).ok_or_else(err)?;
        let col = parse_coordinate(col).ok_or_else(err)?;
        Ok(Self { row, col })
    }
}
