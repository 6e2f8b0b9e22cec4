#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeatingError>;

/// Errors surfaced by the seating engine and its snapshot codec.
///
/// Everything else the engine accepts is a total function: invalid seats,
/// unknown students, and repeated clicks are no-ops rather than errors.
#[derive(Debug, Error)]
pub enum SeatingError {
    /// A roster does not fit into the grid.
    #[error("roster of {students} students exceeds the {seats} seats of the grid")]
    RosterCapacity { students: usize, seats: usize },

    /// Locking one more seat would leave fewer free seats than students.
    #[error(
        "locking this seat leaves {available} free seats, not enough for all {roster} students"
    )]
    LockCapacity { roster: usize, available: usize },

    /// A snapshot payload could not be understood.
    #[error("snapshot format error: {message}")]
    Format { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeatingError {
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Whether the error was raised by a capacity guard.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::RosterCapacity { .. } | Self::LockCapacity { .. })
    }
}

impl From<serde_json::Error> for SeatingError {
    fn from(error: serde_json::Error) -> Self {
        Self::format(error.to_string())
    }
}
