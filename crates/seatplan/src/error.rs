use std::path::PathBuf;

use seatplan_core::{ConfigError, SeatingError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Seating(#[from] SeatingError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart file not found: {path} (run `seatplan init` first)")]
    MissingChart { path: PathBuf },

    #[error("chart file already exists: {path} (pass --force to overwrite)")]
    ChartExists { path: PathBuf },

    #[error("no student matches {query:?}")]
    UnknownStudent { query: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    /// Process exit code: 2 for usage problems, 3 when a capacity guard
    /// refused the edit, 4 for unreadable chart files, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Seating(error) if error.is_capacity() => 3,
            Self::Seating(SeatingError::Format { .. }) => 4,
            Self::Config(_)
            | Self::MissingChart { .. }
            | Self::ChartExists { .. }
            | Self::UnknownStudent { .. }
            | Self::InvalidArgument { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use seatplan_core::SeatingError;

    #[test]
    fn capacity_errors_exit_with_three() {
        let error = CliError::from(SeatingError::LockCapacity {
            roster: 4,
            available: 3,
        });
        assert_eq!(error.exit_code(), 3);
        assert!(error.to_string().contains("all 4 students"));
    }

    #[test]
    fn format_errors_exit_with_four() {
        assert_eq!(CliError::from(SeatingError::format("bad")).exit_code(), 4);
    }

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(CliError::invalid("nope").exit_code(), 2);
        assert_eq!(
            CliError::UnknownStudent {
                query: "x".into()
            }
            .exit_code(),
            2
        );
    }

    #[test]
    fn io_errors_exit_with_one() {
        let error = CliError::from(std::io::Error::other("disk"));
        assert_eq!(error.exit_code(), 1);
    }
}
