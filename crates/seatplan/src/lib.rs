#![forbid(unsafe_code)]

//! Command-line front end for `seatplan-core` chart files.

pub mod cli;
pub mod commands;
pub mod error;
pub mod util;

pub use cli::{Cli, run};
pub use error::{CliError, Result};
