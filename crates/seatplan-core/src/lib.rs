#![forbid(unsafe_code)]

//! Seatplan Core
//!
//! State engine for classroom seating charts: a rows×cols grid of seats, a
//! roster, the student ⇄ seat arrangement, locked seats, and the officer
//! and subject-helper titles students hold.
//!
//! # Key Components
//!
//! - [`ClassState`] - The whole chart as one value; [`ClassState::apply`]
//!   is a pure transition over [`Action`]s
//! - [`Session`] - Current chart plus undo history and a seedable RNG
//! - [`TagRegistry`] / [`TitleBook`] - Role labels, usage counters, and who
//!   holds what
//! - [`snapshot`] - JSON import/export
//! - [`ChartLayout`] - Display model behind the text and print renderers
//!
//! # Invariants
//!
//! Every transition preserves: one seat per student, no student on a
//! locked seat, and usage counters equal to the number of holders. Locking
//! a seat never leaves fewer unlocked seats than students.

pub mod assign;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod layout;
pub mod print;
pub mod roster;
pub mod seat;
pub mod seating;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tags;
pub mod titles;

pub use assign::{AssignMode, AssignReport};
pub use config::{ConfigError, EngineConfig};
pub use error::{Result, SeatingError};
pub use grid::{LockChange, SeatGrid};
pub use history::History;
pub use layout::{Cell, ChartLayout, RoleGroup, View, render_text};
pub use print::render_print_html;
pub use roster::{Roster, RosterChange, Student, StudentId, display_name, parse_roster, roll_label};
pub use seat::{ParseSeatIdError, SeatId};
pub use seating::{Arrangement, Placement};
pub use session::Session;
pub use snapshot::{Snapshot, export_file_name, load_snapshot, save_snapshot};
pub use state::{Action, ClassState, Effect, Page, ResizeReport, SeatState, Selection, Transition};
pub use tags::{TEACHER_SUFFIX, TagAdd, TagKind, TagRegistry, is_officer_label};
pub use titles::{TitleBook, TitleToggle};
