#![forbid(unsafe_code)]

//! The whole chart as one value, and the transitions over it.
//!
//! [`ClassState::apply`] is the only public way to change a chart: it takes
//! an [`Action`] and returns a new state together with an [`Effect`]
//! describing what happened. The previous state is never touched, so a
//! caller can keep it for undo or discard the result.
//!
//! # Invariants
//!
//! 1. No student occupies two seats.
//! 2. Locked seats are never occupied.
//! 3. Every seated student and every title holder is on the roster.
//! 4. Every seat in the arrangement or lock set lies inside the grid.
//! 5. `usage[tag]` equals the number of students holding the tag.
//!
//! [`ClassState::check_invariants`] verifies all five.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assign::{self, AssignReport};
use crate::config::EngineConfig;
use crate::error::{Result, SeatingError};
use crate::grid::{LockChange, SeatGrid};
use crate::roster::{Roster, RosterChange, StudentId};
use crate::seat::SeatId;
use crate::seating::Arrangement;
use crate::tags::{TagAdd, TagKind, TagRegistry};
use crate::titles::{TitleBook, TitleToggle};

/// Screen the chart was last edited on. Carried through snapshots so a
/// reopened file lands where the user left it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Settings,
    Students,
    Roles,
    Seating,
    TeacherView,
}

/// What a seat currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Empty,
    Locked,
    Occupied(StudentId),
}

/// Pending clicks of the two-step selection protocols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub seat: Option<SeatId>,
    pub student: Option<StudentId>,
    pub title_student: Option<StudentId>,
    pub tag: Option<(TagKind, String)>,
}

/// Seats and students dropped by a resize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeReport {
    pub dropped_locks: Vec<SeatId>,
    pub unseated: Vec<(SeatId, StudentId)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetClassInfo {
        name: Option<String>,
        teacher_name: Option<String>,
    },
    SetPage(Page),
    Resize {
        rows: u16,
        cols: u16,
    },
    /// Replace the roster with already-parsed entries.
    LoadRoster(Vec<String>),
    SelectSeat(SeatId),
    SelectWaitingStudent(StudentId),
    /// Unseat an occupied seat, or toggle the lock of an empty one.
    RemoveFromSeat(SeatId),
    ToggleLock(SeatId),
    Place {
        student: StudentId,
        seat: SeatId,
    },
    Swap(SeatId, SeatId),
    Unseat(SeatId),
    RandomAssign,
    ClearSeats,
    AddCustomTag {
        kind: TagKind,
        label: String,
    },
    DeleteCustomTag {
        kind: TagKind,
        label: String,
    },
    ToggleTitle {
        student: StudentId,
        kind: TagKind,
        base: String,
    },
    RemoveTitle {
        student: StudentId,
        label: String,
    },
    /// Click on a tag in the tag pool.
    SelectTag {
        kind: TagKind,
        base: String,
    },
    /// Click on a student in the title editor.
    SelectTitleStudent(StudentId),
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// Only the selection changed.
    Selected,
    /// Class name, teacher or page changed.
    Info,
    Seated {
        seat: SeatId,
        student: StudentId,
        displaced: Option<StudentId>,
    },
    Swapped(SeatId, SeatId),
    Unseated {
        seat: SeatId,
        student: StudentId,
    },
    Lock(SeatId, LockChange),
    Assigned(AssignReport),
    Cleared {
        unseated: usize,
    },
    Resized(ResizeReport),
    RosterLoaded(RosterChange),
    TagAdded(TagAdd),
    TagDeleted {
        stripped: usize,
    },
    Title(TitleToggle),
}

impl Effect {
    /// Whether the chart data (not just the selection) changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        match self {
            Self::None | Self::Selected => false,
            Self::Lock(_, change) => *change != LockChange::Ignored,
            Self::TagAdded(add) => *add == TagAdd::Added,
            Self::TagDeleted { .. } => true,
            Self::Title(toggle) => *toggle != TitleToggle::Ignored,
            _ => true,
        }
    }
}

/// Result of [`ClassState::apply`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ClassState,
    pub effect: Effect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassState {
    pub(crate) name: String,
    pub(crate) teacher_name: String,
    pub(crate) page: Page,
    pub(crate) grid: SeatGrid,
    pub(crate) roster: Roster,
    pub(crate) arrangement: Arrangement,
    pub(crate) registry: TagRegistry,
    pub(crate) titles: TitleBook,
    pub(crate) selection: Selection,
}

impl Default for ClassState {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ClassState {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            name: String::new(),
            teacher_name: String::new(),
            page: Page::default(),
            grid: SeatGrid::new(config.rows, config.cols),
            roster: Roster::new(),
            arrangement: Arrangement::new(),
            registry: TagRegistry::with_builtins(&config.officer_tags, &config.teacher_tags),
            titles: TitleBook::new(),
            selection: Selection::default(),
        }
    }

    // ====================================================================
    // Read accessors
    // ====================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn teacher_name(&self) -> &str {
        &self.teacher_name
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn grid(&self) -> &SeatGrid {
        &self.grid
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    #[must_use]
    pub fn titles(&self) -> &TitleBook {
        &self.titles
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn seat_state(&self, seat: SeatId) -> SeatState {
        if self.grid.is_locked(seat) {
            SeatState::Locked
        } else {
            self.arrangement
                .occupant(seat)
                .map_or(SeatState::Empty, SeatState::Occupied)
        }
    }

    /// Students without a seat, in roster order.
    #[must_use]
    pub fn waiting_pool(&self) -> Vec<StudentId> {
        assign::waiting_pool(&self.roster, &self.arrangement)
    }

    /// Unlocked seats nobody sits on, in row-major order.
    #[must_use]
    pub fn free_seats(&self) -> Vec<SeatId> {
        self.grid
            .unlocked_seats()
            .filter(|seat| !self.arrangement.is_occupied(*seat))
            .collect()
    }

    // ====================================================================
    // Transitions
    // ====================================================================

    /// Apply `action` to a copy of this state.
    ///
    /// Fails only on capacity violations; the receiver is unchanged either
    /// way.
    pub fn apply<R: Rng + ?Sized>(&self, action: Action, rng: &mut R) -> Result<Transition> {
        let mut state = self.clone();
        let effect = state.dispatch(action, rng)?;
        Ok(Transition { state, effect })
    }

    fn dispatch<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) -> Result<Effect> {
        let effect = match action {
            Action::SetClassInfo { name, teacher_name } => {
                if let Some(name) = name {
                    self.name = name;
                }
                if let Some(teacher_name) = teacher_name {
                    self.teacher_name = teacher_name;
                }
                Effect::Info
            }
            Action::SetPage(page) => {
                self.page = page;
                Effect::Info
            }
            Action::Resize { rows, cols } => Effect::Resized(self.resize(rows, cols)),
            Action::LoadRoster(names) => Effect::RosterLoaded(self.load_roster(names)?),
            Action::SelectSeat(seat) => self.select_seat(seat),
            Action::SelectWaitingStudent(student) => self.select_waiting_student(student),
            Action::RemoveFromSeat(seat) => match self.arrangement.remove_seat(seat) {
                Some(student) => {
                    self.forget_seat_selection(seat);
                    Effect::Unseated { seat, student }
                }
                None => self.toggle_lock(seat)?,
            },
            Action::ToggleLock(seat) => self.toggle_lock(seat)?,
            Action::Place { student, seat } => self.place(student, seat),
            Action::Swap(a, b) => self.swap(a, b),
            Action::Unseat(seat) => match self.arrangement.remove_seat(seat) {
                Some(student) => {
                    self.forget_seat_selection(seat);
                    Effect::Unseated { seat, student }
                }
                None => Effect::None,
            },
            Action::RandomAssign => {
                self.selection.seat = None;
                self.selection.student = None;
                Effect::Assigned(assign::random_assign(
                    &self.roster,
                    &self.grid,
                    &mut self.arrangement,
                    rng,
                ))
            }
            Action::ClearSeats => {
                let unseated = self.arrangement.len();
                self.arrangement.clear();
                self.selection.seat = None;
                self.selection.student = None;
                Effect::Cleared { unseated }
            }
            Action::AddCustomTag { kind, label } => {
                Effect::TagAdded(self.registry.add_custom(kind, &label))
            }
            Action::DeleteCustomTag { kind, label } => self.delete_custom_tag(kind, &label),
            Action::ToggleTitle {
                student,
                kind,
                base,
            } => self.toggle_title(student, kind, &base),
            Action::RemoveTitle { student, label } => {
                if self.titles.remove_label(&mut self.registry, student, &label) {
                    Effect::Title(TitleToggle::Removed)
                } else {
                    Effect::None
                }
            }
            Action::SelectTag { kind, base } => self.select_tag(kind, base),
            Action::SelectTitleStudent(student) => self.select_title_student(student),
            Action::ClearSelection => {
                self.selection = Selection::default();
                Effect::Selected
            }
        };
        Ok(effect)
    }

    fn resize(&mut self, rows: u16, cols: u16) -> ResizeReport {
        let dropped_locks = self.grid.resize(rows, cols);
        let grid = &self.grid;
        let unseated = self.arrangement.retain(|seat, _| grid.contains(seat));
        if let Some(seat) = self.selection.seat {
            if !self.grid.contains(seat) {
                self.selection.seat = None;
                self.selection.student = None;
            }
        }
        if !dropped_locks.is_empty() || !unseated.is_empty() {
            tracing::info!(
                target: "seatplan.engine",
                rows = self.grid.rows(),
                cols = self.grid.cols(),
                dropped_locks = dropped_locks.len(),
                unseated = unseated.len(),
                "grid resized; out-of-range seats dropped"
            );
        }
        ResizeReport {
            dropped_locks,
            unseated,
        }
    }

    fn load_roster(&mut self, names: Vec<String>) -> Result<RosterChange> {
        let seats = self.grid.capacity();
        if names.len() > seats {
            return Err(SeatingError::RosterCapacity {
                students: names.len(),
                seats,
            });
        }
        let change = self.roster.replace(names);
        let mut recount = false;
        for student in &change.removed {
            self.arrangement.remove_student(*student);
            recount |= !self.titles.remove_student(*student).is_empty();
        }
        if recount {
            self.registry.recount(self.titles.labels());
        }
        let roster = &self.roster;
        let keep = |id: Option<StudentId>| id.filter(|id| roster.contains(*id));
        self.selection.student = keep(self.selection.student);
        self.selection.title_student = keep(self.selection.title_student);

        let duplicates = self.roster.duplicate_names();
        if !duplicates.is_empty() {
            tracing::warn!(
                target: "seatplan.engine",
                ?duplicates,
                "roster contains repeated names; snapshots cannot tell them apart"
            );
        }
        tracing::debug!(
            target: "seatplan.engine",
            kept = change.kept.len(),
            added = change.added.len(),
            removed = change.removed.len(),
            "roster loaded"
        );
        Ok(change)
    }

    fn clear_seat_cursor(&mut self) {
        self.selection.seat = None;
        self.selection.student = None;
    }

    fn forget_seat_selection(&mut self, seat: SeatId) {
        if self.selection.seat == Some(seat) {
            self.clear_seat_cursor();
        }
    }

    /// Move `student` onto `seat`, wherever they were.
    fn seat_student(&mut self, seat: SeatId, student: StudentId) -> Effect {
        let placement = self.arrangement.place(seat, student);
        Effect::Seated {
            seat,
            student,
            displaced: placement.displaced,
        }
    }

    fn select_seat(&mut self, seat: SeatId) -> Effect {
        if !self.grid.contains(seat) || self.grid.is_locked(seat) {
            return Effect::None;
        }
        let selected = self
            .selection
            .student
            .filter(|id| self.roster.contains(*id));

        let effect = match (self.arrangement.occupant(seat), selected) {
            (Some(occupant), Some(student)) if occupant == student => Effect::Selected,
            (Some(_), Some(student)) => match self.arrangement.seat_of(student) {
                Some(from) => {
                    self.arrangement.swap(from, seat);
                    Effect::Swapped(from, seat)
                }
                None => self.seat_student(seat, student),
            },
            (Some(occupant), None) => {
                if self.selection.seat == Some(seat) {
                    self.clear_seat_cursor();
                } else {
                    self.selection.seat = Some(seat);
                    self.selection.student = Some(occupant);
                }
                return Effect::Selected;
            }
            (None, Some(student)) => self.seat_student(seat, student),
            (None, None) => {
                self.selection.seat = if self.selection.seat == Some(seat) {
                    None
                } else {
                    Some(seat)
                };
                return Effect::Selected;
            }
        };
        self.clear_seat_cursor();
        effect
    }

    fn select_waiting_student(&mut self, student: StudentId) -> Effect {
        if !self.roster.contains(student) {
            return Effect::None;
        }
        let target = self
            .selection
            .seat
            .filter(|_| self.selection.student.is_none())
            .filter(|seat| self.seat_state(*seat) == SeatState::Empty);
        if let Some(seat) = target {
            self.clear_seat_cursor();
            return self.seat_student(seat, student);
        }
        self.selection.seat = None;
        self.selection.student = if self.selection.student == Some(student) {
            None
        } else {
            Some(student)
        };
        Effect::Selected
    }

    fn toggle_lock(&mut self, seat: SeatId) -> Result<Effect> {
        if self.arrangement.is_occupied(seat) {
            return Ok(Effect::None);
        }
        let change = self.grid.toggle_lock(seat, self.roster.len())?;
        if change == LockChange::Locked {
            self.forget_seat_selection(seat);
        }
        Ok(Effect::Lock(seat, change))
    }

    fn usable(&self, seat: SeatId) -> bool {
        self.grid.contains(seat) && !self.grid.is_locked(seat)
    }

    fn place(&mut self, student: StudentId, seat: SeatId) -> Effect {
        if !self.roster.contains(student) || !self.usable(seat) {
            return Effect::None;
        }
        self.seat_student(seat, student)
    }

    fn swap(&mut self, a: SeatId, b: SeatId) -> Effect {
        if a == b || !self.usable(a) || !self.usable(b) {
            return Effect::None;
        }
        if !self.arrangement.is_occupied(a) && !self.arrangement.is_occupied(b) {
            return Effect::None;
        }
        self.arrangement.swap(a, b);
        Effect::Swapped(a, b)
    }

    fn delete_custom_tag(&mut self, kind: TagKind, label: &str) -> Effect {
        if !self.registry.remove_custom(kind, label) {
            return Effect::None;
        }
        let stripped = self.titles.strip_label(&kind.full_tag(label));
        self.registry.recount(self.titles.labels());
        if self
            .selection
            .tag
            .as_ref()
            .is_some_and(|(k, base)| *k == kind && base == label)
        {
            self.selection.tag = None;
        }
        tracing::debug!(target: "seatplan.tags", %kind, label, stripped, "custom tag deleted");
        Effect::TagDeleted { stripped }
    }

    fn toggle_title(&mut self, student: StudentId, kind: TagKind, base: &str) -> Effect {
        if !self.roster.contains(student) {
            return Effect::None;
        }
        Effect::Title(self.titles.toggle(&mut self.registry, student, base, kind))
    }

    fn select_tag(&mut self, kind: TagKind, base: String) -> Effect {
        if let Some(student) = self.selection.title_student.take() {
            self.selection.tag = None;
            return self.toggle_title(student, kind, &base);
        }
        let same = self
            .selection
            .tag
            .as_ref()
            .is_some_and(|(k, b)| *k == kind && *b == base);
        self.selection.tag = if same { None } else { Some((kind, base)) };
        Effect::Selected
    }

    fn select_title_student(&mut self, student: StudentId) -> Effect {
        if !self.roster.contains(student) {
            return Effect::None;
        }
        if let Some((kind, base)) = self.selection.tag.take() {
            self.selection.title_student = None;
            return self.toggle_title(student, kind, &base);
        }
        self.selection.title_student = if self.selection.title_student == Some(student) {
            None
        } else {
            Some(student)
        };
        Effect::Selected
    }

    // ====================================================================
    // Validation
    // ====================================================================

    /// Check the structural invariants. An empty list means the state is
    /// consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for (seat, student) in self.arrangement.iter() {
            if !seen.insert(student) {
                errors.push(format!("student {student} occupies more than one seat"));
            }
            if self.arrangement.seat_of(student) != Some(seat) {
                errors.push(format!("reverse index disagrees for seat {seat}"));
            }
            if self.grid.is_locked(seat) {
                errors.push(format!("seat {seat} is locked and occupied"));
            }
            if !self.grid.contains(seat) {
                errors.push(format!("seat {seat} lies outside the grid"));
            }
            if !self.roster.contains(student) {
                errors.push(format!("seat {seat} holds unknown student {student}"));
            }
        }
        for seat in self.grid.locked() {
            if !self.grid.contains(seat) {
                errors.push(format!("locked seat {seat} lies outside the grid"));
            }
        }
        for (student, _) in self.titles.iter() {
            if !self.roster.contains(student) {
                errors.push(format!("titles held by unknown student {student}"));
            }
        }
        for kind in [TagKind::Officer, TagKind::Teacher] {
            for (base, count) in self.registry.usage_map(kind) {
                let holders = self.titles.holders(&kind.full_tag(base));
                if holders != *count as usize {
                    errors.push(format!(
                        "{kind} tag {base:?} counted {count} but held by {holders}"
                    ));
                }
            }
        }
        for label in self.titles.labels() {
            let (kind, base) = TagKind::classify(label);
            if !self.registry.usage_map(kind).contains_key(base) {
                errors.push(format!("title {label:?} has no usage counter"));
            }
        }
        errors
    }
}
