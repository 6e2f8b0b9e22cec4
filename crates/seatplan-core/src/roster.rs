#![forbid(unsafe_code)]

//! Roster ingestion and student identity.
//!
//! Every roster entry gets a [`StudentId`] when it is ingested. Seats and
//! titles key on that id, so two students who share a printed name stay
//! distinct inside the engine. The display string is an attribute.

use std::collections::BTreeMap;
use std::fmt;

/// Stable synthetic identity of a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StudentId(u32);

impl StudentId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

/// What a roster replacement did to existing identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChange {
    pub kept: Vec<StudentId>,
    pub added: Vec<StudentId>,
    pub removed: Vec<StudentId>,
}

/// Ordered list of students. Order defines roll numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    students: Vec<Student>,
    next_id: u32,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Self::new();
        for name in names {
            roster.push(name.into());
        }
        roster
    }

    fn allocate(&mut self) -> StudentId {
        let id = StudentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, name: String) -> StudentId {
        let id = self.allocate();
        self.students.push(Student { id, name });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.students.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StudentId> + '_ {
        self.students.iter().map(|s| s.id)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|s| s.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, id: StudentId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn name(&self, id: StudentId) -> Option<&str> {
        self.get(id).map(|s| s.name.as_str())
    }

    /// Zero-based position in the roster.
    #[must_use]
    pub fn position(&self, id: StudentId) -> Option<usize> {
        self.students.iter().position(|s| s.id == id)
    }

    /// One-based roll number.
    #[must_use]
    pub fn roll_number(&self, id: StudentId) -> Option<usize> {
        self.position(id).map(|p| p + 1)
    }

    /// Student at a one-based roll number.
    #[must_use]
    pub fn by_roll(&self, roll: usize) -> Option<&Student> {
        roll.checked_sub(1).and_then(|i| self.students.get(i))
    }

    /// First student carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<StudentId> {
        self.students.iter().find(|s| s.name == name).map(|s| s.id)
    }

    /// Display names that occur more than once, in first-seen order.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for student in &self.students {
            *counts.entry(student.name.as_str()).or_default() += 1;
        }
        let mut seen = Vec::new();
        for student in &self.students {
            if counts[student.name.as_str()] > 1 && !seen.contains(&student.name) {
                seen.push(student.name.clone());
            }
        }
        seen
    }

    /// Replace the roster with `names`, reusing the identity of any current
    /// student whose name reappears. Repeated names are matched in order.
    pub fn replace<I, S>(&mut self, names: I) -> RosterChange
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool: Vec<Option<Student>> = std::mem::take(&mut self.students)
            .into_iter()
            .map(Some)
            .collect();
        let mut change = RosterChange::default();
        for name in names {
            let name = name.into();
            let reused = pool
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|s| s.name == name))
                .and_then(Option::take);
            match reused {
                Some(student) => {
                    change.kept.push(student.id);
                    self.students.push(student);
                }
                None => {
                    let id = self.push(name);
                    change.added.push(id);
                }
            }
        }
        change.removed = pool.into_iter().flatten().map(|s| s.id).collect();
        change
    }
}

/// Split pasted text into roster entries.
///
/// One entry per non-blank line: the text before the first parenthesis,
/// trimmed. A line that starts with a parenthesis is kept whole.
#[must_use]
pub fn parse_roster(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let head = line.split(['(', ')']).next().unwrap_or_default();
            if head.is_empty() {
                line.to_string()
            } else {
                head.trim().to_string()
            }
        })
        .collect()
}

/// Printable form of a roster entry: a trailing `(note)` and a leading roll
/// number such as `"01 "` or `"1."` are removed.
#[must_use]
pub fn display_name(raw: &str) -> String {
    let base = strip_note(raw).unwrap_or(raw).trim();
    let digits = base.len() - base.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return base.to_string();
    }
    base[digits..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string()
}

/// `"name(note)"` → `"name"`; `None` when the entry is not of that shape.
fn strip_note(raw: &str) -> Option<&str> {
    match raw.find(['(', ')']) {
        None => (!raw.is_empty()).then_some(raw),
        Some(open) => {
            let (base, rest) = raw.split_at(open);
            let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
            (!base.is_empty() && !inner.is_empty() && !inner.contains(')')).then_some(base)
        }
    }
}

/// Two-digit roll label for a zero-based roster position.
#[must_use]
pub fn roll_label(position: usize) -> String {
    format!("{:02}", position + 1)
}
