#![forbid(unsafe_code)]

//! Snapshot codec: the JSON document a chart is exported to and imported
//! from.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "timestamp": "2026-03-01T08:00:00.000Z",
//!   "currentPage": "seating",
//!   "classData": {
//!     "name": "三年二班",
//!     "teacherName": "陳老師",
//!     "rows": 6,
//!     "cols": 6,
//!     "students": ["01 王小明", "02 林大衛"],
//!     "seatingArrangement": { "1-1": "01 王小明" },
//!     "lockedSeats": ["6-6"],
//!     "studentTitles": { "02 林大衛": ["班長", "數學小老師"] },
//!     "officerTags": ["班長", "..."],
//!     "teacherTags": ["國文", "..."],
//!     "officerTagsUsage": { "班長": 1 },
//!     "teacherTagsUsage": { "數學": 1 },
//!     "customOfficerTags": [],
//!     "customTeacherTags": []
//!   }
//! }
//! ```
//!
//! Students are referenced by display string. Import is lenient about
//! content (unknown students and out-of-range seats are dropped with a
//! warning) and strict about shape (bad JSON, a missing `classData`, or a
//! malformed seat id fail with [`SeatingError::Format`]).
//!
//! # Atomic Writes
//!
//! [`save_snapshot`] writes to a temp file and renames it over the target.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeatingError};
use crate::grid::SeatGrid;
use crate::roster::{Roster, StudentId};
use crate::seat::SeatId;
use crate::seating::Arrangement;
use crate::state::{ClassState, Page, Selection};
use crate::tags::{DEFAULT_OFFICER_TAGS, DEFAULT_TEACHER_TAGS, TagKind, TagParts, TagRegistry};
use crate::titles::TitleBook;

/// Format version written by this codec.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Base of exported file names when the class has no name.
pub const DEFAULT_EXPORT_STEM: &str = "座位表";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub current_page: Page,
    pub class_data: ClassData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teacher_name: String,
    pub rows: u16,
    pub cols: u16,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub seating_arrangement: BTreeMap<String, String>,
    #[serde(default)]
    pub locked_seats: Vec<String>,
    #[serde(default)]
    pub student_titles: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_officer_tags")]
    pub officer_tags: Vec<String>,
    #[serde(default = "default_teacher_tags")]
    pub teacher_tags: Vec<String>,
    #[serde(default)]
    pub officer_tags_usage: BTreeMap<String, u32>,
    #[serde(default)]
    pub teacher_tags_usage: BTreeMap<String, u32>,
    #[serde(default)]
    pub custom_officer_tags: Vec<String>,
    #[serde(default)]
    pub custom_teacher_tags: Vec<String>,
}

fn default_officer_tags() -> Vec<String> {
    DEFAULT_OFFICER_TAGS.map(String::from).to_vec()
}

fn default_teacher_tags() -> Vec<String> {
    DEFAULT_TEACHER_TAGS.map(String::from).to_vec()
}

// =============================================================================
// Encode
// =============================================================================

/// Encode `state`, stamped with the current time.
#[must_use]
pub fn encode(state: &ClassState) -> Snapshot {
    encode_at(state, Utc::now())
}

/// Encode `state` with an explicit timestamp.
#[must_use]
pub fn encode_at(state: &ClassState, at: DateTime<Utc>) -> Snapshot {
    let roster = state.roster();
    let name_of = |id: StudentId| roster.name(id).unwrap_or_default().to_string();

    let seating_arrangement = state
        .arrangement()
        .iter()
        .map(|(seat, id)| (seat.to_string(), name_of(id)))
        .collect();

    // Titles of students sharing a display name merge under that name.
    let mut student_titles: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (id, labels) in state.titles().iter() {
        let merged = student_titles.entry(name_of(id)).or_default();
        for label in labels {
            if !merged.contains(label) {
                merged.push(label.clone());
            }
        }
    }

    let registry = state.registry();
    let officer = registry.parts(TagKind::Officer);
    let teacher = registry.parts(TagKind::Teacher);

    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        current_page: state.page(),
        class_data: ClassData {
            name: state.name().to_string(),
            teacher_name: state.teacher_name().to_string(),
            rows: state.grid().rows(),
            cols: state.grid().cols(),
            students: roster.names().map(String::from).collect(),
            seating_arrangement,
            locked_seats: state.grid().locked().map(|s| s.to_string()).collect(),
            student_titles,
            officer_tags: officer.tags,
            teacher_tags: teacher.tags,
            officer_tags_usage: officer.usage,
            teacher_tags_usage: teacher.usage,
            custom_officer_tags: officer.custom,
            custom_teacher_tags: teacher.custom,
        },
    }
}

// =============================================================================
// Decode
// =============================================================================

fn parse_seat(raw: &str) -> Result<SeatId> {
    raw.parse::<SeatId>()
        .map_err(|e| SeatingError::format(e.to_string()))
}

/// Rebuild a chart from a snapshot.
///
/// Students are matched by display string; repeated names resolve to
/// roster entries in order of occurrence. Usage counters are recounted from
/// the title lists.
pub fn decode(snapshot: Snapshot) -> Result<ClassState> {
    let _span = tracing::debug_span!("snapshot.decode").entered();
    let Snapshot {
        version,
        current_page,
        class_data: data,
        ..
    } = snapshot;

    if version != SNAPSHOT_VERSION {
        tracing::warn!(target: "seatplan.snapshot", %version, "unexpected snapshot version");
    }
    if data.rows == 0 || data.cols == 0 {
        return Err(SeatingError::format(format!(
            "grid must be at least 1x1, got {}x{}",
            data.rows, data.cols
        )));
    }

    let mut grid = SeatGrid::new(data.rows, data.cols);
    let roster = Roster::from_names(data.students);
    if roster.len() > grid.capacity() {
        tracing::warn!(
            target: "seatplan.snapshot",
            students = roster.len(),
            seats = grid.capacity(),
            "snapshot roster exceeds grid capacity"
        );
    }

    let arrangement = {
        let mut unclaimed: HashMap<&str, VecDeque<StudentId>> = HashMap::new();
        for student in roster.iter() {
            unclaimed
                .entry(student.name.as_str())
                .or_default()
                .push_back(student.id);
        }
        let mut arrangement = Arrangement::new();
        for (key, name) in &data.seating_arrangement {
            let seat = parse_seat(key)?;
            if !grid.contains(seat) {
                tracing::warn!(target: "seatplan.snapshot", %seat, %name, "seat outside grid dropped");
                continue;
            }
            match unclaimed.get_mut(name.as_str()).and_then(VecDeque::pop_front) {
                Some(id) => {
                    arrangement.place(seat, id);
                }
                None => {
                    tracing::warn!(target: "seatplan.snapshot", %seat, %name, "seat holds unknown student; dropped");
                }
            }
        }
        arrangement
    };

    for key in &data.locked_seats {
        let seat = parse_seat(key)?;
        if arrangement.is_occupied(seat) {
            tracing::warn!(target: "seatplan.snapshot", %seat, "seat both locked and occupied; lock dropped");
        } else if !grid.insert_lock(seat) && !grid.contains(seat) {
            tracing::warn!(target: "seatplan.snapshot", %seat, "locked seat outside grid dropped");
        }
    }
    if grid.available() < roster.len() {
        tracing::warn!(
            target: "seatplan.snapshot",
            available = grid.available(),
            students = roster.len(),
            "snapshot locks leave fewer seats than students"
        );
    }

    let mut registry = TagRegistry::from_parts(
        TagParts {
            tags: data.officer_tags,
            custom: data.custom_officer_tags,
            usage: data.officer_tags_usage,
        },
        TagParts {
            tags: data.teacher_tags,
            custom: data.custom_teacher_tags,
            usage: data.teacher_tags_usage,
        },
    );

    let mut titles = TitleBook::new();
    for (name, labels) in data.student_titles {
        let Some(id) = roster.find_by_name(&name) else {
            tracing::warn!(target: "seatplan.snapshot", %name, "titles of unknown student dropped");
            continue;
        };
        let mut unique: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        titles.insert_raw(id, unique);
    }
    registry.recount(titles.labels());

    tracing::debug!(
        target: "seatplan.snapshot",
        students = roster.len(),
        seated = arrangement.len(),
        locked = grid.locked_count(),
        "snapshot decoded"
    );

    Ok(ClassState {
        name: data.name,
        teacher_name: data.teacher_name,
        page: current_page,
        grid,
        roster,
        arrangement,
        registry,
        titles,
        selection: Selection::default(),
    })
}

// =============================================================================
// JSON and files
// =============================================================================

pub fn to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json(text: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(text)?)
}

/// Parse and decode a JSON document in one step.
pub fn import(text: &str) -> Result<ClassState> {
    decode(from_json(text)?)
}

/// Write `snapshot` as pretty JSON, replacing `path` atomically.
///
/// The parent directory must already exist.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = to_json(snapshot)?;
    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, json)?;
    std::fs::rename(&temp, path)?;
    tracing::debug!(target: "seatplan.snapshot", path = %path.display(), "snapshot saved");
    Ok(())
}

/// Read and decode the chart stored at `path`.
pub fn load_snapshot(path: &Path) -> Result<ClassState> {
    let text = std::fs::read_to_string(path)?;
    import(&text)
}

/// File name offered for an export: `"{class name}_{YYYY-MM-DD}.json"`.
#[must_use]
pub fn export_file_name(class_name: &str, date: NaiveDate) -> String {
    let stem = class_name.trim();
    let stem = if stem.is_empty() {
        DEFAULT_EXPORT_STEM.to_string()
    } else {
        stem.replace(['/', '\\'], "_")
    };
    format!("{stem}_{}.json", date.format("%Y-%m-%d"))
}

// =============================================================================
// Tests
// =============================================================================
