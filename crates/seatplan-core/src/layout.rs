#![forbid(unsafe_code)]

//! Read-only views of a chart for display and printing.
//!
//! [`ChartLayout::build`] resolves every seat, role and roster entry to the
//! strings that end up on screen or paper. Renderers only format.

use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

use crate::roster::{display_name, roll_label};
use crate::seat::SeatId;
use crate::state::{ClassState, SeatState};
use crate::tags::TagKind;

/// Columns of the printed student list.
pub const STUDENT_LIST_COLUMNS: usize = 4;

/// Label of the front desk.
pub const DESK_LABEL: &str = "講桌";

/// Whose point of view the chart is drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Facing the desk: row 1 at the top, desk above it.
    #[default]
    Student,
    /// Standing at the desk: rows and columns reversed, desk at the bottom.
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Locked,
    Empty,
    Occupied { roll: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroup {
    pub role: String,
    /// `"NN.name"` entries in roster order.
    pub holders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLayout {
    pub view: View,
    pub title: String,
    /// Seat rows in display order.
    pub rows: Vec<Vec<(SeatId, Cell)>>,
    pub officers: Vec<RoleGroup>,
    /// Subject helpers, keyed by subject without the helper suffix.
    pub helpers: Vec<RoleGroup>,
    /// Student list laid out row by row, filled column-major. Short rows
    /// are padded with empty strings.
    pub student_list: Vec<Vec<String>>,
}

impl ChartLayout {
    #[must_use]
    pub fn build(state: &ClassState, view: View) -> Self {
        let grid = state.grid();
        let mut row_ids: Vec<u16> = (1..=grid.rows()).collect();
        let mut col_ids: Vec<u16> = (1..=grid.cols()).collect();
        if view == View::Teacher {
            row_ids.reverse();
            col_ids.reverse();
        }

        let roster = state.roster();
        let rows = row_ids
            .iter()
            .map(|&row| {
                col_ids
                    .iter()
                    .map(|&col| {
                        let seat = SeatId::new(row, col);
                        let cell = match state.seat_state(seat) {
                            SeatState::Locked => Cell::Locked,
                            SeatState::Empty => Cell::Empty,
                            SeatState::Occupied(id) => Cell::Occupied {
                                roll: roster.position(id).map(roll_label).unwrap_or_default(),
                                name: roster.name(id).map(display_name).unwrap_or_default(),
                            },
                        };
                        (seat, cell)
                    })
                    .collect()
            })
            .collect();

        let mut officers: Vec<RoleGroup> = Vec::new();
        let mut helpers: Vec<RoleGroup> = Vec::new();
        for (position, student) in roster.iter().enumerate() {
            let entry = format!("{}.{}", roll_label(position), display_name(&student.name));
            for label in state.titles().titles(student.id) {
                let (kind, base) = TagKind::classify(label);
                let groups = match kind {
                    TagKind::Officer => &mut officers,
                    TagKind::Teacher => &mut helpers,
                };
                match groups.iter_mut().find(|g| g.role == base) {
                    Some(group) => group.holders.push(entry.clone()),
                    None => groups.push(RoleGroup {
                        role: base.to_string(),
                        holders: vec![entry.clone()],
                    }),
                }
            }
        }

        let names: Vec<String> = roster
            .iter()
            .enumerate()
            .map(|(position, s)| format!("{}.{}", roll_label(position), display_name(&s.name)))
            .collect();

        Self {
            view,
            title: chart_title(state, view),
            rows,
            officers,
            helpers,
            student_list: column_major(&names, STUDENT_LIST_COLUMNS),
        }
    }

    /// Whether the desk is drawn above the seats.
    #[must_use]
    pub fn desk_on_top(&self) -> bool {
        self.view == View::Student
    }
}

fn chart_title(state: &ClassState, view: View) -> String {
    match view {
        View::Student => format!("{} 座位表 (學生視角)", state.name()),
        View::Teacher => format!("{} 座位表 (導師：{})", state.name(), state.teacher_name()),
    }
}

/// Arrange `items` into rows of `columns` cells, filling down each column
/// first.
#[must_use]
pub fn column_major(items: &[String], columns: usize) -> Vec<Vec<String>> {
    if items.is_empty() || columns == 0 {
        return Vec::new();
    }
    let height = items.len().div_ceil(columns);
    (0..height)
        .map(|row| {
            (0..columns)
                .map(|col| items.get(col * height + row).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

// =============================================================================
// Plain text
// =============================================================================

fn pad(text: &str, width: usize) -> String {
    let used = text.width();
    let left = width.saturating_sub(used) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Locked => "✖".to_string(),
        Cell::Empty => "·".to_string(),
        Cell::Occupied { roll, name } => format!("{roll} {name}"),
    }
}

/// Render the chart as fixed-width text for a terminal.
#[must_use]
pub fn render_text(layout: &ChartLayout) -> String {
    let texts: Vec<Vec<String>> = layout
        .rows
        .iter()
        .map(|row| row.iter().map(|(_, cell)| cell_text(cell)).collect())
        .collect();
    let width = texts
        .iter()
        .flatten()
        .map(|t| t.width())
        .chain([DESK_LABEL.width()])
        .max()
        .unwrap_or(0)
        + 2;
    let cols = texts.first().map_or(0, Vec::len);
    let line_width = cols * (width + 1) + 1;
    let border = format!("+{}", format!("{}+", "-".repeat(width)).repeat(cols));
    let desk = pad(&format!("[{DESK_LABEL}]"), line_width);

    let mut out = String::new();
    let _ = writeln!(out, "{}", layout.title);
    if layout.desk_on_top() {
        let _ = writeln!(out, "{}", desk.trim_end());
    }
    let _ = writeln!(out, "{border}");
    for row in &texts {
        out.push('|');
        for text in row {
            out.push_str(&pad(text, width));
            out.push('|');
        }
        out.push('\n');
        let _ = writeln!(out, "{border}");
    }
    if !layout.desk_on_top() {
        let _ = writeln!(out, "{}", desk.trim_end());
    }

    for (heading, groups) in [("班級幹部", &layout.officers), ("學科小老師", &layout.helpers)] {
        let _ = writeln!(out, "\n{heading}");
        if groups.is_empty() {
            let _ = writeln!(out, "  尚未設定");
        }
        for group in groups {
            let _ = writeln!(out, "  {}: {}", group.role, group.holders.join(", "));
        }
    }

    if !layout.student_list.is_empty() {
        let _ = writeln!(out, "\n學生名單");
        let list_width = layout
            .student_list
            .iter()
            .flatten()
            .map(|t| t.width())
            .max()
            .unwrap_or(0);
        for row in &layout.student_list {
            let line: Vec<String> = row
                .iter()
                .map(|t| format!("{t}{}", " ".repeat(list_width - t.width())))
                .collect();
            let _ = writeln!(out, "  {}", line.join("  ").trim_end());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::state::Action;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn chart() -> ClassState {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut state = ClassState::from_config(&EngineConfig {
            rows: 2,
            cols: 3,
            ..EngineConfig::default()
        });
        let names = vec!["01 王小明".to_string(), "02 林大衛(轉入)".into(), "03 陳美玲".into()];
        state = state.apply(Action::LoadRoster(names), &mut rng).unwrap().state;
        let ids: Vec<_> = state.roster().ids().collect();
        let actions = [
            Action::SetClassInfo {
                name: Some("三年二班".into()),
                teacher_name: Some("陳老師".into()),
            },
            Action::Place { student: ids[0], seat: SeatId::new(1, 1) },
            Action::Place { student: ids[1], seat: SeatId::new(2, 3) },
            Action::ToggleLock(SeatId::new(1, 3)),
            Action::ToggleTitle { student: ids[2], kind: TagKind::Teacher, base: "數學".into() },
            Action::ToggleTitle { student: ids[0], kind: TagKind::Officer, base: "班長".into() },
            Action::ToggleTitle { student: ids[2], kind: TagKind::Officer, base: "班長".into() },
        ];
        for action in actions {
            state = state.apply(action, &mut rng).unwrap().state;
        }
        state
    }

    #[test]
    fn student_view_is_row_major_from_the_front() {
        let layout = ChartLayout::build(&chart(), View::Student);
        assert_eq!(layout.title, "三年二班 座位表 (學生視角)");
        assert!(layout.desk_on_top());
        assert_eq!(layout.rows[0][0].0, SeatId::new(1, 1));
        assert_eq!(
            layout.rows[0][0].1,
            Cell::Occupied { roll: "01".into(), name: "王小明".into() }
        );
        assert_eq!(layout.rows[0][2].1, Cell::Locked);
        assert_eq!(
            layout.rows[1][2].1,
            Cell::Occupied { roll: "02".into(), name: "林大衛".into() }
        );
    }

    #[test]
    fn teacher_view_reverses_rows_and_columns() {
        let layout = ChartLayout::build(&chart(), View::Teacher);
        assert_eq!(layout.title, "三年二班 座位表 (導師：陳老師)");
        assert!(!layout.desk_on_top());
        assert_eq!(layout.rows[0][0].0, SeatId::new(2, 3));
        assert_eq!(layout.rows[1][2].0, SeatId::new(1, 1));
    }

    #[test]
    fn role_groups_follow_roster_order() {
        let layout = ChartLayout::build(&chart(), View::Student);
        assert_eq!(
            layout.officers,
            vec![RoleGroup {
                role: "班長".into(),
                holders: vec!["01.王小明".into(), "03.陳美玲".into()],
            }]
        );
        assert_eq!(layout.helpers[0].role, "數學");
        assert_eq!(layout.helpers[0].holders, vec!["03.陳美玲".to_string()]);
    }

    #[test]
    fn student_list_fills_columns_first() {
        let items: Vec<String> = (1..=6).map(|i| i.to_string()).collect();
        let rows = column_major(&items, 4);
        assert_eq!(rows, vec![vec!["1", "3", "5", ""], vec!["2", "4", "6", ""]]);
        assert!(column_major(&[], 4).is_empty());
    }

    #[test]
    fn text_render_contains_every_part() {
        let text = render_text(&ChartLayout::build(&chart(), View::Student));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "三年二班 座位表 (學生視角)");
        assert!(lines[1].contains("[講桌]"));
        assert!(text.contains("01 王小明"));
        assert!(text.contains("✖"));
        assert!(text.contains("班長: 01.王小明, 03.陳美玲"));
        assert!(text.contains("數學: 03.陳美玲"));
        assert!(text.contains("學生名單"));
    }
}
