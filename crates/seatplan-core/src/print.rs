#![forbid(unsafe_code)]

//! A4 print page.
//!
//! The page splits 60/40: the titled seat chart with the desk on top, and a
//! footer with the officer roles, the subject helpers and the student list
//! side by side. Every string taken from the chart is HTML-escaped.

use std::fmt::Write as _;

use crate::layout::{Cell, ChartLayout, DESK_LABEL, RoleGroup, View};
use crate::state::ClassState;

const GAP_PX: u32 = 8;
/// Usable width of the chart area in CSS pixels.
const CHART_WIDTH_PX: u32 = 720;

fn html_escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Seat box size for a grid `cols` wide.
fn seat_size(cols: usize) -> (u32, u32) {
    let cols = u32::try_from(cols.max(1)).unwrap_or(u32::MAX);
    let width = (CHART_WIDTH_PX / cols).saturating_sub(GAP_PX).max(1);
    (width, width * 2 / 3)
}

/// Render the print page of `state` from the given point of view.
#[must_use]
pub fn render_print_html(state: &ClassState, view: View) -> String {
    render_layout_html(&ChartLayout::build(state, view))
}

#[must_use]
pub fn render_layout_html(layout: &ChartLayout) -> String {
    let cols = layout.rows.first().map_or(1, Vec::len);
    let (seat_w, seat_h) = seat_size(cols);

    let mut grid = format!(
        "<div style=\"display: flex; flex-direction: column; align-items: center; gap: {GAP_PX}px; width: 100%;\">\n"
    );
    for row in &layout.rows {
        let _ = write!(grid, "<div style=\"display: flex; gap: {GAP_PX}px;\">");
        for (_, cell) in row {
            let base = format!(
                "width: {seat_w}px; height: {seat_h}px; border: 1.5px solid #000; display: flex; flex-direction: column; align-items: center; justify-content: center; box-sizing: border-box; overflow: hidden;"
            );
            match cell {
                Cell::Locked => {
                    let _ = write!(
                        grid,
                        "<div class=\"seat locked\" style=\"{base} background-color: #fff; color: #991b1b; font-size: {}px;\">✖</div>",
                        seat_h / 2
                    );
                }
                Cell::Empty => {
                    let _ = write!(
                        grid,
                        "<div class=\"seat empty\" style=\"{base} background-color: #f9fafb; border-style: dashed; border-color: #ccc;\"></div>"
                    );
                }
                Cell::Occupied { roll, name } => {
                    let _ = write!(
                        grid,
                        "<div class=\"seat\" style=\"{base} background-color: #fff; color: #000; padding: 2px; line-height: 1.2;\">\
                         <div style=\"font-size: {}px; color: #444;\">{}</div>\
                         <div style=\"font-size: {}px; font-weight: bold; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; max-width: 95%;\">{}</div></div>",
                        seat_h * 28 / 100,
                        html_escape(roll),
                        seat_h * 38 / 100,
                        html_escape(name)
                    );
                }
            }
        }
        grid.push_str("</div>\n");
    }
    grid.push_str("</div>\n");

    let desk = format!(
        "<div class=\"desk\" style=\"width: {seat_w}px; height: {seat_h}px; border: 2.5px solid #000; background-color: #dcfce7; display: flex; align-items: center; justify-content: center; font-weight: bold; margin: {GAP_PX}px auto; font-size: {}px;\">{DESK_LABEL}</div>\n",
        seat_h * 35 / 100
    );
    let (above, below) = if layout.view == View::Student {
        (desk.as_str(), "")
    } else {
        ("", desk.as_str())
    };

    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"zh-Hant\">\n<head>\n  <meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "  <title>{}</title>", html_escape(&layout.title));
    html.push_str(
        "  <style>\n    @media print { @page { size: A4; margin: 0.5cm; } body { margin: 0; padding: 0; -webkit-print-color-adjust: exact; } }\n    body { font-family: 'Noto Sans TC', 'Microsoft JhengHei', sans-serif; }\n    h3 { text-align: center; border-bottom: 2.5px solid #000; margin: 0 0 10px 0; font-size: 18px; padding-bottom: 5px; }\n  </style>\n</head>\n<body>\n",
    );
    html.push_str("<div class=\"page\" style=\"width: 200mm; height: 287mm; display: flex; flex-direction: column; box-sizing: border-box; margin: 0 auto; overflow: hidden;\">\n");
    html.push_str("<div class=\"chart\" style=\"height: 60%; display: flex; flex-direction: column; align-items: center; justify-content: center; border-bottom: 3px dashed #000; padding-bottom: 10px; box-sizing: border-box;\">\n");
    let _ = writeln!(
        html,
        "<h1 style=\"text-align: center; margin: 0 0 15px 0; font-size: 28px; letter-spacing: 3px;\">{}</h1>",
        html_escape(&layout.title)
    );
    html.push_str(above);
    html.push_str(&grid);
    html.push_str(below);
    html.push_str("</div>\n");

    html.push_str("<div class=\"lists\" style=\"height: 40%; display: flex; padding-top: 20px; box-sizing: border-box; width: 100%;\">\n");
    html.push_str(&role_section("班級幹部", &layout.officers, "22.22%"));
    html.push_str(&role_section("學科小老師", &layout.helpers, "33.33%"));
    html.push_str(&student_list_section(&layout.student_list));
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

fn role_section(heading: &str, groups: &[RoleGroup], width: &str) -> String {
    let mut html = format!(
        "<div class=\"roles\" style=\"width: {width}; box-sizing: border-box; padding: 0 8px; border-right: 1.5px solid #000;\">\n<h3>{heading}</h3>\n<div style=\"font-size: 16px; line-height: 1.4;\">\n"
    );
    if groups.is_empty() {
        html.push_str("<div style=\"color: #999; text-align: center; font-style: italic;\">尚未設定</div>\n");
    }
    for group in groups {
        let _ = writeln!(
            html,
            "<div style=\"margin-bottom: 6px;\"><strong>{}</strong>: {}</div>",
            html_escape(&group.role),
            html_escape(&group.holders.join(", "))
        );
    }
    html.push_str("</div>\n</div>\n");
    html
}

fn student_list_section(rows: &[Vec<String>]) -> String {
    let mut html = String::from(
        "<div class=\"students\" style=\"width: 44.44%; box-sizing: border-box; padding: 0 10px;\">\n<h3>學生名單</h3>\n<div style=\"display: grid; grid-template-columns: repeat(4, 1fr); gap: 4px; font-size: 15px;\">\n",
    );
    for entry in rows.iter().flatten() {
        let _ = writeln!(
            html,
            "<div style=\"border-bottom: 1px solid #eee; padding: 3px; min-height: 1.5em; white-space: nowrap;\">{}</div>",
            html_escape(entry)
        );
    }
    html.push_str("</div>\n</div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::SeatId;
    use crate::state::Action;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn chart(names: &[&str]) -> ClassState {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut state = ClassState::default();
        for action in [
            Action::SetClassInfo {
                name: Some("<b>七年級</b>".into()),
                teacher_name: Some("林 & 王".into()),
            },
            Action::Resize { rows: 2, cols: 2 },
            Action::LoadRoster(names.iter().map(|s| s.to_string()).collect()),
            Action::ToggleLock(SeatId::new(2, 2)),
            Action::RandomAssign,
        ] {
            state = state.apply(action, &mut rng).unwrap().state;
        }
        state
    }

    #[test]
    fn chart_strings_are_escaped() {
        let html = render_print_html(&chart(&["01 <script>"]), View::Teacher);
        assert!(html.contains("&lt;b&gt;七年級"));
        assert!(html.contains("(導師：林 &amp; 王)"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>七年級"));
    }

    #[test]
    fn page_has_every_section() {
        let html = render_print_html(&chart(&["01 王小明", "02 林大衛", "03"]), View::Student);
        assert_eq!(html.matches("class=\"seat").count(), 4);
        assert_eq!(html.matches("class=\"seat locked\"").count(), 1);
        assert!(html.contains("班級幹部"));
        assert!(html.contains("學科小老師"));
        assert_eq!(html.matches("尚未設定").count(), 2);
        assert!(html.contains("01.王小明"));
        assert!(html.contains("03."));
    }

    #[test]
    fn desk_position_follows_view() {
        let state = chart(&["a"]);
        let student = render_print_html(&state, View::Student);
        let teacher = render_print_html(&state, View::Teacher);
        let desk = |html: &str| html.find("class=\"desk\"").unwrap();
        let first_seat = |html: &str| html.find("class=\"seat").unwrap();
        assert!(desk(&student) < first_seat(&student));
        assert!(desk(&teacher) > first_seat(&teacher));
    }

    #[test]
    fn seat_size_shrinks_with_columns() {
        assert_eq!(seat_size(6), (112, 74));
        assert_eq!(seat_size(0), seat_size(1));
        assert!(seat_size(20).0 < seat_size(6).0);
    }
}
