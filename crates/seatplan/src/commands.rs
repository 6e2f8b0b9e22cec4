//! Subcommand handlers.
//!
//! Every editing command follows the same cycle: load the chart file into a
//! [`Session`], apply one action, describe the effect, and write the file
//! back when the chart data changed.

use std::io::Read as _;
use std::path::Path;

use seatplan_core::{
    Action, AssignMode, ChartLayout, ClassState, ConfigError, Effect, EngineConfig, LockChange,
    SeatId, Session, StudentId, TEACHER_SUFFIX, TagAdd, TagKind, TitleToggle, View, display_name,
    export_file_name, load_snapshot, parse_roster, render_print_html, render_text, roll_label,
    save_snapshot, snapshot,
};

use crate::cli::{
    ExportArgs, GlobalArgs, ImportArgs, InfoArgs, InitArgs, PlaceArgs, PrintArgs, ResizeArgs,
    RosterArgs, ShowArgs, SwapArgs, TagArgs, TitleArgs,
};
use crate::error::{CliError, Result};
use crate::util::{emit, ensure_dir, today, write_string};

impl GlobalArgs {
    /// Engine config from `--config`, or the defaults.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        match &self.config {
            Some(path) => Ok(EngineConfig::load(path)?),
            None => Ok(EngineConfig::default()),
        }
    }

    /// Load the chart file into a fresh session.
    pub fn open(&self) -> Result<Session> {
        if !self.chart.exists() {
            return Err(CliError::MissingChart {
                path: self.chart.clone(),
            });
        }
        let config = self.engine_config()?;
        let state = load_snapshot(&self.chart)?;
        tracing::debug!(
            target: "seatplan.cli",
            chart = %self.chart.display(),
            students = state.roster().len(),
            "chart loaded"
        );
        Ok(Session::restore(config, state)?)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.chart.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        save_snapshot(&self.chart, &session.export())?;
        Ok(())
    }
}

/// Build an action against the loaded chart, apply it, and save the chart
/// when its data changed.
fn edit<F>(global: &GlobalArgs, make: F) -> Result<(Session, Effect)>
where
    F: FnOnce(&ClassState) -> Result<Action>,
{
    let mut session = global.open()?;
    let action = make(session.state())?;
    let effect = session.update(action)?;
    if effect.is_change() {
        global.save(&session)?;
    }
    Ok((session, effect))
}

/// `"NN.name"` label of a student, as printed on the chart.
fn student_label(state: &ClassState, id: StudentId) -> String {
    let roster = state.roster();
    match (roster.position(id), roster.name(id)) {
        (Some(position), Some(name)) => format!("{}.{}", roll_label(position), display_name(name)),
        _ => id.to_string(),
    }
}

/// Find a student by exact roster entry, roll number, or printed name.
pub fn resolve_student(state: &ClassState, query: &str) -> Result<StudentId> {
    let roster = state.roster();
    let query = query.trim();
    if let Some(id) = roster.find_by_name(query) {
        return Ok(id);
    }
    if let Some(student) = query.parse::<usize>().ok().and_then(|roll| roster.by_roll(roll)) {
        return Ok(student.id);
    }
    roster
        .iter()
        .find(|student| display_name(&student.name) == query)
        .map(|student| student.id)
        .ok_or_else(|| CliError::UnknownStudent {
            query: query.to_string(),
        })
}

fn check_seat(state: &ClassState, seat: SeatId) -> Result<()> {
    let grid = state.grid();
    if grid.contains(seat) {
        Ok(())
    } else {
        Err(CliError::invalid(format!(
            "seat {seat} is outside the {}x{} grid",
            grid.rows(),
            grid.cols()
        )))
    }
}

fn kind_name(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Officer => "officer",
        TagKind::Teacher => "subject",
    }
}

pub fn init(global: &GlobalArgs, args: InitArgs) -> Result<()> {
    if global.chart.exists() && !args.force {
        return Err(CliError::ChartExists {
            path: global.chart.clone(),
        });
    }
    let mut config = global.engine_config()?;
    config.rows = args.rows.unwrap_or(config.rows);
    config.cols = args.cols.unwrap_or(config.cols);
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors).into());
    }

    let (rows, cols) = (config.rows, config.cols);
    let mut session = Session::new(config);
    if args.name.is_some() || args.teacher.is_some() {
        session.update(Action::SetClassInfo {
            name: args.name,
            teacher_name: args.teacher,
        })?;
    }
    global.save(&session)?;
    emit(
        global.json,
        "init",
        &format!("created {rows}x{cols} chart {}", global.chart.display()),
    );
    Ok(())
}

fn read_roster_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub fn roster(global: &GlobalArgs, args: &RosterArgs) -> Result<()> {
    let entries = parse_roster(&read_roster_text(&args.file)?);
    let (session, effect) = edit(global, |_| Ok(Action::LoadRoster(entries)))?;
    let Effect::RosterLoaded(change) = effect else {
        return Ok(());
    };
    let mut message = format!(
        "roster has {} students ({} new, {} kept, {} removed)",
        session.state().roster().len(),
        change.added.len(),
        change.kept.len(),
        change.removed.len()
    );
    let duplicates = session.state().roster().duplicate_names();
    if !duplicates.is_empty() {
        message.push_str(&format!("; repeated names: {}", duplicates.join(", ")));
    }
    emit(global.json, "roster", &message);
    Ok(())
}

pub fn resize(global: &GlobalArgs, args: &ResizeArgs) -> Result<()> {
    let (session, effect) = edit(global, |_| {
        Ok(Action::Resize {
            rows: args.rows,
            cols: args.cols,
        })
    })?;
    let grid = session.state().grid();
    let mut message = format!("grid is now {}x{}", grid.rows(), grid.cols());
    if let Effect::Resized(report) = effect {
        if !report.dropped_locks.is_empty() {
            message.push_str(&format!("; {} locks dropped", report.dropped_locks.len()));
        }
        if !report.unseated.is_empty() {
            message.push_str(&format!(
                "; {} students back in the waiting pool",
                report.unseated.len()
            ));
        }
    }
    emit(global.json, "resize", &message);
    Ok(())
}

pub fn info(global: &GlobalArgs, args: InfoArgs) -> Result<()> {
    let session = if args.name.is_none() && args.teacher.is_none() {
        global.open()?
    } else {
        edit(global, |_| {
            Ok(Action::SetClassInfo {
                name: args.name,
                teacher_name: args.teacher,
            })
        })?
        .0
    };
    let state = session.state();
    let grid = state.grid();
    emit(
        global.json,
        "info",
        &format!(
            "class {:?}, teacher {:?}, {}x{} seats, {} locked, {} students, {} waiting",
            state.name(),
            state.teacher_name(),
            grid.rows(),
            grid.cols(),
            grid.locked_count(),
            state.roster().len(),
            state.waiting_pool().len()
        ),
    );
    Ok(())
}

pub fn lock(global: &GlobalArgs, seat: SeatId) -> Result<()> {
    let (session, effect) = edit(global, |state| {
        check_seat(state, seat)?;
        Ok(Action::ToggleLock(seat))
    })?;
    let message = match effect {
        Effect::Lock(_, LockChange::Locked) => format!("seat {seat} locked"),
        Effect::Lock(_, LockChange::Unlocked) => format!("seat {seat} unlocked"),
        _ => match session.state().arrangement().occupant(seat) {
            Some(id) => format!(
                "seat {seat} is taken by {}; unseat first",
                student_label(session.state(), id)
            ),
            None => format!("seat {seat} unchanged"),
        },
    };
    emit(global.json, "lock", &message);
    Ok(())
}

pub fn unseat(global: &GlobalArgs, seat: SeatId) -> Result<()> {
    let (session, effect) = edit(global, |_| Ok(Action::Unseat(seat)))?;
    let message = match effect {
        Effect::Unseated { student, .. } => format!(
            "{} left seat {seat}",
            student_label(session.state(), student)
        ),
        _ => format!("seat {seat} is empty"),
    };
    emit(global.json, "unseat", &message);
    Ok(())
}

pub fn place(global: &GlobalArgs, args: &PlaceArgs) -> Result<()> {
    let seat = args.seat;
    let mut student = None;
    let (session, effect) = edit(global, |state| {
        check_seat(state, seat)?;
        let id = resolve_student(state, &args.student)?;
        student = Some(id);
        Ok(Action::Place { student: id, seat })
    })?;
    let state = session.state();
    let Some(student) = student else {
        return Ok(());
    };
    let message = match effect {
        Effect::Seated { displaced, .. } => {
            let mut message = format!("{} seated at {seat}", student_label(state, student));
            if let Some(other) = displaced {
                message.push_str(&format!(
                    "; {} back in the waiting pool",
                    student_label(state, other)
                ));
            }
            message
        }
        _ if state.grid().is_locked(seat) => format!("seat {seat} is locked"),
        _ => format!("{} already sits at {seat}", student_label(state, student)),
    };
    emit(global.json, "place", &message);
    Ok(())
}

pub fn swap(global: &GlobalArgs, args: &SwapArgs) -> Result<()> {
    let (_, effect) = edit(global, |state| {
        check_seat(state, args.first)?;
        check_seat(state, args.second)?;
        Ok(Action::Swap(args.first, args.second))
    })?;
    let message = match effect {
        Effect::Swapped(a, b) => format!("swapped seats {a} and {b}"),
        _ => format!(
            "nothing to swap between {} and {}",
            args.first, args.second
        ),
    };
    emit(global.json, "swap", &message);
    Ok(())
}

pub fn assign(global: &GlobalArgs) -> Result<()> {
    let (session, effect) = edit(global, |_| Ok(Action::RandomAssign))?;
    let Effect::Assigned(report) = effect else {
        return Ok(());
    };
    let mode = match report.mode {
        AssignMode::Fill => "seated",
        AssignMode::Reshuffle => "reshuffled",
    };
    let mut message = format!("{mode} {} students", report.placed.len());
    if !report.unplaced.is_empty() {
        let names: Vec<_> = report
            .unplaced
            .iter()
            .map(|id| student_label(session.state(), *id))
            .collect();
        message.push_str(&format!("; no seat left for {}", names.join(", ")));
    }
    emit(global.json, "assign", &message);
    Ok(())
}

pub fn clear(global: &GlobalArgs) -> Result<()> {
    let (_, effect) = edit(global, |_| Ok(Action::ClearSeats))?;
    let unseated = match effect {
        Effect::Cleared { unseated } => unseated,
        _ => 0,
    };
    emit(global.json, "clear", &format!("unseated {unseated} students"));
    Ok(())
}

pub fn tag_add(global: &GlobalArgs, args: TagArgs) -> Result<()> {
    let kind = TagKind::from(args.kind);
    let label = args.label.trim().to_string();
    let (_, effect) = edit(global, |_| {
        Ok(Action::AddCustomTag {
            kind,
            label: label.clone(),
        })
    })?;
    match effect {
        Effect::TagAdded(TagAdd::Added) => {
            emit(
                global.json,
                "tag add",
                &format!("added {} tag {label:?}", kind_name(kind)),
            );
            Ok(())
        }
        Effect::TagAdded(TagAdd::Duplicate) => Err(CliError::invalid(format!(
            "{} tag {label:?} already exists",
            kind_name(kind)
        ))),
        Effect::TagAdded(TagAdd::Reserved) => Err(CliError::invalid(format!(
            "officer tag {label:?} may not end in {TEACHER_SUFFIX:?}"
        ))),
        _ => Err(CliError::invalid("tag label is blank")),
    }
}

pub fn tag_delete(global: &GlobalArgs, args: TagArgs) -> Result<()> {
    let kind = TagKind::from(args.kind);
    let label = args.label.trim().to_string();
    let (_, effect) = edit(global, |_| {
        Ok(Action::DeleteCustomTag {
            kind,
            label: label.clone(),
        })
    })?;
    match effect {
        Effect::TagDeleted { stripped } => {
            emit(
                global.json,
                "tag delete",
                &format!(
                    "deleted {} tag {label:?}, taken from {stripped} students",
                    kind_name(kind)
                ),
            );
            Ok(())
        }
        _ => Err(CliError::invalid(format!(
            "no custom {} tag {label:?}",
            kind_name(kind)
        ))),
    }
}

pub fn tag_list(global: &GlobalArgs) -> Result<()> {
    let session = global.open()?;
    let registry = session.state().registry();
    let mut lines = Vec::new();
    for kind in [TagKind::Officer, TagKind::Teacher] {
        let entries: Vec<_> = registry
            .tags(kind)
            .iter()
            .map(|tag| {
                let marker = if registry.is_custom(kind, tag) { "*" } else { "" };
                format!("{tag}{marker}({})", registry.usage(kind, tag))
            })
            .collect();
        lines.push(format!("{}: {}", kind_name(kind), entries.join(" ")));
    }
    emit(global.json, "tag list", &lines.join("\n"));
    Ok(())
}

pub fn title(global: &GlobalArgs, args: TitleArgs) -> Result<()> {
    let kind = TagKind::from(args.kind);
    let base = args.tag.trim().to_string();
    let mut student = None;
    let (session, effect) = edit(global, |state| {
        let id = resolve_student(state, &args.student)?;
        student = Some(id);
        Ok(Action::ToggleTitle {
            student: id,
            kind,
            base: base.clone(),
        })
    })?;
    let Some(student) = student else {
        return Ok(());
    };
    let who = student_label(session.state(), student);
    let label = kind.full_tag(&base);
    let message = match effect {
        Effect::Title(TitleToggle::Added) => format!("{who} is now {label}"),
        Effect::Title(TitleToggle::Removed) => format!("{who} is no longer {label}"),
        _ => {
            return Err(CliError::invalid(format!(
                "unknown {} tag {base:?}",
                kind_name(kind)
            )));
        }
    };
    emit(global.json, "title", &message);
    Ok(())
}

pub fn show(global: &GlobalArgs, args: &ShowArgs) -> Result<()> {
    let session = global.open()?;
    if global.json {
        println!("{}", snapshot::to_json(&session.export())?);
    } else {
        let layout = ChartLayout::build(session.state(), View::from(args.view));
        print!("{}", render_text(&layout));
    }
    Ok(())
}

pub fn print(global: &GlobalArgs, args: &PrintArgs) -> Result<()> {
    let session = global.open()?;
    let html = render_print_html(session.state(), View::from(args.view));
    match &args.output {
        Some(path) => {
            write_string(path, &html)?;
            emit(
                global.json,
                "print",
                &format!("wrote {}", path.display()),
            );
        }
        None => print!("{html}"),
    }
    Ok(())
}

pub fn export(global: &GlobalArgs, args: &ExportArgs) -> Result<()> {
    let session = global.open()?;
    ensure_dir(&args.out_dir)?;
    let path = args
        .out_dir
        .join(export_file_name(session.state().name(), today()));
    save_snapshot(&path, &session.export())?;
    emit(global.json, "export", &format!("wrote {}", path.display()));
    Ok(())
}

pub fn import(global: &GlobalArgs, args: &ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)?;
    let mut session = if global.chart.exists() {
        global.open()?
    } else {
        Session::new(global.engine_config()?)
    };
    session.import_json(&text)?;
    global.save(&session)?;

    let state = session.state();
    emit(
        global.json,
        "import",
        &format!(
            "imported {:?}: {}x{} seats, {} students",
            state.name(),
            state.grid().rows(),
            state.grid().cols(),
            state.roster().len()
        ),
    );
    Ok(())
}
