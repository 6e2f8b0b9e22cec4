use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use seatplan_core::{SeatId, TagKind, View};

use crate::commands;
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "seatplan",
    about = "Edit classroom seating charts: roster, locked seats, random seating and roles",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Chart file to read and update.
    #[arg(long, global = true, default_value = "seatplan.json")]
    pub chart: PathBuf,

    /// Engine config file (.json or .toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new, empty chart file.
    Init(InitArgs),

    /// Replace the roster from a text file, one student per line.
    Roster(RosterArgs),

    /// Change the grid size.
    Resize(ResizeArgs),

    /// Show or set the class and teacher name.
    Info(InfoArgs),

    /// Lock an empty seat, or unlock a locked one.
    Lock(SeatArgs),

    /// Send the student on a seat back to the waiting pool.
    Unseat(SeatArgs),

    /// Put a student on a seat, displacing its occupant.
    Place(PlaceArgs),

    /// Exchange the occupants of two seats.
    Swap(SwapArgs),

    /// Seat waiting students at random, or reshuffle everyone when nobody waits.
    Assign,

    /// Unseat every student.
    Clear,

    /// Manage officer and subject tags.
    #[command(subcommand)]
    Tag(TagCommand),

    /// Grant a tag to a student, or take it back.
    Title(TitleArgs),

    /// Print the chart as text.
    Show(ShowArgs),

    /// Render the A4 print page as HTML.
    Print(PrintArgs),

    /// Write a dated copy of the chart.
    Export(ExportArgs),

    /// Replace the chart with the contents of an exported file.
    Import(ImportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    #[arg(long)]
    pub rows: Option<u16>,

    #[arg(long)]
    pub cols: Option<u16>,

    /// Class name.
    #[arg(long)]
    pub name: Option<String>,

    /// Homeroom teacher.
    #[arg(long)]
    pub teacher: Option<String>,

    /// Overwrite an existing chart file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RosterArgs {
    /// Roster text file; `-` reads standard input.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ResizeArgs {
    #[arg(long)]
    pub rows: u16,

    #[arg(long)]
    pub cols: u16,
}

#[derive(Debug, Clone, Args)]
pub struct InfoArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub teacher: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SeatArgs {
    /// Seat as `row-col`, e.g. `2-3`.
    pub seat: SeatId,
}

#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Roster entry or roll number.
    pub student: String,

    pub seat: SeatId,
}

#[derive(Debug, Clone, Args)]
pub struct SwapArgs {
    pub first: SeatId,

    pub second: SeatId,
}

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// Add a custom tag.
    Add(TagArgs),

    /// Delete a custom tag and take it from every holder.
    Delete(TagArgs),

    /// List tags with their holder counts.
    List,
}

#[derive(Debug, Clone, Args)]
pub struct TagArgs {
    #[arg(long, value_enum, default_value_t = KindArg::Officer)]
    pub kind: KindArg,

    pub label: String,
}

#[derive(Debug, Clone, Args)]
pub struct TitleArgs {
    /// Roster entry or roll number.
    pub student: String,

    /// Tag name, without the helper suffix for subject tags.
    pub tag: String,

    #[arg(long, value_enum, default_value_t = KindArg::Officer)]
    pub kind: KindArg,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Student)]
    pub view: ViewArg,
}

#[derive(Debug, Clone, Args)]
pub struct PrintArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Student)]
    pub view: ViewArg,

    /// Output file; standard output when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Directory the dated file is written to.
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Class officer duty.
    Officer,
    /// Subject helper.
    Teacher,
}

impl From<KindArg> for TagKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Officer => Self::Officer,
            KindArg::Teacher => Self::Teacher,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Student,
    Teacher,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Student => Self::Student,
            ViewArg::Teacher => Self::Teacher,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => commands::init(global, args),
        Commands::Roster(args) => commands::roster(global, &args),
        Commands::Resize(args) => commands::resize(global, &args),
        Commands::Info(args) => commands::info(global, args),
        Commands::Lock(args) => commands::lock(global, args.seat),
        Commands::Unseat(args) => commands::unseat(global, args.seat),
        Commands::Place(args) => commands::place(global, &args),
        Commands::Swap(args) => commands::swap(global, &args),
        Commands::Assign => commands::assign(global),
        Commands::Clear => commands::clear(global),
        Commands::Tag(TagCommand::Add(args)) => commands::tag_add(global, args),
        Commands::Tag(TagCommand::Delete(args)) => commands::tag_delete(global, args),
        Commands::Tag(TagCommand::List) => commands::tag_list(global),
        Commands::Title(args) => commands::title(global, args),
        Commands::Show(args) => commands::show(global, &args),
        Commands::Print(args) => commands::print(global, &args),
        Commands::Export(args) => commands::export(global, &args),
        Commands::Import(args) => commands::import(global, &args),
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "seatplan", "place", "01 王小明", "2-3", "--chart", "a.json", "--json",
        ])
        .expect("parse");
        assert_eq!(cli.global.chart, PathBuf::from("a.json"));
        assert!(cli.global.json);
        let Commands::Place(args) = cli.command else {
            panic!("expected place");
        };
        assert_eq!(args.student, "01 王小明");
        assert_eq!(args.seat, SeatId::new(2, 3));
    }

    #[test]
    fn malformed_seat_is_a_parse_error() {
        assert!(Cli::try_parse_from(["seatplan", "lock", "0-1"]).is_err());
        assert!(Cli::try_parse_from(["seatplan", "lock", "row2"]).is_err());
    }

    #[test]
    fn tag_kind_defaults_to_officer() {
        let cli = Cli::try_parse_from(["seatplan", "tag", "add", "午餐"]).expect("parse");
        let Commands::Tag(TagCommand::Add(args)) = cli.command else {
            panic!("expected tag add");
        };
        assert_eq!(TagKind::from(args.kind), TagKind::Officer);
        assert_eq!(cli.global.chart, PathBuf::from("seatplan.json"));
    }

    #[test]
    fn teacher_view_is_selectable() {
        let cli = Cli::try_parse_from(["seatplan", "print", "--view", "teacher"]).expect("parse");
        let Commands::Print(args) = cli.command else {
            panic!("expected print");
        };
        assert_eq!(View::from(args.view), View::Teacher);
        assert!(args.output.is_none());
    }
}
