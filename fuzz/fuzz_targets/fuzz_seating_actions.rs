#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use seatplan_core::{Action, ClassState, EngineConfig, SeatId, StudentId, TagKind};

const TAGS: [&str; 4] = ["班長", "數學", "午餐", "程式"];

#[derive(Debug, Arbitrary)]
enum Op {
    Resize(u8, u8),
    LoadRoster(u8),
    SelectSeat(u8, u8),
    SelectWaiting(u8),
    RemoveFromSeat(u8, u8),
    ToggleLock(u8, u8),
    Place(u8, u8, u8),
    Swap(u8, u8, u8, u8),
    RandomAssign,
    ClearSeats,
    AddTag(bool, u8),
    DeleteTag(bool, u8),
    ToggleTitle(u8, bool, u8),
    SelectTag(bool, u8),
    SelectTitleStudent(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    seed: u64,
    ops: Vec<Op>,
}

fn seat(row: u8, col: u8) -> SeatId {
    SeatId::new(u16::from(row % 8) + 1, u16::from(col % 8) + 1)
}

fn kind(officer: bool) -> TagKind {
    if officer { TagKind::Officer } else { TagKind::Teacher }
}

fn tag(index: u8) -> String {
    TAGS[usize::from(index) % TAGS.len()].to_string()
}

fn student(state: &ClassState, index: u8) -> Option<StudentId> {
    let ids: Vec<_> = state.roster().ids().collect();
    (!ids.is_empty()).then(|| ids[usize::from(index) % ids.len()])
}

fn to_action(state: &ClassState, op: &Op) -> Option<Action> {
    Some(match *op {
        Op::Resize(r, c) => Action::Resize {
            rows: u16::from(r % 8) + 1,
            cols: u16::from(c % 8) + 1,
        },
        Op::LoadRoster(n) => {
            Action::LoadRoster((0..n % 24).map(|i| format!("{:02} s{}", i + 1, i % 5)).collect())
        }
        Op::SelectSeat(r, c) => Action::SelectSeat(seat(r, c)),
        Op::SelectWaiting(i) => Action::SelectWaitingStudent(student(state, i)?),
        Op::RemoveFromSeat(r, c) => Action::RemoveFromSeat(seat(r, c)),
        Op::ToggleLock(r, c) => Action::ToggleLock(seat(r, c)),
        Op::Place(i, r, c) => Action::Place {
            student: student(state, i)?,
            seat: seat(r, c),
        },
        Op::Swap(a, b, c, d) => Action::Swap(seat(a, b), seat(c, d)),
        Op::RandomAssign => Action::RandomAssign,
        Op::ClearSeats => Action::ClearSeats,
        Op::AddTag(k, t) => Action::AddCustomTag {
            kind: kind(k),
            label: tag(t),
        },
        Op::DeleteTag(k, t) => Action::DeleteCustomTag {
            kind: kind(k),
            label: tag(t),
        },
        Op::ToggleTitle(i, k, t) => Action::ToggleTitle {
            student: student(state, i)?,
            kind: kind(k),
            base: tag(t),
        },
        Op::SelectTag(k, t) => Action::SelectTag {
            kind: kind(k),
            base: tag(t),
        },
        Op::SelectTitleStudent(i) => Action::SelectTitleStudent(student(state, i)?),
    })
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 256 {
        return;
    }
    let mut rng = SmallRng::seed_from_u64(input.seed);
    let mut state = ClassState::from_config(&EngineConfig {
        rows: 4,
        cols: 4,
        ..EngineConfig::default()
    });

    for op in &input.ops {
        let Some(action) = to_action(&state, op) else {
            continue;
        };
        match state.apply(action, &mut rng) {
            Ok(transition) => {
                let errors = transition.state.check_invariants();
                assert!(errors.is_empty(), "{errors:?} after {op:?}");
                state = transition.state;
            }
            Err(error) => assert!(error.is_capacity(), "unexpected error: {error}"),
        }
    }
});
