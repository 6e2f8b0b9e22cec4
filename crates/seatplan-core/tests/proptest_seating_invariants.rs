#![forbid(unsafe_code)]

//! Property tests for chart invariants under arbitrary edit sequences.
//!
//! Validates:
//! 1. No student ever occupies two seats, and the reverse index agrees.
//! 2. Locked seats are never occupied.
//! 3. Usage counters always equal the number of holders.
//! 4. A failed transition leaves the state untouched.
//! 5. Granting and then revoking a title is an identity.
//! 6. Encode → decode → encode is stable.
//! 7. Fill assignment seats exactly `min(pool, free seats)` students.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use seatplan_core::snapshot::{decode, encode_at};
use seatplan_core::{
    Action, AssignMode, ClassState, Effect, EngineConfig, Roster, SeatId, StudentId, TagKind,
};

// ============================================================================
// Strategies
// ============================================================================

const TAG_POOL: [&str; 6] = ["班長", "數學", "衛生", "午餐", "程式", "英文小老師"];

/// Raw operations; student and tag indexes are resolved against the state
/// they are applied to.
#[derive(Debug, Clone)]
enum Op {
    Resize(u16, u16),
    LoadRoster(usize),
    SelectSeat(u16, u16),
    SelectWaiting(usize),
    RemoveFromSeat(u16, u16),
    ToggleLock(u16, u16),
    Place(usize, u16, u16),
    Swap(u16, u16, u16, u16),
    Unseat(u16, u16),
    RandomAssign,
    ClearSeats,
    AddTag(bool, usize),
    DeleteTag(bool, usize),
    ToggleTitle(usize, bool, usize),
    SelectTag(bool, usize),
    SelectTitleStudent(usize),
}

fn coord() -> impl Strategy<Value = u16> {
    1u16..=5
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (1u16..=4, 1u16..=4).prop_map(|(r, c)| Op::Resize(r, c)),
        1 => (0usize..=10).prop_map(Op::LoadRoster),
        3 => (coord(), coord()).prop_map(|(r, c)| Op::SelectSeat(r, c)),
        3 => any::<usize>().prop_map(Op::SelectWaiting),
        2 => (coord(), coord()).prop_map(|(r, c)| Op::RemoveFromSeat(r, c)),
        2 => (coord(), coord()).prop_map(|(r, c)| Op::ToggleLock(r, c)),
        2 => (any::<usize>(), coord(), coord()).prop_map(|(i, r, c)| Op::Place(i, r, c)),
        2 => (coord(), coord(), coord(), coord()).prop_map(|(a, b, c, d)| Op::Swap(a, b, c, d)),
        1 => (coord(), coord()).prop_map(|(r, c)| Op::Unseat(r, c)),
        2 => Just(Op::RandomAssign),
        1 => Just(Op::ClearSeats),
        1 => (any::<bool>(), 0usize..TAG_POOL.len()).prop_map(|(k, t)| Op::AddTag(k, t)),
        1 => (any::<bool>(), 0usize..TAG_POOL.len()).prop_map(|(k, t)| Op::DeleteTag(k, t)),
        3 => (any::<usize>(), any::<bool>(), 0usize..TAG_POOL.len())
            .prop_map(|(i, k, t)| Op::ToggleTitle(i, k, t)),
        2 => (any::<bool>(), 0usize..TAG_POOL.len()).prop_map(|(k, t)| Op::SelectTag(k, t)),
        2 => any::<usize>().prop_map(Op::SelectTitleStudent),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn kind(officer: bool) -> TagKind {
    if officer { TagKind::Officer } else { TagKind::Teacher }
}

fn student(state: &ClassState, index: usize) -> StudentId {
    let ids: Vec<_> = state.roster().ids().collect();
    if ids.is_empty() {
        // Any id is unknown to an empty roster.
        return Roster::from_names(["probe"]).ids().next().expect("one id");
    }
    ids[index % ids.len()]
}

fn to_action(state: &ClassState, op: &Op) -> Action {
    let seat = SeatId::new;
    match *op {
        Op::Resize(r, c) => Action::Resize { rows: r, cols: c },
        Op::LoadRoster(n) => Action::LoadRoster((0..n).map(|i| format!("s{i}")).collect()),
        Op::SelectSeat(r, c) => Action::SelectSeat(seat(r, c)),
        Op::SelectWaiting(i) => Action::SelectWaitingStudent(student(state, i)),
        Op::RemoveFromSeat(r, c) => Action::RemoveFromSeat(seat(r, c)),
        Op::ToggleLock(r, c) => Action::ToggleLock(seat(r, c)),
        Op::Place(i, r, c) => Action::Place {
            student: student(state, i),
            seat: seat(r, c),
        },
        Op::Swap(a, b, c, d) => Action::Swap(seat(a, b), seat(c, d)),
        Op::Unseat(r, c) => Action::Unseat(seat(r, c)),
        Op::RandomAssign => Action::RandomAssign,
        Op::ClearSeats => Action::ClearSeats,
        Op::AddTag(k, t) => Action::AddCustomTag {
            kind: kind(k),
            label: TAG_POOL[t].into(),
        },
        Op::DeleteTag(k, t) => Action::DeleteCustomTag {
            kind: kind(k),
            label: TAG_POOL[t].into(),
        },
        Op::ToggleTitle(i, k, t) => Action::ToggleTitle {
            student: student(state, i),
            kind: kind(k),
            base: TAG_POOL[t].into(),
        },
        Op::SelectTag(k, t) => Action::SelectTag {
            kind: kind(k),
            base: TAG_POOL[t].into(),
        },
        Op::SelectTitleStudent(i) => Action::SelectTitleStudent(student(state, i)),
    }
}

fn initial() -> ClassState {
    ClassState::from_config(&EngineConfig {
        rows: 3,
        cols: 3,
        ..EngineConfig::default()
    })
}

/// Run `ops`, checking invariants after every step. Returns the end state.
fn drive(ops: &[Op], seed: u64) -> Result<ClassState, TestCaseError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = initial();
    for op in ops {
        let action = to_action(&state, op);
        match state.apply(action.clone(), &mut rng) {
            Ok(transition) => {
                let errors = transition.state.check_invariants();
                prop_assert!(errors.is_empty(), "{:?} after {:?}", errors, action);
                if transition.effect == Effect::None {
                    prop_assert_eq!(&transition.state, &state);
                }
                state = transition.state;
            }
            Err(err) => prop_assert!(err.is_capacity(), "unexpected error {}", err),
        }
    }
    Ok(state)
}

// ============================================================================
// Invariants 1-4: every transition keeps the chart consistent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn invariants_hold_under_any_sequence(ops in ops_strategy(60), seed in any::<u64>()) {
        let state = drive(&ops, seed)?;
        for (seat, _) in state.arrangement().iter() {
            prop_assert!(!state.grid().is_locked(seat));
            prop_assert!(state.grid().contains(seat));
        }
    }
}

// ============================================================================
// Invariant 5: toggling a title twice is an identity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn double_toggle_is_identity(
        ops in ops_strategy(40),
        seed in any::<u64>(),
        who in any::<usize>(),
        officer in any::<bool>(),
        tag in 0usize..TAG_POOL.len(),
    ) {
        let state = drive(&ops, seed)?;
        prop_assume!(!state.roster().is_empty());
        let id = student(&state, who);
        prop_assume!(!state.titles().has(id, &kind(officer).full_tag(TAG_POOL[tag])));
        let toggle = Action::ToggleTitle {
            student: id,
            kind: kind(officer),
            base: TAG_POOL[tag].into(),
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        let once = state.apply(toggle.clone(), &mut rng).unwrap().state;
        let twice = once.apply(toggle, &mut rng).unwrap().state;
        prop_assert_eq!(twice, state);
    }
}

// ============================================================================
// Invariant 6: snapshot round trip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn snapshot_round_trip_is_stable(ops in ops_strategy(50), seed in any::<u64>()) {
        let state = drive(&ops, seed)?;
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let first = encode_at(&state, at);
        let decoded = decode(first.clone()).unwrap();
        prop_assert!(decoded.check_invariants().is_empty());
        prop_assert_eq!(decoded.grid(), state.grid());
        prop_assert_eq!(decoded.registry(), state.registry());
        prop_assert_eq!(encode_at(&decoded, at), first);
    }
}

// ============================================================================
// Invariant 7: fill assignment count
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fill_seats_min_of_pool_and_free(ops in ops_strategy(40), seed in any::<u64>()) {
        let state = drive(&ops, seed)?;
        let pool = state.waiting_pool().len();
        prop_assume!(pool > 0);
        let free = state.free_seats().len();
        let before = state.arrangement().len();

        let mut rng = SmallRng::seed_from_u64(seed);
        let transition = state.apply(Action::RandomAssign, &mut rng).unwrap();
        let Effect::Assigned(report) = transition.effect else {
            return Err(TestCaseError::fail("expected an assignment"));
        };
        prop_assert_eq!(report.mode, AssignMode::Fill);
        prop_assert_eq!(transition.state.arrangement().len() - before, pool.min(free));
        prop_assert_eq!(report.unplaced.len(), pool.saturating_sub(free));
        for seat in state.grid().locked() {
            prop_assert!(!transition.state.arrangement().is_occupied(seat));
        }
    }
}
