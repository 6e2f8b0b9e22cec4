#![forbid(unsafe_code)]

//! Structured log events emitted by the engine and the snapshot codec.
//!
//! Run:
//!   cargo test -p seatplan-core --test tracing_events

use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use seatplan_core::snapshot;
use seatplan_core::{Action, ClassState, EngineConfig, SeatId};

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    span: Option<String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        let span = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
            span,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: events.clone(),
        });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(9)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn rejected_lock_warns_on_engine_target() {
    let events = capture(|| {
        let state = ClassState::from_config(&EngineConfig {
            rows: 1,
            cols: 2,
            ..EngineConfig::default()
        });
        let state = state
            .apply(Action::LoadRoster(vec!["a".into(), "b".into()]), &mut rng())
            .unwrap()
            .state;
        assert!(state.apply(Action::ToggleLock(SeatId::new(1, 1)), &mut rng()).is_err());
    });
    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("a warning");
    assert_eq!(warning.target, "seatplan.engine");
    assert!(warning.message.contains("lock rejected"), "{warning:?}");
}

#[test]
fn random_assignment_logs_inside_its_span() {
    let events = capture(|| {
        let state = ClassState::default()
            .apply(Action::LoadRoster(vec!["a".into()]), &mut rng())
            .unwrap()
            .state;
        state.apply(Action::RandomAssign, &mut rng()).unwrap();
    });
    let event = events
        .iter()
        .find(|e| e.message.contains("random assignment"))
        .expect("assignment event");
    assert_eq!(event.level, tracing::Level::DEBUG);
    assert_eq!(event.span.as_deref(), Some("seating.assign"));
}

#[test]
fn dropped_snapshot_entries_are_reported() {
    let events = capture(|| {
        snapshot::import(
            r#"{"classData": {"rows": 1, "cols": 1, "students": ["a"],
                "seatingArrangement": {"1-1": "ghost"}}}"#,
        )
        .unwrap();
    });
    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN && e.target == "seatplan.snapshot")
        .collect();
    assert!(
        warnings.iter().any(|e| e.message.contains("unknown student")),
        "{warnings:?}"
    );
}
