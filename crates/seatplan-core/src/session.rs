#![forbid(unsafe_code)]

//! An editing session: the current chart, its undo history, and the RNG
//! that random assignment draws from.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::EngineConfig;
use crate::error::{Result, SeatingError};
use crate::history::History;
use crate::snapshot::{self, Snapshot};
use crate::state::{Action, ClassState, Effect};

#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    history: History<ClassState>,
    rng: SmallRng,
}

impl Session {
    /// Start a session on a blank chart built from `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let state = ClassState::from_config(&config);
        Self::with_state(config, state)
    }

    /// Start a session on an existing chart.
    #[must_use]
    pub fn with_state(config: EngineConfig, state: ClassState) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            history: History::new(state, config.history_depth),
            config,
            rng,
        }
    }

    /// Start a session on a loaded chart, refusing grids beyond the
    /// configured maximum.
    pub fn restore(config: EngineConfig, state: ClassState) -> Result<Self> {
        check_grid(&config, &state)?;
        Ok(Self::with_state(config, state))
    }

    #[must_use]
    pub fn state(&self) -> &ClassState {
        self.history.current()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `action` to the current chart.
    ///
    /// Data changes become an undo step. Selection-only changes update the
    /// current state in place. On error nothing changes.
    pub fn update(&mut self, action: Action) -> Result<Effect> {
        let action = self.bound(action);
        let transition = self.history.current().apply(action, &mut self.rng)?;
        if transition.effect.is_change() {
            self.history.record(transition.state);
        } else if transition.effect != Effect::None {
            self.history.replace_current(transition.state);
        }
        Ok(transition.effect)
    }

    /// Clamp a resize to the configured maximum grid.
    fn bound(&self, action: Action) -> Action {
        match action {
            Action::Resize { rows, cols } if !self.config.allows_grid(rows, cols) => {
                let clamped = Action::Resize {
                    rows: rows.clamp(1, self.config.max_rows),
                    cols: cols.clamp(1, self.config.max_cols),
                };
                tracing::debug!(
                    target: "seatplan.engine",
                    rows,
                    cols,
                    max_rows = self.config.max_rows,
                    max_cols = self.config.max_cols,
                    "resize clamped to configured bounds"
                );
                clamped
            }
            other => other,
        }
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the chart with a decoded snapshot. A failed import leaves
    /// the session untouched. Grids beyond the configured maximum are
    /// refused.
    pub fn import(&mut self, snapshot: Snapshot) -> Result<()> {
        let state = snapshot::decode(snapshot)?;
        check_grid(&self.config, &state)?;
        self.history.record(state);
        tracing::info!(target: "seatplan.snapshot", "snapshot imported");
        Ok(())
    }

    /// Parse and import a JSON document.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        self.import(snapshot::from_json(text)?)
    }

    #[must_use]
    pub fn export(&self) -> Snapshot {
        snapshot::encode(self.state())
    }
}

fn check_grid(config: &EngineConfig, state: &ClassState) -> Result<()> {
    let (rows, cols) = (state.grid().rows(), state.grid().cols());
    if config.allows_grid(rows, cols) {
        return Ok(());
    }
    Err(SeatingError::format(format!(
        "grid {rows}x{cols} exceeds the configured maximum {}x{}",
        config.max_rows, config.max_cols
    )))
}
