use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, IntegrationError};
use crate::store::{VariableStore, TIME};
use crate::system::OdeSystem;
use crate::traits::{RowSink, Steppable};

/// When the integration loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Step while `t < maxtime`.
    #[default]
    Exclusive,
    /// Step while `t <= maxtime`.
    Inclusive,
}

// Relative slack for deciding whether a grid point lands on the horizon.
const HORIZON_TOLERANCE: f64 = 1e-9;

impl Boundary {
    /// Number of steps from `t0` to `maxtime`.
    ///
    /// A grid point within `HORIZON_TOLERANCE` (relative) of the horizon counts
    /// as on it, so `Exclusive` gives `ceil((maxtime - t0) / dt)` steps even when
    /// `k * dt` rounds to just below `maxtime`.
    pub fn step_count(self, t0: f64, maxtime: f64, dt: f64) -> usize {
        let ratio = (maxtime - t0) / dt;
        let slack = HORIZON_TOLERANCE * ratio.abs().max(1.0);
        let steps = match self {
            Boundary::Exclusive => (ratio - slack).ceil(),
            Boundary::Inclusive => (ratio + slack).floor() + 1.0,
        };
        steps.max(0.0) as usize
    }
}

/// What to do when a state variable becomes NaN or infinite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonFinitePolicy {
    /// Keep integrating; the value propagates through later steps.
    #[default]
    Propagate,
    /// Fail the run before the offending row is emitted.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub maxtime: f64,
    pub dt: f64,
    pub boundary: Boundary,
    pub non_finite: NonFinitePolicy,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            maxtime: 5.0,
            dt: 0.1,
            boundary: Boundary::Exclusive,
            non_finite: NonFinitePolicy::Propagate,
        }
    }
}

impl IntegratorSettings {
    pub fn new(maxtime: f64, dt: f64) -> Self {
        Self {
            maxtime,
            dt,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(IntegrationError::InvalidSettings(format!(
                "dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !self.maxtime.is_finite() {
            return Err(IntegrationError::InvalidSettings(format!(
                "maxtime must be finite, got {}",
                self.maxtime
            )));
        }
        Ok(())
    }
}

/// Explicit Euler stepper.
///
/// Derivatives are applied one ODE at a time in registration order, so an ODE
/// sees the values already updated by the ODEs before it in the same step.
#[derive(Debug, Clone, Default)]
pub struct Euler {
    non_finite: NonFinitePolicy,
    warned: bool,
}

impl Euler {
    pub fn new(non_finite: NonFinitePolicy) -> Self {
        Self {
            non_finite,
            warned: false,
        }
    }
}

impl Steppable for Euler {
    fn step(
        &mut self,
        system: &OdeSystem,
        store: &mut VariableStore,
        t: f64,
        dt: f64,
    ) -> Result<(), IntegrationError> {
        let eval_err = |symbol: &str, source: EvalError| IntegrationError::Eval {
            symbol: symbol.to_string(),
            time: t,
            source,
        };

        for ode in system.entries() {
            let derivative = ode
                .equation
                .evaluate(store)
                .map_err(|e| eval_err(&ode.symbol, e))?;
            let value = store
                .add(&ode.symbol, derivative * dt)
                .map_err(|e| eval_err(&ode.symbol, e))?;

            if !value.is_finite() {
                match self.non_finite {
                    NonFinitePolicy::Abort => {
                        return Err(IntegrationError::NonFinite {
                            symbol: ode.symbol.clone(),
                            time: t + dt,
                        });
                    }
                    NonFinitePolicy::Propagate if !self.warned => {
                        warn!("{} became {} at t = {}", ode.symbol, value, t + dt);
                        self.warned = true;
                    }
                    NonFinitePolicy::Propagate => {}
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntegratorState {
    /// No run started yet.
    Idle,
    /// Clock below the horizon.
    Running,
    /// Horizon reached, or the run was aborted.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of rows emitted after the initial row.
    pub steps: usize,
    pub final_time: f64,
}

/// Drives a stepper over a fixed time grid and feeds rows to a sink.
pub struct Integrator<S: Steppable> {
    settings: IntegratorSettings,
    stepper: S,
    state: IntegratorState,
}

impl Integrator<Euler> {
    pub fn euler(settings: IntegratorSettings) -> Self {
        Self::new(settings, Euler::new(settings.non_finite))
    }
}

impl<S: Steppable> Integrator<S> {
    pub fn new(settings: IntegratorSettings, stepper: S) -> Self {
        Self {
            settings,
            stepper,
            state: IntegratorState::Idle,
        }
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }

    /// Runs from the store's current `t` to the horizon.
    ///
    /// Emits the header, the initial row, then one row per step. On error the
    /// rows already handed to `sink` stay there and the store keeps the
    /// partially updated values of the failing step.
    pub fn run(
        &mut self,
        system: &OdeSystem,
        store: &mut VariableStore,
        sink: &mut impl RowSink,
    ) -> Result<RunSummary, IntegrationError> {
        self.settings.validate()?;
        let IntegratorSettings { maxtime, dt, .. } = self.settings;

        let mut columns = Vec::with_capacity(system.dimension() + 1);
        columns.push(TIME);
        columns.extend(system.symbols());
        sink.header(&columns)?;

        let t0 = store.time();
        let mut row = Vec::with_capacity(columns.len());
        Self::fill_row(&mut row, t0, system, store)?;
        sink.row(&row)?;

        info!(
            "integrating {} ODE(s) from t = {} to {} with dt = {}",
            system.dimension(),
            t0,
            maxtime,
            dt
        );

        self.state = IntegratorState::Running;
        let result = self.drive(system, store, sink, &mut row, t0);
        self.state = IntegratorState::Done;

        let summary = result?;
        info!(
            "integration finished after {} step(s) at t = {}",
            summary.steps, summary.final_time
        );
        Ok(summary)
    }

    fn drive(
        &mut self,
        system: &OdeSystem,
        store: &mut VariableStore,
        sink: &mut impl RowSink,
        row: &mut Vec<f64>,
        t0: f64,
    ) -> Result<RunSummary, IntegrationError> {
        let IntegratorSettings {
            maxtime,
            dt,
            boundary,
            ..
        } = self.settings;

        let total = boundary.step_count(t0, maxtime, dt);
        let mut steps = 0usize;
        let mut t = t0;
        while steps < total {
            let next_t = t0 + (steps + 1) as f64 * dt;
            store.set_time(t);
            self.stepper.step(system, store, t, dt)?;
            Self::fill_row(row, next_t, system, store)?;
            sink.row(row)?;
            trace!("t = {} -> {:?}", next_t, row);

            t = next_t;
            store.set_time(t);
            steps += 1;
        }
        debug!("clock stopped at t = {} (maxtime = {})", t, maxtime);

        Ok(RunSummary {
            steps,
            final_time: t,
        })
    }

    fn fill_row(
        row: &mut Vec<f64>,
        t: f64,
        system: &OdeSystem,
        store: &VariableStore,
    ) -> Result<(), IntegrationError> {
        row.clear();
        row.push(t);
        for ode in system.entries() {
            let value = store.get(&ode.symbol).map_err(|source| IntegrationError::Eval {
                symbol: ode.symbol.clone(),
                time: t,
                source,
            })?;
            row.push(value);
        }
        Ok(())
    }
}
