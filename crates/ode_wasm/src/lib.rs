use anyhow::Context;
use ode_core::{Boundary, IntegratorSettings, Model, NonFinitePolicy, RunSummary, Trajectory};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

#[derive(Serialize)]
struct RunResult {
    summary: RunSummary,
    trajectory: Trajectory,
}

#[wasm_bindgen]
pub struct WasmModel {
    model: Model,
}

#[wasm_bindgen]
impl WasmModel {
    #[wasm_bindgen(constructor)]
    pub fn new(maxtime: f64, dt: f64) -> WasmModel {
        console_error_panic_hook::set_once();
        WasmModel {
            model: Model::new(IntegratorSettings::new(maxtime, dt)),
        }
    }

    /// Registers `d symbol / dt = equation`, with `equation` in text form.
    pub fn ode(&mut self, symbol: &str, equation: &str) -> Result<(), JsValue> {
        self.add_ode(symbol, equation).map_err(to_js)
    }

    pub fn initial(&mut self, symbol: &str, value: f64) {
        self.model.initial(symbol, value);
    }

    pub fn set_inclusive(&mut self, inclusive: bool) {
        self.model.settings.boundary = if inclusive {
            Boundary::Inclusive
        } else {
            Boundary::Exclusive
        };
    }

    pub fn set_abort_on_non_finite(&mut self, abort: bool) {
        self.model.settings.non_finite = if abort {
            NonFinitePolicy::Abort
        } else {
            NonFinitePolicy::Propagate
        };
    }

    pub fn get_value(&self, symbol: &str) -> Option<f64> {
        self.model.store.get(symbol).ok()
    }

    /// Runs the model and returns the text table.
    pub fn run_table(&mut self) -> Result<String, JsValue> {
        self.table().map_err(to_js)
    }

    /// Runs the model and returns `{ summary, trajectory }`.
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        let result = self.trajectory().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WasmModel {
    fn add_ode(&mut self, symbol: &str, equation: &str) -> anyhow::Result<()> {
        let expr = self
            .model
            .parse(equation)
            .with_context(|| format!("equation for {symbol}"))?;
        self.model.ode(symbol, expr);
        Ok(())
    }

    fn table(&mut self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.model.execute(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn trajectory(&mut self) -> anyhow::Result<RunResult> {
        let mut trajectory = Trajectory::new();
        let summary = self.model.run(&mut trajectory)?;
        Ok(RunResult {
            summary,
            trajectory,
        })
    }
}
