use log::debug;

use crate::error::{IntegrationError, ParseError};
use crate::expr::Expr;
use crate::integrator::{Integrator, IntegratorSettings, RunSummary};
use crate::output::TableWriter;
use crate::parser;
use crate::store::VariableStore;
use crate::system::OdeSystem;
use crate::traits::RowSink;

/// A complete simulation: variable store, ODE system and integrator settings.
///
/// Build expressions with the construction methods, register ODEs with
/// [`Model::ode`], optionally override initial values with
/// [`Model::initial`], then call [`Model::run`].
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub store: VariableStore,
    system: OdeSystem,
    pub settings: IntegratorSettings,
}

impl Model {
    pub fn new(settings: IntegratorSettings) -> Self {
        Self {
            store: VariableStore::new(),
            system: OdeSystem::new(),
            settings,
        }
    }

    pub fn constant(&self, value: f64) -> Expr {
        Expr::constant(value)
    }

    pub fn binary(&self, left: Expr, op: &str, right: Expr) -> Expr {
        Expr::binary(left, op, right)
    }

    pub fn unary(&self, op: &str, operand: Expr) -> Expr {
        Expr::unary(op, operand)
    }

    pub fn call(&self, name: &str, args: Vec<Expr>) -> Expr {
        Expr::call(name, args)
    }

    /// Reference to `symbol`. Declares it as 0 in the store if it is new.
    pub fn variable(&mut self, symbol: &str) -> Expr {
        if self.store.declare(symbol) {
            debug!("declared variable {symbol}");
        }
        Expr::Variable(symbol.to_string())
    }

    /// Parses `source` and declares every variable it references.
    pub fn parse(&mut self, source: &str) -> Result<Expr, ParseError> {
        let expr = parser::parse(source)?;
        let store = &mut self.store;
        expr.for_each_variable(&mut |symbol: &str| {
            if store.declare(symbol) {
                debug!("declared variable {symbol}");
            }
        });
        Ok(expr)
    }

    /// Registers `d symbol / dt = equation`. The symbol starts at 0 unless it
    /// already has a value.
    pub fn ode(&mut self, symbol: &str, equation: Expr) {
        if !self.store.contains(symbol) {
            self.initial(symbol, 0.0);
        }
        debug!("registered d{symbol}/dt = {equation:?}");
        self.system.insert(symbol, equation);
    }

    pub fn initial(&mut self, symbol: &str, value: f64) {
        self.store.set(symbol, value);
    }

    pub fn system(&self) -> &OdeSystem {
        &self.system
    }

    /// Integrates from the store's current state and feeds rows to `sink`.
    pub fn run(&mut self, sink: &mut impl RowSink) -> Result<RunSummary, IntegrationError> {
        Integrator::euler(self.settings).run(&self.system, &mut self.store, sink)
    }

    /// Integrates and writes the text table to `out`.
    pub fn execute<W: std::io::Write>(&mut self, out: W) -> Result<RunSummary, IntegrationError> {
        let mut table = TableWriter::new(out);
        self.run(&mut table)
    }
}
