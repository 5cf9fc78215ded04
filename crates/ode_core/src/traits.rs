use std::io;

use crate::error::IntegrationError;
use crate::store::VariableStore;
use crate::system::OdeSystem;

/// A fixed-step method that advances every ODE of a system by one step.
pub trait Steppable {
    /// Advances the state held in `store` from time `t` to `t + dt`.
    /// The clock itself is managed by the caller.
    fn step(
        &mut self,
        system: &OdeSystem,
        store: &mut VariableStore,
        t: f64,
        dt: f64,
    ) -> Result<(), IntegrationError>;
}

/// Receives the integrator's output table.
///
/// `header` is called once per run with the column names (`t` first), then
/// `row` once per sample with values in the same column order.
pub trait RowSink {
    fn header(&mut self, columns: &[&str]) -> io::Result<()>;

    fn row(&mut self, values: &[f64]) -> io::Result<()>;
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn header(&mut self, columns: &[&str]) -> io::Result<()> {
        (**self).header(columns)
    }

    fn row(&mut self, values: &[f64]) -> io::Result<()> {
        (**self).row(values)
    }
}
