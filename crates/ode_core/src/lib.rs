pub mod error;
pub mod expr;
pub mod integrator;
pub mod model;
pub mod output;
pub mod parser;
pub mod registry;
pub mod store;
pub mod system;
/// The `ode_core` crate defines ODE systems from expression trees and
/// integrates them with the explicit Euler method.
///
/// Key components:
/// - **Store**: `VariableStore`, the symbol → value map every expression reads.
/// - **Expressions**: `Expr` nodes over a closed operator/function registry,
///   evaluated lazily against a store; `parser` builds them from text.
/// - **Integrator**: fixed-step Euler with a configurable horizon boundary,
///   writing rows into any `RowSink`.
/// - **Model**: bundles store, ODE list and settings for a single simulation.
pub mod traits;

pub use error::{EvalError, IntegrationError, ParseError};
pub use expr::Expr;
pub use integrator::{Boundary, Integrator, IntegratorSettings, NonFinitePolicy, RunSummary};
pub use model::Model;
pub use output::{TableWriter, Trajectory};
pub use traits::RowSink;
