use crate::expr::Expr;

/// `d symbol / dt = equation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ode {
    pub symbol: String,
    pub equation: Expr,
}

/// Ordered list of ODEs. Registration order is the output column order and
/// the order in which derivatives are applied within a step.
#[derive(Debug, Clone, Default)]
pub struct OdeSystem {
    entries: Vec<Ode>,
}

impl OdeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new entry, or replaces the equation of an existing symbol
    /// while keeping its position.
    pub fn insert(&mut self, symbol: &str, equation: Expr) {
        if let Some(existing) = self.entries.iter_mut().find(|ode| ode.symbol == symbol) {
            existing.equation = equation;
            return;
        }
        self.entries.push(Ode {
            symbol: symbol.to_string(),
            equation,
        });
    }

    pub fn entries(&self) -> &[Ode] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|ode| ode.symbol.as_str())
    }

    pub fn dimension(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
