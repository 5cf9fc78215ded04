use std::collections::HashMap;

use crate::error::EvalError;

/// Name of the simulation clock. Always present in a store.
pub const TIME: &str = "t";

/// Mutable mapping from symbol to its current value.
///
/// One store belongs to one model; expression nodes read it and the
/// integrator writes it.
#[derive(Debug, Clone)]
pub struct VariableStore {
    values: HashMap<String, f64>,
}

impl VariableStore {
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(TIME.to_string(), 0.0);
        Self { values }
    }

    pub fn get(&self, symbol: &str) -> Result<f64, EvalError> {
        self.values
            .get(symbol)
            .copied()
            .ok_or_else(|| EvalError::UndefinedVariable(symbol.to_string()))
    }

    /// Writes `value` unconditionally, creating the entry if needed.
    pub fn set(&mut self, symbol: &str, value: f64) {
        match self.values.get_mut(symbol) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(symbol.to_string(), value);
            }
        }
    }

    /// Inserts `symbol = 0` if absent. Returns true when a new entry was made.
    pub fn declare(&mut self, symbol: &str) -> bool {
        if self.values.contains_key(symbol) {
            return false;
        }
        self.values.insert(symbol.to_string(), 0.0);
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.values.contains_key(symbol)
    }

    /// Adds `delta` to an existing entry and returns the new value.
    pub fn add(&mut self, symbol: &str, delta: f64) -> Result<f64, EvalError> {
        let slot = self
            .values
            .get_mut(symbol)
            .ok_or_else(|| EvalError::UndefinedVariable(symbol.to_string()))?;
        *slot += delta;
        Ok(*slot)
    }

    pub fn time(&self) -> f64 {
        self.values.get(TIME).copied().unwrap_or(0.0)
    }

    pub fn set_time(&mut self, t: f64) {
        self.set(TIME, t);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_holds_clock_at_zero() {
        let store = VariableStore::new();
        assert_eq!(store.get(TIME), Ok(0.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn declare_does_not_overwrite() {
        let mut store = VariableStore::new();
        store.set("x", 3.0);
        assert!(!store.declare("x"));
        assert_eq!(store.get("x"), Ok(3.0));
        assert!(store.declare("y"));
        assert_eq!(store.get("y"), Ok(0.0));
    }

    #[test]
    fn add_requires_existing_entry() {
        let mut store = VariableStore::new();
        assert_eq!(
            store.add("missing", 1.0),
            Err(EvalError::UndefinedVariable("missing".to_string()))
        );
        store.set("x", 1.5);
        assert_eq!(store.add("x", 0.5), Ok(2.0));
    }
}
