use crate::error::EvalError;
use crate::registry::{BinaryOp, Function, UnaryOp};
use crate::store::VariableStore;

/// Expression tree nodes.
///
/// Operator and function names are kept as written and resolved against the
/// fixed registry on every evaluation, so an unknown name only fails when the
/// node is actually evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable(String),
    Binary(Box<Expr>, String, Box<Expr>),
    Unary(String, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn binary(left: Expr, op: &str, right: Expr) -> Self {
        Expr::Binary(Box::new(left), op.to_string(), Box::new(right))
    }

    pub fn unary(op: &str, operand: Expr) -> Self {
        Expr::Unary(op.to_string(), Box::new(operand))
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(name.to_string(), args)
    }

    /// Evaluates the node against the current store contents. Nothing is cached.
    pub fn evaluate(&self, store: &VariableStore) -> Result<f64, EvalError> {
        match self {
            Expr::Constant(value) => Ok(*value),
            Expr::Variable(symbol) => store.get(symbol),
            Expr::Binary(left, op, right) => {
                let a = left.evaluate(store)?;
                let b = right.evaluate(store)?;
                let op = BinaryOp::lookup(op).ok_or_else(|| EvalError::UnknownOperator {
                    op: op.clone(),
                    arity: "binary",
                })?;
                Ok(op.apply(a, b))
            }
            Expr::Unary(op, operand) => {
                let a = operand.evaluate(store)?;
                let op = UnaryOp::lookup(op).ok_or_else(|| EvalError::UnknownOperator {
                    op: op.clone(),
                    arity: "unary",
                })?;
                Ok(op.apply(a))
            }
            Expr::Call(name, args) => {
                let func = Function::lookup(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                if args.len() != func.arity() {
                    return Err(EvalError::ArityMismatch {
                        name: name.clone(),
                        expected: func.arity(),
                        got: args.len(),
                    });
                }
                let a = args[0].evaluate(store)?;
                Ok(func.apply(a))
            }
        }
    }

    /// Visits every variable symbol referenced by the tree.
    pub fn for_each_variable(&self, f: &mut impl FnMut(&str)) {
        match self {
            Expr::Constant(_) => {}
            Expr::Variable(symbol) => f(symbol),
            Expr::Binary(left, _, right) => {
                left.for_each_variable(f);
                right.for_each_variable(f);
            }
            Expr::Unary(_, operand) => operand.for_each_variable(f),
            Expr::Call(_, args) => {
                for arg in args {
                    arg.for_each_variable(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: f64) -> Box<Expr> {
        Box::new(Expr::Constant(v))
    }

    fn bin(a: f64, op: &str, b: f64) -> Expr {
        Expr::Binary(c(a), op.to_string(), c(b))
    }

    #[test]
    fn constant_ignores_store() {
        let mut store = VariableStore::new();
        let node = Expr::Constant(4.25);
        assert_eq!(node.evaluate(&store), Ok(4.25));
        store.set("t", 100.0);
        store.set("x", -3.0);
        assert_eq!(node.evaluate(&store), Ok(4.25));
    }

    #[test]
    fn binary_operators() {
        let store = VariableStore::new();
        assert_eq!(bin(2.0, "+", 3.0).evaluate(&store), Ok(5.0));
        assert_eq!(bin(2.0, "-", 3.0).evaluate(&store), Ok(-1.0));
        assert_eq!(bin(2.0, "*", 3.0).evaluate(&store), Ok(6.0));
        assert_eq!(bin(6.0, "/", 3.0).evaluate(&store), Ok(2.0));
        assert_eq!(bin(2.0, "^", 3.0).evaluate(&store), Ok(8.0));
    }

    #[test]
    fn unknown_operator_fails_at_evaluation() {
        let store = VariableStore::new();
        let node = bin(1.0, "%", 2.0);
        assert_eq!(
            node.evaluate(&store),
            Err(EvalError::UnknownOperator {
                op: "%".to_string(),
                arity: "binary"
            })
        );
        let node = Expr::Unary("!".to_string(), c(1.0));
        assert!(matches!(
            node.evaluate(&store),
            Err(EvalError::UnknownOperator { arity: "unary", .. })
        ));
    }

    #[test]
    fn calls_check_name_and_arity() {
        let store = VariableStore::new();
        let node = Expr::Call("tan".to_string(), vec![Expr::Constant(1.0)]);
        assert_eq!(
            node.evaluate(&store),
            Err(EvalError::UnknownFunction("tan".to_string()))
        );
        let node = Expr::Call("sin".to_string(), vec![]);
        assert!(matches!(
            node.evaluate(&store),
            Err(EvalError::ArityMismatch { expected: 1, got: 0, .. })
        ));
        let node = Expr::Call("exp".to_string(), vec![Expr::Constant(0.0)]);
        assert_eq!(node.evaluate(&store), Ok(1.0));
    }

    #[test]
    fn variable_reads_current_value() {
        let mut store = VariableStore::new();
        store.set("x", 2.0);
        let node = Expr::Binary(
            Box::new(Expr::Variable("x".to_string())),
            "*".to_string(),
            c(10.0),
        );
        assert_eq!(node.evaluate(&store), Ok(20.0));
        store.set("x", 3.0);
        assert_eq!(node.evaluate(&store), Ok(30.0));
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        let store = VariableStore::new();
        let value = bin(1.0, "/", 0.0).evaluate(&store).expect("IEEE division");
        assert_eq!(value, f64::INFINITY);
        let value = bin(0.0, "/", 0.0).evaluate(&store).expect("IEEE division");
        assert!(value.is_nan());
    }

    #[test]
    fn collects_variables() {
        let node = Expr::Call(
            "sin".to_string(),
            vec![Expr::Binary(
                Box::new(Expr::Variable("a".to_string())),
                "+".to_string(),
                Box::new(Expr::Unary(
                    "-".to_string(),
                    Box::new(Expr::Variable("b".to_string())),
                )),
            )],
        );
        let mut seen = Vec::new();
        node.for_each_variable(&mut |s: &str| seen.push(s.to_string()));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn every_function_and_unary_operator_evaluates() {
        let mut store = VariableStore::new();
        store.set("x", 0.5);
        let x = || Expr::Variable("x".to_string());
        let cases = [
            (Expr::call("sin", vec![x()]), 0.5f64.sin()),
            (Expr::call("cos", vec![x()]), 0.5f64.cos()),
            (Expr::call("ln", vec![x()]), 0.5f64.ln()),
            (Expr::call("exp", vec![x()]), 0.5f64.exp()),
            (Expr::unary("+", x()), 0.5),
            (Expr::unary("-", x()), -0.5),
        ];
        for (node, expected) in cases {
            let value = node.evaluate(&store).expect("node should evaluate");
            assert!((value - expected).abs() < 1e-15, "{node:?} gave {value}");
        }
    }
}
