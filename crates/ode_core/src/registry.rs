//! Fixed operator and function tables.
//!
//! The vocabulary is closed: lookups outside these sets return `None` and the
//! evaluator turns that into an `EvalError`.

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// (a + b)
    Add,
    /// (a - b)
    Sub,
    /// (a * b)
    Mul,
    /// (a / b), IEEE semantics for division by zero.
    Div,
    /// (a ^ b) via `powf`; negative bases with fractional exponents give NaN.
    Pow,
}

impl BinaryOp {
    pub fn lookup(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "^" => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

impl UnaryOp {
    pub fn lookup(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Neg),
            _ => None,
        }
    }

    pub fn apply(self, a: f64) -> f64 {
        match self {
            UnaryOp::Plus => a,
            UnaryOp::Neg => -a,
        }
    }
}

/// Named one-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    /// Natural logarithm. `log` is accepted as an alias.
    Ln,
    Exp,
}

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "ln" | "log" => Some(Function::Ln),
            "exp" => Some(Function::Exp),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        1
    }

    pub fn apply(self, a: f64) -> f64 {
        match self {
            Function::Sin => a.sin(),
            Function::Cos => a.cos(),
            Function::Ln => a.ln(),
            Function::Exp => a.exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_cover_closed_vocabulary() {
        for sym in ["+", "-", "*", "/", "^"] {
            let op = BinaryOp::lookup(sym).expect("binary operator should exist");
            assert_eq!(op.symbol(), sym);
        }
        assert!(BinaryOp::lookup("%").is_none());
        assert!(UnaryOp::lookup("+").is_some());
        assert!(UnaryOp::lookup("!").is_none());
        assert!(Function::lookup("tan").is_none());
    }

    #[test]
    fn log_aliases_natural_logarithm() {
        assert_eq!(Function::lookup("log"), Some(Function::Ln));
        let e = std::f64::consts::E;
        assert!((Function::Ln.apply(e) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn domain_conditions_propagate() {
        assert!(BinaryOp::Div.apply(1.0, 0.0).is_infinite());
        assert!(BinaryOp::Pow.apply(-8.0, 1.0 / 3.0).is_nan());
        assert!(Function::Ln.apply(-1.0).is_nan());
        assert_eq!(Function::Ln.apply(0.0), f64::NEG_INFINITY);
    }
}
