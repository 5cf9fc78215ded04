//! Textual front end producing `Expr` trees.
//!
//! Grammar, loosest binding first:
//! `expr := term (('+' | '-') term)*`,
//! `term := unary (('*' | '/') unary)*`,
//! `unary := ('+' | '-') unary | power`,
//! `power := primary ('^' unary)?` (right associative),
//! `primary := number | ident | ident '(' args ')' | '(' expr ')'`.
//!
//! Function names are not checked here; an unknown name fails when the node
//! is evaluated, same as a directly constructed call.

use crate::error::ParseError;
use crate::expr::Expr;

/// Deepest nesting of parentheses, signs and exponents accepted.
pub const MAX_DEPTH: usize = 200;

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ParseError::Expected {
            expected: "end of input".to_string(),
            found: token.describe(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Identifier(name) => format!("identifier '{name}'"),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut literal = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    literal.push(d);
                    chars.next();
                } else if (d == 'e' || d == 'E') && !literal.contains(['e', 'E']) {
                    literal.push(d);
                    chars.next();
                    if let Some(&(_, sign)) = chars.peek() {
                        if sign == '+' || sign == '-' {
                            literal.push(sign);
                            chars.next();
                        }
                    }
                } else {
                    break;
                }
            }
            let value = literal
                .parse()
                .map_err(|_| ParseError::InvalidNumber(literal.clone()))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                _ => return Err(ParseError::UnexpectedChar { ch: c, pos }),
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, wanted: Token) -> Result<(), ParseError> {
        match self.consume() {
            Some(token) if token == wanted => Ok(()),
            Some(token) => Err(ParseError::Expected {
                expected: wanted.describe(),
                found: token.describe(),
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => "+",
                Some(Token::Minus) => "-",
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op.to_string(), Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => "*",
                Some(Token::Slash) => "/",
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op.to_string(), Box::new(right));
        }
        Ok(left)
    }

    // Every nested operand passes through here, so this bounds recursion.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Minus) => "-",
            Some(Token::Plus) => "+",
            _ => return self.parse_power(),
        };
        self.consume();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary(op.to_string(), Box::new(operand)))
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(
                Box::new(base),
                "^".to_string(),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Constant(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(token) => Err(ParseError::Expected {
                expected: "an operand".to_string(),
                found: token.describe(),
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    // Called after '(' has been consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(token) => {
                    return Err(ParseError::Expected {
                        expected: "',' or ')'".to_string(),
                        found: token.describe(),
                    })
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VariableStore;

    fn eval(src: &str, store: &VariableStore) -> f64 {
        parse(src)
            .expect("expression should parse")
            .evaluate(store)
            .expect("expression should evaluate")
    }

    #[test]
    fn respects_precedence() {
        let store = VariableStore::new();
        assert_eq!(eval("1 + 2 * 3", &store), 7.0);
        assert_eq!(eval("(1 + 2) * 3", &store), 9.0);
        assert_eq!(eval("8 / 4 / 2", &store), 1.0);
        assert_eq!(eval("10 - 4 - 3", &store), 3.0);
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_negation() {
        let store = VariableStore::new();
        assert_eq!(eval("2 ^ 3 ^ 2", &store), 512.0);
        assert_eq!(eval("-2 ^ 2", &store), -4.0);
        assert_eq!(eval("2 ^ -1", &store), 0.5);
        assert_eq!(eval("+3", &store), 3.0);
    }

    #[test]
    fn parses_calls_and_variables() {
        let mut store = VariableStore::new();
        store.set("y", 2.0);
        assert_eq!(eval("exp(0) + y * cos(0)", &store), 3.0);
        assert_eq!(
            parse("f(1, y)").expect("should parse"),
            Expr::Call(
                "f".to_string(),
                vec![Expr::Constant(1.0), Expr::Variable("y".to_string())]
            )
        );
    }

    #[test]
    fn parses_exponent_literals() {
        let store = VariableStore::new();
        assert_eq!(eval("1.5e2", &store), 150.0);
        assert_eq!(eval("2E-1", &store), 0.2);
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(
            parse("1 $ 2"),
            Err(ParseError::UnexpectedChar { ch: '$', pos: 2 })
        );
        assert_eq!(parse("(1 + 2"), Err(ParseError::UnexpectedEnd));
        assert!(matches!(parse("1 2"), Err(ParseError::Expected { .. })));
        assert!(matches!(parse("1..2"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse("sin(1 2)"), Err(ParseError::Expected { .. })));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&deep), Err(ParseError::TooDeep { limit: MAX_DEPTH }));
        let signs = format!("{}1", "-".repeat(10_000));
        assert_eq!(parse(&signs), Err(ParseError::TooDeep { limit: MAX_DEPTH }));
        let tower = vec!["2"; 10_000].join("^");
        assert_eq!(parse(&tower), Err(ParseError::TooDeep { limit: MAX_DEPTH }));

        let store = VariableStore::new();
        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(eval(&shallow, &store), 1.0);
    }
}
