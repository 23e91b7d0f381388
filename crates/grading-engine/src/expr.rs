//! A closed expression evaluator for grading formulas.
//!
//! Deliberately small: numeric, boolean, and string literals, arithmetic,
//! comparisons, and `and`/`or`/`not`. No identifiers, no calls, no
//! indexing — placeholders are substituted into the source as literals
//! before evaluation. Every lexical, parse, or type failure maps to
//! [`Error::MalformedRule`], since a formula that cannot be evaluated is a
//! rule-authoring defect.

use bookie_core::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
        }
    }
}

/// Evaluate a formula to whatever value it yields.
pub fn evaluate(source: &str) -> Result<Value> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let value = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.fail("trailing tokens after expression"));
    }
    Ok(value)
}

/// Evaluate a formula that must yield a boolean (an outcome condition).
pub fn evaluate_bool(source: &str) -> Result<bool> {
    match evaluate(source)? {
        Value::Bool(b) => Ok(b),
        other => Err(Error::MalformedRule(format!(
            "'{source}' evaluates to a {}, expected a boolean",
            other.type_name()
        ))),
    }
}

/// Evaluate a formula that must yield a number (a metric).
pub fn evaluate_number(source: &str) -> Result<f64> {
    match evaluate(source)? {
        Value::Num(n) => Ok(n),
        other => Err(Error::MalformedRule(format!(
            "'{source}' evaluates to a {}, expected a number",
            other.type_name()
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Bool(bool),
    Or,
    And,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn lex(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(Error::MalformedRule(format!(
                        "single '=' in '{source}', did you mean '=='?"
                    )));
                }
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(Error::MalformedRule(format!("stray '!' in '{source}'")));
                }
                tokens.push(Token::Ne);
            }
            '<' => {
                chars.next();
                tokens.push(if chars.next_if_eq(&'=').is_some() {
                    Token::Le
                } else {
                    Token::Lt
                });
            }
            '>' => {
                chars.next();
                tokens.push(if chars.next_if_eq(&'=').is_some() {
                    Token::Ge
                } else {
                    Token::Gt
                });
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => text.push(c),
                        None => {
                            return Err(Error::MalformedRule(format!(
                                "unterminated string in '{source}'"
                            )))
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
                    text.push(c);
                }
                let num = text.parse::<f64>().map_err(|_| {
                    Error::MalformedRule(format!("bad number '{text}' in '{source}'"))
                })?;
                tokens.push(Token::Num(num));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
                    word.push(c);
                }
                tokens.push(match word.as_str() {
                    "or" => Token::Or,
                    "and" => Token::And,
                    "not" => Token::Not,
                    "true" | "True" => Token::Bool(true),
                    "false" | "False" => Token::Bool(false),
                    other => {
                        return Err(Error::MalformedRule(format!(
                            "unknown name '{other}' in '{source}'"
                        )))
                    }
                });
            }
            other => {
                return Err(Error::MalformedRule(format!(
                    "unexpected character '{other}' in '{source}'"
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn fail(&self, message: &str) -> Error {
        Error::MalformedRule(format!("{message} in '{}'", self.source))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn as_bool(&self, value: Value) -> Result<bool> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(self.fail(&format!(
                "logical operator applied to a {}",
                other.type_name()
            ))),
        }
    }

    fn as_num(&self, value: Value) -> Result<f64> {
        match value {
            Value::Num(n) => Ok(n),
            other => Err(self.fail(&format!(
                "arithmetic on a {}",
                other.type_name()
            ))),
        }
    }

    fn or_expr(&mut self) -> Result<Value> {
        let mut acc = self.and_expr()?;
        while self.eat(&Token::Or) {
            let lhs = self.as_bool(acc)?;
            let rhs = self.and_expr()?;
            let rhs = self.as_bool(rhs)?;
            acc = Value::Bool(lhs || rhs);
        }
        Ok(acc)
    }

    fn and_expr(&mut self) -> Result<Value> {
        let mut acc = self.not_expr()?;
        while self.eat(&Token::And) {
            let lhs = self.as_bool(acc)?;
            let rhs = self.not_expr()?;
            let rhs = self.as_bool(rhs)?;
            acc = Value::Bool(lhs && rhs);
        }
        Ok(acc)
    }

    fn not_expr(&mut self) -> Result<Value> {
        if self.eat(&Token::Not) {
            let value = self.not_expr()?;
            let value = self.as_bool(value)?;
            return Ok(Value::Bool(!value));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => Token::Eq,
            Some(Token::Ne) => Token::Ne,
            Some(Token::Lt) => Token::Lt,
            Some(Token::Le) => Token::Le,
            Some(Token::Gt) => Token::Gt,
            Some(Token::Ge) => Token::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.additive()?;
        let result = match (&op, &lhs, &rhs) {
            (Token::Eq, _, _) => self.equals(&lhs, &rhs)?,
            (Token::Ne, _, _) => !self.equals(&lhs, &rhs)?,
            (_, Value::Num(l), Value::Num(r)) => match op {
                Token::Lt => l < r,
                Token::Le => l <= r,
                Token::Gt => l > r,
                Token::Ge => l >= r,
                _ => unreachable!(),
            },
            _ => {
                return Err(self.fail(&format!(
                    "ordering comparison between {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                )))
            }
        };
        Ok(Value::Bool(result))
    }

    fn equals(&self, lhs: &Value, rhs: &Value) -> Result<bool> {
        match (lhs, rhs) {
            (Value::Num(l), Value::Num(r)) => Ok(l == r),
            (Value::Bool(l), Value::Bool(r)) => Ok(l == r),
            (Value::Str(l), Value::Str(r)) => Ok(l == r),
            _ => Err(self.fail(&format!(
                "equality between {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    fn additive(&mut self) -> Result<Value> {
        let mut acc = self.term()?;
        loop {
            let add = if self.eat(&Token::Plus) {
                true
            } else if self.eat(&Token::Minus) {
                false
            } else {
                return Ok(acc);
            };
            let lhs = self.as_num(acc)?;
            let rhs = self.term()?;
            let rhs = self.as_num(rhs)?;
            acc = Value::Num(if add { lhs + rhs } else { lhs - rhs });
        }
    }

    fn term(&mut self) -> Result<Value> {
        let mut acc = self.unary()?;
        loop {
            let multiply = if self.eat(&Token::Star) {
                true
            } else if self.eat(&Token::Slash) {
                false
            } else {
                return Ok(acc);
            };
            let lhs = self.as_num(acc)?;
            let rhs = self.unary()?;
            let rhs = self.as_num(rhs)?;
            if !multiply && rhs == 0.0 {
                return Err(self.fail("division by zero"));
            }
            acc = Value::Num(if multiply { lhs * rhs } else { lhs / rhs });
        }
    }

    fn unary(&mut self) -> Result<Value> {
        if self.eat(&Token::Minus) {
            let value = self.unary()?;
            let value = self.as_num(value)?;
            return Ok(Value::Num(-value));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(Value::Num(n)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Bool(b)) => Ok(Value::Bool(b)),
            Some(Token::LParen) => {
                let value = self.or_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.fail("missing closing parenthesis"));
                }
                Ok(value)
            }
            Some(_) => Err(self.fail("unexpected token")),
            None => Err(self.fail("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(evaluate_number("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(evaluate_number("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(evaluate_number("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate_number("7 / 2").unwrap(), 3.5);
        assert_eq!(evaluate_number("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate_number("2 - -2").unwrap(), 4.0);
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert!(evaluate_bool("3.5 > 3 and 3.5 <= 4").unwrap());
        assert!(evaluate_bool("1 == 2 or not (2 == 3)").unwrap());
        assert!(!evaluate_bool("0 != 0").unwrap());
        assert!(evaluate_bool("'home' == 'home'").unwrap());
        assert!(evaluate_bool("\"a\" != 'b'").unwrap());
        assert!(evaluate_bool("False or True").unwrap());
        assert!(!evaluate_bool("not True").unwrap());
    }

    #[test]
    fn test_grading_shaped_formulas() {
        // The shapes that come out of metric substitution.
        assert!(evaluate_bool("2 - 1 > 0").unwrap());
        assert!(evaluate_bool("1 + 1 <= 3.5").unwrap());
        assert!(!evaluate_bool("2 + 2 <= 3.5").unwrap());
        assert!(!evaluate_bool("False").unwrap());
    }

    #[test]
    fn test_no_names_no_calls() {
        assert!(evaluate("result").is_err());
        assert!(evaluate("metric > 0").is_err());
        assert!(evaluate("abs(1)").is_err());
        assert!(evaluate("__import__").is_err());
    }

    #[test]
    fn test_malformed_sources() {
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("(1").is_err());
        assert!(evaluate("1 = 1").is_err());
        assert!(evaluate("'open").is_err());
        assert!(evaluate("1 < 2 < 3").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("").is_err());
    }

    #[test]
    fn test_type_errors() {
        assert!(evaluate("1 + true").is_err());
        assert!(evaluate("'a' < 'b'").is_err());
        assert!(evaluate("1 and 1").is_err());
        assert!(evaluate("not 5").is_err());
        assert!(evaluate("1 == 'one'").is_err());
        assert!(evaluate_bool("1 + 1").is_err());
        assert!(evaluate_number("1 > 0").is_err());
    }
}
