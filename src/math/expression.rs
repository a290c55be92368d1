//! Prefix-notation arithmetic expressions
//!
//! A formula such as `+ * x a e` is tokenized on whitespace and parsed once into
//! an immutable tree; every operator precedes its one or two operands. The tree
//! is then evaluated for each orbit point against an ordered parameter vector.

use crate::io::configuration::MAX_EXPRESSION_DEPTH;
use rand::Rng;
use std::error::Error;
use std::fmt;

/// Failure while building an expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The token stream ended while an operand was still expected
    MissingTokens,
    /// Token is neither an operator, a number nor a known parameter
    UnknownToken(String),
    /// Token looks numeric but does not parse as a number
    InvalidNumber(String),
    /// A complete expression was followed by extra tokens
    TrailingTokens(String),
    /// Operators are nested deeper than `MAX_EXPRESSION_DEPTH`
    TooDeep(usize),
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTokens => write!(f, "tokens are missing"),
            Self::UnknownToken(token) => {
                write!(f, "token \"{token}\" is neither a parameter nor an operation")
            }
            Self::InvalidNumber(token) => write!(f, "token \"{token}\" is not a valid number"),
            Self::TrailingTokens(rest) => write!(f, "unexpected tokens after expression: {rest}"),
            Self::TooDeep(limit) => write!(f, "operators are nested more than {limit} deep"),
        }
    }
}

impl Error for ExpressionError {}

/// Failure while evaluating a parsed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationError {
    /// Right operand of a division evaluated to exactly zero
    DivisionByZero,
    /// Parameter vector is shorter than the parameter list used at parse time
    MissingParameter(usize),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::MissingParameter(index) => write!(f, "no value for parameter #{index}"),
        }
    }
}

impl Error for EvaluationError {}

/// Operators taking a single operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `abs a`
    Abs,
    /// `sin a`
    Sin,
    /// `cos a`
    Cos,
    /// `tan a`
    Tan,
    /// `atan a`
    Atan,
    /// `ln a`
    Ln,
    /// `sign a`: 1 when a >= 0, else -1
    Sign,
    /// `square a`
    Square,
    /// `sqrt a`
    Sqrt,
}

/// Operators taking two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+ a b`
    Add,
    /// `- a b`
    Subtract,
    /// `* a b`
    Multiply,
    /// `/ a b`
    Divide,
    /// `< a b`: 1 when a < b, else 0
    Less,
    /// `test a b`: b when a is 0, else a
    Test,
    /// `atan2 a b`
    Atan2,
    /// `pow a b`
    Pow,
}

impl UnaryOp {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "abs" => Self::Abs,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "atan" => Self::Atan,
            "ln" => Self::Ln,
            "sign" => Self::Sign,
            "square" => Self::Square,
            "sqrt" => Self::Sqrt,
            _ => return None,
        })
    }

    fn apply(self, a: f64) -> f64 {
        match self {
            Self::Abs => a.abs(),
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Atan => a.atan(),
            Self::Ln => a.ln(),
            Self::Sign => {
                if a >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Square => a * a,
            Self::Sqrt => a.sqrt(),
        }
    }
}

impl BinaryOp {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "<" => Self::Less,
            "test" => Self::Test,
            "atan2" => Self::Atan2,
            "pow" => Self::Pow,
            _ => return None,
        })
    }
}

/// Node of an expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Index into the parameter vector
    Parameter(usize),
    /// Literal constant
    Number(f64),
    /// Fresh uniform draw in [0, 1) at every evaluation
    Random,
    /// Single-operand operator
    Unary(UnaryOp, Box<Node>),
    /// Two-operand operator
    Binary(BinaryOp, Box<Node>, Box<Node>),
}

impl Node {
    fn evaluate<R: Rng + ?Sized>(
        &self,
        params: &[f64],
        rng: &mut R,
    ) -> Result<f64, EvaluationError> {
        match self {
            Self::Parameter(index) => params
                .get(*index)
                .copied()
                .ok_or(EvaluationError::MissingParameter(*index)),
            Self::Number(value) => Ok(*value),
            Self::Random => Ok(rng.random::<f64>()),
            Self::Unary(op, a) => Ok(op.apply(a.evaluate(params, rng)?)),
            Self::Binary(op, a, b) => match op {
                BinaryOp::Add => Ok(a.evaluate(params, rng)? + b.evaluate(params, rng)?),
                BinaryOp::Subtract => Ok(a.evaluate(params, rng)? - b.evaluate(params, rng)?),
                BinaryOp::Multiply => {
                    // Right operand skipped entirely, including its random draws
                    let left = a.evaluate(params, rng)?;
                    if left == 0.0 {
                        Ok(0.0)
                    } else {
                        Ok(left * b.evaluate(params, rng)?)
                    }
                }
                BinaryOp::Divide => {
                    let denominator = b.evaluate(params, rng)?;
                    if denominator == 0.0 {
                        return Err(EvaluationError::DivisionByZero);
                    }
                    Ok(a.evaluate(params, rng)? / denominator)
                }
                BinaryOp::Less => {
                    let less = a.evaluate(params, rng)? < b.evaluate(params, rng)?;
                    Ok(if less { 1.0 } else { 0.0 })
                }
                BinaryOp::Test => {
                    let left = a.evaluate(params, rng)?;
                    if left == 0.0 {
                        b.evaluate(params, rng)
                    } else {
                        Ok(left)
                    }
                }
                BinaryOp::Atan2 => Ok(a.evaluate(params, rng)?.atan2(b.evaluate(params, rng)?)),
                BinaryOp::Pow => Ok(a.evaluate(params, rng)?.powf(b.evaluate(params, rng)?)),
            },
        }
    }
}

/// Parsed prefix-notation expression bound to an ordered parameter list
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    text: String,
    parameters: Vec<String>,
    root: Node,
}

impl Expression {
    /// Parse `text` against the ordered `parameters` names
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The text ends before every operator received its operands
    /// - A token is not an operator, a number or one of `parameters`
    /// - Tokens remain after a complete expression
    /// - Operators nest deeper than `MAX_EXPRESSION_DEPTH`
    pub fn parse(text: &str, parameters: &[&str]) -> Result<Self, ExpressionError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (root, rest) = parse_node(&tokens, parameters, 0)?;
        if !rest.is_empty() {
            return Err(ExpressionError::TrailingTokens(rest.join(" ")));
        }

        Ok(Self {
            text: tokens.join(" "),
            parameters: parameters.iter().map(|&p| p.to_string()).collect(),
            root,
        })
    }

    /// Evaluate against `params`, ordered as the parameter list given to `parse`
    ///
    /// # Errors
    ///
    /// Returns an error on division by zero or when `params` is too short
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        params: &[f64],
        rng: &mut R,
    ) -> Result<f64, EvaluationError> {
        self.root.evaluate(params, rng)
    }

    /// Normalized source text (tokens joined by single spaces)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parameter names in evaluation order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Root of the parsed tree
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

// Numbers start with a digit, or with '-' / '.' directly followed by a digit
fn looks_numeric(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-' | '.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Parse one subtree from the front of `tokens`, returning it with the unparsed rest
fn parse_node<'t, 's>(
    tokens: &'t [&'s str],
    parameters: &[&str],
    depth: usize,
) -> Result<(Node, &'t [&'s str]), ExpressionError> {
    if depth > MAX_EXPRESSION_DEPTH {
        return Err(ExpressionError::TooDeep(MAX_EXPRESSION_DEPTH));
    }
    let (&token, rest) = tokens.split_first().ok_or(ExpressionError::MissingTokens)?;

    if let Some(op) = BinaryOp::from_token(token) {
        let (a, rest) = parse_node(rest, parameters, depth + 1)?;
        let (b, rest) = parse_node(rest, parameters, depth + 1)?;
        return Ok((Node::Binary(op, Box::new(a), Box::new(b)), rest));
    }

    if let Some(op) = UnaryOp::from_token(token) {
        let (a, rest) = parse_node(rest, parameters, depth + 1)?;
        return Ok((Node::Unary(op, Box::new(a)), rest));
    }

    if token == "rand" {
        return Ok((Node::Random, rest));
    }

    if looks_numeric(token) {
        let value = token
            .parse::<f64>()
            .ok()
            .ok_or_else(|| ExpressionError::InvalidNumber(token.to_string()))?;
        return Ok((Node::Number(value), rest));
    }

    parameters
        .iter()
        .position(|&p| p == token)
        .map(|index| (Node::Parameter(index), rest))
        .ok_or_else(|| ExpressionError::UnknownToken(token.to_string()))
}
