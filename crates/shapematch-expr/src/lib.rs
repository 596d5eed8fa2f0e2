//! Numeric comparison expressions for shapematch assertions.
//!
//! An expression is an optional comparison operator followed by a number:
//!
//! - Equality: `=== 5`, `== 5`
//! - Inequality: `!== 5`, `!= 5`
//! - Ordering: `< 5`, `<= 5`, `> 5`, `>= 5`
//! - Bare numbers mean strict equality: `5`
//!
//! Whitespace between the operator and the number is optional. Numbers may be
//! signed and may carry a fraction or an exponent (`-2.5`, `1e3`).
//!
//! # Example
//!
//! ```
//! use shapematch_expr::{evaluate, parse, Operator};
//!
//! assert!(evaluate(">= 5", 7.0));
//! assert!(!evaluate("< 5", 7.0));
//! assert!(evaluate("3", 3.0));
//!
//! // Malformed expressions never hold
//! assert!(!evaluate("about 5", 5.0));
//!
//! let expr = parse("!= 0").unwrap();
//! assert_eq!(expr.operator, Operator::Ne);
//!
//! let expr = parse("!== 0").unwrap();
//! assert_eq!(expr.operator, Operator::StrictNe);
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::one_of;

// ============ Types ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    StrictEq,
    Eq,
    StrictNe,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Applies `left <op> right`.
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Operator::StrictEq | Operator::Eq => left == right,
            Operator::StrictNe | Operator::Ne => left != right,
            Operator::Lt => left < right,
            Operator::Le => left <= right,
            Operator::Gt => left > right,
            Operator::Ge => left >= right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::StrictEq => "===",
            Operator::Eq => "==",
            Operator::StrictNe => "!==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed comparison, checked against an actual number with [`NumericExpr::holds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericExpr {
    pub operator: Operator,
    pub operand: f64,
}

impl NumericExpr {
    pub fn new(operator: Operator, operand: f64) -> Self {
        Self { operator, operand }
    }

    pub fn holds(&self, actual: f64) -> bool {
        self.operator.apply(actual, self.operand)
    }
}

impl fmt::Display for NumericExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.operand)
    }
}

impl FromStr for NumericExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unrecognized operator in {0:?}")]
    UnknownOperator(String),
    #[error("expected a number after '{operator}', found {found:?}")]
    MissingOperand { operator: Operator, found: String },
    #[error("unexpected trailing input: {0:?}")]
    TrailingInput(String),
}

// ============ Parser ============

fn cmp_op(input: &mut &str) -> ModalResult<Operator> {
    alt((
        "===".value(Operator::StrictEq),
        "!==".value(Operator::StrictNe),
        "==".value(Operator::Eq),
        "!=".value(Operator::Ne),
        "<=".value(Operator::Le),
        ">=".value(Operator::Ge),
        "<".value(Operator::Lt),
        ">".value(Operator::Gt),
    ))
    .parse_next(input)
}

fn numeral(input: &mut &str) -> ModalResult<f64> {
    let text: &str = (
        opt(one_of(['+', '-'])),
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;

    match text.parse() {
        Ok(n) => Ok(n),
        Err(_) => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

pub fn parse(expression: &str) -> Result<NumericExpr, ExprError> {
    let mut input = expression.trim();
    if input.is_empty() {
        return Err(ExprError::Empty);
    }

    let operator = opt(cmp_op).parse_next(&mut input).ok().flatten();
    let operand = preceded(multispace0, numeral)
        .parse_next(&mut input)
        .map_err(|_| match operator {
            Some(operator) => ExprError::MissingOperand {
                operator,
                found: input.trim().to_string(),
            },
            None => ExprError::UnknownOperator(expression.trim().to_string()),
        })?;

    let remaining = input.trim();
    if !remaining.is_empty() {
        return Err(ExprError::TrailingInput(remaining.to_string()));
    }

    Ok(NumericExpr::new(
        operator.unwrap_or(Operator::StrictEq),
        operand,
    ))
}

// ============ Public API ============

/// Parses and applies `expression` to `actual`, reporting malformed input.
pub fn try_evaluate(expression: &str, actual: f64) -> Result<bool, ExprError> {
    Ok(parse(expression)?.holds(actual))
}

/// Parses and applies `expression` to `actual`. Malformed expressions yield false.
pub fn evaluate(expression: &str, actual: f64) -> bool {
    try_evaluate(expression, actual).unwrap_or(false)
}
