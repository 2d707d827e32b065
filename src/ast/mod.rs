use std::collections::BTreeSet;
use std::fmt;

mod evaluator;
mod lexer;
mod parser;
mod token;

pub use evaluator::*;
pub use lexer::{tokenize, Lexer};
pub use parser::{
    parse_expression, parse_tokens, ExpressionParser, MAX_NESTING_DEPTH, MAX_OPERATIONS,
};
pub use token::{Token, TokenKind};

/// An immutable arithmetic expression tree.
///
/// `Display` renders the fully parenthesized infix form (`(5.0 + x)`), while
/// `Debug` renders the constructor-shaped form (`SumOp(Constant(5.0), Variable('x'))`).
#[derive(Clone, PartialEq)]
pub enum Expression {
    Constant(f64),
    Variable(String),
    BinaryOp {
        kind: BinaryOpKind,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn constant(value: f64) -> Self {
        Expression::Constant(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn binary(kind: BinaryOpKind, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Unary minus has no node of its own: `-v` is `0 - v`.
    pub fn negate(operand: Expression) -> Self {
        Self::binary(BinaryOpKind::Difference, Expression::Constant(0.0), operand)
    }

    /// Constructor-shaped rendering, handy for structural comparisons.
    pub fn to_debug_string(&self) -> String {
        format!("{self:?}")
    }

    /// Names of all variables referenced by this expression, sorted.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(name) => {
                names.insert(name.as_str());
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
        }
    }
}

/// Formats a constant in plain decimal notation with at least one fractional
/// digit (`5.0`, `0.00001`, never `1e-5`), so the output parses back.
fn write_constant(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if !value.is_finite() {
        return write!(f, "{value:?}");
    }
    // f64's Display is the shortest round-tripping form without an exponent.
    let digits = value.to_string();
    if digits.contains('.') {
        f.write_str(&digits)
    } else {
        write!(f, "{digits}.0")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write_constant(f, *value),
            Expression::Variable(name) => f.write_str(name),
            Expression::BinaryOp { kind, left, right } => {
                write!(f, "({left}{}{right})", kind.infix())
            }
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => {
                f.write_str("Constant(")?;
                write_constant(f, *value)?;
                f.write_str(")")
            }
            Expression::Variable(name) => write!(f, "Variable('{name}')"),
            Expression::BinaryOp { kind, left, right } => {
                write!(f, "{}({left:?}, {right:?})", kind.node_name())
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOpKind {
    Sum,
    Difference,
    Product,
    Quotient,
    Power,
}

impl BinaryOpKind {
    /// Applies the operator with plain IEEE-754 semantics: `1/0` is infinity,
    /// `(-8)^(1/3)` is NaN.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOpKind::Sum => left + right,
            BinaryOpKind::Difference => left - right,
            BinaryOpKind::Product => left * right,
            BinaryOpKind::Quotient => left / right,
            BinaryOpKind::Power => left.powf(right),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinaryOpKind::Sum => '+',
            BinaryOpKind::Difference => '-',
            BinaryOpKind::Product => '*',
            BinaryOpKind::Quotient => '/',
            BinaryOpKind::Power => '^',
        }
    }

    // Sums and differences are spaced out for readability.
    fn infix(&self) -> &'static str {
        match self {
            BinaryOpKind::Sum => " + ",
            BinaryOpKind::Difference => " - ",
            BinaryOpKind::Product => "*",
            BinaryOpKind::Quotient => "/",
            BinaryOpKind::Power => "^",
        }
    }

    fn node_name(&self) -> &'static str {
        match self {
            BinaryOpKind::Sum => "SumOp",
            BinaryOpKind::Difference => "DifferenceOp",
            BinaryOpKind::Product => "ProductOp",
            BinaryOpKind::Quotient => "QuotientOp",
            BinaryOpKind::Power => "PowerOp",
        }
    }
}

impl TryFrom<char> for BinaryOpKind {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(BinaryOpKind::Sum),
            '-' => Ok(BinaryOpKind::Difference),
            '*' => Ok(BinaryOpKind::Product),
            '/' => Ok(BinaryOpKind::Quotient),
            '^' => Ok(BinaryOpKind::Power),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}
