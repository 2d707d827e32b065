//! Parser and evaluator for the arithmetic functions typed into TurtleGraph.
//!
//! A string such as `"3-0.3*x^2"` is tokenized, parsed into an immutable
//! [`Expression`] tree and can then be evaluated any number of times against
//! different variable [`Bindings`].
//!
//! ```rust
//! use std::collections::HashMap;
//! use turtlegraph::parse_expression;
//!
//! let tree = parse_expression("x^2+1").unwrap();
//! assert_eq!(tree.to_string(), "((x^2.0) + 1.0)");
//!
//! let bindings = HashMap::from([("x".to_string(), 3.0)]);
//! assert_eq!(tree.evaluate(&bindings), Ok(10.0));
//! ```
//!
//! Common mistakes are reported with a dedicated message:
//!
//! ```rust
//! let err = turtlegraph::parse_expression("5(6+x)").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Implicit multiplication is currently not supported.  Offending piece: ``5.0((6.0 + x))''."
//! );
//! ```

pub mod ast;
pub mod error;
pub mod plot;

pub use ast::{parse_expression, BinaryOpKind, Bindings, Evaluator, Expression};
pub use error::{Error, EvalError, ParseError};
pub use plot::{PlotOptions, PlotRequest};

/// Parses `expression` and evaluates it once against `bindings`.
///
/// Use [`Evaluator`] or keep the parsed [`Expression`] when the same text is
/// evaluated repeatedly.
pub fn evaluate_expression(expression: &str, bindings: &Bindings) -> Result<f64, Error> {
    let tree = parse_expression(expression)?;
    Ok(tree.evaluate(bindings)?)
}
