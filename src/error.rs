use thiserror::Error;

/// Everything that can go wrong while turning text into an [`Expression`](crate::ast::Expression).
///
/// The `Display` texts are shown to the user as-is, so they are part of the
/// public contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown symbol `{fragment}'.")]
    UnknownSymbol { fragment: String },

    #[error("Sorry, operator `{symbol}' is not yet implemented.")]
    UnsupportedOperator { symbol: String },

    #[error("Unknown symbol `,'.  The decimal point is a `.'.")]
    DecimalSeparator,

    #[error("Power operator is `^', not `**'.")]
    PowerSyntax,

    #[error("Nothing to parse.")]
    EmptyInput,

    #[error("Functions are currently not supported.  Offending piece: ``{name}({argument})''.")]
    UnsupportedFunction { name: String, argument: String },

    #[error(
        "Implicit multiplication is currently not supported.  Offending piece: ``{left}({right})''."
    )]
    ImplicitMultiplication { left: String, right: String },

    #[error("Syntax error at `{token}'.")]
    SyntaxError { token: String },

    #[error("Unexpected end of input.")]
    UnexpectedEndOfInput,

    #[error("Expression is nested too deeply (more than {limit} levels).")]
    TooDeeplyNested { limit: usize },

    #[error("Expression is too long (more than {limit} operations).")]
    TooLong { limit: usize },

    /// The token grammar gave up for a reason other than a non-matching symbol.
    #[error("Could not read the input: {message}")]
    Lexer { message: String },
}

impl ParseError {
    /// True for inputs that are well-formed but use a feature that is not
    /// available yet, as opposed to plain mistakes.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            ParseError::UnsupportedOperator { .. }
                | ParseError::UnsupportedFunction { .. }
                | ParseError::ImplicitMultiplication { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Variable `{name}' is not bound.")]
    UnboundVariable { name: String },
}

/// Umbrella error for the one-shot entry points that both parse and evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
