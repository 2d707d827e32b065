use crate::ast::Expression;
use std::fmt;

/// The kinds of token the lexer emits.
///
/// Variables and constants are folded into tree nodes as soon as they are
/// lexed; the parser only has to move them into place.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    /// `+` or `-`.
    SumOp(char),
    /// `*` or `/`.
    ProdOp(char),
    PowOp,
    Variable(Expression),
    Constant(Expression),
}

impl TokenKind {
    /// Upper-case tag of the token class, e.g. `SUMOP`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::OpenParen => "OPPAR",
            TokenKind::CloseParen => "CLPAR",
            TokenKind::SumOp(_) => "SUMOP",
            TokenKind::ProdOp(_) => "PRODOP",
            TokenKind::PowOp => "POWOP",
            TokenKind::Variable(_) => "VARIABLE",
            TokenKind::Constant(_) => "CONSTANT",
        }
    }
}

/// Renders the token the way it is quoted in syntax errors: operators as
/// their character, values as their display string.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::OpenParen => f.write_str("("),
            TokenKind::CloseParen => f.write_str(")"),
            TokenKind::SumOp(op) | TokenKind::ProdOp(op) => write!(f, "{op}"),
            TokenKind::PowOp => f.write_str("^"),
            TokenKind::Variable(node) | TokenKind::Constant(node) => write!(f, "{node}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    /// Byte offset of the first character of the token.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, position: usize) -> Self {
        Self {
            kind,
            line,
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
