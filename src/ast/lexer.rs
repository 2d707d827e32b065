use crate::ast::{Expression, Token, TokenKind};
use crate::error::ParseError;
use log::trace;
use pest::error::ErrorVariant;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::iter::FusedIterator;

#[derive(Parser)]
#[grammar = "ast/lexer.pest"] // relative to project `src`
struct TokenGrammar;

/// Characters skipped between tokens.
const IGNORED: [char; 3] = [' ', '\t', '\n'];

fn is_ignored(c: char) -> bool {
    IGNORED.contains(&c)
}

/// Pull-based tokenizer: each call to [`Lexer::next_token`] matches exactly one
/// token at the current position.
///
/// Once an error has been reported the lexer is exhausted.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    // There are no statement separators, so every token sits on line 1.
    line: usize,
}

/// Returns a lexer over `input`; tokens are produced on demand.
pub fn tokenize(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Advances the lexer and returns the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_ignored();

        let input = self.input;
        let rest = &input[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }

        let start = self.position;
        let matched = match TokenGrammar::parse(Rule::token, rest) {
            Ok(mut pairs) => pairs.next().and_then(|token| token.into_inner().next()),
            Err(err) => {
                // Only a plain mismatch means the symbol is unknown; anything
                // else (call or stack limits) is reported as it is.
                if let ErrorVariant::CustomError { message } = err.variant {
                    self.exhaust();
                    return Err(ParseError::Lexer { message });
                }
                None
            }
        };

        let Some(pair) = matched else {
            self.exhaust();
            return Err(ParseError::UnknownSymbol {
                fragment: unknown_fragment(rest).to_string(),
            });
        };

        self.position += pair.as_str().len();
        match classify(pair) {
            Ok(kind) => {
                let token = Token::new(kind, self.line, start);
                trace!("Lexed {} `{}' at {}", token.kind.name(), token, start);
                Ok(Some(token))
            }
            Err(err) => {
                self.exhaust();
                Err(err)
            }
        }
    }

    fn skip_ignored(&mut self) {
        let input = self.input;
        let rest = &input[self.position..];
        self.position += rest.len() - rest.trim_start_matches(is_ignored).len();
    }

    fn exhaust(&mut self) {
        self.position = self.input.len();
    }
}

fn classify(pair: Pair<'_, Rule>) -> Result<TokenKind, ParseError> {
    let text = pair.as_str();
    match (pair.as_rule(), text.chars().next()) {
        (Rule::not_implemented, _) => Err(ParseError::UnsupportedOperator {
            symbol: text.to_string(),
        }),
        (Rule::bad_comma, _) => Err(ParseError::DecimalSeparator),
        (Rule::bad_power, _) => Err(ParseError::PowerSyntax),
        (Rule::open_paren, _) => Ok(TokenKind::OpenParen),
        (Rule::close_paren, _) => Ok(TokenKind::CloseParen),
        (Rule::sum_op, Some(op)) => Ok(TokenKind::SumOp(op)),
        (Rule::prod_op, Some(op)) => Ok(TokenKind::ProdOp(op)),
        (Rule::pow_op, _) => Ok(TokenKind::PowOp),
        (Rule::variable, _) => Ok(TokenKind::Variable(Expression::variable(text))),
        (Rule::constant, _) => text
            .parse::<f64>()
            .map(|value| TokenKind::Constant(Expression::constant(value)))
            .map_err(|_| ParseError::UnknownSymbol {
                fragment: text.to_string(),
            }),
        _ => Err(ParseError::UnknownSymbol {
            fragment: unknown_fragment(text).to_string(),
        }),
    }
}

/// The run of non-ignored characters at the start of `rest`, so that the user
/// sees `$3` rather than just `$`.
fn unknown_fragment(rest: &str) -> &str {
    rest.split(is_ignored).next().unwrap_or(rest)
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl FusedIterator for Lexer<'_> {}
