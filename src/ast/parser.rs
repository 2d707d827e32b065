//! Recursive descent parser from tokens to an [`Expression`] tree.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! sum      := product (SUMOP product)*
//! product  := power (PRODOP power)*
//! power    := SUMOP exponent | exponent
//! exponent := value (POWOP power)?
//! value    := OPPAR sum CLPAR | VARIABLE | CONSTANT
//! ```
//!
//! Sums and products fold to the left, powers to the right. A leading `+` is
//! dropped and a leading `-` becomes `0 - operand`.
//!
//! A few shapes that users type by mistake are reported with a dedicated
//! message instead of a bare syntax error: `name(expr)` (function call),
//! `constant(expr)` and `(expr)(expr)` (implicit multiplication), and `* *`.
//!
//! The tree is walked recursively once built, so the parser refuses inputs
//! nested deeper than [`MAX_NESTING_DEPTH`] or holding more than
//! [`MAX_OPERATIONS`] operators.

use crate::ast::{tokenize, BinaryOpKind, Expression, Token, TokenKind};
use crate::error::ParseError;
use log::debug;

/// Groups and power chains nested deeper than this are rejected.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Binary operations one expression may contain, unary minus included.
pub const MAX_OPERATIONS: usize = 1000;

/// Parses `input` into an expression tree.
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    debug!("Parsing expression: {}", input);
    let expression = parse_tokens(tokenize(input))?;
    debug!("Parse result: {:?}", expression);
    Ok(expression)
}

/// Parses a complete token stream. Fails on an empty stream and on tokens
/// left over after a full expression.
pub fn parse_tokens<I>(tokens: I) -> Result<Expression, ParseError>
where
    I: Iterator<Item = Result<Token, ParseError>>,
{
    ExpressionParser::new(tokens)?.parse()
}

pub struct ExpressionParser<I> {
    tokens: I,
    current: Option<Token>,
    depth: usize,
    operations: usize,
}

impl<I> ExpressionParser<I>
where
    I: Iterator<Item = Result<Token, ParseError>>,
{
    /// Creates a parser and pulls the first token.
    pub fn new(mut tokens: I) -> Result<Self, ParseError> {
        let current = tokens.next().transpose()?;
        Ok(Self {
            tokens,
            current,
            depth: 0,
            operations: 0,
        })
    }

    pub fn parse(mut self) -> Result<Expression, ParseError> {
        if self.current.is_none() {
            return Err(ParseError::EmptyInput);
        }

        let expression = self.build_sum()?;

        match self.current.take() {
            None => Ok(expression),
            Some(token) => Err(syntax_error(&token)),
        }
    }

    /// Moves to the next token and returns the one just left behind.
    fn advance(&mut self) -> Result<Option<Token>, ParseError> {
        let next = self.tokens.next().transpose()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn current_kind(&self) -> Option<&TokenKind> {
        self.current.as_ref().map(|token| &token.kind)
    }

    fn count_operation(&mut self) -> Result<(), ParseError> {
        self.operations += 1;
        if self.operations > MAX_OPERATIONS {
            debug!("Operation limit reached at {:?}", self.current);
            return Err(ParseError::TooLong {
                limit: MAX_OPERATIONS,
            });
        }
        Ok(())
    }

    /// Builds a binary node, counting it against [`MAX_OPERATIONS`].
    fn join(
        &mut self,
        kind: BinaryOpKind,
        left: Expression,
        right: Expression,
    ) -> Result<Expression, ParseError> {
        self.count_operation()?;
        Ok(Expression::binary(kind, left, right))
    }

    fn build_sum(&mut self) -> Result<Expression, ParseError> {
        let mut node = self.build_product()?;

        while let Some(&TokenKind::SumOp(op)) = self.current_kind() {
            debug!("Sum operator: {}", op);
            self.advance()?;
            let right = self.build_product()?;
            node = self.join(operator_kind(op)?, node, right)?;
        }

        Ok(node)
    }

    fn build_product(&mut self) -> Result<Expression, ParseError> {
        let mut node = self.build_power()?;

        while let Some(&TokenKind::ProdOp(op)) = self.current_kind() {
            debug!("Product operator: {}", op);
            self.advance()?;
            // `* *` with blanks in between slips past the lexer's `**` rule.
            if op == '*' && self.current_kind() == Some(&TokenKind::ProdOp('*')) {
                return Err(ParseError::PowerSyntax);
            }
            let right = self.build_power()?;
            node = self.join(operator_kind(op)?, node, right)?;
        }

        Ok(node)
    }

    // Every group and every `^` goes through here, so this is where nesting is bounded.
    fn build_power(&mut self) -> Result<Expression, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH,
            });
        }

        self.depth += 1;
        let power = self.build_signed();
        self.depth -= 1;
        power
    }

    fn build_signed(&mut self) -> Result<Expression, ParseError> {
        let Some(&TokenKind::SumOp(sign)) = self.current_kind() else {
            return self.build_exponent();
        };

        debug!("Unary operator: {}", sign);
        self.advance()?;
        let operand = self.build_exponent()?;
        match sign {
            '-' => {
                self.count_operation()?;
                Ok(Expression::negate(operand))
            }
            _ => Ok(operand),
        }
    }

    fn build_exponent(&mut self) -> Result<Expression, ParseError> {
        let base = self.build_value()?;

        if self.current_kind() != Some(&TokenKind::PowOp) {
            return Ok(base);
        }

        self.advance()?;
        let exponent = self.build_power()?;
        self.join(BinaryOpKind::Power, base, exponent)
    }

    fn build_value(&mut self) -> Result<Expression, ParseError> {
        let token = self
            .advance()?
            .ok_or(ParseError::UnexpectedEndOfInput)?;
        debug!("Building value from {} at {}", token.kind.name(), token.position);

        match token.kind {
            TokenKind::OpenParen => {
                let inner = self.build_group()?;
                self.advance()?;
                if let Some(right) = self.juxtaposed_group()? {
                    return Err(ParseError::ImplicitMultiplication {
                        left: format!("({inner})"),
                        right: right.to_string(),
                    });
                }
                Ok(inner)
            }
            TokenKind::Variable(node) => match self.juxtaposed_group()? {
                Some(argument) => Err(ParseError::UnsupportedFunction {
                    name: node.to_string(),
                    argument: argument.to_string(),
                }),
                None => Ok(node),
            },
            TokenKind::Constant(node) => match self.juxtaposed_group()? {
                Some(right) => Err(ParseError::ImplicitMultiplication {
                    left: node.to_string(),
                    right: right.to_string(),
                }),
                None => Ok(node),
            },
            // A leading `* *`, which the product rule never sees.
            TokenKind::ProdOp('*') if self.current_kind() == Some(&TokenKind::ProdOp('*')) => {
                Err(ParseError::PowerSyntax)
            }
            _ => Err(syntax_error(&token)),
        }
    }

    /// Parses the inside of a parenthesized group, leaving the closing
    /// parenthesis as the current token.
    fn build_group(&mut self) -> Result<Expression, ParseError> {
        let inner = self.build_sum()?;
        match &self.current {
            Some(token) if token.kind == TokenKind::CloseParen => Ok(inner),
            Some(token) => Err(syntax_error(token)),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    /// A group directly following a value, e.g. the `(x)` in `sin(x)`. Only
    /// ever parsed to build a diagnostic.
    fn juxtaposed_group(&mut self) -> Result<Option<Expression>, ParseError> {
        if self.current_kind() != Some(&TokenKind::OpenParen) {
            return Ok(None);
        }
        self.advance()?;
        self.build_group().map(Some)
    }
}

fn operator_kind(op: char) -> Result<BinaryOpKind, ParseError> {
    BinaryOpKind::try_from(op).map_err(|_| ParseError::SyntaxError {
        token: op.to_string(),
    })
}

fn syntax_error(token: &Token) -> ParseError {
    debug!("Syntax error at {} ({})", token.position, token.kind.name());
    ParseError::SyntaxError {
        token: token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(input: &str) -> String {
        parse_expression(input)
            .unwrap_or_else(|err| panic!("Input '{}' should parse: {}", input, err))
            .to_string()
    }

    fn debug_string(input: &str) -> String {
        parse_expression(input).unwrap().to_debug_string()
    }

    fn error(input: &str) -> ParseError {
        match parse_expression(input) {
            Ok(expression) => panic!("Input '{}' should fail, got {}", input, expression),
            Err(err) => err,
        }
    }

    #[test]
    fn test_single_operators() {
        assert_eq!(display("5+x"), "(5.0 + x)");
        assert_eq!(display("x-7"), "(x - 7.0)");
        assert_eq!(display("z*y"), "(z*y)");
        assert_eq!(display("6/3"), "(6.0/3.0)");
        assert_eq!(display("x^2"), "(x^2.0)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(display("x+2.5+3"), "((x + 2.5) + 3.0)");
        assert_eq!(display("0+0-0"), "((0.0 + 0.0) - 0.0)");
        assert_eq!(display("5-2+7.3"), "((5.0 - 2.0) + 7.3)");
        assert_eq!(display("9-x-3"), "((9.0 - x) - 3.0)");
        assert_eq!(display("9*z*1.1"), "((9.0*z)*1.1)");
        assert_eq!(display("y*z/x"), "((y*z)/x)");
        assert_eq!(display("8/0.5*2"), "((8.0/0.5)*2.0)");
        assert_eq!(display("3.3/1.1/0.1"), "((3.3/1.1)/0.1)");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(display("y^2^0.5"), "(y^(2.0^0.5))");
        assert_eq!(display("a^b^c^d"), "(a^(b^(c^d)))");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(display("5*x+0.5"), "((5.0*x) + 0.5)");
        assert_eq!(display("5-x*0.5"), "(5.0 - (x*0.5))");
        assert_eq!(display("3*x^2"), "(3.0*(x^2.0))");
        assert_eq!(display("y^2/x"), "((y^2.0)/x)");
        assert_eq!(display("0.3^x+5/2"), "((0.3^x) + (5.0/2.0))");
        assert_eq!(display("3-0.3*x^2"), "(3.0 - (0.3*(x^2.0)))");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(display("3+-5"), "(3.0 + (0.0 - 5.0))");
        assert_eq!(display("-2*x"), "((0.0 - 2.0)*x)");
        assert_eq!(display("x^-2"), "(x^(0.0 - 2.0))");
        assert_eq!(display("-2^4"), "(0.0 - (2.0^4.0))");
        assert_eq!(display("-(x+1)"), "(0.0 - (x + 1.0))");
    }

    #[test]
    fn test_parentheses_reset_precedence() {
        assert_eq!(display("(x+3)*(x-7)"), "((x + 3.0)*(x - 7.0))");
        assert_eq!(display("0.5^(3*x)"), "(0.5^(3.0*x))");
        assert_eq!(display("5*(x+3)"), "(5.0*(x + 3.0))");
        assert_eq!(display("2*3+(5-3)"), "((2.0*3.0) + (5.0 - 3.0))");
        assert_eq!(display("((x))"), "x");
    }

    #[test]
    fn test_tree_creation() {
        assert_eq!(debug_string("0"), "Constant(0.0)");
        assert_eq!(debug_string("3.5"), "Constant(3.5)");
        assert_eq!(debug_string("x"), "Variable('x')");
        assert_eq!(debug_string("-3"), "DifferenceOp(Constant(0.0), Constant(3.0))");
        assert_eq!(debug_string("+3"), "Constant(3.0)");
        assert_eq!(debug_string("5+x"), "SumOp(Constant(5.0), Variable('x'))");
        assert_eq!(debug_string("3-2"), "DifferenceOp(Constant(3.0), Constant(2.0))");
        assert_eq!(debug_string("0*x"), "ProductOp(Constant(0.0), Variable('x'))");
        assert_eq!(debug_string("z/2"), "QuotientOp(Variable('z'), Constant(2.0))");
        assert_eq!(debug_string("x^2"), "PowerOp(Variable('x'), Constant(2.0))");
        assert_eq!(
            debug_string("x^(2+3)"),
            "PowerOp(Variable('x'), SumOp(Constant(2.0), Constant(3.0)))"
        );
    }

    #[test]
    fn test_literals_render_without_operators() {
        assert_eq!(display("5"), "5.0");
        assert_eq!(display("  42.25 "), "42.25");
        assert_eq!(display("cat"), "cat");
    }

    #[test]
    fn test_display_string_round_trips() {
        let inputs = [
            "3-0.3*x^2",
            "(x+3)*(x-7)",
            "y^2^0.5",
            "-2^4",
            "x^-2",
            "9-x-3",
            "3.3/1.1/0.1",
            "-(a+b)*c/d",
            "0.00001*x",
            "10000000000000000+x",
        ];
        for input in inputs {
            let first = parse_expression(input).unwrap();
            let second = parse_expression(&first.to_string()).unwrap();
            assert_eq!(first.to_debug_string(), second.to_debug_string(), "input: {input:?}");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(error(""), ParseError::EmptyInput);
        assert_eq!(error(" \t\n"), ParseError::EmptyInput);
        assert_eq!(error("").to_string(), "Nothing to parse.");
    }

    #[test]
    fn test_functions_are_reported() {
        assert_eq!(
            error("sin(x)"),
            ParseError::UnsupportedFunction {
                name: "sin".to_string(),
                argument: "x".to_string()
            }
        );
        assert_eq!(
            error("sin(x)").to_string(),
            "Functions are currently not supported.  Offending piece: ``sin(x)''."
        );
        assert_eq!(
            error("tan(y+3)").to_string(),
            "Functions are currently not supported.  Offending piece: ``tan((y + 3.0))''."
        );
        assert_eq!(
            error("6*ln(x+3)").to_string(),
            "Functions are currently not supported.  Offending piece: ``ln((x + 3.0))''."
        );
    }

    #[test]
    fn test_implicit_multiplication_is_reported() {
        assert_eq!(
            error("5(6+x)"),
            ParseError::ImplicitMultiplication {
                left: "5.0".to_string(),
                right: "(6.0 + x)".to_string()
            }
        );
        assert_eq!(
            error("5(6+x)").to_string(),
            "Implicit multiplication is currently not supported.  \
             Offending piece: ``5.0((6.0 + x))''."
        );
        assert_eq!(
            error("2(x+3)+7").to_string(),
            "Implicit multiplication is currently not supported.  \
             Offending piece: ``2.0((x + 3.0))''."
        );
        assert_eq!(
            error("(x+3)(6+x)").to_string(),
            "Implicit multiplication is currently not supported.  \
             Offending piece: ``((x + 3.0))((6.0 + x))''."
        );
        assert!(error("(x+3)(6+x)").is_unsupported());
    }

    #[test]
    fn test_spaced_double_star() {
        assert_eq!(error("x^3* *6"), ParseError::PowerSyntax);
        assert_eq!(error("2**3"), ParseError::PowerSyntax);
        assert_eq!(error("* *6"), ParseError::PowerSyntax);
        assert_eq!(error("(* *6)"), ParseError::PowerSyntax);
        assert_eq!(error("*6").to_string(), "Syntax error at `*'.");
        assert_eq!(error("* /6").to_string(), "Syntax error at `*'.");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(error("5+++3").to_string(), "Syntax error at `+'.");
        assert_eq!(error("6.0 7").to_string(), "Syntax error at `7.0'.");
        assert_eq!(error("--3").to_string(), "Syntax error at `-'.");
        assert_eq!(error(")").to_string(), "Syntax error at `)'.");
        assert_eq!(error("(x+1))").to_string(), "Syntax error at `)'.");
        assert_eq!(error("x y").to_string(), "Syntax error at `y'.");
        assert_eq!(error("(x*)").to_string(), "Syntax error at `)'.");
        assert_eq!(error("()").to_string(), "Syntax error at `)'.");
    }

    #[test]
    fn test_unexpected_end_of_input() {
        for input in ["5+", "(5", "x^", "sin(x", "-", "2*(x-"] {
            assert_eq!(error(input), ParseError::UnexpectedEndOfInput, "input: {input:?}");
        }
    }

    #[test]
    fn test_lexical_errors_surface_through_parser() {
        assert_eq!(
            error("x = 5").to_string(),
            "Sorry, operator `=' is not yet implemented."
        );
        assert_eq!(error("0,5"), ParseError::DecimalSeparator);
        assert_eq!(
            error("5 + $3 - 7"),
            ParseError::UnknownSymbol {
                fragment: "$3".to_string()
            }
        );
    }

    #[test]
    fn test_parse_tokens_from_any_stream() {
        let tokens = vec![
            Ok(Token::new(TokenKind::SumOp('-'), 1, 0)),
            Ok(Token::new(TokenKind::Variable(Expression::variable("x")), 1, 1)),
            Ok(Token::new(TokenKind::ProdOp('*'), 1, 2)),
            Ok(Token::new(TokenKind::Constant(Expression::constant(2.0)), 1, 3)),
        ];
        let expression = parse_tokens(tokens.into_iter()).unwrap();
        assert_eq!(expression.to_string(), "((0.0 - x)*2.0)");

        assert_eq!(
            parse_tokens(std::iter::empty::<Result<Token, ParseError>>()),
            Err(ParseError::EmptyInput)
        );
    }

    fn nested(depth: usize) -> String {
        format!("{}x{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_deeply_nested_groups() {
        assert_eq!(display(&nested(50)), "x");
        assert_eq!(display(&nested(MAX_NESTING_DEPTH - 1)), "x");
        assert_eq!(
            error(&nested(MAX_NESTING_DEPTH)),
            ParseError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn test_nesting_limit_is_reported_not_misread() {
        for depth in [500, 5_000] {
            assert_eq!(
                error(&nested(depth)),
                ParseError::TooDeeplyNested {
                    limit: MAX_NESTING_DEPTH
                },
                "depth: {depth}"
            );
        }
        assert_eq!(
            error(&nested(500)).to_string(),
            "Expression is nested too deeply (more than 64 levels)."
        );
        // The lexer on its own has no depth limit.
        assert!(tokenize(&nested(500)).all(|token| token.is_ok()));
    }

    #[test]
    fn test_power_chains_count_as_nesting() {
        let chain = |len: usize| vec!["x"; len].join("^");
        assert!(parse_expression(&chain(MAX_NESTING_DEPTH)).is_ok());
        assert_eq!(
            error(&chain(MAX_NESTING_DEPTH + 1)),
            ParseError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn test_very_long_sum() {
        let input = vec!["x"; 100].join(" + ");
        let expression = parse_expression(&input).unwrap();

        let mut expected = Expression::variable("x");
        for _ in 1..100 {
            expected = Expression::binary(BinaryOpKind::Sum, expected, Expression::variable("x"));
        }
        assert_eq!(expression, expected);
    }

    #[test]
    fn test_longest_accepted_sum() {
        let input = vec!["x"; MAX_OPERATIONS + 1].join("+");
        let expression = parse_expression(&input).unwrap();
        let bindings = crate::ast::Bindings::from([("x".to_string(), 1.0)]);
        assert_eq!(expression.evaluate(&bindings), Ok((MAX_OPERATIONS + 1) as f64));
        assert_eq!(expression.to_string().matches('+').count(), MAX_OPERATIONS);
        assert!(expression.to_debug_string().starts_with("SumOp(SumOp("));
    }

    #[test]
    fn test_too_long_expressions_are_rejected() {
        for terms in [MAX_OPERATIONS + 2, 10_000, 100_000] {
            let input = vec!["x"; terms].join("+");
            assert_eq!(
                error(&input),
                ParseError::TooLong {
                    limit: MAX_OPERATIONS
                },
                "terms: {terms}"
            );
        }
        assert_eq!(
            error(&vec!["-x"; 600].join("*")).to_string(),
            "Expression is too long (more than 1000 operations)."
        );
    }
}
