//! Converting infix expressions to prefix notation.

use crate::lexer::{BinaryOperator, Token, TokenKind, Tokens, UnaryOperator};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
};

/// Rewrite an infix expression (e.g. `x = a + b * c`) in the prefix notation
/// understood by [`crate::evaluate()`] (e.g. `= x + a * b c`).
pub fn to_prefix(src: &str) -> Result<String, ParseError> {
    let prefix = parse(src)?.to_string();
    log::trace!("Converted \"{}\" to \"{}\"", src, prefix);

    Ok(prefix)
}

/// Parse an infix expression into a [`Node`] tree.
pub fn parse(src: &str) -> Result<Node<'_>, ParseError> {
    Parser::new(src).parse()
}

impl BinaryOperator {
    /// How tightly the operator binds, where higher numbers bind tighter.
    /// Unary operators bind tighter than all of them.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Assign => 1,
            BinaryOperator::Add | BinaryOperator::Subtract => 10,
            BinaryOperator::Multiply | BinaryOperator::Scale => 20,
            BinaryOperator::Power => 30,
        }
    }

    /// `a ^ b ^ c` is `a ^ (b ^ c)`, and `x = y = z` is `x = (y = z)`.
    pub fn is_right_associative(self) -> bool {
        match self {
            BinaryOperator::Power | BinaryOperator::Assign => true,
            _ => false,
        }
    }
}

/// An expression tree. Its [`Display`] impl writes the expression in prefix
/// notation.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// A number, variable name, or `?`.
    Operand(&'a str),
    Unary {
        op: UnaryOperator,
        operand: Box<Node<'a>>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Node<'a>>,
        right: Box<Node<'a>>,
    },
}

impl<'a> Display for Node<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand(text) => write!(f, "{}", text),
            Node::Unary { op, operand } => write!(f, "{} {}", op, operand),
            Node::Binary { op, left, right } => {
                write!(f, "{} {} {}", op, left, right)
            },
        }
    }
}

const OPERANDS: &[TokenKind] = &[
    TokenKind::Number,
    TokenKind::Identifier,
    TokenKind::Prompt,
    TokenKind::OpenParen,
];

const BINARY_OPERATORS: &[TokenKind] = &[
    TokenKind::Binary(BinaryOperator::Add),
    TokenKind::Binary(BinaryOperator::Subtract),
    TokenKind::Binary(BinaryOperator::Multiply),
    TokenKind::Binary(BinaryOperator::Scale),
    TokenKind::Binary(BinaryOperator::Power),
    TokenKind::Binary(BinaryOperator::Assign),
];

/// A precedence climbing parser for infix expressions.
///
/// The grammar:
///
/// ```text
/// expression     := unary (BINARY_OPERATOR expression)*
///
/// unary          := UNARY_OPERATOR unary
///                 | operand
///
/// operand        := NUMBER
///                 | IDENTIFIER
///                 | "?"
///                 | "(" expression ")"
/// ```
///
/// with the binary operators' precedence and associativity deciding how far
/// each `expression` reaches.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Node<'a>, ParseError> {
        let expr = self.expression(0)?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(token) => Err(ParseError::unexpected(token, BINARY_OPERATORS)),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(token) if token.kind == TokenKind::Unknown => {
                Err(ParseError::invalid(token))
            },
            Some(token) => Ok(token),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expression(
        &mut self,
        min_precedence: u8,
    ) -> Result<Node<'a>, ParseError> {
        let mut left = self.unary()?;

        while let Some(TokenKind::Binary(op)) = self.peek() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }

            // skip past the operator
            let _ = self.advance()?;

            let next_min = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.expression(next_min)?;

            left = Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Node<'a>, ParseError> {
        if let Some(TokenKind::Unary(op)) = self.peek() {
            let _ = self.advance()?;
            let operand = self.unary()?;

            return Ok(Node::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.operand()
    }

    fn operand(&mut self) -> Result<Node<'a>, ParseError> {
        let token = self.advance()?;

        match token.kind {
            kind if kind.is_operand() => Ok(Node::Operand(token.text)),
            TokenKind::OpenParen => {
                let expr = self.expression(0)?;
                let close_paren = self.advance()?;

                if close_paren.kind == TokenKind::CloseParen {
                    Ok(expr)
                } else {
                    Err(ParseError::unexpected(
                        close_paren,
                        &[TokenKind::CloseParen],
                    ))
                }
            },
            _ => Err(ParseError::unexpected(token, OPERANDS)),
        }
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("\"{text}\" at {span:?} isn't a valid token")]
    InvalidToken { text: SmolStr, span: Range<usize> },
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error(
        "Expected {} but found {found} at {span:?}",
        describe_expected(.expected)
    )]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
}

impl ParseError {
    fn invalid(token: Token<'_>) -> Self {
        ParseError::InvalidToken {
            text: token.text.into(),
            span: token.span,
        }
    }

    fn unexpected(token: Token<'_>, expected: &'static [TokenKind]) -> Self {
        if token.kind == TokenKind::Unknown {
            return ParseError::invalid(token);
        }

        ParseError::UnexpectedToken {
            found: token.kind,
            span: token.span,
            expected,
        }
    }
}

fn describe_expected(expected: &[TokenKind]) -> String {
    let descriptions: Vec<_> =
        expected.iter().map(ToString::to_string).collect();

    match descriptions.as_slice() {
        [] => String::from("nothing"),
        [single] => single.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}
