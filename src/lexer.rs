//! Splitting a line of text into tokens.

use std::{
    fmt::{self, Display, Formatter},
    ops::Range,
};

/// An iterator over the [`Token`]s in a piece of text.
///
/// Tokens are separated by whitespace, except for parentheses which always
/// stand on their own. The iterator carries its own cursor, so any number of
/// them can walk different strings at the same time.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn take_while<P>(&mut self, mut predicate: P) -> Range<usize>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        start..self.cursor
    }

    fn chomp_paren(&mut self) -> Option<Token<'a>> {
        let start = self.cursor;
        self.advance()?;

        Some(Token::from_text(self.src, start..self.cursor))
    }

    fn chomp_word(&mut self) -> Token<'a> {
        let span = self.take_while(|c| !c.is_whitespace() && !is_paren(c));

        Token::from_text(self.src, span)
    }
}

fn is_paren(c: char) -> bool { c == '(' || c == ')' }

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' | ')' => self.chomp_paren(),
                _ => Some(self.chomp_word()),
            };
        }
    }
}

/// A single token and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(src: &'a str, span: Range<usize>) -> Self {
        let text = &src[span.clone()];

        Token {
            text,
            span,
            kind: TokenKind::classify(text),
        }
    }
}

/// The kinds of token that can appear in an expression.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    /// A real number literal.
    Number,
    /// A variable name.
    Identifier,
    /// `?`, asking the user to type in a matrix.
    Prompt,
    OpenParen,
    CloseParen,
    /// Something which isn't a valid token.
    Unknown,
}

impl TokenKind {
    /// Figure out what kind of token a piece of text is. The whole token is
    /// used, so `m` is an operator but `m1` is a variable.
    pub fn classify(text: &str) -> TokenKind {
        if let Some(op) = BinaryOperator::from_symbol(text) {
            return TokenKind::Binary(op);
        }
        if let Some(op) = UnaryOperator::from_symbol(text) {
            return TokenKind::Unary(op);
        }

        match text {
            "?" => TokenKind::Prompt,
            "(" => TokenKind::OpenParen,
            ")" => TokenKind::CloseParen,
            _ if is_number(text) => TokenKind::Number,
            _ if is_identifier(text) => TokenKind::Identifier,
            _ => TokenKind::Unknown,
        }
    }

    /// Can this token be used where an operand is expected?
    pub fn is_operand(self) -> bool {
        match self {
            TokenKind::Number | TokenKind::Identifier | TokenKind::Prompt => {
                true
            },
            _ => false,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Binary(op) => write!(f, "\"{}\"", op),
            TokenKind::Unary(op) => write!(f, "\"{}\"", op),
            TokenKind::Number => write!(f, "a number"),
            TokenKind::Identifier => write!(f, "a variable name"),
            TokenKind::Prompt => write!(f, "\"?\""),
            TokenKind::OpenParen => write!(f, "\"(\""),
            TokenKind::CloseParen => write!(f, "\")\""),
            TokenKind::Unknown => write!(f, "an unknown token"),
        }
    }
}

fn is_number(text: &str) -> bool {
    // f64's FromStr also accepts things like "inf" and "NaN", which we'd
    // rather treat as names
    let starts_like_a_number = text
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || "+-.".contains(c));

    starts_like_a_number && text.parse::<f64>().is_ok()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        },
        _ => false,
    }
}

/// An operator which sits between its operands when written in infix form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`, matrix addition.
    Add,
    /// `-`, matrix subtraction.
    Subtract,
    /// `*`, matrix multiplication.
    Multiply,
    /// `.`, multiplying a matrix by a scalar.
    Scale,
    /// `^`, raising a square matrix to an integer power.
    Power,
    /// `=`, saving a matrix to a variable.
    Assign,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Scale => ".",
            BinaryOperator::Power => "^",
            BinaryOperator::Assign => "=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "." => Some(BinaryOperator::Scale),
            "^" => Some(BinaryOperator::Power),
            "=" => Some(BinaryOperator::Assign),
            _ => None,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator written in front of its single operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `~`
    Negate,
    /// `i`
    Inverse,
    /// `d`
    Determinant,
    /// `m`
    Minors,
    /// `c`
    Cofactors,
    /// `t`
    Transpose,
    /// `id`, followed by the size of the identity matrix.
    Identity,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "~",
            UnaryOperator::Inverse => "i",
            UnaryOperator::Determinant => "d",
            UnaryOperator::Minors => "m",
            UnaryOperator::Cofactors => "c",
            UnaryOperator::Transpose => "t",
            UnaryOperator::Identity => "id",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "~" => Some(UnaryOperator::Negate),
            "i" => Some(UnaryOperator::Inverse),
            "d" => Some(UnaryOperator::Determinant),
            "m" => Some(UnaryOperator::Minors),
            "c" => Some(UnaryOperator::Cofactors),
            "t" => Some(UnaryOperator::Transpose),
            "id" => Some(UnaryOperator::Identity),
            _ => None,
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
