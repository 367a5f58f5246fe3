//! Evaluating expressions written in prefix notation.
//!
//! Each operator comes before its operands, so `+ a * b c` means `a + b * c`.
//!
//! | Token | Operands | Result |
//! |---|---|---|
//! | `+` | 2 matrices | their sum |
//! | `-` | 2 matrices | the first minus the second |
//! | `*` | 2 matrices | their product |
//! | `.` | a number, then a matrix | the matrix scaled by the number |
//! | `^` | a square matrix, then an integer | the matrix raised to that power |
//! | `~` | 1 matrix | the matrix negated |
//! | `i` | 1 square matrix | its inverse |
//! | `d` | 1 square matrix | its determinant, as a `1x1` matrix |
//! | `m` | 1 square matrix | its matrix of minors |
//! | `c` | 1 square matrix | its matrix of cofactors |
//! | `t` | 1 matrix | its transpose |
//! | `id` | an integer up to 4096 | the identity matrix of that size |
//! | `?` | | a matrix from the [`InputSource`] |
//! | `=` | a name, then a matrix | the matrix, also saved under the name |
//!
//! Anything else is looked up in the [`Variables`].

use crate::{
    cofactor::Decomposition,
    kernel,
    lexer::{BinaryOperator, Token, TokenKind, Tokens, UnaryOperator},
    store::{self, Variables},
    Matrix, ParseError,
};
use smol_str::SmolStr;

/// Somewhere the `?` operator can get a freshly entered matrix from.
pub trait InputSource {
    /// Ask for a matrix, returning `None` if one couldn't be provided.
    fn read_matrix(&mut self) -> Option<Matrix>;
}

/// An [`InputSource`] for when there is nobody to ask.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_matrix(&mut self) -> Option<Matrix> { None }
}

impl<F> InputSource for F
where
    F: FnMut() -> Option<Matrix>,
{
    fn read_matrix(&mut self) -> Option<Matrix> { self() }
}

/// Evaluate an expression written in prefix notation.
///
/// Variables are read from (and `=` writes to) `variables`. When the
/// expression fails, nothing it would have saved is saved.
pub fn evaluate(
    prefix: &str,
    variables: &mut Variables,
    input: &mut dyn InputSource,
) -> Result<Matrix, EvalError> {
    let mut tokens = Tokens::new(prefix);
    let mut evaluator = Evaluator { variables, input };

    let result = evaluator.expression(&mut tokens)?;

    match tokens.next() {
        None => Ok(result),
        Some(token) => Err(EvalError::TrailingInput {
            token: token.text.into(),
        }),
    }
}

/// The largest identity matrix `id` will build.
const MAX_IDENTITY_SIZE: usize = 4096;

struct Evaluator<'v, 'i> {
    variables: &'v mut Variables,
    input: &'i mut dyn InputSource,
}

impl<'v, 'i> Evaluator<'v, 'i> {
    fn expression(
        &mut self,
        tokens: &mut Tokens<'_>,
    ) -> Result<Matrix, EvalError> {
        let token = next_token(tokens)?;
        log::debug!("Evaluating \"{}\"", token.text);

        match token.kind {
            TokenKind::Binary(op) => self.binary(op, tokens),
            TokenKind::Unary(op) => self.unary(op, tokens),
            TokenKind::Prompt => {
                self.input.read_matrix().ok_or(EvalError::NoInput)
            },
            TokenKind::Identifier => match self.variables.get(token.text) {
                Some(matrix) => Ok(matrix.clone()),
                None => Err(EvalError::UnknownVariable {
                    name: token.text.into(),
                }),
            },
            _ => Err(EvalError::UnrecognizedToken {
                token: token.text.into(),
            }),
        }
    }

    fn binary(
        &mut self,
        op: BinaryOperator,
        tokens: &mut Tokens<'_>,
    ) -> Result<Matrix, EvalError> {
        match op {
            BinaryOperator::Add | BinaryOperator::Subtract => {
                let mut left = self.expression(tokens)?;
                let mut right = self.expression(tokens)?;

                if !left.same_shape(&right) {
                    return Err(EvalError::mismatch(op, &left, &right));
                }
                if op == BinaryOperator::Subtract {
                    kernel::scale_in_place(&mut right, -1.0);
                }

                kernel::add_in_place(&mut left, &right);
                Ok(left)
            },
            BinaryOperator::Multiply => {
                let left = self.expression(tokens)?;
                let right = self.expression(tokens)?;

                if left.columns() != right.rows() {
                    return Err(EvalError::mismatch(op, &left, &right));
                }

                let mut product = Matrix::zeros(left.rows(), right.columns());
                kernel::multiply(&mut product, &left, &right);
                Ok(product)
            },
            BinaryOperator::Scale => {
                let scalar = number(tokens)?;
                let mut matrix = self.expression(tokens)?;

                kernel::scale_in_place(&mut matrix, scalar);
                Ok(matrix)
            },
            BinaryOperator::Power => {
                let base = self.expression(tokens)?;
                let exponent = integer(tokens)?;

                if !base.is_square() {
                    return Err(EvalError::not_square(op.symbol(), &base));
                }

                Ok(power(base, exponent))
            },
            BinaryOperator::Assign => {
                let name = next_token(tokens)?;

                if !store::is_valid_name(name.text) {
                    return Err(EvalError::InvalidName {
                        name: name.text.into(),
                    });
                }

                let value = self.expression(tokens)?;
                self.variables.set(name.text, value.clone());

                Ok(value)
            },
        }
    }

    fn unary(
        &mut self,
        op: UnaryOperator,
        tokens: &mut Tokens<'_>,
    ) -> Result<Matrix, EvalError> {
        match op {
            UnaryOperator::Identity => {
                let size = integer(tokens)?;

                if size == 0 || size > MAX_IDENTITY_SIZE {
                    return Err(EvalError::InvalidSize { size });
                }

                Ok(Matrix::identity(size))
            },
            UnaryOperator::Negate => {
                let mut matrix = self.expression(tokens)?;
                kernel::scale_in_place(&mut matrix, -1.0);
                Ok(matrix)
            },
            UnaryOperator::Transpose => {
                let matrix = self.expression(tokens)?;
                Ok(matrix.transposed())
            },
            UnaryOperator::Inverse
            | UnaryOperator::Determinant
            | UnaryOperator::Minors
            | UnaryOperator::Cofactors => {
                let matrix = self.expression(tokens)?;
                let decomposition =
                    Decomposition::of(&matrix).ok_or_else(|| {
                        EvalError::not_square(op.symbol(), &matrix)
                    })?;

                Ok(select(op, decomposition))
            },
        }
    }
}

/// Pick the bit of a [`Decomposition`] a unary operator asks for.
fn select(op: UnaryOperator, decomposition: Decomposition) -> Matrix {
    match op {
        UnaryOperator::Inverse => {
            if decomposition.is_singular() {
                log::warn!(
                    "Inverting a singular matrix, the result will contain \
                     infinities or NaNs"
                );
            }
            decomposition.inverse()
        },
        UnaryOperator::Determinant => {
            Matrix::from([[decomposition.determinant]])
        },
        UnaryOperator::Minors => decomposition.minors,
        UnaryOperator::Cofactors => decomposition.cofactors,
        other => unreachable!("{:?} doesn't use a decomposition", other),
    }
}

/// Raise a square matrix to some power by repeated multiplication.
fn power(base: Matrix, exponent: usize) -> Matrix {
    match exponent {
        0 => Matrix::identity(base.rows()),
        1 => base,
        _ => {
            let mut result = base.clone();
            let mut scratch = Matrix::zeros(base.rows(), base.columns());

            for _ in 2..=exponent {
                kernel::multiply(&mut scratch, &result, &base);
                std::mem::swap(&mut result, &mut scratch);
            }

            result
        },
    }
}

fn next_token<'a>(tokens: &mut Tokens<'a>) -> Result<Token<'a>, EvalError> {
    tokens.next().ok_or(EvalError::UnexpectedEndOfInput)
}

fn number(tokens: &mut Tokens<'_>) -> Result<f64, EvalError> {
    let token = next_token(tokens)?;

    match token.kind {
        TokenKind::Number => token.text.parse().map_err(|_| {
            EvalError::InvalidNumber {
                token: token.text.into(),
            }
        }),
        _ => Err(EvalError::InvalidNumber {
            token: token.text.into(),
        }),
    }
}

fn integer(tokens: &mut Tokens<'_>) -> Result<usize, EvalError> {
    let token = next_token(tokens)?;

    token.text.parse().map_err(|_| EvalError::InvalidInteger {
        token: token.text.into(),
    })
}

/// The reasons evaluating an expression can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("The expression ended before all operands were provided")]
    UnexpectedEndOfInput,
    #[error("Failed to interpret token \"{token}\"")]
    UnrecognizedToken { token: SmolStr },
    #[error("There is no matrix called \"{name}\"")]
    UnknownVariable { name: SmolStr },
    #[error("\"{token}\" isn't a number")]
    InvalidNumber { token: SmolStr },
    #[error("\"{token}\" isn't a non-negative integer")]
    InvalidInteger { token: SmolStr },
    #[error("An identity matrix can't have a size of {size}")]
    InvalidSize { size: usize },
    #[error("Cannot save matrix with name \"{name}\"")]
    InvalidName { name: SmolStr },
    #[error(
        "\"{operation}\" can't be applied to a {}x{} and a {}x{} matrix",
        .left.0, .left.1, .right.0, .right.1
    )]
    DimensionMismatch {
        operation: BinaryOperator,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error(
        "\"{operation}\" needs a square matrix, not a {}x{} one",
        .shape.0, .shape.1
    )]
    NotSquare {
        operation: &'static str,
        shape: (usize, usize),
    },
    #[error("No matrix was entered")]
    NoInput,
    #[error("Found \"{token}\" after the end of the expression")]
    TrailingInput { token: SmolStr },
}

impl EvalError {
    fn mismatch(
        operation: BinaryOperator,
        left: &Matrix,
        right: &Matrix,
    ) -> Self {
        EvalError::DimensionMismatch {
            operation,
            left: left.shape(),
            right: right.shape(),
        }
    }

    fn not_square(operation: &'static str, matrix: &Matrix) -> Self {
        EvalError::NotSquare {
            operation,
            shape: matrix.shape(),
        }
    }
}
