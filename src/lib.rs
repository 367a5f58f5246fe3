//! A small matrix calculator.
//!
//! Expressions can be written in the usual infix notation (`x = a + b * c`)
//! or in prefix notation (`= x + a * b c`). Infix expressions are rewritten
//! as prefix with [`to_prefix()`] and then [`evaluate()`]d against a store of
//! named matrices, [`Variables`].
//!
//! ```rust
//! use matcalc::{Matrix, NoInput, Session};
//!
//! let mut session = Session::new();
//! session
//!     .variables_mut()
//!     .set("a", Matrix::from([[1.0, 2.0], [3.0, 4.0]]));
//!
//! let got = session.evaluate("b = t a * a", &mut NoInput).unwrap();
//!
//! assert_eq!(got, [[10.0, 14.0], [14.0, 20.0]]);
//! assert_eq!(session.variables().get("b"), Some(&got));
//! ```
//!
//! The numeric building blocks live in [`kernel`] (element-wise arithmetic,
//! products and transposes) and [`cofactor`] (minors, cofactors,
//! determinants and inverses).

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod cofactor;
mod eval;
pub mod infix;
pub mod kernel;
pub mod lexer;
mod matrix;
mod session;
mod store;

pub use cofactor::Decomposition;
pub use eval::{evaluate, EvalError, InputSource, NoInput};
pub use infix::{to_prefix, ParseError};
pub use matrix::Matrix;
pub use session::{Notation, Session, UnknownNotation};
pub use store::{is_valid_name, Variables};
