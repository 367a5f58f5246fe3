//! Elementary matrix arithmetic.
//!
//! Every operation writes into a caller-supplied destination. When the shapes
//! involved don't line up the operation does nothing at all, leaving the
//! destination exactly as it was. Callers that need to know whether anything
//! happened should check the shapes first (see [`Matrix::same_shape()`]).
//!
//! Rust won't let a destination alias one of its operands, so the operations
//! which may legitimately work in place have `*_in_place()` variants.

use crate::Matrix;

/// The `size x size` identity matrix.
pub fn identity(size: usize) -> Matrix { Matrix::identity(size) }

/// A `rows x columns` matrix full of zeroes.
pub fn zero(rows: usize, columns: usize) -> Matrix {
    Matrix::zeros(rows, columns)
}

/// `dst = a + b`.
pub fn add(dst: &mut Matrix, a: &Matrix, b: &Matrix) {
    if !a.same_shape(b) || !dst.same_shape(a) {
        log::trace!("add: {:?} + {:?} is a no-op", a.shape(), b.shape());
        return;
    }

    dst.for_each_mut(|row, column, value| {
        *value = a[(row, column)] + b[(row, column)];
    });
}

/// `a += b`.
pub fn add_in_place(a: &mut Matrix, b: &Matrix) {
    if !a.same_shape(b) {
        log::trace!("add: {:?} + {:?} is a no-op", a.shape(), b.shape());
        return;
    }

    a.for_each_mut(|row, column, value| *value += b[(row, column)]);
}

/// `dst = m * k`.
pub fn scale(dst: &mut Matrix, m: &Matrix, k: f64) {
    if !dst.same_shape(m) {
        return;
    }

    dst.for_each_mut(|row, column, value| *value = m[(row, column)] * k);
}

/// `m *= k`.
pub fn scale_in_place(m: &mut Matrix, k: f64) {
    m.for_each_mut(|_, _, value| *value *= k);
}

/// `dst = a * b`, the usual matrix product.
///
/// Requires `a.columns() == b.rows()` and `dst` to be `a.rows() x b.columns()`.
pub fn multiply(dst: &mut Matrix, a: &Matrix, b: &Matrix) {
    if a.columns() != b.rows() || dst.shape() != (a.rows(), b.columns()) {
        log::trace!("multiply: {:?} * {:?} is a no-op", a.shape(), b.shape());
        return;
    }

    dst.for_each_mut(|row, column, value| {
        let mut sum = 0.0;

        for i in 0..a.columns() {
            sum += a[(row, i)] * b[(i, column)];
        }

        *value = sum;
    });
}

/// `dst = transpose(m)`, where `dst` must be `m.columns() x m.rows()`.
pub fn transpose(dst: &mut Matrix, m: &Matrix) {
    if dst.shape() != (m.columns(), m.rows()) {
        return;
    }

    dst.for_each_mut(|row, column, value| *value = m[(column, row)]);
}

/// Transpose a square matrix by swapping each pair of entries mirrored across
/// the diagonal. Non-square matrices are left alone.
pub fn transpose_in_place(m: &mut Matrix) {
    if !m.is_square() {
        return;
    }

    let size = m.rows();

    for row in 0..size {
        for column in row + 1..size {
            let upper = m[(row, column)];
            m[(row, column)] = m[(column, row)];
            m[(column, row)] = upper;
        }
    }
}

/// Do `a` and `b` have the same shape, with every pair of entries differing by
/// strictly less than `tolerance`?
pub fn equals(a: &Matrix, b: &Matrix, tolerance: f64) -> bool {
    a.same_shape(b)
        && a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .all(|(l, r)| (l - r).abs() < tolerance)
}
