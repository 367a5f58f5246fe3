//! Minors, cofactors, determinants and inverses via Laplace expansion.
//!
//! The determinant of an `n x n` matrix is found by expanding along its first
//! row, recursing into `(n-1) x (n-1)` submatrices until only `1 x 1` matrices
//! remain. That costs `O(n!)` and there is no pivoting, so these routines are
//! only meant for the small matrices people type in by hand.

use crate::{kernel, Matrix};

/// Fill `dst` with the matrix of minors for `m`, where `dst[(r, c)]` is the
/// determinant of `m` with row `r` and column `c` removed.
///
/// Does nothing unless `m` is square and `dst` has the same shape.
pub fn minors(dst: &mut Matrix, m: &Matrix) {
    if !m.is_square() || !dst.same_shape(m) {
        return;
    }

    if m.rows() == 1 {
        // removing the only row and column leaves the empty matrix, whose
        // determinant is 1
        dst[(0, 0)] = 1.0;
        return;
    }

    dst.for_each_mut(|row, column, value| {
        if let Some(det) = m
            .submatrix(row, column)
            .and_then(|sub| determinant(&sub, None))
        {
            *value = det;
        }
    });
}

/// Turn a matrix of minors into a matrix of cofactors by flipping the sign of
/// every entry whose row and column add up to an odd number.
pub fn cofactors(dst: &mut Matrix, minors: &Matrix) {
    if !dst.same_shape(minors) {
        return;
    }

    dst.for_each_mut(|row, column, value| {
        *value = minors[(row, column)] * sign(row, column);
    });
}

fn sign(row: usize, column: usize) -> f64 {
    if (row + column) % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Calculate the determinant of a square matrix.
///
/// If the matrix of cofactors is already known it can be passed in to save
/// recomputing it.
///
/// Returns `None` if `m` isn't square or `cofactors` has the wrong shape. A
/// `Some(0.0)` always means the matrix really is singular.
pub fn determinant(m: &Matrix, cofactors: Option<&Matrix>) -> Option<f64> {
    if !m.is_square() {
        return None;
    }

    if m.rows() == 1 {
        return Some(m[(0, 0)]);
    }

    let det = match cofactors {
        Some(cofactors) if cofactors.same_shape(m) => (0..m.columns())
            .map(|column| m[(0, column)] * cofactors[(0, column)])
            .sum(),
        Some(_) => return None,
        None => {
            let mut det = 0.0;

            // only the first row of cofactors is needed for the expansion
            for column in 0..m.columns() {
                let sub = m.submatrix(0, column)?;
                let cofactor = sign(0, column) * determinant(&sub, None)?;
                det += m[(0, column)] * cofactor;
            }

            det
        },
    };

    Some(det)
}

/// Invert `m` using the adjugate method, writing the result to `dst` and
/// returning the determinant.
///
/// The matrices of minors and cofactors are computed along the way. Pass in
/// `minors_out` and `cofactors_out` to keep them.
///
/// Returns `None` without touching anything if `m` isn't square or one of the
/// other matrices has a different shape. A singular matrix isn't treated
/// specially: the returned determinant is `0` and `dst` ends up full of
/// infinities and NaNs, so check the determinant before trusting `dst`.
pub fn invert(
    dst: &mut Matrix,
    m: &Matrix,
    minors_out: Option<&mut Matrix>,
    cofactors_out: Option<&mut Matrix>,
) -> Option<f64> {
    let shapes_match = m.is_square()
        && dst.same_shape(m)
        && minors_out.as_ref().map_or(true, |buf| buf.same_shape(m))
        && cofactors_out.as_ref().map_or(true, |buf| buf.same_shape(m));

    if !shapes_match {
        return None;
    }

    let size = m.rows();

    let mut scratch_minors;
    let minors_buf = match minors_out {
        Some(buf) => buf,
        None => {
            scratch_minors = Matrix::zeros(size, size);
            &mut scratch_minors
        },
    };

    let mut scratch_cofactors;
    let cofactors_buf = match cofactors_out {
        Some(buf) => buf,
        None => {
            scratch_cofactors = Matrix::zeros(size, size);
            &mut scratch_cofactors
        },
    };

    minors(minors_buf, m);
    cofactors(cofactors_buf, minors_buf);
    let det = determinant(m, Some(&*cofactors_buf))?;

    // the adjugate is the transposed matrix of cofactors
    kernel::transpose(dst, cofactors_buf);
    kernel::scale_in_place(dst, 1.0 / det);

    Some(det)
}

/// Everything the Laplace expansion of a square matrix produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub minors: Matrix,
    pub cofactors: Matrix,
    pub determinant: f64,
}

impl Decomposition {
    /// Compute the minors, cofactors and determinant of `m` in one go, or
    /// `None` if `m` isn't square.
    pub fn of(m: &Matrix) -> Option<Self> {
        if !m.is_square() {
            return None;
        }

        let size = m.rows();
        let mut minors_matrix = Matrix::zeros(size, size);
        let mut cofactors_matrix = Matrix::zeros(size, size);

        minors(&mut minors_matrix, m);
        cofactors(&mut cofactors_matrix, &minors_matrix);
        let determinant = determinant(m, Some(&cofactors_matrix))?;

        Some(Decomposition {
            minors: minors_matrix,
            cofactors: cofactors_matrix,
            determinant,
        })
    }

    pub fn is_singular(&self) -> bool { self.determinant == 0.0 }

    /// The transpose of the matrix of cofactors.
    pub fn adjugate(&self) -> Matrix { self.cofactors.transposed() }

    /// The inverse, `adjugate / determinant`. See [`invert()`] for what
    /// happens with a singular matrix.
    pub fn inverse(&self) -> Matrix {
        let mut inverse = self.adjugate();
        kernel::scale_in_place(&mut inverse, 1.0 / self.determinant);
        inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;

    fn example_3x3() -> Matrix {
        Matrix::from([[3.0, 0.0, 2.0], [2.0, 0.0, -2.0], [0.0, 1.0, 1.0]])
    }

    fn example_4x4() -> Matrix {
        Matrix::from([
            [4.0, 3.0, 2.0, 1.0],
            [0.5, -1.0, 7.0, 2.0],
            [3.0, 3.0, -2.0, 0.25],
            [1.0, 0.0, 6.0, 5.0],
        ])
    }

    fn product(a: &Matrix, b: &Matrix) -> Matrix {
        let mut dst = Matrix::zeros(a.rows(), b.columns());
        kernel::multiply(&mut dst, a, b);
        dst
    }

    #[test]
    fn determinant_of_a_1x1_is_its_only_entry() {
        assert_eq!(determinant(&Matrix::from([[-7.5]]), None), Some(-7.5));
    }

    #[test]
    fn determinant_of_2x2() {
        let m = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);

        assert_eq!(determinant(&m, None), Some(-2.0));
    }

    #[test]
    fn determinant_of_identity_is_one() {
        for size in 1..=6 {
            assert_eq!(
                determinant(&Matrix::identity(size), None),
                Some(1.0),
                "identity({})",
                size
            );
        }
    }

    #[test]
    fn non_square_matrices_have_no_determinant() {
        let m = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        assert_eq!(determinant(&m, None), None);
    }

    #[test]
    fn a_singular_matrix_has_a_zero_determinant() {
        let m = Matrix::from([[1.0, 2.0], [2.0, 4.0]]);

        assert_eq!(determinant(&m, None), Some(0.0));
    }

    #[test]
    fn cofactors_with_the_wrong_shape_are_rejected() {
        let m = example_3x3();
        let cofactors = Matrix::zeros(2, 2);

        assert_eq!(determinant(&m, Some(&cofactors)), None);
    }

    #[test]
    fn minors_and_cofactors_of_a_known_matrix() {
        let m = example_3x3();
        let mut minors_matrix = Matrix::zeros(3, 3);
        let mut cofactors_matrix = Matrix::zeros(3, 3);

        minors(&mut minors_matrix, &m);
        cofactors(&mut cofactors_matrix, &minors_matrix);

        assert_eq!(
            minors_matrix,
            [[2.0, 2.0, 2.0], [-2.0, 3.0, 3.0], [0.0, -10.0, 0.0]]
        );
        assert_eq!(
            cofactors_matrix,
            [[2.0, -2.0, 2.0], [2.0, 3.0, -3.0], [0.0, 10.0, 0.0]]
        );
        assert_eq!(determinant(&m, Some(&cofactors_matrix)), Some(10.0));
        assert_eq!(determinant(&m, None), Some(10.0));
    }

    #[test]
    fn minors_of_a_non_square_matrix_is_a_no_op() {
        let m = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut dst = Matrix::from([[9.0, 9.0, 9.0], [9.0, 9.0, 9.0]]);

        minors(&mut dst, &m);

        assert_eq!(dst, [[9.0, 9.0, 9.0], [9.0, 9.0, 9.0]]);
    }

    #[test]
    fn invert_a_known_matrix() {
        let m = example_3x3();
        let mut inverse = Matrix::zeros(3, 3);
        let mut minors_matrix = Matrix::zeros(3, 3);
        let mut cofactors_matrix = Matrix::zeros(3, 3);

        let det = invert(
            &mut inverse,
            &m,
            Some(&mut minors_matrix),
            Some(&mut cofactors_matrix),
        );

        assert_eq!(det, Some(10.0));
        assert_abs_diff_eq!(
            inverse,
            Matrix::from([[0.2, 0.2, 0.0], [-0.2, 0.3, 1.0], [0.2, -0.3, 0.0]]),
            epsilon = 1e-12
        );
        // the caller's buffers are left holding the minors and cofactors, not
        // the adjugate
        assert_eq!(cofactors_matrix[(0, 1)], -2.0);
        assert_eq!(minors_matrix[(2, 1)], -10.0);
    }

    #[test]
    fn inverse_times_original_is_identity() {
        for m in vec![example_3x3(), example_4x4(), Matrix::from([[4.0]])] {
            let mut inverse = Matrix::zeros(m.rows(), m.columns());

            let det = invert(&mut inverse, &m, None, None).unwrap();
            assert_ne!(det, 0.0);

            let got = product(&inverse, &m);
            assert!(
                kernel::equals(&got, &Matrix::identity(m.rows()), 1e-9),
                "{:?} * {:?} = {:?}",
                inverse,
                m,
                got
            );
        }
    }

    #[test]
    fn inverse_of_a_1x1() {
        let mut inverse = Matrix::zeros(1, 1);

        let det = invert(&mut inverse, &Matrix::from([[4.0]]), None, None);

        assert_eq!(det, Some(4.0));
        assert_eq!(inverse, [[0.25]]);
    }

    #[test]
    fn inverting_a_non_square_matrix_does_nothing() {
        let m = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut dst = Matrix::from([[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);
        let original = dst.clone();

        assert_eq!(invert(&mut dst, &m, None, None), None);
        assert_eq!(dst, original);
    }

    #[test]
    fn inverting_into_the_wrong_shape_does_nothing() {
        let m = example_3x3();
        let mut dst = Matrix::zeros(2, 2);
        let mut minors_matrix = Matrix::zeros(4, 4);

        assert_eq!(invert(&mut dst, &m, None, None), None);
        let mut dst = Matrix::zeros(3, 3);
        assert_eq!(invert(&mut dst, &m, Some(&mut minors_matrix), None), None);
        assert!(dst.is_zero());
    }

    #[test]
    fn inverting_a_singular_matrix_gives_non_finite_entries() {
        let m = Matrix::from([[1.0, 2.0], [2.0, 4.0]]);
        let mut dst = Matrix::zeros(2, 2);

        let det = invert(&mut dst, &m, None, None);

        assert_eq!(det, Some(0.0));
        assert!(dst.as_slice().iter().all(|value| !value.is_finite()));
    }

    #[test]
    fn decomposition_matches_the_individual_operations() {
        let m = example_4x4();

        let decomposition = Decomposition::of(&m).unwrap();

        let mut inverse = Matrix::zeros(4, 4);
        let det = invert(&mut inverse, &m, None, None).unwrap();
        assert_eq!(decomposition.determinant, det);
        assert_eq!(decomposition.inverse(), inverse);
        assert!(!decomposition.is_singular());
        assert_eq!(
            decomposition.adjugate(),
            decomposition.cofactors.transposed()
        );
        assert!(Decomposition::of(&Matrix::zeros(2, 3)).is_none());
    }

    #[test]
    fn agrees_with_nalgebra() {
        let m = Matrix::from([
            [2.0, -1.0, 0.0, 3.0, 1.0],
            [1.0, 4.0, -2.0, 0.5, 0.0],
            [0.0, 3.0, 5.0, -1.0, 2.0],
            [7.0, 0.0, 1.0, 2.0, -3.0],
            [1.0, 1.0, 1.0, 1.0, 6.0],
        ]);
        let reference = DMatrix::from(&m);

        let det = determinant(&m, None).unwrap();
        assert_abs_diff_eq!(det, reference.determinant(), epsilon = 1e-9);

        let mut inverse = Matrix::zeros(5, 5);
        invert(&mut inverse, &m, None, None).unwrap();
        let reference_inverse = reference.try_inverse().unwrap();
        assert_abs_diff_eq!(
            inverse,
            Matrix::from(&reference_inverse),
            epsilon = 1e-9
        );
    }
}
