//! The dense matrix type everything else operates on.

use approx::{AbsDiffEq, RelativeEq};
use nalgebra::DMatrix;
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::{Index, IndexMut},
};

/// A dense `rows x columns` matrix of `f64`s laid out sequentially in memory,
/// one row after another.
///
/// The shape is fixed when the matrix is created and both dimensions are
/// always at least 1.
#[derive(Clone, PartialEq)]
pub struct Matrix {
    cells: Box<[f64]>,
    rows: usize,
    columns: usize,
}

impl Matrix {
    /// Create a new [`Matrix`] by invoking some `fn(row, column) -> f64`
    /// function for each cell.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero, or if `rows * columns` overflows a
    /// `usize`.
    pub fn init<F>(rows: usize, columns: usize, mut get_cell: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        use std::convert::Infallible;

        match Matrix::try_init::<_, Infallible>(rows, columns, |row, column| {
            Ok(get_cell(row, column))
        }) {
            Ok(matrix) => matrix,
            Err(never) => match never {},
        }
    }

    /// A version of [`Matrix::init()`] which lets you initialize a matrix using
    /// a function which may fail.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero, or if `rows * columns` overflows a
    /// `usize`.
    pub fn try_init<F, E>(
        rows: usize,
        columns: usize,
        mut get_cell: F,
    ) -> Result<Self, E>
    where
        F: FnMut(usize, usize) -> Result<f64, E>,
    {
        assert!(
            rows > 0 && columns > 0,
            "A matrix must have at least one row and one column, not {}x{}",
            rows,
            columns
        );

        let len = match rows.checked_mul(columns) {
            Some(len) => len,
            None => panic!("A {}x{} matrix is too big", rows, columns),
        };
        let mut cells = Vec::with_capacity(len);

        for row in 0..rows {
            for column in 0..columns {
                cells.push(get_cell(row, column)?);
            }
        }

        Ok(Matrix {
            cells: cells.into_boxed_slice(),
            rows,
            columns,
        })
    }

    /// A `rows x columns` matrix where every entry is `0`.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Matrix::init(rows, columns, |_, _| 0.0)
    }

    /// The `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        Matrix::init(size, size, |row, column| {
            if row == column {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Create a matrix from its entries in row-major order.
    ///
    /// Returns `None` if the shape is empty or doesn't match the number of
    /// entries.
    pub fn from_row_slice(
        rows: usize,
        columns: usize,
        entries: &[f64],
    ) -> Option<Self> {
        let len = rows.checked_mul(columns)?;

        if rows == 0 || columns == 0 || entries.len() != len {
            return None;
        }

        Some(Matrix {
            cells: entries.into(),
            rows,
            columns,
        })
    }

    /// Create a matrix from a list of rows, returning `None` when there are no
    /// rows, the rows are empty, or the rows have different lengths.
    pub fn from_rows<R>(rows: &[R]) -> Option<Self>
    where
        R: AsRef<[f64]>,
    {
        let columns = rows.first()?.as_ref().len();

        if rows.iter().any(|row| row.as_ref().len() != columns) {
            return None;
        }

        let entries: Vec<f64> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();

        Matrix::from_row_slice(rows.len(), columns, &entries)
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn columns(&self) -> usize { self.columns }

    /// The `(rows, columns)` pair.
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }

    pub fn is_square(&self) -> bool { self.rows == self.columns }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.shape() == other.shape()
    }

    pub fn is_zero(&self) -> bool { self.cells.iter().all(|&v| v == 0.0) }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && self.cells().all(|(row, column, &value)| {
                value == if row == column { 1.0 } else { 0.0 }
            })
    }

    /// The entries in row-major order.
    pub fn as_slice(&self) -> &[f64] { &self.cells }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.cells.chunks_exact(self.columns)
    }

    fn index_of(&self, row: usize, column: usize) -> Option<usize> {
        if row < self.rows && column < self.columns {
            Some(row * self.columns + column)
        } else {
            None
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.index_of(row, column).map(|ix| self.cells[ix])
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut f64> {
        let ix = self.index_of(row, column)?;
        self.cells.get_mut(ix)
    }

    /// Iterate over every `(row, column, &value)` triple.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &f64)> + '_ {
        let columns = self.columns;

        self.cells
            .iter()
            .enumerate()
            .map(move |(ix, value)| (ix / columns, ix % columns, value))
    }

    /// Evaluate some function, `fn(row, column, &mut item)` for each cell in
    /// the matrix.
    pub fn for_each_mut<F>(&mut self, mut func: F)
    where
        F: FnMut(usize, usize, &mut f64),
    {
        let columns = self.columns;

        self.cells
            .iter_mut()
            .enumerate()
            .for_each(|(ix, value)| func(ix / columns, ix % columns, value));
    }

    /// A copy of this matrix with row `skip_row` and column `skip_column`
    /// removed, or `None` if that would leave nothing behind.
    pub fn submatrix(
        &self,
        skip_row: usize,
        skip_column: usize,
    ) -> Option<Self> {
        if self.rows < 2 || self.columns < 2 {
            return None;
        }

        Some(Matrix::init(self.rows - 1, self.columns - 1, |row, column| {
            let row = if row >= skip_row { row + 1 } else { row };
            let column = if column >= skip_column {
                column + 1
            } else {
                column
            };
            self[(row, column)]
        }))
    }

    pub fn transposed(&self) -> Self {
        Matrix::init(self.columns, self.rows, |row, column| self[(column, row)])
    }
}

impl Debug for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_rows()).finish()
    }
}

/// One row per line, entries separated by a single space.
impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                Display::fmt(value, f)?;
            }
        }

        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows, "Row index out of bounds");
        assert!(column < self.columns, "Column index out of bounds");

        &self.cells[row * self.columns + column]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(
        &mut self,
        (row, column): (usize, usize),
    ) -> &mut Self::Output {
        assert!(row < self.rows, "Row index out of bounds");
        assert!(column < self.columns, "Column index out of bounds");

        &mut self.cells[row * self.columns + column]
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for Matrix {
    fn from(other: [[f64; C]; R]) -> Self {
        Matrix::init(R, C, |row, column| other[row][column])
    }
}

impl<const R: usize, const C: usize> PartialEq<[[f64; C]; R]> for Matrix {
    fn eq(&self, other: &[[f64; C]; R]) -> bool {
        self.rows == R
            && self.columns == C
            && self
                .cells()
                .all(|(row, column, value)| *value == other[row][column])
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 { f64::default_epsilon() }

    fn abs_diff_eq(&self, other: &Matrix, epsilon: f64) -> bool {
        self.same_shape(other)
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(l, r)| l.abs_diff_eq(r, epsilon))
    }
}

impl RelativeEq for Matrix {
    fn default_max_relative() -> f64 { f64::default_max_relative() }

    fn relative_eq(
        &self,
        other: &Matrix,
        epsilon: f64,
        max_relative: f64,
    ) -> bool {
        self.same_shape(other)
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(l, r)| l.relative_eq(r, epsilon, max_relative))
    }
}

/// # Panics
///
/// Panics if the [`DMatrix`] has no rows or no columns.
impl From<&DMatrix<f64>> for Matrix {
    fn from(other: &DMatrix<f64>) -> Self {
        Matrix::init(other.nrows(), other.ncols(), |row, column| {
            other[(row, column)]
        })
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(other: &Matrix) -> Self {
        DMatrix::from_row_slice(other.rows, other.columns, &other.cells)
    }
}
