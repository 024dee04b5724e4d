//! Dense row-major matrices whose operations run through a [`Dispatcher`].
//!
//! [`Dispatcher`]: crate::Dispatcher

mod element;
mod ops;

pub use element::Element;

use crate::{ParmatErrorKind, Result};
use std::ops::Index;

/// A dense matrix stored row by row in one flat buffer
///
/// ```
/// use parmat::{Config, Dispatcher, Matrix};
///
/// let dispatcher = Dispatcher::new(Config::default().with_threads(2).with_limit(1)).unwrap();
///
/// let a = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
/// let b = Matrix::identity(2);
///
/// let sum = a.add(&b, &dispatcher).unwrap();
/// assert_eq!(&[2, 2, 3, 5], sum.as_slice());
///
/// let product = a.matmul(&a, &dispatcher).unwrap();
/// assert_eq!(&[7, 10, 15, 22], product.as_slice());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> Matrix<T> {
    /// a `rows` x `cols` matrix of zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// wrap a row-major buffer, which must hold exactly `rows * cols` elements
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(ParmatErrorKind::ShapeMismatch.into());
        }
        Ok(Self { rows, cols, data })
    }

    /// build a matrix from `f(row, col)`
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    /// the `n` x `n` identity
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |row, col| if row == col { T::one() } else { T::zero() })
    }

    /// a square matrix with `values` on its diagonal
    pub fn diagonal(values: &[T]) -> Self {
        let n = values.len();
        Self::from_fn(n, n, |row, col| if row == col { values[row] } else { T::zero() })
    }

    /// number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// whether the matrix has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// whether rows equal columns
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// element at `(row, col)`, if in bounds
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// the row-major buffer
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// take the row-major buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn ensure_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(ParmatErrorKind::ShapeMismatch.into());
        }
        Ok(())
    }

    fn ensure_square(&self) -> Result<()> {
        if !self.is_square() {
            return Err(ParmatErrorKind::NotSquare.into());
        }
        Ok(())
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.data[row * self.cols + col]
    }
}
