use super::{Element, Matrix};
use crate::thread_pool::ThreadPool;
use crate::{Dispatcher, ParmatErrorKind, Result};

// Every operation below writes through `Dispatcher::dispatch_mut` or reads
// through `dispatch_all` / `dispatch_with_config`, one flat element index
// per item.
// In-place variants borrow `self` mutably, so the destination can never
// alias an operand.

impl<T: Element> Matrix<T> {
    /// elementwise sum
    pub fn add<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.zip_with(other, dispatcher, |a, b| a + b)
    }

    /// elementwise difference
    pub fn sub<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.zip_with(other, dispatcher, |a, b| a - b)
    }

    /// elementwise (Hadamard) product
    pub fn hadamard<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.zip_with(other, dispatcher, |a, b| a * b)
    }

    /// add `other` into `self`
    pub fn add_assign<P: ThreadPool>(&mut self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<()> {
        self.zip_assign(other, dispatcher, |a, b| a + b)
    }

    /// subtract `other` from `self`
    pub fn sub_assign<P: ThreadPool>(&mut self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<()> {
        self.zip_assign(other, dispatcher, |a, b| a - b)
    }

    /// every element multiplied by `factor`
    pub fn scale<P: ThreadPool>(&self, factor: T, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.map(dispatcher, |a| a * factor)
    }

    /// every element raised to `exp`; `exp == 0` gives all ones
    pub fn pow_elem<P: ThreadPool>(&self, exp: u32, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.map(dispatcher, |a| {
            let mut value = T::one();
            for _ in 0..exp {
                value = value * a;
            }
            value
        })
    }

    /// matrix product, `self.cols()` must equal `other.rows()`
    pub fn matmul<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<Self> {
        if self.cols != other.rows {
            return Err(ParmatErrorKind::ShapeMismatch.into());
        }

        let (inner, width) = (self.cols, other.cols);
        let (lhs, rhs) = (&self.data, &other.data);
        let mut out = Matrix::new(self.rows, width);
        dispatcher.dispatch_mut(&mut out.data, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                let (row, col) = ((start + offset) / width, (start + offset) % width);
                let mut sum = T::zero();
                for k in 0..inner {
                    sum = sum + lhs[row * inner + k] * rhs[k * width + col];
                }
                *value = sum;
            }
        })?;
        Ok(out)
    }

    /// `self` multiplied by itself `exp` times; `exp == 0` gives the identity
    pub fn pow<P: ThreadPool>(&self, exp: u32, dispatcher: &Dispatcher<P>) -> Result<Self> {
        self.ensure_square()?;

        let mut result = Matrix::identity(self.rows);
        let mut base = self.clone();
        let mut exp = exp;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.matmul(&base, dispatcher)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.matmul(&base, dispatcher)?;
            }
        }
        Ok(result)
    }

    /// rows become columns
    pub fn transpose<P: ThreadPool>(&self, dispatcher: &Dispatcher<P>) -> Result<Self> {
        let (rows, cols) = (self.rows, self.cols);
        let data = &self.data;
        let mut out = Matrix::new(cols, rows);
        dispatcher.dispatch_mut(&mut out.data, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                // (row, col) of the transposed matrix
                let (row, col) = ((start + offset) / rows, (start + offset) % rows);
                *value = data[col * cols + row];
            }
        })?;
        Ok(out)
    }

    /// Equal shapes and every pair of elements equal within the
    /// dispatcher's epsilon.
    ///
    /// Matrices of different shapes are simply unequal, so unlike
    /// [`all_lt`](Self::all_lt) a shape mismatch gives `Ok(false)`.
    pub fn approx_eq<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<bool> {
        if self.shape() != other.shape() {
            return Ok(false);
        }

        let (lhs, rhs) = (&self.data, &other.data);
        let chunks = dispatcher.dispatch_with_config(self.len(), |config, start, len| {
            (start..start + len).all(|i| lhs[i].approx_eq(rhs[i], config.epsilon))
        })?;
        Ok(chunks.into_iter().all(|holds| holds))
    }

    /// Every element strictly less than its counterpart.
    ///
    /// Fails with `ShapeMismatch` if the shapes differ.
    pub fn all_lt<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<bool> {
        self.all_pairs(other, dispatcher, |a, b| a < b)
    }

    /// Every element strictly greater than its counterpart.
    ///
    /// Fails with `ShapeMismatch` if the shapes differ.
    pub fn all_gt<P: ThreadPool>(&self, other: &Self, dispatcher: &Dispatcher<P>) -> Result<bool> {
        self.all_pairs(other, dispatcher, |a, b| a > b)
    }

    /// Square and equal to its transpose within the dispatcher's epsilon.
    /// A matrix that is not square is not symmetric, which is `Ok(false)`.
    pub fn is_symmetric<P: ThreadPool>(&self, dispatcher: &Dispatcher<P>) -> Result<bool> {
        if !self.is_square() {
            return Ok(false);
        }

        let n = self.rows;
        let data = &self.data;
        let chunks = dispatcher.dispatch_with_config(self.len(), |config, start, len| {
            (start..start + len).all(|i| {
                let (row, col) = (i / n, i % n);
                data[i].approx_eq(data[col * n + row], config.epsilon)
            })
        })?;
        Ok(chunks.into_iter().all(|holds| holds))
    }

    fn map<P, F>(&self, dispatcher: &Dispatcher<P>, op: F) -> Result<Self>
    where
        P: ThreadPool,
        F: Fn(T) -> T + Sync,
    {
        let data = &self.data;
        let mut out = Matrix::new(self.rows, self.cols);
        dispatcher.dispatch_mut(&mut out.data, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                *value = op(data[start + offset]);
            }
        })?;
        Ok(out)
    }

    fn zip_with<P, F>(&self, other: &Self, dispatcher: &Dispatcher<P>, op: F) -> Result<Self>
    where
        P: ThreadPool,
        F: Fn(T, T) -> T + Sync,
    {
        self.ensure_same_shape(other)?;

        let (lhs, rhs) = (&self.data, &other.data);
        let mut out = Matrix::new(self.rows, self.cols);
        dispatcher.dispatch_mut(&mut out.data, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                let i = start + offset;
                *value = op(lhs[i], rhs[i]);
            }
        })?;
        Ok(out)
    }

    fn zip_assign<P, F>(&mut self, other: &Self, dispatcher: &Dispatcher<P>, op: F) -> Result<()>
    where
        P: ThreadPool,
        F: Fn(T, T) -> T + Sync,
    {
        self.ensure_same_shape(other)?;

        let rhs = &other.data;
        dispatcher.dispatch_mut(&mut self.data, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                *value = op(*value, rhs[start + offset]);
            }
        })
    }

    fn all_pairs<P, F>(&self, other: &Self, dispatcher: &Dispatcher<P>, test: F) -> Result<bool>
    where
        P: ThreadPool,
        F: Fn(T, T) -> bool + Sync,
    {
        self.ensure_same_shape(other)?;

        let (lhs, rhs) = (&self.data, &other.data);
        dispatcher.dispatch_all(self.len(), |start, len| {
            (start..start + len).all(|i| test(lhs[i], rhs[i]))
        })
    }
}
