use crate::backend::ComputeBackend;
use crate::element::Element;
use crate::error::{Result, TensorError};
use crate::shape::MatShape;

/// A dense 2-D matrix with row-major storage.
///
/// Rows start `row_stride` elements apart. A freshly constructed matrix is
/// contiguous (`row_stride == cols`); [`Matrix::with_row_stride`] accepts
/// padded rows, and the padding is never read by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    shape: MatShape,
    row_stride: usize,
}

/// A borrowed, read-only view of a matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    shape: MatShape,
    row_stride: usize,
}

impl<T: Element> Matrix<T> {
    /// Create a new contiguous matrix from row-major data.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<T>, shape: MatShape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Matrix {
            data,
            row_stride: shape.cols(),
            shape,
        }
    }

    /// Fallible variant of [`Matrix::new`].
    pub fn try_new(data: Vec<T>, shape: MatShape) -> Result<Self> {
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![shape.numel()],
                got: vec![data.len()],
            });
        }
        Ok(Matrix {
            data,
            row_stride: shape.cols(),
            shape,
        })
    }

    /// Create a matrix whose rows start `row_stride` elements apart.
    ///
    /// `data` must hold at least `(rows - 1) * row_stride + cols` elements.
    pub fn with_row_stride(data: Vec<T>, shape: MatShape, row_stride: usize) -> Result<Self> {
        if !shape.is_valid_row_stride(row_stride) {
            return Err(TensorError::Other(format!(
                "row stride {} is smaller than column count {}",
                row_stride,
                shape.cols()
            )));
        }
        let required = shape.required_len(row_stride);
        if data.len() < required {
            return Err(TensorError::ShapeMismatch {
                expected: vec![required],
                got: vec![data.len()],
            });
        }
        Ok(Matrix {
            data,
            shape,
            row_stride,
        })
    }

    /// Build a matrix from a list of equally sized rows.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![n_cols],
                    got: vec![row.len()],
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix::new(data, MatShape::new(n_rows, n_cols)))
    }

    /// Create a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn(shape: MatShape, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape.numel());
        for i in 0..shape.rows() {
            for j in 0..shape.cols() {
                data.push(f(i, j));
            }
        }
        Matrix::new(data, shape)
    }

    /// Create a zero-filled matrix with the given shape.
    pub fn zeros(shape: MatShape) -> Self {
        Matrix::new(vec![T::zero(); shape.numel()], shape)
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Matrix::from_fn(MatShape::new(n, n), |i, j| {
            if i == j {
                T::one()
            } else {
                T::zero()
            }
        })
    }

    /// Returns the matrix shape.
    pub fn shape(&self) -> MatShape {
        self.shape
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    /// Distance in elements between the starts of consecutive rows.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns true if rows are packed without padding.
    pub fn is_contiguous(&self) -> bool {
        self.row_stride == self.shape.cols()
    }

    /// Returns the backing buffer, including any row padding.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the backing buffer mutably, including any row padding.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the matrix and return its backing buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns the element at `(row, col)`, or `None` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows() && col < self.cols() {
            Some(self.data[self.shape.offset(row, col, self.row_stride)])
        } else {
            None
        }
    }

    /// Returns row `i` without its padding.
    ///
    /// # Panics
    /// Panics if `i >= rows()`.
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.row_stride;
        &self.data[start..start + self.cols()]
    }

    /// Copies the logical contents into a contiguous row-major vector.
    pub fn to_contiguous(&self) -> Vec<T> {
        if self.is_contiguous() {
            return self.data[..self.shape.numel()].to_vec();
        }
        let mut out = Vec::with_capacity(self.shape.numel());
        for i in 0..self.rows() {
            out.extend_from_slice(self.row(i));
        }
        out
    }

    /// Copies the logical contents into nested row vectors.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows()).map(|i| self.row(i).to_vec()).collect()
    }

    /// Borrow the matrix as a read-only view.
    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView {
            data: &self.data,
            shape: self.shape,
            row_stride: self.row_stride,
        }
    }
}

impl Matrix<f32> {
    /// Matrix multiplication using the given backend.
    ///
    /// self is [m, k], other is [k, n], result is [m, n].
    pub fn matmul(&self, other: &Matrix<f32>, backend: &dyn ComputeBackend) -> Result<Matrix<f32>> {
        let m = self.rows();
        let k = self.cols();
        let k2 = other.rows();
        let n = other.cols();

        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }

        let a = self.to_contiguous();
        let b = other.to_contiguous();
        let result_data = backend.matmul(&a, &b, m, k, n)?;
        Matrix::try_new(result_data, MatShape::new(m, n))
    }
}

impl<'a, T: Element> MatrixView<'a, T> {
    /// Create a contiguous view over row-major `data`.
    pub fn new(data: &'a [T], shape: MatShape) -> Result<Self> {
        Self::with_row_stride(data, shape, shape.cols())
    }

    /// Create a view whose rows start `row_stride` elements apart.
    pub fn with_row_stride(data: &'a [T], shape: MatShape, row_stride: usize) -> Result<Self> {
        let required = shape.required_len(row_stride);
        if !shape.is_valid_row_stride(row_stride) || data.len() < required {
            return Err(TensorError::ShapeMismatch {
                expected: vec![required],
                got: vec![data.len()],
            });
        }
        Ok(MatrixView {
            data,
            shape,
            row_stride,
        })
    }

    pub fn shape(&self) -> MatShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// The in-bounds part of row `i`, starting at column `col_start` and
    /// covering at most `len` columns.
    ///
    /// Returns an empty slice when the window lies entirely outside the row
    /// or `i` is past the last row.
    #[inline]
    pub fn row_segment(&self, i: usize, col_start: usize, len: usize) -> &'a [T] {
        if i >= self.rows() || col_start >= self.cols() {
            return &[];
        }
        let col_end = (col_start + len).min(self.cols());
        let base = i * self.row_stride;
        let data: &'a [T] = self.data;
        &data[base + col_start..base + col_end]
    }
}
