use std::fmt;

/// The logical shape of a 2-D matrix: `rows x cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatShape {
    rows: usize,
    cols: usize,
}

impl MatShape {
    /// Create a new shape with the given number of rows and columns.
    pub fn new(rows: usize, cols: usize) -> Self {
        MatShape { rows, cols }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements (`rows * cols`), saturating at `usize::MAX`.
    pub fn numel(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Checks whether `row_stride` describes a valid row-major layout for
    /// this shape, i.e. rows do not overlap.
    pub fn is_valid_row_stride(&self, row_stride: usize) -> bool {
        row_stride >= self.cols
    }

    /// Minimum buffer length needed to back this shape with `row_stride`
    /// elements between consecutive row starts. Saturates at `usize::MAX`.
    pub fn required_len(&self, row_stride: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.rows - 1)
            .saturating_mul(row_stride)
            .saturating_add(self.cols)
    }

    /// Linear index of `(row, col)` under the given row stride.
    #[inline]
    pub fn offset(&self, row: usize, col: usize, row_stride: usize) -> usize {
        row * row_stride + col
    }

    /// The dimensions as a vector, in `[rows, cols]` order.
    pub fn dims(&self) -> Vec<usize> {
        vec![self.rows, self.cols]
    }
}

impl fmt::Display for MatShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for MatShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        MatShape::new(rows, cols)
    }
}
