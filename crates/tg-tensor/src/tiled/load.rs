use crate::element::Element;
use crate::matrix::MatrixView;

/// A dense row-major scratch block holding one loaded sub-block of A or B.
///
/// The backing allocation is sized for the largest window once and reused
/// across loads.
#[derive(Debug, Clone)]
pub struct TileBuffer<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> TileBuffer<T> {
    /// Allocate a buffer able to hold up to `max_rows x max_cols` cells.
    pub fn with_capacity(max_rows: usize, max_cols: usize) -> Self {
        TileBuffer {
            data: vec![T::zero(); max_rows * max_cols],
            rows: 0,
            cols: 0,
        }
    }

    /// Rows of the most recently loaded window.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns of the most recently loaded window.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row `i` of the loaded window.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// The loaded window as a flat row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.rows * self.cols]
    }

    /// Masked gather of the `rows x cols` window of `src` whose top-left
    /// corner is `(row_start, col_start)`.
    ///
    /// Cells inside `src` are copied; cells past its last row or column are
    /// set to `fill`. Each source row is read through a slice clipped to
    /// `min(col_start + cols, src.cols())`, so no element outside the
    /// source extent is ever addressed.
    ///
    /// # Panics
    /// Panics if the window exceeds the capacity given at construction.
    pub fn load(
        &mut self,
        src: &MatrixView<'_, T>,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
        fill: T,
    ) {
        assert!(
            rows * cols <= self.data.len(),
            "tile window {}x{} exceeds buffer capacity {}",
            rows,
            cols,
            self.data.len()
        );
        self.rows = rows;
        self.cols = cols;

        for r in 0..rows {
            let dst = &mut self.data[r * cols..(r + 1) * cols];
            let seg = src.row_segment(row_start + r, col_start, cols);
            dst[..seg.len()].copy_from_slice(seg);
            dst[seg.len()..].fill(fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn source() -> Matrix<f32> {
        // 3x3: 1..9
        Matrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_interior_window() {
        let m = source();
        let mut buf = TileBuffer::with_capacity(2, 2);
        buf.load(&m.view(), 0, 1, 2, 2, 0.0);
        assert_eq!(buf.as_slice(), &[2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn test_masked_corner() {
        let m = source();
        let mut buf = TileBuffer::with_capacity(2, 2);
        buf.load(&m.view(), 2, 2, 2, 2, 0.0);
        assert_eq!(buf.row(0), &[9.0, 0.0]);
        assert_eq!(buf.row(1), &[0.0, 0.0]);
    }

    #[test]
    fn test_custom_fill() {
        let m = source();
        let mut buf = TileBuffer::with_capacity(4, 4);
        buf.load(&m.view(), 1, 1, 4, 4, -1.0);
        assert_eq!(buf.row(0), &[5.0, 6.0, -1.0, -1.0]);
        assert_eq!(buf.row(1), &[8.0, 9.0, -1.0, -1.0]);
        assert_eq!(buf.row(2), &[-1.0; 4]);
        assert_eq!(buf.row(3), &[-1.0; 4]);
    }

    #[test]
    fn test_padding_never_read() {
        // Row stride 4 with NaN padding in column 3; the loader must not
        // pick it up even when the window extends past column 2.
        let nan = f32::NAN;
        let m = Matrix::with_row_stride(
            vec![1.0, 2.0, 3.0, nan, 4.0, 5.0, 6.0],
            crate::shape::MatShape::new(2, 3),
            4,
        )
        .unwrap();
        let mut buf = TileBuffer::with_capacity(2, 4);
        buf.load(&m.view(), 0, 0, 2, 4, 0.0);
        assert!(buf.as_slice().iter().all(|v| !v.is_nan()));
        assert_eq!(buf.row(1), &[4.0, 5.0, 6.0, 0.0]);
    }

    #[test]
    fn test_reuse_shrinks_window() {
        let m = source();
        let mut buf = TileBuffer::with_capacity(3, 3);
        buf.load(&m.view(), 0, 0, 3, 3, 0.0);
        buf.load(&m.view(), 0, 2, 3, 1, 0.0);
        assert_eq!((buf.rows(), buf.cols()), (3, 1));
        assert_eq!(buf.as_slice(), &[3.0, 6.0, 9.0]);
    }
}
