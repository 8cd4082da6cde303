use crate::element::Element;

use super::accumulate::Accumulator;

/// Masked scatter of a finished accumulator into a band of C.
///
/// `band` holds the output rows of one tile row, rows starting
/// `row_stride` elements apart. Only the `height x width` in-bounds corner
/// of the accumulator is written, at columns `col_start..col_start + width`;
/// the remaining accumulator cells are discarded.
pub fn store_tile<T: Element>(
    acc: &Accumulator<T>,
    band: &mut [T],
    row_stride: usize,
    col_start: usize,
    height: usize,
    width: usize,
) {
    debug_assert!(height <= acc.rows() && width <= acc.cols());
    for r in 0..height {
        let start = r * row_stride + col_start;
        band[start..start + width].copy_from_slice(&acc.row(r)[..width]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::tiled::load::TileBuffer;

    #[test]
    fn test_store_clips_to_bounds() {
        // 2x2 tile whose product is all ones, stored as a 1x1 corner.
        let ones = Matrix::from_rows(&[vec![1.0f32, 1.0], vec![1.0, 1.0]]).unwrap();
        let mut buf = TileBuffer::with_capacity(2, 2);
        buf.load(&ones.view(), 0, 0, 2, 2, 0.0);
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&buf, &buf);

        let sentinel = -7.0f32;
        let mut band = vec![sentinel; 3];
        store_tile(&acc, &mut band, 3, 2, 1, 1);
        assert_eq!(band, vec![sentinel, sentinel, 2.0]);
    }

    #[test]
    fn test_store_respects_row_stride() {
        let src = Matrix::from_rows(&[vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
        let id = Matrix::<f32>::identity(2);
        let mut a = TileBuffer::with_capacity(2, 2);
        let mut b = TileBuffer::with_capacity(2, 2);
        a.load(&src.view(), 0, 0, 2, 2, 0.0);
        b.load(&id.view(), 0, 0, 2, 2, 0.0);
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&a, &b);

        // Band of two rows, stride 4, tile written at column 1.
        let mut band = vec![0.0f32; 4 + 3];
        store_tile(&acc, &mut band, 4, 1, 2, 2);
        assert_eq!(band, vec![0.0, 1.0, 2.0, 0.0, 0.0, 3.0, 4.0]);
    }
}
