use crate::element::Element;

use super::load::TileBuffer;

/// The private running sum for one output tile.
///
/// Holds `rows x cols` cells (the tile extent clipped to the output), is
/// cleared at the start of every tile and receives only additions of
/// partial products.
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> Accumulator<T> {
    /// A zeroed accumulator for tiles of at most `rows x cols` cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Accumulator {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Zero every cell before a new tile begins.
    pub fn reset(&mut self) {
        self.data.fill(T::zero());
    }

    /// Row `i` of the accumulator (full width).
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Add the product of an A sub-block (`rows x kb`) and a B sub-block
    /// (`kb x cols`) into the running sum.
    ///
    /// Every cell receives its `kb` partial products in increasing k order,
    /// so across K-blocks processed in increasing order the sum of
    /// `C[i][j]` is formed exactly as a sequential loop over k would form it.
    ///
    /// # Panics
    /// Panics if the inner dimensions disagree or the blocks exceed the tile.
    pub fn accumulate(&mut self, a: &TileBuffer<T>, b: &TileBuffer<T>) {
        assert_eq!(a.cols(), b.rows(), "k-block width mismatch");
        assert!(a.rows() <= self.rows && b.cols() <= self.cols);

        let width = b.cols();
        for i in 0..a.rows() {
            let a_row = a.row(i);
            let start = i * self.cols;
            let acc_row = &mut self.data[start..start + width];
            for (p, &a_ip) in a_row.iter().enumerate() {
                let b_row = b.row(p);
                for (c, &b_pj) in acc_row.iter_mut().zip(b_row) {
                    *c = *c + a_ip * b_pj;
                }
            }
        }
    }
}
