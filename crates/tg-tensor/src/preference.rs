//! Preference select with a shared weight update.
//!
//! For each element, the output takes `a[i]` when `prefer_a[i]` is set and
//! `b[i]` otherwise, and the weight at `weight_index[i]` moves by `+step`
//! (A preferred) or `-step` (B preferred). Several elements, possibly in
//! different blocks, may target the same weight. Blocks therefore record
//! their updates in a private delta list, and the lists are merged into the
//! weight vector after every block is done, in block order.

use std::ops::Neg;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::element::Element;
#[cfg(feature = "parallel")]
use crate::elementwise::PARALLEL_MIN_LEN;
use crate::elementwise::{check_block, check_lens};
use crate::error::{Result, TensorError};

/// Inputs of one preference pass. All four slices have the same length.
#[derive(Debug, Clone, Copy)]
pub struct PreferenceBatch<'a, T> {
    pub prefer_a: &'a [bool],
    pub a: &'a [T],
    pub b: &'a [T],
    pub weight_index: &'a [usize],
}

impl<'a, T: Element> PreferenceBatch<'a, T> {
    fn validate(&self, n_weights: usize) -> Result<()> {
        check_lens(
            self.prefer_a.len(),
            &[self.a.len(), self.b.len(), self.weight_index.len()],
        )?;
        if let Some(&index) = self.weight_index.iter().find(|&&w| w >= n_weights) {
            return Err(TensorError::IndexOutOfRange {
                index,
                len: n_weights,
            });
        }
        Ok(())
    }
}

/// Pick `a[i]` or `b[i]` per element and bump the selected weights.
///
/// Returns the selected values. All checks run before `weights` is touched;
/// on error it is left unchanged.
pub fn select_and_bump<T>(
    batch: PreferenceBatch<'_, T>,
    weights: &mut [T],
    step: T,
    block: usize,
) -> Result<Vec<T>>
where
    T: Element + Neg<Output = T>,
{
    check_block(block)?;
    batch.validate(weights.len())?;

    let mut out = vec![T::zero(); batch.prefer_a.len()];
    let run_block = |(i, dst): (usize, &mut [T])| -> Vec<(usize, T)> {
        let start = i * block;
        let mut deltas = Vec::with_capacity(dst.len());
        for (off, o) in dst.iter_mut().enumerate() {
            let e = start + off;
            let (value, delta) = if batch.prefer_a[e] {
                (batch.a[e], step)
            } else {
                (batch.b[e], -step)
            };
            *o = value;
            deltas.push((batch.weight_index[e], delta));
        }
        deltas
    };

    #[cfg(feature = "parallel")]
    let block_deltas: Vec<Vec<(usize, T)>> = if batch.prefer_a.len() >= PARALLEL_MIN_LEN {
        out.par_chunks_mut(block).enumerate().map(run_block).collect()
    } else {
        out.chunks_mut(block).enumerate().map(run_block).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let block_deltas: Vec<Vec<(usize, T)>> =
        out.chunks_mut(block).enumerate().map(run_block).collect();

    for (index, delta) in block_deltas.into_iter().flatten() {
        weights[index] = weights[index] + delta;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementwise::PARALLEL_MIN_LEN;

    #[test]
    fn test_select_and_bump() {
        let prefer_a = [true, false, true, true];
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [10.0f32, 20.0, 30.0, 40.0];
        let weight_index = [0, 1, 0, 2];
        let mut weights = vec![0.0f32; 3];
        let out = select_and_bump(
            PreferenceBatch {
                prefer_a: &prefer_a,
                a: &a,
                b: &b,
                weight_index: &weight_index,
            },
            &mut weights,
            0.5,
            3,
        )
        .unwrap();
        assert_eq!(out, vec![1.0, 20.0, 3.0, 4.0]);
        assert_eq!(weights, vec![1.0, -0.5, 0.5]);
    }

    #[test]
    fn test_shared_weight_across_blocks() {
        // Every element hits weight 0; every block must contribute.
        let n = PARALLEL_MIN_LEN + 3;
        let prefer_a = vec![true; n];
        let a = vec![1.0f64; n];
        let b = vec![0.0f64; n];
        let weight_index = vec![0usize; n];
        let mut weights = vec![0.0f64];
        select_and_bump(
            PreferenceBatch {
                prefer_a: &prefer_a,
                a: &a,
                b: &b,
                weight_index: &weight_index,
            },
            &mut weights,
            1.0,
            64,
        )
        .unwrap();
        assert_eq!(weights[0], n as f64);
    }

    #[test]
    fn test_out_of_range_leaves_weights() {
        let mut weights = vec![5.0f32, 5.0];
        let r = select_and_bump(
            PreferenceBatch {
                prefer_a: &[true, false],
                a: &[1.0, 2.0],
                b: &[3.0, 4.0],
                weight_index: &[0, 2],
            },
            &mut weights,
            1.0,
            1,
        );
        assert_eq!(r, Err(TensorError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(weights, vec![5.0, 5.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut weights = vec![0.0f32];
        let r = select_and_bump(
            PreferenceBatch {
                prefer_a: &[true],
                a: &[1.0, 2.0],
                b: &[3.0],
                weight_index: &[0],
            },
            &mut weights,
            1.0,
            4,
        );
        assert!(matches!(r, Err(TensorError::ShapeMismatch { .. })));
    }
}
