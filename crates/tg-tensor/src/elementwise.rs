//! Blocked elementwise kernels.
//!
//! A vector of length `len` is split into `ceil(len / block)` blocks. Each
//! block covers `[start, min(start + block, len))`, so the final partial
//! block is clipped rather than read past the end, and writes land in
//! disjoint output ranges.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::element::Element;
use crate::error::{Result, TensorError};

/// Below this length the blocks run sequentially even with `parallel` on.
pub const PARALLEL_MIN_LEN: usize = 1 << 15;

/// Number of blocks covering `len` elements.
pub fn num_blocks(len: usize, block: usize) -> usize {
    len.div_ceil(block)
}

pub(crate) fn check_block(block: usize) -> Result<()> {
    if block == 0 {
        return Err(TensorError::InvalidTileSize { tile_size: block });
    }
    Ok(())
}

pub(crate) fn check_lens(expected: usize, others: &[usize]) -> Result<()> {
    for &len in others {
        if len != expected {
            return Err(TensorError::ShapeMismatch {
                expected: vec![expected],
                got: vec![len],
            });
        }
    }
    Ok(())
}

/// Visit every block of `out`, passing its start offset and its slice.
fn for_each_block<T, F>(out: &mut [T], block: usize, f: F)
where
    T: Element,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if out.len() >= PARALLEL_MIN_LEN {
            out.par_chunks_mut(block)
                .enumerate()
                .for_each(|(i, dst)| f(i * block, dst));
            return;
        }
    }
    for (i, dst) in out.chunks_mut(block).enumerate() {
        f(i * block, dst);
    }
}

/// `out[i] = x[i] + y[i]`.
pub fn add<T: Element>(x: &[T], y: &[T], block: usize) -> Result<Vec<T>> {
    check_block(block)?;
    check_lens(x.len(), &[y.len()])?;

    let mut out = vec![T::zero(); x.len()];
    for_each_block(&mut out, block, |start, dst| {
        let end = start + dst.len();
        for ((o, &a), &b) in dst.iter_mut().zip(&x[start..end]).zip(&y[start..end]) {
            *o = a + b;
        }
    });
    Ok(out)
}

/// Fused add-multiply: `out[i] = (x[i] + y[i]) * z[i]`.
pub fn add_mul<T: Element>(x: &[T], y: &[T], z: &[T], block: usize) -> Result<Vec<T>> {
    check_block(block)?;
    check_lens(x.len(), &[y.len(), z.len()])?;

    let mut out = vec![T::zero(); x.len()];
    for_each_block(&mut out, block, |start, dst| {
        let end = start + dst.len();
        let src = x[start..end].iter().zip(&y[start..end]).zip(&z[start..end]);
        for (o, ((&a, &b), &c)) in dst.iter_mut().zip(src) {
            *o = (a + b) * c;
        }
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_num_blocks() {
        assert_eq!(num_blocks(10, 4), 3);
        assert_eq!(num_blocks(8, 4), 2);
        assert_eq!(num_blocks(0, 4), 0);
    }

    #[test]
    fn test_add_partial_block() {
        let x: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let y = vec![0.5f32; 10];
        let r = add(&x, &y, 4).unwrap();
        assert_eq!(r.len(), 10);
        for (i, v) in r.iter().enumerate() {
            assert_relative_eq!(*v, i as f32 + 0.5);
        }
    }

    #[test]
    fn test_add_mul() {
        let r = add_mul(&[1.0f64, 2.0, 3.0], &[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(r, vec![4.0, 9.0, 16.0]);
    }

    #[test]
    fn test_large_input_matches_sequential_definition() {
        let n = PARALLEL_MIN_LEN + 17;
        let x: Vec<f32> = (0..n).map(|i| (i % 97) as f32).collect();
        let y: Vec<f32> = (0..n).map(|i| (i % 13) as f32).collect();
        let z: Vec<f32> = (0..n).map(|i| (i % 5) as f32 * 0.5).collect();
        let r = add_mul(&x, &y, &z, 1000).unwrap();
        for i in 0..n {
            assert_eq!(r[i], (x[i] + y[i]) * z[i]);
        }
    }

    #[test]
    fn test_empty() {
        assert!(add::<f32>(&[], &[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            add(&[1.0f32], &[2.0], 0),
            Err(TensorError::InvalidTileSize { tile_size: 0 })
        );
        assert!(matches!(
            add_mul(&[1.0f32, 2.0], &[2.0, 3.0], &[1.0], 2),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }
}
