use crate::backend::ComputeBackend;
use crate::element::Element;
use crate::error::{Result, TensorError};

/// Pure-Rust reference backend.
///
/// Implements every operation with straightforward loops optimized for
/// correctness rather than peak performance. The matmul sums each output
/// cell over k in increasing order, which is the summation order the tiled
/// engine reproduces.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Straightforward triple-loop GEMM over row-major slices.
///
/// The caller guarantees `a.len() == m * k` and `b.len() == k * n`.
pub fn reference_matmul<T: Element>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T> {
    let mut c = vec![T::zero(); m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            for p in 0..k {
                sum = sum + a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    c
}

pub(crate) fn check_matmul_lens(a: usize, b: usize, m: usize, k: usize, n: usize) -> Result<()> {
    if m.checked_mul(k) != Some(a) {
        return Err(TensorError::ShapeMismatch {
            expected: vec![m, k],
            got: vec![a],
        });
    }
    if k.checked_mul(n) != Some(b) {
        return Err(TensorError::ShapeMismatch {
            expected: vec![k, n],
            got: vec![b],
        });
    }
    Ok(())
}

fn check_same_len(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(TensorError::ShapeMismatch {
            expected: vec![a.len()],
            got: vec![b.len()],
        });
    }
    Ok(())
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        check_matmul_lens(a.len(), b.len(), m, k, n)?;
        Ok(reference_matmul(a, b, m, k, n))
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_same_len(a, b)?;
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
    }

    fn add_mul(&self, a: &[f32], b: &[f32], c: &[f32]) -> Result<Vec<f32>> {
        check_same_len(a, b)?;
        check_same_len(a, c)?;
        Ok(a.iter()
            .zip(b.iter())
            .zip(c.iter())
            .map(|((x, y), z)| (x + y) * z)
            .collect())
    }
}
