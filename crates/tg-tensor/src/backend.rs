use std::fmt::Debug;

use crate::error::Result;

/// Trait for pluggable compute backends (reference loops, tiled engine).
///
/// Operations work on row-major f32 slices and return owned vectors.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu", "tiled").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;

    /// Element-wise addition: result[i] = a[i] + b[i].
    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// Fused add-multiply: result[i] = (a[i] + b[i]) * c[i].
    fn add_mul(&self, a: &[f32], b: &[f32], c: &[f32]) -> Result<Vec<f32>>;
}
