//! `tg-tensor` - Blocked, tiled dense matrix multiplication for tiled-gemm.
//!
//! This crate provides:
//! - A row-major `Matrix` type with optional row padding
//! - The tiled GEMM engine (`multiply`): tile grid planning, masked tile
//!   loads, per-tile accumulation and masked stores
//! - A `ComputeBackend` trait with a reference `CpuBackend` and the
//!   `TiledBackend`
//! - Blocked elementwise kernels and a preference select/weight update
//!
//! ```
//! use tg_tensor::{multiply, Matrix};
//!
//! let a = Matrix::from_rows(&[vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
//! let b = Matrix::from_rows(&[vec![5.0f32, 6.0], vec![7.0, 8.0]]).unwrap();
//! let c = multiply(&a, &b, 128).unwrap();
//! assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
//! ```

pub mod backend;
pub mod config;
pub mod cpu;
pub mod element;
pub mod elementwise;
pub mod error;
pub mod matrix;
pub mod preference;
pub mod shape;
pub mod tiled;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use config::GemmConfig;
pub use cpu::{reference_matmul, CpuBackend};
pub use element::Element;
pub use error::{Result, TensorError};
pub use matrix::{Matrix, MatrixView};
pub use preference::{select_and_bump, PreferenceBatch};
pub use shape::MatShape;
pub use tiled::{multiply, multiply_into, multiply_slices, multiply_with, TileGrid, TiledBackend};
