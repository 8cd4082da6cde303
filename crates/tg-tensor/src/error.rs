use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("invalid tile size {tile_size}: must be > 0")]
    InvalidTileSize { tile_size: usize },
    #[error("empty dimension: m={m}, n={n}, k={k} (all must be > 0)")]
    EmptyDimension { m: usize, n: usize, k: usize },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{0}")]
    Other(String),
}

impl TensorError {
    /// Returns true for errors caused by an invalid tiling configuration
    /// rather than by the shapes of the operands.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TensorError::InvalidTileSize { .. } | TensorError::EmptyDimension { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matmul_mismatch() {
        let e = TensorError::MatmulMismatch {
            m: 2,
            k: 3,
            k2: 4,
            n: 5,
        };
        assert_eq!(e.to_string(), "matmul dimension mismatch: [2x3] @ [4x5]");
    }

    #[test]
    fn test_config_classification() {
        assert!(TensorError::InvalidTileSize { tile_size: 0 }.is_config_error());
        assert!(TensorError::EmptyDimension { m: 0, n: 1, k: 1 }.is_config_error());
        assert!(!TensorError::MatmulMismatch {
            m: 1,
            k: 1,
            k2: 2,
            n: 1
        }
        .is_config_error());
    }
}
