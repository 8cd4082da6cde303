use crate::error::{Result, TensorError};

/// Environment variable overriding the tile size.
pub const TILE_SIZE_ENV: &str = "TG_TILE_SIZE";
/// Environment variable toggling tile-parallel dispatch (`0`/`false` disable).
pub const PARALLEL_ENV: &str = "TG_PARALLEL";

/// Default tile edge length.
pub const DEFAULT_TILE_SIZE: usize = 32;

/// Configuration for the tiled GEMM engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmConfig {
    /// Edge length of an output tile, and the K-block step.
    pub tile_size: usize,
    /// Dispatch independent tile bands on the rayon pool.
    ///
    /// Has no effect when the crate is built without the `parallel` feature.
    /// Never changes results.
    pub parallel: bool,
}

impl Default for GemmConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            parallel: true,
        }
    }
}

impl GemmConfig {
    /// Create a configuration with the given tile size and parallel dispatch enabled.
    pub fn new(tile_size: usize) -> Self {
        Self {
            tile_size,
            ..Self::default()
        }
    }

    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject configurations that cannot drive a tile grid.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(TensorError::InvalidTileSize {
                tile_size: self.tile_size,
            });
        }
        Ok(())
    }

    /// Build a configuration from `TG_TILE_SIZE` and `TG_PARALLEL`.
    ///
    /// Missing variables keep their defaults. Unparsable values are logged
    /// and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(TILE_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => config.tile_size = v,
                _ => log::warn!(
                    "ignoring {}={:?}: expected a positive integer",
                    TILE_SIZE_ENV,
                    raw
                ),
            }
        }

        if let Some(raw) = lookup(PARALLEL_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.parallel = true,
                "0" | "false" | "no" | "off" => config.parallel = false,
                _ => log::warn!(
                    "ignoring {}={:?}: expected a boolean",
                    PARALLEL_ENV,
                    raw
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default() {
        let c = GemmConfig::default();
        assert_eq!(c.tile_size, DEFAULT_TILE_SIZE);
        assert!(c.parallel);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let c = GemmConfig::new(8).with_parallel(false);
        assert_eq!(c.tile_size, 8);
        assert!(!c.parallel);
        assert_eq!(c.with_tile_size(16).tile_size, 16);
    }

    #[test]
    fn test_zero_tile_rejected() {
        assert_eq!(
            GemmConfig::new(0).validate(),
            Err(TensorError::InvalidTileSize { tile_size: 0 })
        );
    }

    #[test]
    fn test_from_lookup() {
        let c = GemmConfig::from_lookup(lookup(&[(TILE_SIZE_ENV, "64"), (PARALLEL_ENV, "off")]));
        assert_eq!(c.tile_size, 64);
        assert!(!c.parallel);
    }

    #[test]
    fn test_from_lookup_invalid_falls_back() {
        let c = GemmConfig::from_lookup(lookup(&[(TILE_SIZE_ENV, "0"), (PARALLEL_ENV, "maybe")]));
        assert_eq!(c, GemmConfig::default());

        let c = GemmConfig::from_lookup(lookup(&[(TILE_SIZE_ENV, "-4")]));
        assert_eq!(c.tile_size, DEFAULT_TILE_SIZE);
    }
}
