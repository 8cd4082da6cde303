use tg_tensor::GemmConfig;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TGStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorShape = 2,
    ErrorConfig = 3,
    ErrorInternal = 4,
}

/// Compute backend type selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TGBackendType {
    Reference = 0,
    Tiled = 1,
}

/// Parameters for the tiled backend.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TGGemmParams {
    pub tile_size: usize,
    pub parallel: bool,
}

impl Default for TGGemmParams {
    fn default() -> Self {
        let config = GemmConfig::default();
        Self {
            tile_size: config.tile_size,
            parallel: config.parallel,
        }
    }
}

impl From<TGGemmParams> for GemmConfig {
    fn from(p: TGGemmParams) -> Self {
        GemmConfig::new(p.tile_size).with_parallel(p.parallel)
    }
}
