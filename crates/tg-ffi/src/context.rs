use tg_tensor::{ComputeBackend, CpuBackend, GemmConfig, TiledBackend};

use crate::types::TGBackendType;

/// Opaque context handle that owns the selected compute backend.
pub struct TGContext {
    pub backend: Box<dyn ComputeBackend>,
}

impl TGContext {
    pub fn new(backend: TGBackendType, config: GemmConfig) -> Self {
        let backend: Box<dyn ComputeBackend> = match backend {
            TGBackendType::Reference => Box::new(CpuBackend::new()),
            TGBackendType::Tiled => Box::new(TiledBackend::new(config)),
        };
        Self { backend }
    }
}
