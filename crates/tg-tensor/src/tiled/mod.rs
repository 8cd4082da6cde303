//! Blocked, tiled GEMM.
//!
//! The output `C = A @ B` is cut into `tile_size x tile_size` tiles by
//! [`plan`]. For each tile, [`load`] gathers the matching sub-blocks of A
//! and B one K-block at a time (zero-filling cells past the matrix edges),
//! [`accumulate`] adds their product into the tile's private accumulator,
//! and [`store`] writes the in-bounds part of the finished tile back to C.
//!
//! Tiles never share mutable state: each tile row owns a disjoint band of C
//! and its own scratch buffers, so bands run in parallel without locks.

pub mod accumulate;
pub mod gemm;
pub mod load;
pub mod plan;
pub mod store;

pub use accumulate::Accumulator;
pub use gemm::{multiply, multiply_into, multiply_slices, multiply_with, TiledBackend};
pub use load::TileBuffer;
pub use plan::{KBlock, TileBounds, TileCoord, TileGrid};
pub use store::store_tile;
