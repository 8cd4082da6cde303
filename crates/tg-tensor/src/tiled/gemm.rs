#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backend::ComputeBackend;
use crate::config::GemmConfig;
use crate::cpu::check_matmul_lens;
use crate::element::Element;
use crate::elementwise;
use crate::error::{Result, TensorError};
use crate::matrix::{Matrix, MatrixView};
use crate::shape::MatShape;

use super::accumulate::Accumulator;
use super::load::TileBuffer;
use super::plan::{TileCoord, TileGrid};
use super::store::store_tile;

/// Compute `C = A @ B` with `tile_size x tile_size` output tiles.
///
/// Fails with `InvalidTileSize` / `EmptyDimension` for an unusable grid and
/// with `MatmulMismatch` if `a.cols() != b.rows()`, in both cases before
/// any tile runs.
pub fn multiply<T: Element>(a: &Matrix<T>, b: &Matrix<T>, tile_size: usize) -> Result<Matrix<T>> {
    multiply_with(a, b, &GemmConfig::new(tile_size))
}

/// [`multiply`] with an explicit configuration.
pub fn multiply_with<T: Element>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    config: &GemmConfig,
) -> Result<Matrix<T>> {
    let grid = plan::<T>(a.shape(), b.shape(), config)?;
    let mut c = Matrix::zeros(MatShape::new(grid.m(), grid.n()));
    let stride = c.row_stride();
    execute(&grid, a.view(), b.view(), c.data_mut(), stride, config.parallel);
    Ok(c)
}

/// Compute `A @ B` into a caller-provided `c`, which must already have
/// shape `[a.rows(), b.cols()]`. Padding between rows of `c` is left as is.
///
/// On error `c` is not modified.
pub fn multiply_into<T: Element>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    c: &mut Matrix<T>,
    config: &GemmConfig,
) -> Result<()> {
    let grid = plan::<T>(a.shape(), b.shape(), config)?;
    let expected = MatShape::new(grid.m(), grid.n());
    if c.shape() != expected {
        return Err(TensorError::ShapeMismatch {
            expected: expected.dims(),
            got: c.shape().dims(),
        });
    }
    let stride = c.row_stride();
    execute(&grid, a.view(), b.view(), c.data_mut(), stride, config.parallel);
    Ok(())
}

/// Multiply contiguous row-major slices: `a` is `[m, k]`, `b` is `[k, n]`,
/// and `c` (length `m * n`) is overwritten with the product.
pub fn multiply_slices<T: Element>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    k: usize,
    n: usize,
    config: &GemmConfig,
) -> Result<()> {
    check_matmul_lens(a.len(), b.len(), m, k, n)?;
    if m.checked_mul(n) != Some(c.len()) {
        return Err(TensorError::ShapeMismatch {
            expected: vec![m, n],
            got: vec![c.len()],
        });
    }
    let a = MatrixView::new(a, MatShape::new(m, k))?;
    let b = MatrixView::new(b, MatShape::new(k, n))?;
    let grid = plan::<T>(a.shape(), b.shape(), config)?;
    execute(&grid, a, b, c, n, config.parallel);
    Ok(())
}

/// Validate operands and configuration, then lay out the tile grid.
fn plan<T: Element>(a: MatShape, b: MatShape, config: &GemmConfig) -> Result<TileGrid> {
    let result = config.validate().and_then(|()| {
        if a.cols() != b.rows() {
            return Err(TensorError::MatmulMismatch {
                m: a.rows(),
                k: a.cols(),
                k2: b.rows(),
                n: b.cols(),
            });
        }
        TileGrid::new(a.rows(), b.cols(), a.cols(), config.tile_size)
    });

    match &result {
        Ok(grid) => log::debug!(
            "tiled gemm ({}): [{}x{}] @ [{}x{}], tile={}, grid={}x{} tiles, {} k-blocks, parallel={}",
            T::NAME,
            grid.m(),
            grid.k(),
            grid.k(),
            grid.n(),
            grid.tile_size(),
            grid.tile_rows(),
            grid.tile_cols(),
            grid.num_k_blocks(),
            config.parallel
        ),
        Err(e) => log::debug!("tiled gemm ({}) rejected {} @ {}: {}", T::NAME, a, b, e),
    }
    result
}

/// Per-band working set: the two loaded sub-blocks and the accumulator.
///
/// Sized to the tile extent clipped against the operands, so the working
/// set never exceeds `min(ts, m) x min(ts, n)` plus the two input blocks.
/// Created once per band and reused tile after tile; dropped when the band
/// finishes.
struct TileScratch<T> {
    a: TileBuffer<T>,
    b: TileBuffer<T>,
    acc: Accumulator<T>,
    tile_m: usize,
    tile_n: usize,
}

impl<T: Element> TileScratch<T> {
    fn new(grid: &TileGrid) -> Self {
        let ts = grid.tile_size();
        let tile_m = ts.min(grid.m());
        let tile_n = ts.min(grid.n());
        let tile_k = ts.min(grid.k());
        TileScratch {
            a: TileBuffer::with_capacity(tile_m, tile_k),
            b: TileBuffer::with_capacity(tile_k, tile_n),
            acc: Accumulator::new(tile_m, tile_n),
            tile_m,
            tile_n,
        }
    }
}

/// Run every tile of the grid, writing into `c` (rows `c_stride` apart).
///
/// Each tile row owns a disjoint band of `c`, so bands are dispatched
/// independently; within a band tiles run left to right.
fn execute<T: Element>(
    grid: &TileGrid,
    a: MatrixView<'_, T>,
    b: MatrixView<'_, T>,
    c: &mut [T],
    c_stride: usize,
    parallel: bool,
) {
    let used = MatShape::new(grid.m(), grid.n()).required_len(c_stride);
    let c = &mut c[..used];
    // With tile_size >= m there is a single band covering all of `c`.
    let band_len = grid.tile_size().min(grid.m()) * c_stride;

    #[cfg(feature = "parallel")]
    {
        if parallel && grid.tile_rows() > 1 {
            c.par_chunks_mut(band_len)
                .enumerate()
                .for_each(|(tile_row, band)| run_band(grid, &a, &b, tile_row, band, c_stride));
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for (tile_row, band) in c.chunks_mut(band_len).enumerate() {
        run_band(grid, &a, &b, tile_row, band, c_stride);
    }
}

fn run_band<T: Element>(
    grid: &TileGrid,
    a: &MatrixView<'_, T>,
    b: &MatrixView<'_, T>,
    tile_row: usize,
    band: &mut [T],
    c_stride: usize,
) {
    let mut scratch = TileScratch::new(grid);
    for coord in grid.tiles_in_row(tile_row) {
        let bounds = grid.bounds(coord);
        compute_tile(grid, a, b, coord, &mut scratch);
        store_tile(
            &scratch.acc,
            band,
            c_stride,
            bounds.cols.start,
            bounds.height(),
            bounds.width(),
        );
    }
}

/// Accumulate the full K reduction for one output tile into `scratch.acc`.
fn compute_tile<T: Element>(
    grid: &TileGrid,
    a: &MatrixView<'_, T>,
    b: &MatrixView<'_, T>,
    coord: TileCoord,
    scratch: &mut TileScratch<T>,
) {
    let ts = grid.tile_size();
    let row_start = coord.tile_row * ts;
    let col_start = coord.tile_col * ts;

    scratch.acc.reset();
    for kb in grid.k_blocks() {
        scratch.a.load(a, row_start, kb.start, scratch.tile_m, kb.len, T::zero());
        scratch.b.load(b, kb.start, col_start, kb.len, scratch.tile_n, T::zero());
        scratch.acc.accumulate(&scratch.a, &scratch.b);
    }
}

/// Tiled compute backend.
///
/// Matmul goes through the tile engine; the elementwise operations use the
/// same tile size as their 1-D block length.
#[derive(Debug, Clone, Default)]
pub struct TiledBackend {
    config: GemmConfig,
}

impl TiledBackend {
    pub fn new(config: GemmConfig) -> Self {
        TiledBackend { config }
    }

    /// Tiled backend with the given tile size and default parallelism.
    pub fn with_tile_size(tile_size: usize) -> Self {
        Self::new(GemmConfig::new(tile_size))
    }

    pub fn config(&self) -> &GemmConfig {
        &self.config
    }
}

impl ComputeBackend for TiledBackend {
    fn name(&self) -> &str {
        "tiled"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        let mut c = vec![0.0f32; m * n];
        multiply_slices(a, b, &mut c, m, k, n, &self.config)?;
        Ok(c)
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        elementwise::add(a, b, self.config.tile_size)
    }

    fn add_mul(&self, a: &[f32], b: &[f32], c: &[f32]) -> Result<Vec<f32>> {
        elementwise::add_mul(a, b, c, self.config.tile_size)
    }
}
