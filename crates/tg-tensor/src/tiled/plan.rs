use std::ops::Range;

use crate::error::{Result, TensorError};

/// Identifies one output tile by its position in the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub tile_row: usize,
    pub tile_col: usize,
}

/// The output cells covered by a tile, clipped against the matrix bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBounds {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl TileBounds {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }
}

/// One chunk of the shared reduction dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KBlock {
    /// First k index covered by this block.
    pub start: usize,
    /// Number of k indices covered; only the last block may be shorter
    /// than the tile size.
    pub len: usize,
}

/// Partition of `C = A @ B` into `tile_size x tile_size` output tiles and
/// `tile_size`-wide K-blocks.
///
/// The grid is a pure description; it owns no buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    m: usize,
    n: usize,
    k: usize,
    tile_size: usize,
}

impl TileGrid {
    /// Plan the grid for an `[m x k] @ [k x n]` product.
    ///
    /// Fails with `InvalidTileSize` if `tile_size == 0` and with
    /// `EmptyDimension` if any of `m`, `n`, `k` is zero.
    pub fn new(m: usize, n: usize, k: usize, tile_size: usize) -> Result<Self> {
        if tile_size == 0 {
            return Err(TensorError::InvalidTileSize { tile_size });
        }
        if m == 0 || n == 0 || k == 0 {
            return Err(TensorError::EmptyDimension { m, n, k });
        }
        Ok(TileGrid { m, n, k, tile_size })
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tile rows: `ceil(m / tile_size)`.
    pub fn tile_rows(&self) -> usize {
        self.m.div_ceil(self.tile_size)
    }

    /// Number of tile columns: `ceil(n / tile_size)`.
    pub fn tile_cols(&self) -> usize {
        self.n.div_ceil(self.tile_size)
    }

    /// Total number of output tiles.
    pub fn num_tiles(&self) -> usize {
        self.tile_rows() * self.tile_cols()
    }

    /// Number of K-blocks each tile iterates over: `ceil(k / tile_size)`.
    pub fn num_k_blocks(&self) -> usize {
        self.k.div_ceil(self.tile_size)
    }

    /// Every tile coordinate, each exactly once, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.tile_rows()).flat_map(move |tile_row| self.tiles_in_row(tile_row))
    }

    /// The tiles of one tile row (a horizontal band of the output).
    pub fn tiles_in_row(&self, tile_row: usize) -> impl Iterator<Item = TileCoord> {
        (0..self.tile_cols()).map(move |tile_col| TileCoord { tile_row, tile_col })
    }

    /// Output cells covered by `coord`, clipped to `[0, m) x [0, n)`.
    pub fn bounds(&self, coord: TileCoord) -> TileBounds {
        let row_start = coord.tile_row * self.tile_size;
        let col_start = coord.tile_col * self.tile_size;
        TileBounds {
            rows: row_start..(row_start + self.tile_size).min(self.m),
            cols: col_start..(col_start + self.tile_size).min(self.n),
        }
    }

    /// K-blocks in increasing start order. The last one may be partial.
    pub fn k_blocks(&self) -> impl Iterator<Item = KBlock> {
        let k = self.k;
        let step = self.tile_size;
        (0..k).step_by(step).map(move |start| KBlock {
            start,
            len: step.min(k - start),
        })
    }
}
