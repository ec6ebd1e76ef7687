//! Sparse per-request window of elevation tiles.

use crate::coords::{tile_world_size, Extent, TileRange, TILE_SIZE, TSIZE1};

/// Sentinel elevation for samples with no data behind them.
pub const NODATA: f32 = 0.0;

/// One tile's worth of elevation samples: `TILE_SIZE * TILE_SIZE` values in
/// row-major order, north row first. Immutable once stored in a grid.
pub type TileBuffer = Vec<f32>;

/// A rectangular window of tiles at a fixed zoom, assembled into one
/// virtual raster.
///
/// The grid is created empty, populated tile by tile as fetches complete,
/// and sampled once to produce an output block. Tiles that were never set
/// (fetch failed, or no tile exists there) sample as [`NODATA`].
///
/// The window's world extent is derived from the tile range at
/// construction and never changes afterwards.
#[derive(Debug)]
pub struct TileGrid {
    /// Zoom level of every tile in the window.
    zoom: u8,
    /// Tile-index rectangle covered by the window.
    range: TileRange,
    /// World extent covered by the full tile window.
    extent: Extent,
    /// Tile columns in the window.
    cols: usize,
    /// Tile rows in the window.
    rows: usize,
    /// World-unit width of one pixel.
    cell_size: f64,
    /// Tile buffers in window-relative row-major order; `None` is a
    /// missing tile.
    blocks: Vec<Option<TileBuffer>>,
}

impl TileGrid {
    /// Create an empty grid covering `range` at `zoom`.
    ///
    /// # Panics
    /// Panics if the range is inverted in either axis.
    pub fn new(zoom: u8, range: TileRange) -> Self {
        assert!(
            range.max_x >= range.min_x && range.max_y >= range.min_y,
            "inverted tile range {:?}",
            range
        );

        let tile_size = tile_world_size(zoom);
        let extent = Extent::new(
            range.min_x as f64 * tile_size - TSIZE1,
            TSIZE1 - (range.max_y + 1) as f64 * tile_size,
            (range.max_x + 1) as f64 * tile_size - TSIZE1,
            TSIZE1 - range.min_y as f64 * tile_size,
        );
        let cols = range.cols();
        let rows = range.rows();

        Self {
            zoom,
            range,
            extent,
            cols,
            rows,
            cell_size: tile_size / TILE_SIZE as f64,
            blocks: vec![None; cols * rows],
        }
    }

    /// Zoom level of the window.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// World extent covered by the full tile window.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// World-unit width of one pixel.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of tiles currently populated.
    pub fn populated(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    /// Store a fetched tile buffer at absolute tile index `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` lies outside the window or the buffer is not
    /// exactly `TILE_SIZE * TILE_SIZE` samples.
    pub fn set(&mut self, x: u32, y: u32, buffer: TileBuffer) {
        assert!(
            self.range.contains(x, y),
            "tile ({}, {}) outside window {:?}",
            x,
            y,
            self.range
        );
        assert_eq!(
            buffer.len(),
            TILE_SIZE * TILE_SIZE,
            "tile buffer has wrong sample count"
        );

        let idx = (x - self.range.min_x) as usize + (y - self.range.min_y) as usize * self.cols;
        self.blocks[idx] = Some(buffer);
    }

    /// Sample a regular `nx` x `ny` grid of points over `extent`.
    ///
    /// Output is row-major with the first row at `extent.max_y` descending
    /// to `extent.min_y`, columns running west to east. For `n > 1` points
    /// in an axis the spacing is `(max - min) / (n - 1)` (both edges are
    /// sample points); `n == 1` samples the axis minimum.
    ///
    /// Each point takes the value of the nearest source pixel; bilinear
    /// interpolation is a known gap left open deliberately. Points outside
    /// the tile window sample as [`NODATA`].
    ///
    /// # Panics
    /// Panics if `nx` or `ny` is zero.
    pub fn read(&self, extent: Extent, nx: usize, ny: usize) -> Vec<f32> {
        assert!(nx >= 1 && ny >= 1, "empty sample grid {}x{}", nx, ny);

        let xstep = if nx > 1 {
            extent.width() / (nx - 1) as f64
        } else {
            0.0
        };
        let ystep = if ny > 1 {
            extent.height() / (ny - 1) as f64
        } else {
            0.0
        };

        let mut values = Vec::with_capacity(nx * ny);
        for row in 0..ny {
            let y = if ny == 1 {
                extent.min_y
            } else {
                extent.max_y - row as f64 * ystep
            };
            for col in 0..nx {
                let x = if nx == 1 {
                    extent.min_x
                } else {
                    extent.min_x + col as f64 * xstep
                };
                values.push(self.sample(x, y));
            }
        }
        values
    }

    /// Nearest-neighbor lookup of one world point.
    fn sample(&self, x: f64, y: f64) -> f32 {
        let xi = (x - self.extent.min_x) / self.cell_size;
        let yi = (self.extent.max_y - y) / self.cell_size;

        // Outside the window, including NaN offsets.
        if !(xi >= 0.0 && yi >= 0.0)
            || xi >= (self.cols * TILE_SIZE) as f64
            || yi >= (self.rows * TILE_SIZE) as f64
        {
            return NODATA;
        }

        let xi = xi as usize;
        let yi = yi as usize;
        let tile = xi / TILE_SIZE + (yi / TILE_SIZE) * self.cols;
        match &self.blocks[tile] {
            Some(buffer) => buffer[(xi % TILE_SIZE) + (yi % TILE_SIZE) * TILE_SIZE],
            None => NODATA,
        }
    }
}
