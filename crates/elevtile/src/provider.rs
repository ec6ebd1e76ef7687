//! Public elevation provider: zoom selection, admission control and
//! resampling on top of the tile fetcher.

use crate::coords::{tile_range, zoom_for_resolution, Extent, TileRange, ZMAX};
use crate::error::ElevError;
use crate::fetch::TileFetcher;
use crate::grid::TileGrid;
use crate::projection::Projection;
use crate::Result;
use tracing::warn;

/// Default tile source: GSI elevation tiles (plain-text DEM).
pub const GSI_DEM_URL_TEMPLATE: &str = "http://cyberjapandata.gsi.go.jp/xyz/dem/{z}/{x}/{y}.txt";

/// Maximum number of tiles a single request may fetch.
pub const MAX_TILES_PER_REQUEST: usize = 128;

/// Supplies elevation values for arbitrary sample grids by assembling DEM
/// tiles from a tiled web service.
///
/// The provider holds only an immutable URL template and an HTTP client;
/// every request is independent and concurrent [`read_block`] calls never
/// share state.
///
/// # Example
///
/// ```no_run
/// use elevtile::{ElevationProvider, Extent, IdentityProjection, GSI_DEM_URL_TEMPLATE};
///
/// # async fn sample() -> elevtile::Result<()> {
/// let provider = ElevationProvider::new(GSI_DEM_URL_TEMPLATE)?;
/// let extent = Extent::new(15443000.0, 4212000.0, 15457000.0, 4226000.0);
/// let values = provider.read_block(extent, 64, 64, &IdentityProjection).await?;
/// assert_eq!(values.len(), 64 * 64);
/// # Ok(())
/// # }
/// ```
///
/// [`read_block`]: ElevationProvider::read_block
#[derive(Debug, Clone)]
pub struct ElevationProvider {
    fetcher: TileFetcher,
}

impl ElevationProvider {
    /// Create a provider for a tile source described by a URL template
    /// with `{z}`, `{x}`, `{y}` placeholders.
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        Ok(Self {
            fetcher: TileFetcher::new(url_template)?,
        })
    }

    /// Create a provider for the default GSI elevation tile source.
    pub fn gsi() -> Result<Self> {
        Self::new(GSI_DEM_URL_TEMPLATE)
    }

    /// The configured URL template.
    pub fn url_template(&self) -> &str {
        self.fetcher.url_template()
    }

    /// Sample a `width` x `height` grid of elevations over `extent`.
    ///
    /// Chooses the zoom level matching the requested output resolution,
    /// fetches the needed tiles concurrently, and resamples the assembled
    /// raster onto the output grid (row-major, north row first; see
    /// [`TileGrid::read`] for the exact grid-point layout). Missing tiles
    /// and malformed values sample as 0.
    ///
    /// # Errors
    /// [`ElevError::InvalidGridSize`] for a zero dimension,
    /// [`ElevError::InvalidExtent`] for a non-increasing extent, and
    /// [`ElevError::TooManyTiles`] when the request would exceed the
    /// admission cap (nothing is fetched in that case).
    pub async fn read_block(
        &self,
        extent: Extent,
        width: usize,
        height: usize,
        projection: &dyn Projection,
    ) -> Result<Vec<f32>> {
        if width == 0 || height == 0 {
            return Err(ElevError::InvalidGridSize { width, height });
        }
        let world = projection.to_world(extent);
        if !world.is_increasing() {
            return Err(ElevError::InvalidExtent {
                min_x: world.min_x,
                min_y: world.min_y,
                max_x: world.max_x,
                max_y: world.max_y,
            });
        }

        let segments_x = width.saturating_sub(1).max(1);
        let resolution = world.width() / segments_x as f64;

        let grid = self.get_blocks(world, resolution).await?;
        Ok(grid.read(world, width, height))
    }

    /// Sample the elevation at a single world point.
    ///
    /// Fetches the one tile containing the point at the given zoom level
    /// and reads it the same way as a one-point [`read_block`]. A missing
    /// tile yields 0.
    ///
    /// [`read_block`]: ElevationProvider::read_block
    pub async fn get_value(
        &self,
        x: f64,
        y: f64,
        zoom: u8,
        projection: &dyn Projection,
    ) -> Result<f32> {
        if zoom > ZMAX {
            return Err(ElevError::InvalidZoomLevel(zoom));
        }
        let world = projection.to_world(Extent::point(x, y));
        let range = tile_range(world, zoom);
        let grid = self.fetcher.fetch_tiles(zoom, range).await;
        Ok(grid.read(world, 1, 1)[0])
    }

    /// Fetch the tile window covering `extent` at the zoom level matching
    /// `map_units_per_pixel`, subject to the admission cap.
    async fn get_blocks(&self, extent: Extent, map_units_per_pixel: f64) -> Result<TileGrid> {
        let zoom = zoom_for_resolution(map_units_per_pixel);
        let range = tile_range(extent, zoom);
        check_admission(range)?;
        Ok(self.fetcher.fetch_tiles(zoom, range).await)
    }
}

/// Reject requests that would fetch more tiles than the cap allows.
fn check_admission(range: TileRange) -> Result<()> {
    let required = range.count();
    if required > MAX_TILES_PER_REQUEST {
        warn!(
            required,
            cap = MAX_TILES_PER_REQUEST,
            "number of tiles to fetch is too large, rejecting request"
        );
        return Err(ElevError::TooManyTiles {
            required,
            cap: MAX_TILES_PER_REQUEST,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::TSIZE1;
    use crate::projection::IdentityProjection;

    #[test]
    fn test_admission_accepts_cap_exactly() {
        // 16 x 8 = 128 tiles: admitted.
        let range = TileRange {
            min_x: 0,
            min_y: 0,
            max_x: 15,
            max_y: 7,
        };
        assert_eq!(range.count(), 128);
        assert!(check_admission(range).is_ok());
    }

    #[test]
    fn test_admission_rejects_cap_plus_one() {
        // 43 x 3 = 129 tiles: rejected.
        let range = TileRange {
            min_x: 0,
            min_y: 0,
            max_x: 42,
            max_y: 2,
        };
        assert_eq!(range.count(), 129);
        let err = check_admission(range).unwrap_err();
        assert!(matches!(
            err,
            ElevError::TooManyTiles {
                required: 129,
                cap: MAX_TILES_PER_REQUEST
            }
        ));
    }

    #[tokio::test]
    async fn test_read_block_rejects_zero_dimensions() {
        let provider = ElevationProvider::gsi().unwrap();
        let extent = Extent::new(0.0, 0.0, 1000.0, 1000.0);
        let err = provider
            .read_block(extent, 0, 4, &IdentityProjection)
            .await
            .unwrap_err();
        assert!(matches!(err, ElevError::InvalidGridSize { width: 0, height: 4 }));
    }

    #[tokio::test]
    async fn test_read_block_rejects_non_increasing_extent() {
        let provider = ElevationProvider::gsi().unwrap();
        let extent = Extent::new(1000.0, 0.0, 1000.0, 1000.0);
        let err = provider
            .read_block(extent, 4, 4, &IdentityProjection)
            .await
            .unwrap_err();
        assert!(matches!(err, ElevError::InvalidExtent { .. }));
    }

    #[tokio::test]
    async fn test_read_block_rejects_oversized_request_without_fetching() {
        // A fine resolution over a huge extent needs far more than 128
        // tiles; the unroutable template guarantees the rejection happens
        // before any request is attempted.
        let provider = ElevationProvider::new("http://invalid.invalid/{z}/{x}/{y}.txt").unwrap();
        let extent = Extent::new(-TSIZE1, -TSIZE1, TSIZE1, TSIZE1);
        let err = provider
            .read_block(extent, 8192, 8192, &IdentityProjection)
            .await
            .unwrap_err();
        assert!(matches!(err, ElevError::TooManyTiles { .. }));
    }

    #[tokio::test]
    async fn test_get_value_rejects_bad_zoom() {
        let provider = ElevationProvider::gsi().unwrap();
        let err = provider
            .get_value(0.0, 0.0, 15, &IdentityProjection)
            .await
            .unwrap_err();
        assert!(matches!(err, ElevError::InvalidZoomLevel(15)));
    }
}
