//! # elevtile
//!
//! Elevation sample grids assembled from tiled web DEM services.
//!
//! This crate fetches digital-elevation-model raster tiles from an XYZ
//! tile service and resamples them onto an arbitrary caller-requested
//! grid, so map-rendering clients get per-pixel or per-vertex elevation
//! without doing any tile math themselves.
//!
//! ## Overview
//!
//! A request goes through four stages:
//!
//! 1. The requested extent and output resolution select a zoom level and
//!    an inclusive tile-index rectangle ([`zoom_for_resolution`],
//!    [`tile_range`]).
//! 2. An admission check caps the request at
//!    [`MAX_TILES_PER_REQUEST`] tiles.
//! 3. All needed tiles are fetched concurrently and assembled into a
//!    contiguous virtual raster ([`TileFetcher`], [`TileGrid`]).
//! 4. The raster is resampled onto the output grid with nearest-neighbor
//!    lookup ([`TileGrid::read`]).
//!
//! Missing tiles and malformed values never fail a request; they sample
//! as the no-data value 0. Only the admission cap and caller-contract
//! violations surface as errors.
//!
//! ## Tile scheme
//!
//! Tiles are 256x256 rasters in a power-of-two matrix over the square
//! world extent `[-TSIZE1, TSIZE1]` of projected meters, y origin at the
//! north edge. The wire format is plain text: newline-separated rows of
//! comma-separated decimal values. The default source is the GSI
//! elevation tile service ([`GSI_DEM_URL_TEMPLATE`]).
//!
//! ## Example
//!
//! ```no_run
//! use elevtile::{ElevationProvider, Extent, IdentityProjection};
//!
//! # async fn sample() -> elevtile::Result<()> {
//! let provider = ElevationProvider::gsi()?;
//!
//! // A block around Mt. Fuji in projected (EPSG:3857-style) meters.
//! let extent = Extent::new(15443000.0, 4212000.0, 15457000.0, 4226000.0);
//! let values = provider.read_block(extent, 128, 128, &IdentityProjection).await?;
//! assert_eq!(values.len(), 128 * 128);
//!
//! // Single-point convenience lookup.
//! let summit = provider.get_value(15443650.0, 4222000.0, 14, &IdentityProjection).await?;
//! println!("elevation: {} m", summit);
//! # Ok(())
//! # }
//! ```

mod coords;
mod error;
mod fetch;
mod grid;
mod projection;
mod provider;

pub use coords::{
    tile_range, tile_world_size, zoom_for_resolution, Extent, TileCoord, TileRange, TILE_SIZE,
    TSIZE1, ZMAX,
};
pub use error::ElevError;
pub use fetch::TileFetcher;
pub use grid::{TileBuffer, TileGrid, NODATA};
pub use projection::{IdentityProjection, Projection};
pub use provider::{ElevationProvider, GSI_DEM_URL_TEMPLATE, MAX_TILES_PER_REQUEST};

/// Result type for elevation tile operations.
pub type Result<T> = std::result::Result<T, ElevError>;
