//! Error types for elevation tile requests.

use thiserror::Error;

/// Errors surfaced by the public provider API.
///
/// Data-quality failures (a missing tile, a malformed value inside a tile)
/// are deliberately not represented here: they degrade to no-data samples
/// instead of failing the request.
#[derive(Debug, Error)]
pub enum ElevError {
    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Requested extent/resolution needs more tiles than one request may
    /// fetch; nothing was downloaded.
    #[error("request requires {required} tiles, more than the limit of {cap}")]
    TooManyTiles {
        /// Tiles the request would have fetched.
        required: usize,
        /// Admission cap.
        cap: usize,
    },

    /// Extent is not strictly increasing in both axes.
    #[error("invalid extent: ({min_x}, {min_y}, {max_x}, {max_y}) is not increasing")]
    InvalidExtent {
        /// West edge.
        min_x: f64,
        /// South edge.
        min_y: f64,
        /// East edge.
        max_x: f64,
        /// North edge.
        max_y: f64,
    },

    /// Output grid has a zero dimension.
    #[error("invalid sample grid size {width}x{height}")]
    InvalidGridSize {
        /// Requested grid columns.
        width: usize,
        /// Requested grid rows.
        height: usize,
    },

    /// Invalid zoom level.
    #[error("invalid zoom level {0} (must be 0-14)")]
    InvalidZoomLevel(u8),
}
