//! Tile matrix coordinate math.
//!
//! The tile scheme is a power-of-two quad matrix over a square world extent
//! of `[-TSIZE1, TSIZE1]` projected meters in each axis (the spherical
//! Mercator world square). At zoom `z` the matrix is `2^z` tiles on a side,
//! with the y origin at the north edge and y increasing southward.

/// Pixel width and height of one source tile.
pub const TILE_SIZE: usize = 256;

/// Half the world extent in projected meters (the spherical Mercator bound).
pub const TSIZE1: f64 = 20037508.342789244;

/// Maximum zoom level served by the tile source.
pub const ZMAX: u8 = 14;

/// A rectangle in world (projected) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// West edge.
    pub min_x: f64,
    /// South edge.
    pub min_y: f64,
    /// East edge.
    pub max_x: f64,
    /// North edge.
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A degenerate extent covering a single point.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Width in world units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in world units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether both axes are strictly increasing.
    pub fn is_increasing(&self) -> bool {
        self.max_x > self.min_x && self.max_y > self.min_y
    }
}

/// Tile matrix coordinates (z, x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0-14).
    pub z: u8,
    /// X coordinate (column, 0 at the west edge, increases eastward).
    pub x: u32,
    /// Y coordinate (row, 0 at the north edge, increases southward).
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    ///
    /// # Panics
    /// Panics if the zoom level or coordinates are out of range.
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        assert!(z <= ZMAX, "zoom {} out of range (max {})", z, ZMAX);
        let max_coord = 1u32 << z;
        assert!(x < max_coord, "x={} out of range for zoom {}", x, z);
        assert!(y < max_coord, "y={} out of range for zoom {}", y, z);
        Self { z, x, y }
    }

    /// Produce the tile URL by substituting `{z}`, `{x}` and `{y}` into a
    /// template string.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// An inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Westmost column.
    pub min_x: u32,
    /// Northmost row.
    pub min_y: u32,
    /// Eastmost column (inclusive).
    pub max_x: u32,
    /// Southmost row (inclusive).
    pub max_y: u32,
}

impl TileRange {
    /// Number of tile columns.
    pub fn cols(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    /// Number of tile rows.
    pub fn rows(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }

    /// Total number of tiles in the rectangle.
    pub fn count(&self) -> usize {
        self.cols() * self.rows()
    }

    /// Whether a tile index lies within the rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Iterate over the contained tile indices in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> {
        let range = *self;
        (range.min_y..=range.max_y)
            .flat_map(move |y| (range.min_x..=range.max_x).map(move |x| (x, y)))
    }
}

/// World-unit width of one tile at the given zoom level.
///
/// Zoom 0 is a single tile covering the full world square.
pub fn tile_world_size(zoom: u8) -> f64 {
    TSIZE1 / 2f64.powi(zoom as i32 - 1)
}

/// Choose the coarsest zoom level whose native resolution is at least as
/// fine as the requested map-units-per-pixel, capped at [`ZMAX`].
pub fn zoom_for_resolution(map_units_per_pixel: f64) -> u8 {
    let mpp1 = TSIZE1 / TILE_SIZE as f64;
    let zoom = ((mpp1 / map_units_per_pixel).log2() + 1.0).ceil();
    zoom.clamp(0.0, ZMAX as f64) as u8
}

/// Compute the inclusive tile-index rectangle covering an extent at a zoom
/// level. Indices are clamped to the tile matrix, so an extent reaching
/// past the world square maps to the matrix edge.
pub fn tile_range(extent: Extent, zoom: u8) -> TileRange {
    assert!(zoom <= ZMAX, "zoom {} out of range (max {})", zoom, ZMAX);
    let tile_size = tile_world_size(zoom);
    let max_index = ((1u32 << zoom) - 1) as f64;

    let ulx = ((extent.min_x + TSIZE1) / tile_size).floor().clamp(0.0, max_index);
    let uly = ((TSIZE1 - extent.max_y) / tile_size).floor().clamp(0.0, max_index);
    let lrx = ((extent.max_x + TSIZE1) / tile_size).floor().clamp(0.0, max_index);
    let lry = ((TSIZE1 - extent.min_y) / tile_size).floor().clamp(0.0, max_index);

    TileRange {
        min_x: ulx as u32,
        min_y: uly as u32,
        max_x: lrx as u32,
        max_y: lry as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tile_world_size() {
        // Zoom 0 is one tile covering the whole world square.
        assert_relative_eq!(tile_world_size(0), 2.0 * TSIZE1);
        assert_relative_eq!(tile_world_size(1), TSIZE1);
        // Each zoom level halves the tile size.
        for z in 1..=ZMAX {
            assert_relative_eq!(tile_world_size(z), tile_world_size(z - 1) / 2.0);
        }
    }

    #[test]
    fn test_zoom_resolution_roundtrip() {
        // The native resolution of zoom z must select zoom z.
        for z in 0..=ZMAX {
            let native = tile_world_size(z) / TILE_SIZE as f64;
            assert_eq!(zoom_for_resolution(native), z, "zoom {}", z);
        }
    }

    #[test]
    fn test_zoom_for_resolution_caps() {
        // Finer than zoom 14 native resolution still selects 14.
        assert_eq!(zoom_for_resolution(0.001), ZMAX);
        // Coarser than zoom 0 native resolution clamps to 0.
        assert_eq!(zoom_for_resolution(TSIZE1), 0);
    }

    #[test]
    fn test_zoom_for_resolution_rounds_up() {
        // A resolution between the native resolutions of zooms 5 and 6
        // picks the finer level.
        let between = tile_world_size(6) / TILE_SIZE as f64 * 1.5;
        assert_eq!(zoom_for_resolution(between), 6);
    }

    #[test]
    fn test_tile_range_full_world() {
        let world = Extent::new(-TSIZE1, -TSIZE1, TSIZE1, TSIZE1);
        assert_eq!(
            tile_range(world, 0),
            TileRange {
                min_x: 0,
                min_y: 0,
                max_x: 0,
                max_y: 0
            }
        );
        let range = tile_range(world, 3);
        assert_eq!((range.min_x, range.min_y), (0, 0));
        assert_eq!((range.max_x, range.max_y), (7, 7));
        assert_eq!(range.count(), 64);
    }

    #[test]
    fn test_tile_range_single_tile() {
        // The first quadrant tile at zoom 2 spans [0, ts] x [0, ts] in x
        // and sits just below the north half in y.
        let ts = tile_world_size(2);
        let extent = Extent::new(0.1, 0.1, ts - 0.1, ts - 0.1);
        let range = tile_range(extent, 2);
        assert_eq!(
            range,
            TileRange {
                min_x: 2,
                min_y: 1,
                max_x: 2,
                max_y: 1
            }
        );
    }

    #[test]
    fn test_tile_range_monotonic() {
        // Widening the extent never shrinks the tile rectangle.
        let base = Extent::new(-1000.0, -1000.0, 1000.0, 1000.0);
        let mut prev = tile_range(base, 10);
        for grow in 1..20 {
            let pad = grow as f64 * 100_000.0;
            let wider = Extent::new(
                base.min_x - pad,
                base.min_y - pad,
                base.max_x + pad,
                base.max_y + pad,
            );
            let range = tile_range(wider, 10);
            assert!(range.min_x <= prev.min_x);
            assert!(range.min_y <= prev.min_y);
            assert!(range.max_x >= prev.max_x);
            assert!(range.max_y >= prev.max_y);
            prev = range;
        }
    }

    #[test]
    fn test_tile_range_y_origin_north() {
        // An extent hugging the north edge maps to row 0.
        let ts = tile_world_size(4);
        let north = Extent::new(0.0, TSIZE1 - ts / 2.0, ts / 2.0, TSIZE1 - 1.0);
        let range = tile_range(north, 4);
        assert_eq!(range.min_y, 0);
        assert_eq!(range.max_y, 0);
    }

    #[test]
    fn test_tile_range_iter_row_major() {
        let range = TileRange {
            min_x: 3,
            min_y: 7,
            max_x: 4,
            max_y: 8,
        };
        let tiles: Vec<_> = range.iter().collect();
        assert_eq!(tiles, vec![(3, 7), (4, 7), (3, 8), (4, 8)]);
    }

    #[test]
    fn test_tile_url() {
        let coord = TileCoord::new(14, 14552, 6451);
        assert_eq!(
            coord.url("http://cyberjapandata.gsi.go.jp/xyz/dem/{z}/{x}/{y}.txt"),
            "http://cyberjapandata.gsi.go.jp/xyz/dem/14/14552/6451.txt"
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_tile_coord_rejects_out_of_matrix() {
        TileCoord::new(2, 4, 0);
    }

    #[test]
    fn test_extent_helpers() {
        let extent = Extent::new(-10.0, -20.0, 30.0, 20.0);
        assert_relative_eq!(extent.width(), 40.0);
        assert_relative_eq!(extent.height(), 40.0);
        assert!(extent.is_increasing());
        assert!(!Extent::point(5.0, 5.0).is_increasing());
    }
}
