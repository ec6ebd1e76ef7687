//! Concurrent tile fetching and wire-format parsing.
//!
//! Tiles are served as plain UTF-8 text: 256 rows separated by newlines,
//! 256 comma-separated decimal values per row, one value per pixel. A token
//! that does not parse as a finite number stands for "no data" and becomes
//! 0, as does any pixel a short response never covers.

use crate::coords::{TileCoord, TileRange, TILE_SIZE};
use crate::grid::{TileBuffer, TileGrid};
use tokio::task::JoinSet;
use tracing::debug;

/// Fetches all tiles of a tile-index rectangle and assembles them into a
/// [`TileGrid`].
///
/// One HTTP request is issued per tile, all of them concurrently; the
/// fetch resolves only after every request has settled. A failed request
/// leaves its tile absent in the grid (sampled as no-data downstream) and
/// is never surfaced as an error.
#[derive(Debug, Clone)]
pub struct TileFetcher {
    /// HTTP client shared by all tile requests.
    client: reqwest::Client,
    /// URL template with `{z}`, `{x}`, `{y}` placeholders.
    url_template: String,
}

impl TileFetcher {
    /// Create a fetcher for the given URL template.
    pub fn new(url_template: impl Into<String>) -> crate::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// The configured URL template.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Fetch every tile in `range` at `zoom` and return the populated grid.
    ///
    /// Fan-out/fan-in: all requests run concurrently and this resolves
    /// once the last of them settles; a slow tile delays the join but
    /// never aborts the others. Individual failures are logged at debug
    /// level and leave the tile absent.
    pub async fn fetch_tiles(&self, zoom: u8, range: TileRange) -> TileGrid {
        let mut grid = TileGrid::new(zoom, range);

        let mut requests = JoinSet::new();
        for (x, y) in range.iter() {
            let url = TileCoord::new(zoom, x, y).url(&self.url_template);
            let client = self.client.clone();
            requests.spawn(async move { (x, y, fetch_one(&client, &url).await) });
        }

        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok((x, y, Ok(buffer))) => grid.set(x, y, buffer),
                Ok((x, y, Err(error))) => {
                    debug!(zoom, x, y, %error, "tile fetch failed, leaving as no-data");
                }
                Err(error) => debug!(%error, "tile task aborted"),
            }
        }
        grid
    }
}

/// Fetch and parse a single tile.
async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<TileBuffer, reqwest::Error> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(parse_tile_body(&body))
}

/// Parse a tile response body into a full pixel buffer.
///
/// Rows are newline-delimited, values comma-delimited. Every pixel not
/// covered by a finite numeric token is 0.
fn parse_tile_body(body: &str) -> TileBuffer {
    let mut values = vec![0.0f32; TILE_SIZE * TILE_SIZE];
    for (slot, token) in values.iter_mut().zip(body.split([',', '\n'])) {
        if let Ok(value) = token.trim().parse::<f32>() {
            if value.is_finite() {
                *slot = value;
            }
        }
    }
    values
}
