//! Command-line elevation query tool.
//!
//! Samples a block or a single point from a tiled web DEM service and
//! prints the values. Coordinates are world (projected) meters in the
//! tile scheme's coordinate system.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elevtile::{ElevationProvider, Extent, IdentityProjection, GSI_DEM_URL_TEMPLATE, ZMAX};

#[derive(Parser)]
#[command(name = "elevtile", about = "Query elevations from a tiled web DEM service")]
struct Cli {
    /// Tile source URL template with {z}, {x} and {y} placeholders.
    #[arg(long, global = true, default_value = GSI_DEM_URL_TEMPLATE)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sample a rectangular grid of elevations and print it as CSV rows,
    /// north row first.
    Block {
        /// World extent as min-x,min-y,max-x,max-y.
        #[arg(long, value_parser = parse_extent, allow_hyphen_values = true)]
        extent: Extent,

        /// Output grid columns.
        #[arg(long, default_value_t = 16)]
        width: usize,

        /// Output grid rows.
        #[arg(long, default_value_t = 16)]
        height: usize,
    },
    /// Sample the elevation at a single world point.
    Point {
        /// World x coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// World y coordinate.
        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Zoom level of the tile to sample.
        #[arg(long, default_value_t = ZMAX)]
        zoom: u8,
    },
}

fn parse_extent(arg: &str) -> std::result::Result<Extent, String> {
    let parts = arg
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad coordinate {:?}: {}", part.trim(), e))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    if parts.len() != 4 {
        return Err(format!(
            "expected four comma-separated coordinates, got {}",
            parts.len()
        ));
    }
    Ok(Extent::new(parts[0], parts[1], parts[2], parts[3]))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let provider = ElevationProvider::new(cli.url.as_str()).context("building HTTP client")?;

    match cli.command {
        Command::Block {
            extent,
            width,
            height,
        } => {
            let values = provider
                .read_block(extent, width, height, &IdentityProjection)
                .await?;
            for row in values.chunks(width) {
                let line = row
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                println!("{line}");
            }
        }
        Command::Point { x, y, zoom } => {
            let value = provider.get_value(x, y, zoom, &IdentityProjection).await?;
            println!("{value}");
        }
    }

    Ok(())
}
