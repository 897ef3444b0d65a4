#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for soil map unit lookups.
//!
//! `lookup` and `mukeys` query Soil Data Access directly and print JSON
//! to stdout; `serve` starts the HTTP API.

use std::time::Duration;

use clap::{Parser, Subcommand};
use dirtio_sda::{SdaClient, SdaConfig, SoilDataAccess as _};
use dirtio_server_models::{
    ApiPolygonRow, NO_POLYGONS_MESSAGE, SoilDataResponse, SoilMessageResponse,
};
use dirtio_soil::SoilLookup;
use dirtio_soil_models::QueryPoint;
use dirtio_spatial::ParsePolicy;

#[derive(Parser)]
#[command(name = "dirtio", about = "Soil map unit lookup tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the map unit polygons containing a point
    Lookup {
        /// Longitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Latitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Handling of invalid upstream geometry ("fail-fast" or
        /// "skip-invalid"). Overrides `DIRTIO_GEOMETRY_POLICY`.
        #[arg(long)]
        policy: Option<ParsePolicy>,
        /// Upstream request timeout in seconds (overrides `SDA_TIMEOUT_SECS`)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the keys of the map units intersecting a point
    Mukeys {
        /// Longitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Latitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Upstream request timeout in seconds (overrides `SDA_TIMEOUT_SECS`)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            lon,
            lat,
            policy,
            timeout,
        } => {
            let point = QueryPoint::new(lon, lat)?;
            let policy = match policy {
                Some(policy) => policy,
                None => dirtio_soil::policy_from_env()?,
            };
            let client = build_client(timeout)?;

            let output = match dirtio_soil::lookup(&client, &point, policy).await? {
                SoilLookup::NoCandidates => serde_json::to_string_pretty(&SoilMessageResponse {
                    message: NO_POLYGONS_MESSAGE.to_string(),
                })?,
                SoilLookup::Matches(matches) => serde_json::to_string_pretty(&SoilDataResponse {
                    data: matches.into_iter().map(ApiPolygonRow::from).collect(),
                })?,
            };
            println!("{output}");
        }
        Commands::Mukeys { lon, lat, timeout } => {
            let point = QueryPoint::new(lon, lat)?;
            let client = build_client(timeout)?;
            let keys = client.map_unit_keys(&point).await?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        Commands::Serve { bind, port } => {
            let mut config = dirtio_server::ServerConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }

            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(dirtio_server::run_server(config))
            })
            .await??;
        }
    }

    Ok(())
}

fn build_client(timeout_secs: Option<u64>) -> Result<SdaClient, Box<dyn std::error::Error>> {
    let mut config = SdaConfig::from_env()?;
    if let Some(secs) = timeout_secs.filter(|s| *s > 0) {
        config.timeout = Duration::from_secs(secs);
    }
    log::debug!("Soil Data Access config: {config:?}");
    Ok(SdaClient::new(config)?)
}
