#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for soil map unit lookups.
//!
//! Serves `GET /soil?lon=<f64>&lat=<f64>`, which asks Soil Data Access for
//! the map unit polygons around the point and returns the ones that
//! contain it. The upstream client is held behind [`SoilDataAccess`] in
//! [`AppState`] so tests can swap in an in-memory source.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use dirtio_sda::{SdaClient, SdaConfig, SoilDataAccess};
use dirtio_spatial::ParsePolicy;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Shared application state.
pub struct AppState {
    /// Upstream map unit polygon source.
    pub source: Arc<dyn SoilDataAccess>,
    /// How to treat candidate rows with invalid geometry.
    pub policy: ParsePolicy,
}

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default [`DEFAULT_PORT`]).
    pub port: u16,
    /// Soil Data Access connection settings.
    pub sda: SdaConfig,
    /// Invalid-geometry policy (`DIRTIO_GEOMETRY_POLICY`).
    pub policy: ParsePolicy,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, the SDA variables, and the geometry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDA settings or the geometry policy are
    /// invalid.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let sda = SdaConfig::from_env().map_err(std::io::Error::other)?;
        let policy = dirtio_soil::policy_from_env().map_err(std::io::Error::other)?;

        Ok(Self {
            bind_addr,
            port,
            sda,
            policy,
        })
    }
}

/// Registers the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/soil", web::get().to(handlers::soil));
}

/// Starts the soil API server.
///
/// Builds the Soil Data Access client and serves until shutdown. Logger
/// initialization is left to the caller. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, or the server
/// fails to bind or encounters a runtime error.
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Using Soil Data Access at {} (timeout {:?}, geometry policy {})",
        config.sda.url,
        config.sda.timeout,
        config.policy,
    );
    let client = SdaClient::new(config.sda).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState {
        source: Arc::new(client),
        policy: config.policy,
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
