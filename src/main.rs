//! imagemill - an on-demand image derivative server.
//!
//! This binary parses configuration, wires the components together, and
//! runs the HTTP server.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imagemill::{
    config::Config,
    derivative::DerivativeService,
    server::{create_router, RouterConfig},
    source::FsImageSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // Fail fast if the image directory is missing rather than 404-ing
    // every request.
    if !config.image_dir.is_dir() {
        error!(
            "Image directory does not exist: {}",
            config.image_dir.display()
        );
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Image directory: {}", config.image_dir.display());
    match config.static_dir() {
        Some(dir) => info!("  Static files: {}", dir.display()),
        None => info!("  Static files: disabled"),
    }
    info!(
        "  Cache: {} entries, {}s TTL",
        config.cache_entries, config.cache_ttl
    );
    info!(
        "  Derivatives: default width {}px, JPEG quality {}",
        config.default_width, config.jpeg_quality
    );

    let source = Arc::new(FsImageSource::new(config.image_dir.clone()));
    let service = DerivativeService::with_limits(
        source,
        config.cache_entries,
        config.cache_ttl(),
        config.jpeg_quality,
    );

    let router_config = build_router_config(&config);
    let router = create_router(service, router_config);

    let addr = config.bind_address();
    info!("Server listening on http://{}", addr);
    info!("  Try: curl 'http://{}/images/<name>?width=400'", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imagemill=debug,tower_http=debug"
    } else {
        "imagemill=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_default_width(config.default_width)
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    if let Some(static_dir) = config.static_dir() {
        router_config = router_config.with_static_dir(static_dir);
    }

    router_config
}
