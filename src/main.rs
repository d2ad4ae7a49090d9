use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use camdash::config::{self, AppConfig, LogLevel};
use camdash::state::AppState;
use camdash::video::Resolution;
use camdash::web;

/// camdash command line arguments
#[derive(Parser, Debug)]
#[command(name = "camdash")]
#[command(version, about = "Webcam dashboard server (MJPEG over HTTP)", long_about = None)]
struct CliArgs {
    /// Listen address
    #[arg(short = 'a', long, value_name = "ADDRESS", default_value = "0.0.0.0")]
    address: String,

    /// HTTP port
    #[arg(short = 'p', long, value_name = "PORT", default_value_t = 8080)]
    port: u16,

    /// Camera device path (stub://name selects a synthetic source)
    #[arg(short = 'd', long, value_name = "PATH", default_value = config::DEFAULT_DEVICE)]
    device: String,

    /// Requested capture width
    #[arg(long, value_name = "PIXELS", default_value_t = 640)]
    width: u32,

    /// Requested capture height
    #[arg(long, value_name = "PIXELS", default_value_t = 480)]
    height: u32,

    /// Output scale as percent of the captured size
    #[arg(short = 's', long, value_name = "PERCENT", default_value_t = config::DEFAULT_SCALE_PERCENT)]
    scale_percent: u32,

    /// JPEG quality (1-100)
    #[arg(short = 'q', long, value_name = "QUALITY", default_value_t = config::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    config::init_logging(args.log_level, args.verbose);

    tracing::info!("Starting camdash v{}", env!("CARGO_PKG_VERSION"));

    let app_config = AppConfig {
        device: args.device,
        capture_size: Resolution::new(args.width, args.height),
        scale_percent: args.scale_percent,
        jpeg_quality: args.jpeg_quality,
        ..Default::default()
    };
    app_config.validate()?;

    let state = Arc::new(AppState::new(app_config));
    let router = web::create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.address, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Dashboard listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Shutdown signal received");
}
