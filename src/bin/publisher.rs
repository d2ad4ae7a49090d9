//! Timer-driven publisher process: captures frames at a fixed rate and
//! publishes them to the camera topic until shutdown.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;

use camdash::config::{self, AppConfig, LogLevel};
use camdash::stream::{FramePublisher, FrameTopic};
use camdash::video::{open_source, FrameEmitter, Resolution, ScaleConfig, SourceConfig, Transcoder};

/// cam-publisher command line arguments
#[derive(Parser, Debug)]
#[command(name = "cam-publisher")]
#[command(version, about = "Timer-driven camera frame publisher", long_about = None)]
struct CliArgs {
    /// Camera device path (stub://name selects a synthetic source)
    #[arg(short = 'd', long, value_name = "PATH", default_value = config::DEFAULT_DEVICE)]
    device: String,

    /// Requested capture width
    #[arg(long, value_name = "PIXELS", default_value_t = 640)]
    width: u32,

    /// Requested capture height
    #[arg(long, value_name = "PIXELS", default_value_t = 480)]
    height: u32,

    /// Publish rate in frames per second
    #[arg(short = 'f', long, value_name = "FPS", default_value_t = config::DEFAULT_FPS)]
    fps: u32,

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

    tracing::info!("Starting cam-publisher v{}", env!("CARGO_PKG_VERSION"));

    let app_config = AppConfig {
        device: args.device,
        capture_size: Resolution::new(args.width, args.height),
        scale_percent: args.scale_percent,
        jpeg_quality: args.jpeg_quality,
        fps: args.fps,
    };
    app_config.validate()?;

    // Fatal at startup if the camera cannot be acquired
    let source = open_source(&SourceConfig {
        device: app_config.device.clone(),
        capture_size: app_config.capture_size,
        fps: app_config.fps,
    })?;
    let transcoder = Transcoder::new(
        ScaleConfig::new(app_config.scale_percent)?,
        app_config.jpeg_quality,
    );
    let emitter = FrameEmitter::new(source, transcoder);

    let topic = Arc::new(FrameTopic::camera());
    let publisher = FramePublisher::new(emitter, topic, app_config.fps);

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        }
    });

    publisher.run(shutdown_rx).await?;

    tracing::info!("Publisher shutdown complete");
    Ok(())
}
