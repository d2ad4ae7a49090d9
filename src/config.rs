//! Process configuration and logging setup
//!
//! All configuration is fixed at process start from CLI flags; there is no
//! mutable runtime configuration.

use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, Result};
use crate::video::format::Resolution;

/// Default capture device
pub const DEFAULT_DEVICE: &str = "/dev/video0";
/// Default output scale (percent of original size)
pub const DEFAULT_SCALE_PERCENT: u32 = 50;
/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
/// Default publish rate for the timer-driven publisher
pub const DEFAULT_FPS: u32 = 10;

/// Application configuration shared by both binaries
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera device path (`stub://name` selects a synthetic source)
    pub device: String,
    /// Requested capture resolution (the driver may negotiate another)
    pub capture_size: Resolution,
    /// Output scale as percent of the captured size (1-100 intended)
    pub scale_percent: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Publish rate for the timer-driven publisher
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            capture_size: Resolution::VGA,
            scale_percent: DEFAULT_SCALE_PERCENT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            fps: DEFAULT_FPS,
        }
    }
}

impl AppConfig {
    /// Validate ranges that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.scale_percent == 0 {
            return Err(AppError::Config("scale percent must be >= 1".to_string()));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(AppError::Config(
                "jpeg quality must be in 1..=100".to_string(),
            ));
        }
        if self.fps == 0 {
            return Err(AppError::Config("fps must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Initialize tracing with a CLI-selected level.
///
/// The `RUST_LOG` environment variable takes priority over the flag.
pub fn init_logging(level: LogLevel, verbose_count: u8) {
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "camdash=error,tower_http=error",
        LogLevel::Warn => "camdash=warn,tower_http=warn",
        LogLevel::Info => "camdash=info,tower_http=info",
        LogLevel::Debug => "camdash=debug,tower_http=debug",
        LogLevel::Trace => "camdash=trace,tower_http=debug",
    };

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_scale_rejected() {
        let config = AppConfig {
            scale_percent: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_fps_rejected() {
        let config = AppConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
