//! Shared application state

use crate::config::AppConfig;
use crate::error::Result;
use crate::video::{open_source, FrameEmitter, ScaleConfig, SourceConfig, Transcoder};

/// State shared across request handlers.
///
/// Holds only the immutable configuration; each streaming request builds a
/// fresh emitter (and with it a fresh device handle) through `new_emitter`.
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Build a fresh source-backed emitter from the configuration.
    ///
    /// Fails with `DeviceUnavailable` if the camera is absent or already
    /// held (one active handle per device).
    pub fn new_emitter(&self) -> Result<FrameEmitter> {
        let source = open_source(&SourceConfig {
            device: self.config.device.clone(),
            capture_size: self.config.capture_size,
            fps: 0,
        })?;
        let transcoder = Transcoder::new(
            ScaleConfig::new(self.config.scale_percent)?,
            self.config.jpeg_quality,
        );
        Ok(FrameEmitter::new(source, transcoder))
    }
}
