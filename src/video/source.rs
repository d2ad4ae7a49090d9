//! Frame sources
//!
//! A `FrameSource` owns a camera device handle and produces one `RawFrame`
//! per `capture()` call. `open_source` selects the backend from the device
//! path: `stub://...` yields a synthetic source (tests, camera-less
//! development), anything else opens a V4L2 device.
//!
//! The camera device is a process-wide exclusive resource. A global claim
//! registry makes the "one active source per device" rule an explicit
//! fail-fast invariant; the claim is released on every exit path via `Drop`.

use image::RgbImage;
use ouroboros::self_referencing;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::convert;
use super::format::{PixelFormat, Resolution};
use super::frame::RawFrame;
use crate::error::{AppError, Result};

/// Minimum valid frame size in bytes; shorter reads are driver glitches
const MIN_FRAME_SIZE: usize = 128;
/// Number of memory-mapped capture buffers
const BUFFER_COUNT: u32 = 4;

/// Configuration for opening a frame source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Device path (e.g. "/dev/video0", or "stub://name" for synthetic)
    pub device: String,
    /// Requested capture resolution (the driver may negotiate another)
    pub capture_size: Resolution,
    /// Requested capture rate (0 = driver default)
    pub fps: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            capture_size: Resolution::VGA,
            fps: 0,
        }
    }
}

/// A source of raw frames backed by an exclusively held device
pub trait FrameSource: Send {
    /// Block until the next frame is available and return it as RGB.
    fn capture(&mut self) -> Result<RawFrame>;

    /// Device path this source holds.
    fn device(&self) -> &str;
}

/// Open a frame source for the configured device path.
///
/// Fails with `DeviceUnavailable` if the device cannot be opened or is
/// already held by another source in this process.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn FrameSource>> {
    if config.device.starts_with("stub://") {
        Ok(Box::new(SyntheticSource::open(config)?))
    } else {
        Ok(Box::new(CameraSource::open(config)?))
    }
}

// ----------------------------------------------------------------------------
// Device claim registry
// ----------------------------------------------------------------------------

fn claims() -> &'static Mutex<HashSet<String>> {
    static CLAIMS: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    CLAIMS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Exclusive in-process claim on a device path, released on drop
struct DeviceClaim {
    device: String,
}

impl DeviceClaim {
    fn acquire(device: &str) -> Result<Self> {
        let mut held = claims().lock();
        if !held.insert(device.to_string()) {
            return Err(AppError::DeviceUnavailable {
                device: device.to_string(),
                reason: "already held by another frame source".to_string(),
            });
        }
        Ok(Self {
            device: device.to_string(),
        })
    }
}

impl Drop for DeviceClaim {
    fn drop(&mut self) {
        claims().lock().remove(&self.device);
    }
}

// ----------------------------------------------------------------------------
// V4L2 camera source
// ----------------------------------------------------------------------------

#[self_referencing]
struct CameraState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this>,
}

/// V4L2-backed frame source
pub struct CameraSource {
    state: CameraState,
    device_path: String,
    format: PixelFormat,
    resolution: Resolution,
    claim: DeviceClaim,
}

impl CameraSource {
    /// Acquire the device exclusively and negotiate a capture format.
    ///
    /// MJPG is requested first (cheaper on USB bandwidth), YUYV second; the
    /// fourcc the driver actually reports decides the per-frame decode path.
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let claim = DeviceClaim::acquire(&config.device)?;

        let mut device = v4l::Device::with_path(&config.device).map_err(|e| {
            AppError::DeviceUnavailable {
                device: config.device.clone(),
                reason: e.to_string(),
            }
        })?;

        let (format, resolution) = negotiate_format(&mut device, config)?;

        if config.fps > 0 {
            use v4l::video::Capture;
            let params = v4l::video::capture::Parameters::with_fps(config.fps);
            if let Err(e) = device.set_params(&params) {
                tracing::warn!("Failed to set {} fps on {}: {}", config.fps, config.device, e);
            }
        }

        let state = CameraStateTryBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(
                    device,
                    v4l::buffer::Type::VideoCapture,
                    BUFFER_COUNT,
                )
            },
        }
        .try_build()
        .map_err(|e| AppError::DeviceUnavailable {
            device: config.device.clone(),
            reason: format!("failed to map capture buffers: {e}"),
        })?;

        tracing::info!(
            "Opened {} at {} {}",
            config.device,
            resolution,
            format
        );

        Ok(Self {
            state,
            device_path: config.device.clone(),
            format,
            resolution,
            claim,
        })
    }

    /// Negotiated capture resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Negotiated pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

impl FrameSource for CameraSource {
    fn capture(&mut self) -> Result<RawFrame> {
        // DQBUF blocks until the driver delivers the next frame. The buffer
        // is only valid inside the closure, so the used bytes are copied out.
        let data = self
            .state
            .with_stream_mut(|stream| {
                use v4l::io::traits::CaptureStream;
                stream.next().map(|(buf, meta)| {
                    let used = meta.bytesused as usize;
                    let used = if used == 0 || used > buf.len() {
                        buf.len()
                    } else {
                        used
                    };
                    buf[..used].to_vec()
                })
            })
            .map_err(|e| AppError::CaptureError(format!("{}: {e}", self.device_path)))?;

        if data.len() < MIN_FRAME_SIZE {
            return Err(AppError::CaptureError(format!(
                "{}: undersized frame ({} bytes)",
                self.device_path,
                data.len()
            )));
        }

        let image = match self.format {
            PixelFormat::Mjpeg => image::load_from_memory_with_format(&data, image::ImageFormat::Jpeg)
                .map_err(|e| AppError::CaptureError(format!("MJPEG decode failed: {e}")))?
                .to_rgb8(),
            PixelFormat::Yuyv => {
                convert::yuyv_to_rgb(&data, self.resolution.width, self.resolution.height)?
            }
        };

        Ok(RawFrame::new(image))
    }

    fn device(&self) -> &str {
        &self.claim.device
    }
}

fn negotiate_format(
    device: &mut v4l::Device,
    config: &SourceConfig,
) -> Result<(PixelFormat, Resolution)> {
    use v4l::video::Capture;

    let unavailable = |reason: String| AppError::DeviceUnavailable {
        device: config.device.clone(),
        reason,
    };

    let mut format = device
        .format()
        .map_err(|e| unavailable(format!("failed to read format: {e}")))?;
    format.width = config.capture_size.width;
    format.height = config.capture_size.height;

    for wanted in [PixelFormat::Mjpeg, PixelFormat::Yuyv] {
        format.fourcc = wanted.to_fourcc();
        let actual = device
            .set_format(&format)
            .map_err(|e| unavailable(format!("failed to set format: {e}")))?;
        if let Some(negotiated) = PixelFormat::from_fourcc(actual.fourcc) {
            return Ok((negotiated, Resolution::new(actual.width, actual.height)));
        }
    }

    Err(unavailable("no MJPG or YUYV format available".to_string()))
}

// ----------------------------------------------------------------------------
// Synthetic source (stub:// device paths)
// ----------------------------------------------------------------------------

/// Synthetic frame source for tests and camera-less development.
///
/// Generates a slowly shifting gradient so consecutive frames differ.
pub struct SyntheticSource {
    resolution: Resolution,
    frame_count: u64,
    claim: DeviceClaim,
}

impl SyntheticSource {
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let claim = DeviceClaim::acquire(&config.device)?;
        Ok(Self {
            resolution: config.capture_size,
            frame_count: 0,
            claim,
        })
    }
}

impl FrameSource for SyntheticSource {
    fn capture(&mut self) -> Result<RawFrame> {
        self.frame_count += 1;
        let shift = (self.frame_count % 256) as u32;
        let image = RgbImage::from_fn(self.resolution.width, self.resolution.height, |x, y| {
            image::Rgb([
                ((x + shift) % 256) as u8,
                ((y + shift) % 256) as u8,
                ((x + y) % 256) as u8,
            ])
        });
        Ok(RawFrame::new(image))
    }

    fn device(&self) -> &str {
        &self.claim.device
    }
}
