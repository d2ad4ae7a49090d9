//! Frame data structures

use bytes::Bytes;
use image::RgbImage;
use std::time::Instant;

use super::format::Resolution;

/// A raw captured frame: an owned RGB bitmap.
///
/// Produced fresh per capture and owned exclusively by the caller until it
/// is transcoded or dropped.
#[derive(Debug, Clone)]
pub struct RawFrame {
    image: RgbImage,
    /// Timestamp when the frame was captured
    pub capture_ts: Instant,
}

impl RawFrame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            capture_ts: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// An encoded JPEG frame.
///
/// Immutable byte buffer with metadata; cloning is cheap (`Bytes`).
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    data: Bytes,
    /// Resolution of the encoded image
    pub resolution: Resolution,
    /// Monotonically increasing sequence number per emitter
    pub sequence: u64,
    /// Timestamp when the underlying raw frame was captured
    pub capture_ts: Instant,
}

impl EncodedFrame {
    pub fn new(data: Bytes, resolution: Resolution, sequence: u64, capture_ts: Instant) -> Self {
        Self {
            data,
            resolution,
            sequence,
            capture_ts,
        }
    }

    /// Get frame data as bytes slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get frame data as Bytes (cheap clone)
    pub fn data_bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Validate JPEG frame data by its start/end markers
    pub fn is_valid_jpeg(&self) -> bool {
        is_valid_jpeg(&self.data)
    }
}

/// Check the JPEG SOI/EOI markers
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }
    if data[0] != 0xFF || data[1] != 0xD8 {
        return false;
    }
    let end = data.len();
    data[end - 2] == 0xFF && data[end - 1] == 0xD9
}
