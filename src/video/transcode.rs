//! Frame transcoding: resize, mirror, JPEG encode
//!
//! Pure transformation with no state beyond configuration. The pipeline
//! order is fixed: resize first (so the mirror touches fewer pixels), then
//! mirror, then encode.

use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::io::Cursor;

use super::format::Resolution;
use super::frame::{EncodedFrame, RawFrame};
use crate::error::{AppError, Result};

/// Output scale as percent of the source size.
///
/// 1..=100 is the intended range; values above 100 are accepted and upscale
/// with the same filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleConfig(u32);

impl ScaleConfig {
    pub fn new(percent: u32) -> Result<Self> {
        if percent == 0 {
            return Err(AppError::Config(
                "scale percent must be >= 1".to_string(),
            ));
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> u32 {
        self.0
    }
}

/// Frame transcoder: fixed resize -> mirror -> encode pipeline
#[derive(Debug, Clone)]
pub struct Transcoder {
    scale: ScaleConfig,
    jpeg_quality: u8,
}

impl Transcoder {
    pub fn new(scale: ScaleConfig, jpeg_quality: u8) -> Self {
        Self {
            scale,
            jpeg_quality,
        }
    }

    /// Scale an image to `floor(dim * percent / 100)` per axis.
    ///
    /// The triangle filter averages neighboring pixels, which is what a
    /// downscale wants; upscaling uses the same filter.
    pub fn resize(&self, image: &RgbImage) -> (RgbImage, Resolution) {
        let dim = scaled_dimensions(image.width(), image.height(), self.scale.percent());
        let resized = imageops::resize(image, dim.width, dim.height, FilterType::Triangle);
        (resized, dim)
    }

    /// Flip horizontally (selfie view)
    pub fn mirror(&self, image: RgbImage) -> RgbImage {
        imageops::flip_horizontal(&image)
    }

    /// Compress to JPEG at the configured quality.
    ///
    /// Fails with `EncodeError` for malformed (e.g. empty) frames.
    pub fn encode(&self, image: &RgbImage) -> Result<Bytes> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AppError::EncodeError("empty frame".to_string()));
        }
        let mut buf = Cursor::new(Vec::with_capacity(
            image.as_raw().len() / 8,
        ));
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| AppError::EncodeError(e.to_string()))?;
        Ok(Bytes::from(buf.into_inner()))
    }

    /// Run the full pipeline on a raw frame, attaching a sequence number.
    pub fn process(&self, raw: RawFrame, sequence: u64) -> Result<EncodedFrame> {
        let capture_ts = raw.capture_ts;
        let (resized, resolution) = self.resize(raw.image());
        let mirrored = self.mirror(resized);
        let data = self.encode(&mirrored)?;
        Ok(EncodedFrame::new(data, resolution, sequence, capture_ts))
    }
}

/// Per-axis floor(dim * percent / 100)
pub fn scaled_dimensions(width: u32, height: u32, percent: u32) -> Resolution {
    Resolution::new(
        (width as u64 * percent as u64 / 100) as u32,
        (height as u64 * percent as u64 / 100) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([40, 120, 200]))
    }

    fn transcoder(percent: u32) -> Transcoder {
        Transcoder::new(ScaleConfig::new(percent).unwrap(), 80)
    }

    #[test]
    fn zero_percent_rejected() {
        assert!(ScaleConfig::new(0).is_err());
        assert_eq!(ScaleConfig::new(50).unwrap().percent(), 50);
    }

    #[test]
    fn resize_floors_each_axis() {
        let image = solid_frame(641, 479);
        for percent in [1, 10, 33, 50, 99, 100] {
            let (resized, dim) = transcoder(percent).resize(&image);
            assert_eq!(dim.width, 641 * percent / 100);
            assert_eq!(dim.height, 479 * percent / 100);
            assert_eq!(resized.width(), dim.width);
            assert_eq!(resized.height(), dim.height);
        }
    }

    #[test]
    fn vga_at_half_scale_is_qvga() {
        let image = solid_frame(640, 480);
        let (resized, dim) = transcoder(50).resize(&image);
        assert_eq!((dim.width, dim.height), (320, 240));

        // Encode and decode back: dimensions must survive the round trip
        let t = transcoder(50);
        let jpeg = t.encode(&resized).unwrap();
        let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .unwrap()
            .to_rgb8();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[test]
    fn double_mirror_is_identity() {
        let image = RgbImage::from_fn(31, 17, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let t = transcoder(100);
        let twice = t.mirror(t.mirror(image.clone()));
        assert_eq!(twice.as_raw(), image.as_raw());
    }

    #[test]
    fn mirror_actually_flips() {
        let mut image = solid_frame(4, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let t = transcoder(100);
        let flipped = t.mirror(image);
        assert_eq!(flipped.get_pixel(3, 0).0, [255, 0, 0]);
    }

    #[test]
    fn encode_preserves_dimensions() {
        let image = solid_frame(123, 77);
        let t = transcoder(100);
        let jpeg = t.encode(&image).unwrap();
        assert!(crate::video::frame::is_valid_jpeg(&jpeg));
        let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (123, 77));
    }

    #[test]
    fn pipeline_shape_is_stable() {
        let t = transcoder(50);
        let a = t
            .process(RawFrame::new(solid_frame(640, 480)), 1)
            .unwrap();
        let b = t
            .process(RawFrame::new(solid_frame(640, 480)), 2)
            .unwrap();
        assert_eq!(a.resolution, b.resolution);
        assert_eq!(a.resolution, Resolution::new(320, 240));
        assert!(a.is_valid_jpeg());
        assert!(b.is_valid_jpeg());
    }

    #[test]
    fn empty_frame_fails_encode() {
        let t = transcoder(100);
        let empty = RgbImage::new(0, 0);
        assert!(matches!(
            t.encode(&empty),
            Err(AppError::EncodeError(_))
        ));
    }
}
