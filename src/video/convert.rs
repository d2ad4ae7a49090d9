//! Pixel format conversion (YUYV 4:2:2 to RGB24)

use image::RgbImage;

use crate::error::{AppError, Result};

/// Convert a packed YUYV 4:2:2 buffer to an RGB image.
///
/// BT.601 coefficients. Width must be even (YUYV packs two pixels per
/// four bytes).
pub fn yuyv_to_rgb(pixels: &[u8], width: u32, height: u32) -> Result<RgbImage> {
    if width % 2 != 0 {
        return Err(AppError::CaptureError(format!(
            "YUYV width must be even, got {width}"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(2))
        .ok_or_else(|| AppError::CaptureError("YUYV frame dimensions overflow".to_string()))?;
    if pixels.len() < expected {
        return Err(AppError::CaptureError(format!(
            "YUYV frame too short: expected {expected} bytes, got {}",
            pixels.len()
        )));
    }

    let w = width as usize;
    let mut rgb = vec![0u8; w * height as usize * 3];
    for row in 0..height as usize {
        for pair in 0..w / 2 {
            let src = (row * w + pair * 2) * 2;
            let y0 = pixels[src] as f32;
            let u = pixels[src + 1] as f32 - 128.0;
            let y1 = pixels[src + 2] as f32;
            let v = pixels[src + 3] as f32 - 128.0;

            let dst = (row * w + pair * 2) * 3;
            write_pixel(&mut rgb[dst..dst + 3], y0, u, v);
            write_pixel(&mut rgb[dst + 3..dst + 6], y1, u, v);
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| AppError::CaptureError("converted buffer size mismatch".to_string()))
}

fn write_pixel(dst: &mut [u8], y: f32, u: f32, v: f32) {
    let r = y + 1.402_f32 * v;
    let g = y - 0.344_136_f32 * u - 0.714_136_f32 * v;
    let b = y + 1.772_f32 * u;
    dst[0] = clamp_to_u8(r);
    dst[1] = clamp_to_u8(g);
    dst[2] = clamp_to_u8(b);
}

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_chroma_produces_gray() {
        // Y=128, U=V=128 means mid-gray in BT.601
        let yuyv = vec![128u8; 2 * 2 * 2];
        let rgb = yuyv_to_rgb(&yuyv, 2, 2).unwrap();
        assert!(rgb.pixels().all(|p| p.0 == [128, 128, 128]));
    }

    #[test]
    fn short_buffer_rejected() {
        assert!(yuyv_to_rgb(&[0u8; 4], 4, 4).is_err());
    }

    #[test]
    fn odd_width_rejected() {
        assert!(yuyv_to_rgb(&[0u8; 64], 3, 2).is_err());
    }
}
