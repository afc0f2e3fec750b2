//! Image conditioning for the local OCR engine.
//!
//! Handwritten notes and phone photos OCR poorly at native resolution. The
//! chain here — grayscale, upscale, median denoise, contrast stretch — is
//! tuned for text, not natural images, and is only applied on the local
//! engine path (the cloud service receives the original bytes).

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use super::ExtractionError;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial uploads.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024; // 20 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// Shortest acceptable edge after upscaling.
const MIN_DIMENSION: u32 = 300;

/// Fixed upscale factor. OCR engines resolve small glyphs far better at 2×.
const UPSCALE_FACTOR: u32 = 2;

/// Contrast stretch factor around the mean luminance.
const CONTRAST_FACTOR: f32 = 2.0;

/// Reject byte streams that cannot plausibly be an image.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::InvalidImage(format!(
            "{} bytes is below the minimum of {MIN_IMAGE_BYTES}",
            bytes.len()
        )));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::InvalidImage(format!(
            "{} bytes exceeds the maximum of {MAX_IMAGE_BYTES}",
            bytes.len()
        )));
    }
    Ok(())
}

/// Run the full conditioning chain and re-encode as PNG for the OCR engine.
pub fn prepare_for_ocr(bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    validate_image_bytes(bytes)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::InvalidImage(e.to_string()))?;

    let gray = condition(&decoded);
    encode_png(&gray)
}

/// Grayscale → upscale → median filter → contrast stretch.
pub fn condition(img: &DynamicImage) -> GrayImage {
    let gray = img.to_luma8();

    let (w, h) = gray.dimensions();
    let new_w = (w * UPSCALE_FACTOR).max(MIN_DIMENSION);
    let new_h = (h * UPSCALE_FACTOR).max(MIN_DIMENSION);

    // CatmullRom over Lanczos3: comparable sharpness without ringing
    // artifacts around high-contrast glyph edges.
    let upscaled = image::imageops::resize(&gray, new_w, new_h, FilterType::CatmullRom);

    let denoised = median_filter_3x3(&upscaled);
    stretch_contrast(&denoised, CONTRAST_FACTOR)
}

/// 3×3 median filter. Removes salt-and-pepper scanner noise that otherwise
/// fragments glyph outlines. Border pixels are passed through unchanged.
pub fn median_filter_3x3(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    if w < 3 || h < 3 {
        return img.clone();
    }

    let mut out = img.clone();
    let mut window = [0u8; 9];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut i = 0;
            for dy in 0..3 {
                for dx in 0..3 {
                    window[i] = img.get_pixel(x + dx - 1, y + dy - 1)[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, Luma([window[4]]));
        }
    }

    out
}

/// Linear contrast stretch around the image mean:
/// `out = mean + (px - mean) * factor`, clamped to [0, 255].
/// A flat image (all pixels at the mean) is unchanged.
pub fn stretch_contrast(img: &GrayImage, factor: f32) -> GrayImage {
    let pixels = img.as_raw();
    if pixels.is_empty() {
        return img.clone();
    }

    let mean = pixels.iter().map(|&p| p as f32).sum::<f32>() / pixels.len() as f32;

    let mut out = img.clone();
    for px in out.pixels_mut() {
        let stretched = mean + (px[0] as f32 - mean) * factor;
        px[0] = stretched.clamp(0.0, 255.0) as u8;
    }

    out
}

/// Encode a grayscale image as PNG bytes.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, ExtractionError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(e.to_string()))?;
    Ok(buf)
}
