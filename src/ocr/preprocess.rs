//! Image preparation ahead of OCR: format sniffing, decoding, grayscale
//! inversion and skew correction.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::contrast::otsu_level;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use std::io::Cursor;
use tracing::debug;

use super::OcrError;

/// Skew below this many degrees is left alone
const MIN_CORRECTION_DEGREES: f32 = 0.1;

/// An image ready to hand to an OCR engine
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// PNG-encoded, grayscale, inverted (light text on dark background)
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Degrees the image was rotated to undo skew
    pub skew_angle: f32,
}

/// Check the magic bytes; only JPEG and PNG uploads are accepted
pub fn sniff_image_format(bytes: &[u8]) -> Result<ImageFormat, OcrError> {
    if bytes.is_empty() {
        return Err(OcrError::Decode("uploaded file is empty".to_string()));
    }

    match infer::get(bytes).map(|kind| kind.mime_type()) {
        Some("image/png") => Ok(ImageFormat::Png),
        Some("image/jpeg") => Ok(ImageFormat::Jpeg),
        Some(other) => Err(OcrError::UnsupportedFormat(format!(
            "file content is {}, expected a JPEG or PNG image",
            other
        ))),
        None => Err(OcrError::Decode("file content is not a recognizable image".to_string())),
    }
}

/// Decode, grayscale, invert and (optionally) deskew an uploaded image
pub fn prepare_image(bytes: &[u8], deskew: bool) -> Result<PreparedImage, OcrError> {
    let format = sniff_image_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| OcrError::Decode(e.to_string()))?;

    let mut gray = decoded.to_luma8();
    image::imageops::invert(&mut gray);

    let mut skew_angle = 0.0;
    if deskew {
        let angle = estimate_skew_angle(&gray);
        if angle.abs() >= MIN_CORRECTION_DEGREES {
            debug!("Correcting {:.2}° of skew", angle);
            // Background is black after inversion
            gray = rotate_about_center(&gray, (-angle).to_radians(), Interpolation::Bilinear, Luma([0u8]));
            skew_angle = -angle;
        }
    }

    let (width, height) = gray.dimensions();
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| OcrError::Engine(format!("Failed to encode preprocessed image: {}", e)))?;

    Ok(PreparedImage {
        png,
        width,
        height,
        skew_angle,
    })
}

/// Estimate how far the content is rotated clockwise, in degrees within (-45, 45].
///
/// Expects an inverted grayscale image. Foreground pixels are found with an
/// Otsu threshold and the angle is read off the minimum-area rectangle that
/// encloses them.
pub fn estimate_skew_angle(inverted: &GrayImage) -> f32 {
    let level = otsu_level(inverted);

    let points: Vec<Point<i32>> = inverted
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel[0] > level)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect();

    if points.len() < 3 {
        return 0.0;
    }

    // A rectangle fitted to a single row or column has no meaningful angle
    let (min_x, max_x) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if max_x - min_x < 2 || max_y - min_y < 2 {
        return 0.0;
    }

    let rect = min_area_rect(&points);
    let dx = (rect[1].x - rect[0].x) as f32;
    let dy = (rect[1].y - rect[0].y) as f32;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }

    normalize_angle(dy.atan2(dx).to_degrees())
}

/// Fold any edge angle into (-45, 45]
fn normalize_angle(mut degrees: f32) -> f32 {
    while degrees > 45.0 {
        degrees -= 90.0;
    }
    while degrees <= -45.0 {
        degrees += 90.0;
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), format).unwrap();
        out
    }

    #[test]
    fn test_sniff_accepts_png_and_jpeg() {
        let png = encode(DynamicImage::ImageRgb8(RgbImage::new(4, 4)), ImageFormat::Png);
        let jpeg = encode(DynamicImage::ImageRgb8(RgbImage::new(4, 4)), ImageFormat::Jpeg);
        assert_eq!(sniff_image_format(&png).unwrap(), ImageFormat::Png);
        assert_eq!(sniff_image_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert!(matches!(sniff_image_format(b""), Err(OcrError::Decode(_))));
        assert!(matches!(sniff_image_format(b"not an image at all"), Err(OcrError::Decode(_))));
        assert!(matches!(
            sniff_image_format(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n"),
            Err(OcrError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_png_fails_to_decode() {
        let mut png = encode(DynamicImage::ImageRgb8(RgbImage::new(32, 32)), ImageFormat::Png);
        png.truncate(40);
        assert!(matches!(prepare_image(&png, true), Err(OcrError::Decode(_))));
    }

    #[test]
    fn test_prepare_blank_page() {
        let white = RgbImage::from_pixel(64, 48, image::Rgb([255, 255, 255]));
        let png = encode(DynamicImage::ImageRgb8(white), ImageFormat::Png);

        let prepared = prepare_image(&png, true).unwrap();
        assert_eq!((prepared.width, prepared.height), (64, 48));
        assert_eq!(prepared.skew_angle, 0.0);

        // Output is a PNG with the page inverted to black
        let decoded = image::load_from_memory(&prepared.png).unwrap().to_luma8();
        assert!(decoded.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_axis_aligned_block_has_no_skew() {
        let mut img = GrayImage::new(100, 60);
        for y in 20..30 {
            for x in 10..90 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        assert!(estimate_skew_angle(&img).abs() < 0.5);
    }

    #[test]
    fn test_tilted_band_reports_its_angle() {
        let mut img = GrayImage::new(220, 120);
        let slope = 10f32.to_radians().tan();
        for x in 10..210u32 {
            let center = 30.0 + (x as f32) * slope;
            for dy in 0..6 {
                img.put_pixel(x, center as u32 + dy, Luma([255]));
            }
        }
        let angle = estimate_skew_angle(&img);
        assert!((angle - 10.0).abs() < 1.5, "expected ~10°, got {}", angle);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(90.0), 0.0);
        assert_eq!(normalize_angle(-80.0), 10.0);
        assert_eq!(normalize_angle(45.0), 45.0);
        assert_eq!(normalize_angle(-45.0), 45.0);
    }
}
