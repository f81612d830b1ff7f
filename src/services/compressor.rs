//! Bounded JPEG re-encoding of uploaded photos.

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("Could not read the image: {0}")]
    Decode(String),
    #[error("Could not encode the image: {0}")]
    Encode(String),
}

/// Re-encoded image ready for preview and for the analysis payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub width: u32,
    pub height: u32,
    /// `data:image/jpeg;base64,...`
    pub data_uri: String,
}

/// Output size for a `width`×`height` source.
///
/// The larger side is clamped to `max_dimension`; the other side is scaled
/// by the same factor and rounded. Sources within the bound keep their size.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = (side as f64 * max_dimension as f64 / larger as f64).round() as u32;
        scaled.max(1)
    };

    if width > height {
        if width > max_dimension {
            return (max_dimension, scale(height, width));
        }
    } else if height > max_dimension {
        return (scale(width, height), max_dimension);
    }

    (width, height)
}

/// Decode `bytes` upright: the EXIF orientation tag, when present, is applied.
fn decode(bytes: &[u8]) -> Result<DynamicImage, CompressError> {
    let decode_error = |e: image::ImageError| CompressError::Decode(e.to_string());

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompressError::Decode(e.to_string()))?
        .into_decoder()
        .map_err(decode_error)?;
    let orientation = decoder.orientation().map_err(decode_error)?;

    let mut image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Decode `bytes`, fit into `max_dimension`, encode as JPEG at `quality` percent.
pub fn compress(bytes: &[u8], max_dimension: u32, quality: u8) -> Result<CompressedImage, CompressError> {
    if max_dimension == 0 {
        return Err(CompressError::Encode("zero-sized target".to_string()));
    }

    let source = decode(bytes)?;
    let (width, height) = target_dimensions(source.width(), source.height(), max_dimension);

    let rendered = if (width, height) == (source.width(), source.height()) {
        source
    } else {
        source.resize_exact(width, height, FilterType::Triangle)
    };
    // JPEG has no alpha channel
    let rgb = rendered.to_rgb8();

    let mut jpeg = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
        encoder
            .encode_image(&rgb)
            .map_err(|e| CompressError::Encode(e.to_string()))?;
    }

    Ok(CompressedImage {
        width,
        height,
        data_uri: format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(&jpeg)
        ),
    })
}

/// `compress` on the blocking pool.
pub async fn compress_async(
    bytes: actix_web::web::Bytes,
    max_dimension: u32,
    quality: u8,
) -> Result<CompressedImage, CompressError> {
    tokio::task::spawn_blocking(move || compress(&bytes, max_dimension, quality))
        .await
        .map_err(|e| CompressError::Encode(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([180, 120, 90, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// A `width`×`height` JPEG carrying an EXIF orientation tag.
    fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 150, 120]));
        let mut plain = Cursor::new(Vec::new());
        img.write_to(&mut plain, ImageFormat::Jpeg).unwrap();
        let plain = plain.into_inner();

        // APP1: "Exif\0\0", big-endian TIFF header, one IFD entry 0x0112 SHORT
        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
        app1.extend_from_slice(&[0x00, 0x01]);
        app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        app1.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
        app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut out = plain[..2].to_vec();
        out.extend_from_slice(&app1);
        out.extend_from_slice(&plain[2..]);
        out
    }

    fn decoded_size(data_uri: &str) -> (u32, u32) {
        let encoded = data_uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn rotated_photo_is_turned_upright() {
        // orientation 6: stored landscape, shown rotated 90° clockwise
        let result = compress(&jpeg_with_orientation(300, 200, 6), 800, 70).unwrap();
        assert_eq!((result.width, result.height), (200, 300));
        assert_eq!(decoded_size(&result.data_uri), (200, 300));
    }

    #[test]
    fn bound_applies_to_upright_sides() {
        let result = compress(&jpeg_with_orientation(1600, 800, 8), 800, 70).unwrap();
        assert_eq!((result.width, result.height), (400, 800));
    }

    #[test]
    fn untagged_orientation_is_left_alone() {
        let result = compress(&jpeg_with_orientation(300, 200, 1), 800, 70).unwrap();
        assert_eq!((result.width, result.height), (300, 200));
    }

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(target_dimensions(4000, 2000, 800), (800, 400));
        assert_eq!(target_dimensions(1000, 333, 800), (800, 266));
        assert_eq!(target_dimensions(1000, 334, 800), (800, 267));
    }

    #[test]
    fn portrait_and_square_are_bounded_by_height() {
        assert_eq!(target_dimensions(1500, 3000, 800), (400, 800));
        assert_eq!(target_dimensions(1200, 1200, 800), (800, 800));
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(target_dimensions(640, 480, 800), (640, 480));
        assert_eq!(target_dimensions(800, 800, 800), (800, 800));
    }

    #[test]
    fn extreme_ratio_keeps_one_pixel() {
        assert_eq!(target_dimensions(10_000, 2, 800), (800, 1));
    }

    #[test]
    fn aspect_ratio_within_a_pixel() {
        for (w, h) in [(1234, 987), (3001, 1999), (801, 799), (999, 1777)] {
            let (tw, th) = target_dimensions(w, h, 800);
            assert_eq!(tw.max(th), 800);
            let expected = if w > h {
                h as f64 * 800.0 / w as f64
            } else {
                w as f64 * 800.0 / h as f64
            };
            assert!((tw.min(th) as f64 - expected).abs() <= 1.0);
        }
    }

    #[test]
    fn compress_produces_bounded_jpeg_data_uri() {
        let compressed = compress(&png(1600, 900), 800, 70).unwrap();

        assert_eq!((compressed.width, compressed.height), (800, 450));
        assert!(compressed.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decoded_size(&compressed.data_uri), (800, 450));
    }

    #[test]
    fn compress_keeps_small_rgb_image() {
        let img = RgbImage::from_pixel(320, 200, Rgb([10, 20, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();

        let compressed = compress(out.get_ref(), 800, 70).unwrap();
        assert_eq!(decoded_size(&compressed.data_uri), (320, 200));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = compress(b"definitely not an image", 800, 70).unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
    }

    #[test]
    fn zero_bound_is_an_encode_error() {
        let err = compress(&png(10, 10), 0, 70).unwrap_err();
        assert!(matches!(err, CompressError::Encode(_)));
    }
}
