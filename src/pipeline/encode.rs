use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::error::IiifError;
use crate::request::Format;

/// JPEG quality fixed at 85; other formats use default encoder parameters.
const JPEG_QUALITY: u8 = 85;

/// Applies the Encode stage: format dispatch, returning the encoded bytes
/// and the IIIF `Content-Type` string (verbatim `image/jpg` included, per
/// the documented quirk).
///
/// JPEG and WebP go through `JpegEncoder::new_with_quality` and
/// `webp::Encoder` respectively; `png`/`gif`/`tif` use the `image` crate's
/// built-in encoders.
pub fn apply(img: &DynamicImage, format: Format) -> Result<(Vec<u8>, &'static str), IiifError> {
    let bytes = match format {
        Format::Jpg => {
            let rgb = img.to_rgb8();
            let (w, h) = (rgb.width(), rgb.height());
            let mut out = Vec::new();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| IiifError::InternalServerError(format!("jpeg encode failed: {e}")))?;
            out
        }
        Format::Png => {
            let mut out = Vec::new();
            img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
                .map_err(|e| IiifError::InternalServerError(format!("png encode failed: {e}")))?;
            out
        }
        Format::Gif => {
            let mut out = Vec::new();
            img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Gif)
                .map_err(|e| IiifError::InternalServerError(format!("gif encode failed: {e}")))?;
            out
        }
        Format::Tif => {
            let mut out = Vec::new();
            img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Tiff)
                .map_err(|e| IiifError::InternalServerError(format!("tiff encode failed: {e}")))?;
            out
        }
        Format::Webp => {
            let rgb = img.to_rgb8();
            let (w, h) = (rgb.width(), rgb.height());
            let encoder = webp::Encoder::from_rgb(rgb.as_raw(), w, h);
            let encoded = encoder.encode(75.0);
            encoded.to_vec()
        }
    };

    Ok((bytes, format.content_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::new(4, 4))
    }

    #[test]
    fn jpg_content_type_is_verbatim_quirk() {
        let (_bytes, ct) = apply(&test_image(), Format::Jpg).unwrap();
        assert_eq!(ct, "image/jpg");
    }

    #[test]
    fn png_round_trips_as_decodable_bytes() {
        let (bytes, ct) = apply(&test_image(), Format::Png).unwrap();
        assert_eq!(ct, "image/png");
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn webp_produces_nonempty_output() {
        let (bytes, ct) = apply(&test_image(), Format::Webp).unwrap();
        assert_eq!(ct, "image/webp");
        assert!(!bytes.is_empty());
    }
}
