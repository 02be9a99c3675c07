//! Transformation Pipeline: Region → Size → Rotation → Quality → Encode, a
//! fixed order over a single decoded image handle.
//!
//! Split into one module per stage so each keeps its own numeric policy
//! and tests, decoding once up front and threading a single
//! `DynamicImage` through the chain.

pub mod encode;
pub mod quality;
pub mod region;
pub mod rotation;
pub mod size;

use crate::error::IiifError;
use crate::request::ImageParams;

/// Result of running the full pipeline: encoded bytes plus the
/// `Content-Type` to serve them with.
pub struct Transformed {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Decodes `source_bytes` and runs all five stages in order. CPU-bound —
/// callers on an async task should run this inside `spawn_blocking` (see
/// `crate::handlers`) so it doesn't stall the executor.
pub fn transform(
    source_bytes: &[u8],
    params: &ImageParams,
    max_pixels: u64,
) -> Result<Transformed, IiifError> {
    let fmt = image::guess_format(source_bytes)
        .map_err(|e| IiifError::InternalServerError(format!("unrecognised image data: {e}")))?;
    let img = image::load_from_memory_with_format(source_bytes, fmt)
        .map_err(|e| IiifError::InternalServerError(format!("failed to decode image: {e}")))?;

    let img = region::apply(img, &params.region)?;
    let img = size::apply(img, &params.size, max_pixels)?;
    let img = rotation::apply(img, &params.rotation)?;
    let img = quality::apply(img, params.quality);
    let (bytes, content_type) = encode::apply(&img, params.format)?;

    Ok(Transformed { bytes, content_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Format, Quality, RegionSpec, RotationSpec, SizeSpec};

    fn encode_test_source(w: u32, h: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(w, h));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn full_pipeline_round_trip() {
        let source = encode_test_source(200, 100);
        let params = ImageParams {
            identifier: "demo.jpg".into(),
            region: RegionSpec::Full,
            size: SizeSpec::Max,
            rotation: RotationSpec { mirror: false, angle: 0 },
            quality: Quality::Default,
            format: Format::Png,
        };
        let out = transform(&source, &params, 10_000_000).unwrap();
        assert_eq!(out.content_type, "image/png");
        assert!(image::load_from_memory(&out.bytes).is_ok());
    }

    #[test]
    fn size_too_large_propagates_from_size_stage() {
        let source = encode_test_source(4000, 4000);
        let params = ImageParams {
            identifier: "demo.jpg".into(),
            region: RegionSpec::Full,
            size: SizeSpec::Full,
            rotation: RotationSpec { mirror: false, angle: 0 },
            quality: Quality::Default,
            format: Format::Png,
        };
        let err = transform(&source, &params, 1000).unwrap_err();
        assert!(matches!(err, IiifError::SizeTooLarge));
    }

    #[test]
    fn rotation_unsupported_propagates() {
        let source = encode_test_source(10, 10);
        let params = ImageParams {
            identifier: "demo.jpg".into(),
            region: RegionSpec::Full,
            size: SizeSpec::Full,
            rotation: RotationSpec { mirror: false, angle: 45 },
            quality: Quality::Default,
            format: Format::Png,
        };
        let err = transform(&source, &params, 10_000_000).unwrap_err();
        assert!(matches!(err, IiifError::RotationUnsupported));
    }
}
