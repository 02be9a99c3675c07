use image::{DynamicImage, GenericImageView};

use crate::error::IiifError;
use crate::request::SizeSpec;

/// Applies the Size stage: resolves the request against the
/// post-region dimensions, checks the output stays within the configured
/// pixel budget (`w·h ≤ MaxPixels`), and resizes with a Lanczos-3 kernel.
pub fn apply(
    img: DynamicImage,
    size: &SizeSpec,
    max_pixels: u64,
) -> Result<DynamicImage, IiifError> {
    let (w, h) = img.dimensions();
    let (target_w, target_h) = resolve(size, w, h, max_pixels)?;

    check_pixel_budget(target_w, target_h, max_pixels)?;

    if target_w == w && target_h == h {
        return Ok(img);
    }

    Ok(img.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3))
}

fn resolve(
    size: &SizeSpec,
    w: u32,
    h: u32,
    max_pixels: u64,
) -> Result<(u32, u32), IiifError> {
    let pixel_count = w as u64 * h as u64;

    match *size {
        SizeSpec::Full => {
            if pixel_count > max_pixels {
                return Err(IiifError::SizeTooLarge);
            }
            Ok((w, h))
        }
        SizeSpec::Max => {
            if pixel_count <= max_pixels {
                return Ok((w, h));
            }
            let s = (max_pixels as f64 / pixel_count as f64).sqrt();
            Ok((
                (w as f64 * s).trunc() as u32,
                (h as f64 * s).trunc() as u32,
            ))
        }
        SizeSpec::Percent { p } => Ok((
            ((w as f64) * p / 100.0).floor() as u32,
            ((h as f64) * p / 100.0).floor() as u32,
        )),
        SizeSpec::WidthOnly { w: tw } => {
            let th = ((h as f64) * (tw as f64) / (w as f64)).floor() as u32;
            Ok((tw, th))
        }
        SizeSpec::HeightOnly { h: th } => {
            let tw = ((w as f64) * (th as f64) / (h as f64)).floor() as u32;
            Ok((tw, th))
        }
        SizeSpec::Exact { w: tw, h: th } => Ok((tw, th)),
        SizeSpec::Confined { w: tw, h: th } => {
            let r = (tw as f64 / w as f64).min(th as f64 / h as f64);
            Ok((
                (w as f64 * r).floor() as u32,
                (h as f64 * r).floor() as u32,
            ))
        }
        SizeSpec::Distorted { w: tw, h: th } => {
            let r = (tw as f64 / w as f64).max(th as f64 / h as f64);
            Ok((
                (w as f64 * r).floor() as u32,
                (h as f64 * r).floor() as u32,
            ))
        }
    }
}

fn check_pixel_budget(w: u32, h: u32, max_pixels: u64) -> Result<(), IiifError> {
    if w == 0 || h == 0 {
        return Err(IiifError::SizeInvalid(format!(
            "degenerate output size {w}x{h}"
        )));
    }
    if (w as u64) * (h as u64) > max_pixels {
        return Err(IiifError::SizeTooLarge);
    }
    Ok(())
}
