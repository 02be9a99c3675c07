use image::{DynamicImage, GenericImageView};

use crate::error::IiifError;
use crate::request::RegionSpec;

/// Applies the Region stage: resolves the request against the
/// image's current dimensions, checks the resulting rectangle lies fully
/// within bounds, and crops.
///
/// A free function taking and returning a `DynamicImage`, built on
/// `image::GenericImageView::crop`.
pub fn apply(img: DynamicImage, region: &RegionSpec) -> Result<DynamicImage, IiifError> {
    let (w, h) = img.dimensions();

    let (x, y, cw, ch) = match *region {
        RegionSpec::Full => (0, 0, w, h),
        RegionSpec::Square => {
            let side = w.min(h);
            if w >= h {
                ((w - h) / 2, 0, side, side)
            } else {
                (0, (h - w) / 2, side, side)
            }
        }
        RegionSpec::Absolute { x, y, w: rw, h: rh } => (x, y, rw, rh),
        RegionSpec::Percent { x, y, w: pw, h: ph } => (
            ((w as f64) * x / 100.0).floor() as u32,
            ((h as f64) * y / 100.0).floor() as u32,
            ((w as f64) * pw / 100.0).floor() as u32,
            ((h as f64) * ph / 100.0).floor() as u32,
        ),
    };

    check_region_bounds(x, y, cw, ch, w, h)?;

    Ok(img.crop_imm(x, y, cw, ch))
}

/// Rejects a region unless `0 ≤ x, 0 ≤ y, w>0, h>0, x+w ≤ W, y+h ≤ H`.
fn check_region_bounds(x: u32, y: u32, cw: u32, ch: u32, w: u32, h: u32) -> Result<(), IiifError> {
    if cw == 0 || ch == 0 {
        return Err(IiifError::InvalidRegion(format!(
            "zero-sized region: {cw}x{ch}"
        )));
    }
    let x_end = x.checked_add(cw).ok_or_else(|| {
        IiifError::InvalidRegion(format!("region x+w overflows: x={x} w={cw}"))
    })?;
    let y_end = y.checked_add(ch).ok_or_else(|| {
        IiifError::InvalidRegion(format!("region y+h overflows: y={y} h={ch}"))
    })?;
    if x_end > w || y_end > h {
        return Err(IiifError::InvalidRegion(format!(
            "region {x},{y},{cw},{ch} exceeds image bounds {w}x{h}"
        )));
    }
    Ok(())
}
