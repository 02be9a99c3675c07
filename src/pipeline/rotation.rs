use image::DynamicImage;

use crate::error::IiifError;
use crate::request::RotationSpec;

/// Applies the Rotation stage: mirror first (if requested), then rotate by
/// one of `{0, 90, 180, 270}` degrees. Any other angle is rejected here —
/// the parser accepts any signed integer lexically, so this is the single
/// place the `{0,90,180,270}` restriction is enforced.
pub fn apply(img: DynamicImage, rotation: &RotationSpec) -> Result<DynamicImage, IiifError> {
    let img = if rotation.mirror {
        img.fliph()
    } else {
        img
    };

    // Literal angle match, not modular: only these four values are
    // accepted, so e.g. -90 or 450 are rejected even though they're
    // congruent to an accepted angle.
    match rotation.angle {
        0 => Ok(img),
        90 => Ok(img.rotate90()),
        180 => Ok(img.rotate180()),
        270 => Ok(img.rotate270()),
        _ => Err(IiifError::RotationUnsupported),
    }
}
