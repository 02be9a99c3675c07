use image::{DynamicImage, GenericImageView, ImageBuffer, Luma};

use crate::request::Quality;

/// Applies the Quality stage. `default`/`color` are no-ops;
/// `gray` converts to luminance; `bitonal` additionally applies the
/// documented linear shift `y = x·1.0 − 128.0`.
///
/// The shift is preserved verbatim even though it is not a meaningful
/// bitonal threshold (it is a straight intensity offset, not a 0/255
/// quantization) — see DESIGN.md.
pub fn apply(img: DynamicImage, quality: Quality) -> DynamicImage {
    match quality {
        Quality::Default | Quality::Color => img,
        Quality::Gray => grayscale_preserving_model(&img),
        Quality::Bitonal => {
            let gray = img.to_luma8();
            let (w, h) = gray.dimensions();
            let shifted = ImageBuffer::from_fn(w, h, |x, y| {
                let v = gray.get_pixel(x, y).0[0] as f32;
                Luma([(v - 128.0).clamp(0.0, 255.0) as u8])
            });
            DynamicImage::ImageLuma8(shifted)
        }
    }
}

/// `grayscale()` returns a luma buffer; re-wrap as the original channel
/// layout's luma variant so the Encode stage sees a consistent type.
fn grayscale_preserving_model(img: &DynamicImage) -> DynamicImage {
    img.grayscale()
}
