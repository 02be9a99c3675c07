//! Parameter Parser: turns a raw IIIF path into a validated [`ImageRequest`].
//!
//! A `FromStr`-based parser per path segment, covering the full IIIF 3.0
//! grammar: region, size, rotation, quality, and format.

pub mod quality;
pub mod region;
pub mod rotation;
pub mod size;

pub use quality::{Format, Quality};
pub use region::RegionSpec;
pub use rotation::RotationSpec;
pub use size::SizeSpec;

use crate::error::IiifError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub identifier: String,
    pub region: RegionSpec,
    pub size: SizeSpec,
    pub rotation: RotationSpec,
    pub quality: Quality,
    pub format: Format,
}

impl ImageParams {
    /// Reconstructs the canonical path grammar for this request. Used by
    /// the round-trip property test (stringify → reparse → equal).
    pub fn to_path_string(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}.{}",
            self.identifier, self.region, self.size, self.rotation, self.quality, self.format
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageRequest {
    Info { identifier: String },
    Image(ImageParams),
}

/// Parses the portion of the URL path after the `/iiif/<version>/` prefix.
///
/// Follows the IIIF path grammar exactly:
/// 1. normalise separators (reject doubled/leading/trailing `/` ⇒ `InvalidPath`)
/// 2. canonicalise (collapse `.`/`..`; differing canonical form ⇒ `InvalidPath`)
/// 3. URL-decode each path segment once (failure ⇒ `InvalidEncoding`)
/// 4. re-check the decoded segments for `.`/`..` smuggled in percent-encoded
///    (e.g. `%2e%2e`), since step 2 only sees the still-encoded text
/// 5. `.../info.json` ⇒ [`ImageRequest::Info`]
/// 6. otherwise match the last four segments against the grammar
pub fn parse_path(raw_path: &str) -> Result<ImageRequest, IiifError> {
    // `split('/')` over a path with doubled, leading, or trailing slashes
    // yields empty segments; reject those before they get silently dropped
    // by the `filter` below, since spec.md §4.1 requires separator
    // normalisation to change nothing about an already-canonical path.
    if !raw_path.is_empty() && raw_path.split('/').any(|s| s.is_empty()) {
        return Err(IiifError::InvalidPath);
    }

    let raw_segments: Vec<&str> = raw_path.split('/').filter(|s| !s.is_empty()).collect();
    let canonical_segments = canonicalise(&raw_segments)?;
    if canonical_segments != raw_segments {
        return Err(IiifError::InvalidPath);
    }

    if canonical_segments.is_empty() {
        return Err(IiifError::InvalidRequest("empty path".into()));
    }

    let decoded: Vec<String> = canonical_segments
        .iter()
        .map(|seg| decode_segment(seg))
        .collect::<Result<_, _>>()?;

    // `canonicalise` only ever sees the still-encoded segments, so a
    // percent-encoded `.`/`..` (e.g. `%2e%2e`) sails through it unchanged
    // and only becomes `..` once decoded here. Reject it now, or it ends up
    // as part of the identifier and can walk a filesystem-backed source
    // straight out of `imageDir`.
    if decoded.iter().any(|seg| seg == "." || seg == "..") {
        return Err(IiifError::InvalidPath);
    }

    if decoded.last().map(String::as_str) == Some("info.json") {
        if decoded.len() < 2 {
            return Err(IiifError::InvalidRequest(
                "info.json requires an identifier".into(),
            ));
        }
        let identifier = decoded[..decoded.len() - 1].join("/");
        return Ok(ImageRequest::Info { identifier });
    }

    if decoded.len() < 5 {
        return Err(IiifError::InvalidRequest(
            "path does not have region/size/rotation/quality.format".into(),
        ));
    }

    let split_at = decoded.len() - 4;
    let identifier = decoded[..split_at].join("/");
    let region_str = &decoded[split_at];
    let size_str = &decoded[split_at + 1];
    let rotation_str = &decoded[split_at + 2];
    let quality_format = &decoded[split_at + 3];

    let (quality_str, format_str) = quality_format
        .rsplit_once('.')
        .ok_or_else(|| IiifError::InvalidRequest(format!("bad quality.format: {quality_format}")))?;

    if identifier.is_empty() {
        return Err(IiifError::InvalidRequest("empty identifier".into()));
    }

    Ok(ImageRequest::Image(ImageParams {
        identifier,
        region: region_str.parse()?,
        size: size_str.parse()?,
        rotation: rotation_str.parse()?,
        quality: quality_str.parse()?,
        format: format_str.parse()?,
    }))
}

fn decode_segment(segment: &str) -> Result<String, IiifError> {
    urlencoding::decode(segment)
        .map(|cow| cow.into_owned())
        .map_err(|e| IiifError::InvalidEncoding(e.to_string()))
}

/// Collapses `.` and `..` segments. Returns `Err` only for a `..` that would
/// escape the root (no parent to pop) — everything else just normalizes the
/// segment list, and the caller decides whether that changed anything.
fn canonicalise<'a>(segments: &[&'a str]) -> Result<Vec<&'a str>, IiifError> {
    let mut out: Vec<&'a str> = Vec::with_capacity(segments.len());
    for &seg in segments {
        match seg {
            "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(IiifError::InvalidPath);
                }
            }
            _ => out.push(seg),
        }
    }
    Ok(out)
}
