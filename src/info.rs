//! Info Descriptor Builder: the `info.json` response body.
//!
//! Typed `Serialize` structs rather than free-form `serde_json::json!`,
//! since the document shape is fixed by the IIIF grammar and stable across
//! every request.

use serde::Serialize;

#[derive(Serialize)]
pub struct TileInfo {
    pub width: u32,
    #[serde(rename = "scaleFactors")]
    pub scale_factors: Vec<u32>,
}

#[derive(Serialize)]
pub struct SizeInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize)]
pub struct InfoDescriptor {
    #[serde(rename = "@context")]
    pub context: &'static str,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub protocol: &'static str,
    pub width: u32,
    pub height: u32,
    pub profile: Vec<&'static str>,
    pub tiles: Vec<TileInfo>,
    pub sizes: Vec<SizeInfo>,
    #[serde(rename = "extraFormats")]
    pub extra_formats: Vec<&'static str>,
    #[serde(rename = "extraQualities")]
    pub extra_qualities: Vec<&'static str>,
    #[serde(rename = "extraFeatures")]
    pub extra_features: Vec<&'static str>,
}

impl InfoDescriptor {
    /// `base_url` is the fully-qualified `<scheme>://<host>:<port>/iiif/<version>/<identifier>`
    /// prefix, with the identifier already trimmed of leading/trailing slashes.
    pub fn new(base_url: String, width: u32, height: u32) -> Self {
        Self {
            context: "http://iiif.io/api/image/3/context.json",
            id: base_url,
            kind: "sc:Manifest",
            protocol: "http://iiif.io/api/image",
            width,
            height,
            profile: vec![
                "http://iiif.io/api/image/3/level2.json",
                "http://iiif.io/api/image/3/profiles/level2.json",
            ],
            tiles: vec![TileInfo { width: 512, scale_factors: vec![1, 2, 4, 8] }],
            sizes: vec![
                SizeInfo { width, height },
                SizeInfo { width: width / 2, height: height / 2 },
                SizeInfo { width: width / 4, height: height / 4 },
            ],
            extra_formats: vec!["jpg", "png", "webp", "gif"],
            extra_qualities: vec!["default", "color", "gray", "bitonal"],
            extra_features: vec![
                "regionByPct",
                "regionSquare",
                "sizeByWhListed",
                "sizeByPct",
                "sizeByW",
                "sizeByH",
                "sizeByConfinedWh",
                "sizeByDistortedWh",
                "rotationBy90s",
            ],
        }
    }
}

/// Builds the `id` field: `<scheme>://<host>:<port>/iiif/<version>/<identifier>`
/// with the identifier trimmed of leading/trailing slashes.
pub fn build_id(scheme: &str, host: &str, port: u16, version: &str, identifier: &str) -> String {
    format!(
        "{scheme}://{host}:{port}/iiif/{version}/{}",
        identifier.trim_matches('/')
    )
}
