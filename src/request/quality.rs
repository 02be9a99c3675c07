use std::fmt;
use std::str::FromStr;

use crate::error::IiifError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Default,
    Color,
    Gray,
    Bitonal,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quality::Default => "default",
            Quality::Color => "color",
            Quality::Gray => "gray",
            Quality::Bitonal => "bitonal",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Quality {
    type Err = IiifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Quality::Default),
            "color" => Ok(Quality::Color),
            "gray" => Ok(Quality::Gray),
            "bitonal" => Ok(Quality::Bitonal),
            _ => Err(IiifError::InvalidRequest(format!("bad quality: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpg,
    Png,
    Webp,
    Gif,
    Tif,
}

impl Format {
    /// IIIF's observed-behaviour `Content-Type`: `jpg` maps verbatim to
    /// `image/jpg`, not `image/jpeg`. See SPEC_FULL.md §9.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Jpg => "image/jpg",
            Format::Png => "image/png",
            Format::Webp => "image/webp",
            Format::Gif => "image/gif",
            Format::Tif => "image/tif",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Jpg => "jpg",
            Format::Png => "png",
            Format::Webp => "webp",
            Format::Gif => "gif",
            Format::Tif => "tif",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Format {
    type Err = IiifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(Format::Jpg),
            "png" => Ok(Format::Png),
            "webp" => Ok(Format::Webp),
            "gif" => Ok(Format::Gif),
            "tif" => Ok(Format::Tif),
            _ => Err(IiifError::InvalidRequest(format!("bad format: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        for s in ["default", "color", "gray", "bitonal"] {
            assert_eq!(s.parse::<Quality>().unwrap().to_string(), s);
        }
        for s in ["jpg", "png", "webp", "gif", "tif"] {
            assert_eq!(s.parse::<Format>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn jpg_content_type_is_verbatim() {
        assert_eq!(Format::Jpg.content_type(), "image/jpg");
    }

    #[test]
    fn rejects_unknown() {
        assert!("sepia".parse::<Quality>().is_err());
        assert!("bmp".parse::<Format>().is_err());
    }
}
