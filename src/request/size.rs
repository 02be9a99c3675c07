use std::fmt;
use std::str::FromStr;

use crate::error::IiifError;

/// The size segment of an IIIF request, lexically parsed.
///
/// `Confined` is IIIF's `!w,h` ("fit within, preserve aspect"); `Distorted`
/// is `^w,h` ("fill at least, preserve aspect, may exceed one axis").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSpec {
    Full,
    Max,
    Percent { p: f64 },
    WidthOnly { w: u32 },
    HeightOnly { h: u32 },
    Exact { w: u32, h: u32 },
    Confined { w: u32, h: u32 },
    Distorted { w: u32, h: u32 },
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSpec::Full => write!(f, "full"),
            SizeSpec::Max => write!(f, "max"),
            SizeSpec::Percent { p } => write!(f, "pct:{p}"),
            SizeSpec::WidthOnly { w } => write!(f, "{w},"),
            SizeSpec::HeightOnly { h } => write!(f, ",{h}"),
            SizeSpec::Exact { w, h } => write!(f, "{w},{h}"),
            SizeSpec::Confined { w, h } => write!(f, "!{w},{h}"),
            SizeSpec::Distorted { w, h } => write!(f, "^{w},{h}"),
        }
    }
}

impl FromStr for SizeSpec {
    type Err = IiifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || IiifError::InvalidRequest(format!("bad size: {s}"));

        if s == "full" {
            return Ok(SizeSpec::Full);
        }
        if s == "max" {
            return Ok(SizeSpec::Max);
        }
        if let Some(rest) = s.strip_prefix("pct:") {
            let p: f64 = rest.parse().map_err(|_| bad())?;
            if p <= 0.0 {
                return Err(bad());
            }
            return Ok(SizeSpec::Percent { p });
        }
        if let Some(rest) = s.strip_prefix('!') {
            let (w, h) = split_wh(rest).ok_or_else(bad)?;
            return Ok(SizeSpec::Confined { w, h });
        }
        if let Some(rest) = s.strip_prefix('^') {
            let (w, h) = split_wh(rest).ok_or_else(bad)?;
            return Ok(SizeSpec::Distorted { w, h });
        }
        if let Some(w_str) = s.strip_suffix(',') {
            if w_str.is_empty() || w_str.contains(',') {
                return Err(bad());
            }
            let w: u32 = w_str.parse().map_err(|_| bad())?;
            return Ok(SizeSpec::WidthOnly { w });
        }
        if let Some(h_str) = s.strip_prefix(',') {
            if h_str.is_empty() || h_str.contains(',') {
                return Err(bad());
            }
            let h: u32 = h_str.parse().map_err(|_| bad())?;
            return Ok(SizeSpec::HeightOnly { h });
        }
        let (w, h) = split_wh(s).ok_or_else(bad)?;
        Ok(SizeSpec::Exact { w, h })
    }
}

fn split_wh(s: &str) -> Option<(u32, u32)> {
    let mut it = s.split(',');
    let w = it.next()?.parse().ok()?;
    let h = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_variant() {
        assert_eq!("full".parse::<SizeSpec>().unwrap(), SizeSpec::Full);
        assert_eq!("max".parse::<SizeSpec>().unwrap(), SizeSpec::Max);
        assert_eq!(
            "pct:50".parse::<SizeSpec>().unwrap(),
            SizeSpec::Percent { p: 50.0 }
        );
        assert_eq!(
            "300,".parse::<SizeSpec>().unwrap(),
            SizeSpec::WidthOnly { w: 300 }
        );
        assert_eq!(
            ",300".parse::<SizeSpec>().unwrap(),
            SizeSpec::HeightOnly { h: 300 }
        );
        assert_eq!(
            "300,200".parse::<SizeSpec>().unwrap(),
            SizeSpec::Exact { w: 300, h: 200 }
        );
        assert_eq!(
            "!300,300".parse::<SizeSpec>().unwrap(),
            SizeSpec::Confined { w: 300, h: 300 }
        );
        assert_eq!(
            "^300,300".parse::<SizeSpec>().unwrap(),
            SizeSpec::Distorted { w: 300, h: 300 }
        );
    }

    #[test]
    fn rejects_non_positive_percent() {
        assert!("pct:0".parse::<SizeSpec>().is_err());
        assert!("pct:-5".parse::<SizeSpec>().is_err());
    }

    #[test]
    fn round_trips_through_display() {
        for s in ["full", "max", "pct:50", "300,", ",300", "300,200", "!300,300", "^300,300"] {
            let parsed: SizeSpec = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
    }
}
