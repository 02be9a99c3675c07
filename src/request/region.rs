use std::fmt;
use std::str::FromStr;

use crate::error::IiifError;

/// The region segment of an IIIF request, lexically parsed.
///
/// Bounds checking against the actual image dimensions happens in the
/// pipeline, not here — parsing only recognises the grammar shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionSpec {
    Full,
    Square,
    Absolute { x: u32, y: u32, w: u32, h: u32 },
    Percent { x: f64, y: f64, w: f64, h: f64 },
}

impl fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSpec::Full => write!(f, "full"),
            RegionSpec::Square => write!(f, "square"),
            RegionSpec::Absolute { x, y, w, h } => write!(f, "{x},{y},{w},{h}"),
            RegionSpec::Percent { x, y, w, h } => write!(f, "pct:{x},{y},{w},{h}"),
        }
    }
}

impl FromStr for RegionSpec {
    type Err = IiifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "full" {
            return Ok(RegionSpec::Full);
        }
        if s == "square" {
            return Ok(RegionSpec::Square);
        }
        if let Some(rest) = s.strip_prefix("pct:") {
            let parts = split_four(rest)
                .ok_or_else(|| IiifError::InvalidRequest(format!("bad region: {s}")))?;
            let mut vals = [0f64; 4];
            for (i, p) in parts.iter().enumerate() {
                vals[i] = p
                    .parse()
                    .map_err(|_| IiifError::InvalidRequest(format!("bad region: {s}")))?;
                if !(0.0..=100.0).contains(&vals[i]) {
                    return Err(IiifError::InvalidRequest(format!(
                        "region percent out of range: {s}"
                    )));
                }
            }
            return Ok(RegionSpec::Percent {
                x: vals[0],
                y: vals[1],
                w: vals[2],
                h: vals[3],
            });
        }
        let parts =
            split_four(s).ok_or_else(|| IiifError::InvalidRequest(format!("bad region: {s}")))?;
        let mut vals = [0u32; 4];
        for (i, p) in parts.iter().enumerate() {
            vals[i] = p
                .parse()
                .map_err(|_| IiifError::InvalidRequest(format!("bad region: {s}")))?;
        }
        Ok(RegionSpec::Absolute {
            x: vals[0],
            y: vals[1],
            w: vals[2],
            h: vals[3],
        })
    }
}

fn split_four(s: &str) -> Option<[&str; 4]> {
    let mut it = s.split(',');
    let a = it.next()?;
    let b = it.next()?;
    let c = it.next()?;
    let d = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some([a, b, c, d])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_square() {
        assert_eq!("full".parse::<RegionSpec>().unwrap(), RegionSpec::Full);
        assert_eq!("square".parse::<RegionSpec>().unwrap(), RegionSpec::Square);
    }

    #[test]
    fn parses_absolute() {
        assert_eq!(
            "10,20,300,400".parse::<RegionSpec>().unwrap(),
            RegionSpec::Absolute { x: 10, y: 20, w: 300, h: 400 }
        );
    }

    #[test]
    fn parses_percent() {
        assert_eq!(
            "pct:0,0,50,50".parse::<RegionSpec>().unwrap(),
            RegionSpec::Percent { x: 0.0, y: 0.0, w: 50.0, h: 50.0 }
        );
    }

    #[test]
    fn rejects_percent_out_of_range() {
        assert!("pct:0,0,50,150".parse::<RegionSpec>().is_err());
    }

    #[test]
    fn round_trips_through_display() {
        for s in ["full", "square", "10,20,300,400", "pct:0,0,50,50"] {
            let parsed: RegionSpec = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
    }
}
