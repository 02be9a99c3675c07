use std::fmt;
use std::str::FromStr;

use crate::error::IiifError;

/// The rotation segment, lexically parsed as `!?N`.
///
/// `angle` is kept as a signed integer exactly as written on the wire;
/// restricting it to `{0, 90, 180, 270}` is a pipeline-stage concern (see
/// `crate::pipeline::rotation`), not a parsing concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSpec {
    pub mirror: bool,
    pub angle: i64,
}

impl fmt::Display for RotationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mirror {
            write!(f, "!{}", self.angle)
        } else {
            write!(f, "{}", self.angle)
        }
    }
}

impl FromStr for RotationSpec {
    type Err = IiifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || IiifError::InvalidRequest(format!("bad rotation: {s}"));
        let (mirror, rest) = match s.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let angle: i64 = rest.parse().map_err(|_| bad())?;
        Ok(RotationSpec { mirror, angle })
    }
}
