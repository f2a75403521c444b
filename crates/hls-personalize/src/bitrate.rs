use std::fmt;
use std::str::FromStr;

use hls_manifest::Error;

/// One bitrate selector as written by callers.
///
/// | text | spec |
/// |---|---|
/// | `800000` | `Exact(800000)` |
/// | `100000-200000` | `Range(100000, 200000)` |
/// | `100000-` | `AtLeast(100000)` |
/// | `-300000` | `AtMost(300000)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateSpec {
    Exact(u64),
    /// Inclusive on both ends.
    Range(u64, u64),
    AtLeast(u64),
    AtMost(u64),
}

impl BitrateSpec {
    /// Whether `bandwidth` satisfies this spec.
    ///
    /// `tolerance` widens [`BitrateSpec::Exact`] into `value ± tolerance`. The
    /// range forms always use their exact bounds.
    pub fn matches(&self, bandwidth: u64, tolerance: u64) -> bool {
        match *self {
            Self::Exact(value) => {
                bandwidth >= value.saturating_sub(tolerance)
                    && bandwidth <= value.saturating_add(tolerance)
            }
            Self::Range(lo, hi) => (lo..=hi).contains(&bandwidth),
            Self::AtLeast(lo) => bandwidth >= lo,
            Self::AtMost(hi) => bandwidth <= hi,
        }
    }
}

impl FromStr for BitrateSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |reason: &str| {
            Error::invalid_argument(format!("invalid bitrate spec {s:?}: {reason}"))
        };
        let value = |part: &str| -> Result<u64, Error> {
            part.trim()
                .parse()
                .map_err(|_| invalid("expected a non-negative integer"))
        };

        match text.split_once('-') {
            None if text.is_empty() => Err(invalid("empty")),
            None => Ok(Self::Exact(value(text)?)),
            Some(("", "")) => Err(invalid("range has no bounds")),
            Some((lo, "")) => Ok(Self::AtLeast(value(lo)?)),
            Some(("", hi)) => Ok(Self::AtMost(value(hi)?)),
            Some((lo, hi)) => {
                let (lo, hi) = (value(lo)?, value(hi)?);
                if lo > hi {
                    return Err(invalid("lower bound exceeds upper bound"));
                }
                Ok(Self::Range(lo, hi))
            }
        }
    }
}

impl fmt::Display for BitrateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{value}"),
            Self::Range(lo, hi) => write!(f, "{lo}-{hi}"),
            Self::AtLeast(lo) => write!(f, "{lo}-"),
            Self::AtMost(hi) => write!(f, "-{hi}"),
        }
    }
}

/// Parse every spec, failing on the first bad one.
pub fn parse_bitrate_specs<S: AsRef<str>>(specs: &[S]) -> Result<Vec<BitrateSpec>, Error> {
    if specs.is_empty() {
        return Err(Error::invalid_argument(
            "expected at least one bitrate spec",
        ));
    }
    specs.iter().map(|spec| spec.as_ref().parse()).collect()
}
