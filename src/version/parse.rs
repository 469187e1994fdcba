//! Add-on platform version grammar
//!
//! Versions look like `MAJOR.MINOR.MICRO.PATCH`, optionally followed by an
//! alpha/beta marker (`a1`, `b3`) and a `pre` marker (`pre1`):
//!
//! - `115.0` -> 115.0.0.0
//! - `128.0b3` -> 128.0.0.0, beta 3
//! - `3.0pre1` -> 3.0.0.0, pre 1
//! - `*` / `102.*` -> wildcard parts become [`VERSION_PART_MAX`]
//!
//! The grammar is matched as a prefix, so suffixes such as the `esr` in
//! `115.3.0esr` are ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::version::error::ParseError;

/// Value a `*` part stands for (the largest 16-bit part the platform accepts).
pub const VERSION_PART_MAX: u32 = (1 << 16) - 1;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]+|\*)(?:\.([0-9]+|\*)(?:\.([0-9]+|\*)(?:\.([0-9]+|\*))?)?)?(?:([ab])([0-9]+)?)?(?:(pre)([0-9]+)?)?",
    )
    .unwrap()
});

/// Alpha/beta marker. A version without one sorts after its alphas and betas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReleaseStage {
    Alpha,
    Beta,
    /// No `a`/`b` marker
    Final,
}

/// `pre` marker. A version without one sorts after its pre-releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreStage {
    Pre,
    /// No `pre` marker
    Final,
}

/// A parsed version.
///
/// Field order is the comparison order; the derived `Ord` is the total order
/// used for compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub patch: u32,
    pub release_stage: ReleaseStage,
    pub release_stage_version: u32,
    pub pre_stage: PreStage,
    pub pre_stage_version: u32,
}

impl Version {
    /// A final release with the given numeric parts
    pub const fn new(major: u32, minor: u32, micro: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            patch,
            release_stage: ReleaseStage::Final,
            release_stage_version: 0,
            pre_stage: PreStage::Final,
            pre_stage_version: 0,
        }
    }

    /// Parse a version, allowing `*` in numeric parts (add-on compatibility data).
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, true)
    }

    /// Parse a version made of integers only (crash-stats product versions).
    pub fn parse_strict(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, false)
    }

    fn parse_with(text: &str, allow_wildcard: bool) -> Result<Self, ParseError> {
        let caps = VERSION_RE
            .captures(text)
            .ok_or_else(|| ParseError::Invalid(text.to_string()))?;

        let part = |i: usize| -> Result<u32, ParseError> {
            match caps.get(i).map(|m| m.as_str()) {
                None => Ok(0),
                Some("*") if allow_wildcard => Ok(VERSION_PART_MAX),
                Some("*") => Err(ParseError::WildcardNotAllowed(text.to_string())),
                Some(digits) => parse_number(digits, text),
            }
        };

        let release_stage = match caps.get(5).map(|m| m.as_str()) {
            Some("a") => ReleaseStage::Alpha,
            Some("b") => ReleaseStage::Beta,
            _ => ReleaseStage::Final,
        };
        let pre_stage = if caps.get(7).is_some() {
            PreStage::Pre
        } else {
            PreStage::Final
        };

        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            micro: part(3)?,
            patch: part(4)?,
            release_stage,
            release_stage_version: optional_number(&caps, 6, text)?,
            pre_stage,
            pre_stage_version: optional_number(&caps, 8, text)?,
        })
    }

    /// Whether any numeric part is the wildcard sentinel
    pub fn has_wildcard(&self) -> bool {
        [self.major, self.minor, self.micro, self.patch].contains(&VERSION_PART_MAX)
    }
}

fn parse_number(digits: &str, text: &str) -> Result<u32, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::OutOfRange(text.to_string()))
}

fn optional_number(caps: &Captures<'_>, i: usize, text: &str) -> Result<u32, ParseError> {
    caps.get(i)
        .map_or(Ok(0), |m| parse_number(m.as_str(), text))
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Part(u32);

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == VERSION_PART_MAX {
            f.write_str("*")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            Part(self.major),
            Part(self.minor),
            Part(self.micro),
            Part(self.patch)
        )?;
        match self.release_stage {
            ReleaseStage::Alpha => write!(f, "a{}", self.release_stage_version)?,
            ReleaseStage::Beta => write!(f, "b{}", self.release_stage_version)?,
            ReleaseStage::Final => {}
        }
        if self.pre_stage == PreStage::Pre {
            write!(f, "pre{}", self.pre_stage_version)?;
        }
        Ok(())
    }
}

/// Short channel label for a product version, e.g. `128 Beta` or `115 ESR`.
///
/// Returns the input unchanged when it is not an integer version.
pub fn channel_label(raw: &str) -> String {
    let Ok(version) = Version::parse_strict(raw) else {
        return raw.to_string();
    };

    let channel = match version.release_stage {
        ReleaseStage::Alpha => Some("Daily"),
        ReleaseStage::Beta => Some("Beta"),
        ReleaseStage::Final if raw.ends_with("esr") => Some("ESR"),
        ReleaseStage::Final => None,
    };

    match channel {
        Some(channel) => format!("{} {}", version.major, channel),
        None => version.major.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[rstest]
    #[case("115", Version::new(115, 0, 0, 0))]
    #[case("115.2", Version::new(115, 2, 0, 0))]
    #[case("115.2.3", Version::new(115, 2, 3, 0))]
    #[case("115.2.3.4", Version::new(115, 2, 3, 4))]
    #[case("*", Version::new(VERSION_PART_MAX, 0, 0, 0))]
    #[case("102.*", Version::new(102, VERSION_PART_MAX, 0, 0))]
    #[case("115.3.0esr", Version::new(115, 3, 0, 0))]
    fn parse_numeric_parts(#[case] input: &str, #[case] expected: Version) {
        assert_eq!(v(input), expected);
    }

    #[test]
    fn parse_stage_markers() {
        let beta = v("128.0b3");
        assert_eq!(beta.release_stage, ReleaseStage::Beta);
        assert_eq!(beta.release_stage_version, 3);
        assert_eq!(beta.pre_stage, PreStage::Final);

        let alpha = v("130.0a1");
        assert_eq!(alpha.release_stage, ReleaseStage::Alpha);
        assert_eq!(alpha.release_stage_version, 1);

        let pre = v("3.0pre2");
        assert_eq!(pre.release_stage, ReleaseStage::Final);
        assert_eq!(pre.pre_stage, PreStage::Pre);
        assert_eq!(pre.pre_stage_version, 2);

        let bare = v("3.1b");
        assert_eq!(bare.release_stage, ReleaseStage::Beta);
        assert_eq!(bare.release_stage_version, 0);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case(".1")]
    #[case("v1.0")]
    fn parse_rejects_non_versions(#[case] input: &str) {
        assert_eq!(
            Version::parse(input),
            Err(ParseError::Invalid(input.to_string()))
        );
    }

    #[test]
    fn parse_rejects_parts_that_overflow() {
        let err = Version::parse("99999999999.0").unwrap_err();
        assert_eq!(err, ParseError::OutOfRange("99999999999.0".to_string()));
        assert_eq!(err.input(), "99999999999.0");
    }

    #[test]
    fn parse_strict_rejects_wildcards() {
        assert_eq!(
            Version::parse_strict("115.*"),
            Err(ParseError::WildcardNotAllowed("115.*".to_string()))
        );
        assert_eq!(
            Version::parse_strict("115.0.1"),
            Ok(Version::new(115, 0, 1, 0))
        );
    }

    #[rstest]
    #[case("10.0b1", "10.0")]
    #[case("10.0a1", "10.0b1")]
    #[case("10.0pre1", "10.0")]
    #[case("10.0b1pre1", "10.0b1")]
    #[case("10.0", "10.0.1")]
    #[case("9.9.9.9", "10.0a1")]
    #[case("115.0", "*")]
    #[case("102.5", "102.*")]
    fn ordering_is_ascending(#[case] lower: &str, #[case] higher: &str) {
        assert!(v(lower) < v(higher), "{lower} < {higher}");
    }

    #[test]
    fn wildcard_equals_sentinel() {
        assert_eq!(v("*"), v("65535.0.0.0"));
        assert!(v("*") >= v("65535"));
    }

    #[test]
    fn missing_parts_equal_zero_parts() {
        assert_eq!(v("10"), v("10.0.0.0"));
    }

    #[rstest]
    #[case("115.2.3")]
    #[case("128.0b3")]
    #[case("130.0a1")]
    #[case("3.0pre2")]
    #[case("102.*")]
    #[case("*")]
    fn display_round_trips(#[case] input: &str) {
        let parsed = v(input);
        assert_eq!(v(&parsed.to_string()), parsed);
    }

    #[test]
    fn display_renders_wildcards() {
        assert_eq!(v("102.*").to_string(), "102.*.0.0");
        assert_eq!(v("128.0b3").to_string(), "128.0.0.0b3");
    }

    #[test]
    fn from_str_allows_wildcards() {
        let parsed: Version = "*".parse().unwrap();
        assert!(parsed.has_wildcard());
    }

    #[rstest]
    #[case("130.0a1", "130 Daily")]
    #[case("129.0b2", "129 Beta")]
    #[case("115.3.0esr", "115 ESR")]
    #[case("128.1.0", "128")]
    #[case("unknown", "unknown")]
    fn channel_label_returns_expected(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(channel_label(raw), expected);
    }
}
