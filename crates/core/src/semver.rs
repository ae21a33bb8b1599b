//! Semantic versions (`major.minor.patch`) and bump kinds.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Accepted version format. Pre-release and build suffixes are not supported.
pub const SEMVER_PATTERN: &str = r"^(\d+)\.(\d+)\.(\d+)$";

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SEMVER_PATTERN).expect("valid regex"));

/// Version assigned to a brand-new collection.
pub const INITIAL_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// SemVer
// ---------------------------------------------------------------------------

/// A parsed `major.minor.patch` version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string, returning `None` when it is not `x.y.z`.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = SEMVER_RE.captures(s.trim())?;
        let part = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// `true` when `s` is a well-formed `x.y.z` version.
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_some()
    }

    /// The next version for the given bump kind. Fails when the bumped
    /// component would overflow.
    pub fn bump(&self, kind: VersionBump) -> CoreResult<Self> {
        let next = match kind {
            VersionBump::Major => self.major.checked_add(1).map(|m| Self::new(m, 0, 0)),
            VersionBump::Minor => self
                .minor
                .checked_add(1)
                .map(|m| Self::new(self.major, m, 0)),
            VersionBump::Patch => self
                .patch
                .checked_add(1)
                .map(|p| Self::new(self.major, self.minor, p)),
        };
        next.ok_or_else(|| {
            CoreError::validation(
                "semantic-version",
                format!("cannot apply a {kind} bump to {self}: component overflow"),
            )
        })
    }

    /// Half-open interval membership: `from < self <= to`.
    pub fn within(&self, from: &SemVer, to: &SemVer) -> bool {
        from < self && self <= to
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            CoreError::validation(
                "semantic-version",
                format!("'{s}' is not in semantic version format (major.minor.patch)"),
            )
        })
    }
}

impl Serialize for SemVer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemVer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// VersionBump
// ---------------------------------------------------------------------------

/// Which component of the version an update increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(CoreError::validation(
                "version-type",
                format!("Invalid version type: '{s}'. Must be one of: major, minor, patch"),
            )),
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_versions() {
        assert_eq!(SemVer::parse("1.2.3"), Some(SemVer::new(1, 2, 3)));
        assert_eq!(SemVer::parse("10.0.42"), Some(SemVer::new(10, 0, 42)));
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["1.2", "v1.2.3", "1.2.3-beta", "error", "", "1.2.x"] {
            assert!(SemVer::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(SemVer::new(1, 10, 0) > SemVer::new(1, 9, 9));
        assert!(SemVer::new(2, 0, 0) > SemVer::new(1, 99, 99));
    }

    #[test]
    fn bumps_reset_lower_components() {
        let v = SemVer::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Major).unwrap().to_string(), "2.0.0");
        assert_eq!(v.bump(VersionBump::Minor).unwrap().to_string(), "1.3.0");
        assert_eq!(v.bump(VersionBump::Patch).unwrap().to_string(), "1.2.4");
    }

    #[test]
    fn bump_overflow_is_a_validation_error() {
        let top = SemVer::new(u64::MAX, u64::MAX, u64::MAX);
        for kind in [VersionBump::Major, VersionBump::Minor, VersionBump::Patch] {
            let err = top.bump(kind).unwrap_err();
            assert!(matches!(err, CoreError::ValidationFailed { ref rule, .. } if rule == "semantic-version"));
        }
        assert_eq!(
            SemVer::new(u64::MAX, 0, 0).bump(VersionBump::Minor).unwrap(),
            SemVer::new(u64::MAX, 1, 0)
        );
    }

    #[test]
    fn within_excludes_lower_bound_and_includes_upper() {
        let from = SemVer::new(1, 0, 0);
        let to = SemVer::new(1, 3, 0);
        assert!(!from.within(&from, &to));
        assert!(SemVer::new(1, 0, 1).within(&from, &to));
        assert!(to.within(&from, &to));
        assert!(!SemVer::new(1, 3, 1).within(&from, &to));
    }

    #[test]
    fn from_str_error_names_rule() {
        let err = "abc".parse::<SemVer>().unwrap_err();
        assert!(err.to_string().contains("semantic-version"));
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&SemVer::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"1.2.3\"");
        let parsed: SemVer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SemVer::new(1, 2, 3));
    }

    #[test]
    fn version_bump_parsing() {
        assert_eq!(VersionBump::from_str("minor").unwrap(), VersionBump::Minor);
        assert!(VersionBump::from_str("huge").is_err());
    }
}
