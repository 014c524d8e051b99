//! Version parsing and ordering for Kubernetes and module versions.
//!
//! Kubernetes versions are written bare (`1.35.0`) while distribution modules
//! carry a `v` prefix (`v0.6.0`). Both forms parse into the same [`Version`]
//! so they can be compared directly. Precedence follows SemVer 2.0: build
//! metadata is ignored and a prerelease sorts below its release.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version format '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },
}

impl VersionError {
    fn invalid(input: &str, reason: impl Into<String>) -> Self {
        VersionError::InvalidFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[vV]?(\d+)\.(\d+)(?:\.(\d+))?([-+].+)?$").expect("version pattern is valid")
    })
}

/// A parsed semantic version.
///
/// The text the version was parsed from is kept so messages can echo the
/// value exactly as the operator wrote it.
#[derive(Debug, Clone)]
pub struct Version {
    inner: semver::Version,
    raw: String,
}

impl Version {
    /// Parse a version in `1.35.0`, `v0.6.0` or `1.35` form.
    ///
    /// A missing patch component reads as `0`. Prerelease and build suffixes
    /// (`-rc.1`, `+build.5`) are accepted.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::invalid(input, "empty version string"));
        }

        let caps = version_pattern().captures(trimmed).ok_or_else(|| {
            VersionError::invalid(input, "expected MAJOR.MINOR[.PATCH] with optional 'v' prefix")
        })?;

        let patch = caps.get(3).map_or("0", |m| m.as_str());
        let suffix = caps.get(4).map_or("", |m| m.as_str());
        let normalized = format!("{}.{}.{}{}", &caps[1], &caps[2], patch, suffix);

        let inner = semver::Version::parse(&normalized)
            .map_err(|e| VersionError::invalid(input, e.to_string()))?;

        Ok(Self {
            inner,
            raw: trimmed.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// The version as originally written, whitespace trimmed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Canonical `MAJOR.MINOR.PATCH[-PRE][+BUILD]` form without prefix.
    pub fn normalized(&self) -> String {
        self.inner.to_string()
    }

    /// Three-way comparison by SemVer precedence.
    pub fn compare(&self, other: &Version) -> Ordering {
        let a = &self.inner;
        let b = &other.inner;
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            .then_with(|| a.pre.cmp(&b.pre))
    }

    /// `self >= other`; equality satisfies a minimum.
    pub fn greater_or_equal(&self, other: &Version) -> bool {
        self.compare(other) != Ordering::Less
    }

    pub fn less_than(&self, other: &Version) -> bool {
        self.compare(other) == Ordering::Less
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_bare_and_prefixed() {
        let bare = v("1.35.0");
        assert_eq!((bare.major(), bare.minor(), bare.patch()), (1, 35, 0));

        let prefixed = v("v0.6.0");
        assert_eq!((prefixed.major(), prefixed.minor(), prefixed.patch()), (0, 6, 0));
        assert_eq!(prefixed.as_str(), "v0.6.0");
        assert_eq!(prefixed.normalized(), "0.6.0");
    }

    #[test]
    fn test_prefix_is_normalized_for_comparison() {
        assert_eq!(v("v1.35.0"), v("1.35.0"));
        assert_eq!(v("V2.0.0").compare(&v("2.0.0")), Ordering::Equal);
    }

    #[test]
    fn test_missing_patch_reads_as_zero() {
        assert_eq!(v("1.35"), v("1.35.0"));
        assert!(v("v5.2").less_than(&v("v5.2.1")));
    }

    #[test]
    fn test_ordering_is_numeric_not_lexical() {
        assert!(v("1.9.0").less_than(&v("1.10.0")));
        assert!(v("v0.10.0").greater_or_equal(&v("v0.6.0")));
        assert!(v("1.35.5").greater_or_equal(&v("1.35.0")));
    }

    #[test]
    fn test_equality_meets_minimum() {
        assert!(v("v4.0.1").greater_or_equal(&v("v4.0.1")));
        assert!(!v("v4.0.1").less_than(&v("v4.0.1")));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        assert!(v("1.35.0-rc.1").less_than(&v("1.35.0")));
        assert!(v("1.35.0-alpha").less_than(&v("1.35.0-beta")));
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(v("1.2.3+build.1"), v("1.2.3+build.2"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(v("  v3.0.0\n").as_str(), "v3.0.0");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        for input in ["", "v", "invalid", "1", "1.x.0", "+1.2.3", "1.2.3.4", "v1..2"] {
            let err = Version::parse(input).unwrap_err();
            match err {
                VersionError::InvalidFormat { input: ref got, .. } => assert_eq!(got, input),
            }
        }
    }

    #[test]
    fn test_from_str() {
        let parsed: Version = "v3.0.0".parse().unwrap();
        assert_eq!(parsed.to_string(), "v3.0.0");
    }
}
