//! Schema versions

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\.(\d+)$").expect("version pattern is valid"))
}

/// A REXS schema version such as `1.4`
///
/// Versions order by major, then minor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Create a version from its components
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a `major.minor` string
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] when the string is not two dot
    /// separated unsigned integers.
    pub fn parse(version: &str) -> Result<Self> {
        let captures = version_pattern()
            .captures(version.trim())
            .ok_or_else(|| Error::InvalidVersion(version.to_string()))?;

        let component = |idx: usize| {
            captures[idx]
                .parse::<u32>()
                .map_err(|_| Error::InvalidVersion(version.to_string()))
        };

        Ok(Self::new(component(1)?, component(2)?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let version = Version::parse("1.4").unwrap();
        assert_eq!(version, Version::new(1, 4));
        assert_eq!(version.to_string(), "1.4");
    }

    #[test]
    fn test_parse_version_trims_whitespace() {
        assert_eq!(Version::parse(" 2.10 ").unwrap(), Version::new(2, 10));
    }

    #[test]
    fn test_parse_version_invalid() {
        assert!(Version::parse("1").is_err());
        assert!(Version::parse("1.x").is_err());
        assert!(Version::parse("1.4.2").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 4) < Version::new(1, 5));
        assert!(Version::new(1, 10) > Version::new(1, 9));
        assert!(Version::new(2, 0) > Version::new(1, 99));
    }

    #[test]
    fn test_version_serde() {
        let version: Version = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(version, Version::new(1, 5));
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"1.5\"");
        assert!(serde_json::from_str::<Version>("\"one\"").is_err());
    }
}
