//! Catalog version identifiers
//!
//! A catalog version names one release line of the generated catalogs, e.g.
//! "4.17". The original spelling is preserved verbatim so that output paths
//! and tags round-trip exactly what the release config said; equality,
//! hashing, and ordering look only at the parsed `(major, minor)` pair.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;

use crate::error::FbcgenError;

/// One catalog release line, parsed from a `"<major>.<minor>"` string.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogVersion {
    /// The original string as supplied by configuration
    canonical: String,
    major: u64,
    minor: u64,
}

impl CatalogVersion {
    /// The exact spelling from the release config, used in output paths/tags
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }
}

impl FromStr for CatalogVersion {
    type Err = FbcgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FbcgenError::InvalidCatalogVersion {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('.');
        let (Some(major_part), Some(minor_part), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected '<major>.<minor>'"));
        };

        for part in [major_part, minor_part] {
            if part.len() > 1 && part.starts_with('0') {
                return Err(invalid("leading zeroes in version numbers are not permitted"));
            }
        }

        let major = major_part
            .parse::<u64>()
            .map_err(|_| invalid("major version is not a non-negative integer"))?;
        let minor = minor_part
            .parse::<u64>()
            .map_err(|_| invalid("minor version is not a non-negative integer"))?;

        Ok(CatalogVersion {
            canonical: s.to_string(),
            major,
            minor,
        })
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

// Identity is the numeric pair only; `canonical` is carried along for output.
impl PartialEq for CatalogVersion {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl Eq for CatalogVersion {}

impl Hash for CatalogVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
    }
}

impl Ord for CatalogVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for CatalogVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
