//! Bundle model and descriptor decoding
//!
//! A [`Bundle`] is one built revision of the operator package: its identity
//! from the rendered descriptor the external builder returns, plus the set of
//! catalog versions the bundle's `release-config.yaml` enrolls it in.

use std::collections::BTreeSet;
use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::catalog_version::CatalogVersion;
use crate::error::{FbcgenError, Result};

/// Property type carrying the package version inside a rendered descriptor
const PACKAGE_PROPERTY_TYPE: &str = "olm.package";

/// One built package revision, as exposed to the FBC template.
///
/// `catalog_versions` drives grouping only and is not part of the template
/// data surface.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub package: String,
    pub name: String,
    pub version: Version,
    pub image: String,

    #[serde(skip)]
    pub catalog_versions: BTreeSet<CatalogVersion>,
}

/// Rendered bundle descriptor returned by the external builder (JSON).
///
/// Mirrors the declarative-config bundle shape: identity fields plus a list
/// of opaque typed properties.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleDescriptor {
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub properties: Vec<BundleProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BundleProperty {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Value shape of the `olm.package` property
#[derive(Debug, Deserialize)]
struct PackageProperty {
    #[serde(default)]
    version: String,
}

impl BundleDescriptor {
    /// Extract the package version from the `olm.package` property.
    ///
    /// Absence of the property, or a version that does not parse as semver,
    /// aborts the whole run: a bundle without a version cannot be ordered
    /// into any catalog.
    pub fn package_version(&self) -> Result<Version> {
        let raw = self
            .properties
            .iter()
            .find(|p| p.property_type == PACKAGE_PROPERTY_TYPE)
            .map(|p| {
                serde_json::from_value::<PackageProperty>(p.value.clone()).map_err(|e| {
                    FbcgenError::BundleVersionInvalid {
                        bundle: self.name.clone(),
                        version: p.value.to_string(),
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()?
            .ok_or_else(|| FbcgenError::BundleVersionMissing {
                bundle: self.name.clone(),
            })?;

        Version::parse(&raw.version).map_err(|e| FbcgenError::BundleVersionInvalid {
            bundle: self.name.clone(),
            version: raw.version.clone(),
            reason: e.to_string(),
        })
    }
}

/// Per-bundle release configuration (`release-config.yaml`)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    #[serde(default)]
    pub catalog_versions: Vec<String>,
}

impl ReleaseConfig {
    /// Load and validate the release config of one bundle directory.
    pub fn load(bundle_dir: &Path) -> Result<Self> {
        let path = bundle_dir.join("release-config.yaml");
        let contents =
            std::fs::read_to_string(&path).map_err(|e| FbcgenError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        serde_yaml::from_str(&contents).map_err(|e| FbcgenError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse every configured version string, rejecting malformed entries.
    pub fn parsed_catalog_versions(&self) -> Result<BTreeSet<CatalogVersion>> {
        self.catalog_versions
            .iter()
            .map(|raw| raw.parse::<CatalogVersion>())
            .collect()
    }
}
