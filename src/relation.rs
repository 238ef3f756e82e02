//! Bundle-to-catalog-version grouping
//!
//! Inverts every bundle's catalog-version set into an explicitly ordered
//! aggregate: catalog versions ascending by (major, minor), and within each
//! version the member bundles ascending by semantic version. Both orders are
//! load-bearing — bundle order appears in rendered output — so the aggregate
//! is a sorted `Vec`, never a map left to its own iteration order.

use std::collections::BTreeMap;

use crate::bundle::Bundle;
use crate::catalog_version::CatalogVersion;

/// One catalog version together with its member bundles, sorted by version.
pub type CatalogGroup = (CatalogVersion, Vec<Bundle>);

/// Group bundles by the catalog versions they enroll in.
///
/// A bundle appears once in every group its `catalog_versions` names, and a
/// bundle with an empty set appears nowhere — that is upstream configuration
/// passed through, not an error. Bundles with equal versions keep their input
/// order (stable sort), so identical inputs always produce identical output.
pub fn group_by_catalog_version(bundles: &[Bundle]) -> Vec<CatalogGroup> {
    let mut buckets: BTreeMap<CatalogVersion, Vec<Bundle>> = BTreeMap::new();
    for bundle in bundles {
        for cv in &bundle.catalog_versions {
            buckets
                .entry(cv.clone())
                .or_default()
                .push(bundle.clone());
        }
    }

    buckets
        .into_iter()
        .map(|(cv, mut members)| {
            members.sort_by(|a, b| a.version.cmp(&b.version));
            (cv, members)
        })
        .collect()
}
