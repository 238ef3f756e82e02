//! FBC template parsing, data assembly, and rendering
//!
//! The template engine is Handlebars with HTML escaping disabled (output is
//! YAML, not HTML). The engine sees exactly one record per catalog version:
//! the catalog version itself, its sorted member bundles, and the
//! user-supplied values mapping shared read-only across all versions.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::bundle::Bundle;
use crate::catalog_version::CatalogVersion;
use crate::error::{FbcgenError, Result};

const TEMPLATE_NAME: &str = "fbc-template";

/// The record exposed to the template for one catalog version.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData<'a> {
    pub catalog_version: &'a CatalogVersion,
    pub bundles: &'a [Bundle],
    pub values: &'a serde_yaml::Value,
}

/// A parsed FBC template, rendered once per catalog version.
#[derive(Debug)]
pub struct FbcTemplate {
    registry: Handlebars<'static>,
}

impl FbcTemplate {
    /// Read and parse the template source file.
    pub fn parse(path: &Path) -> Result<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|e| FbcgenError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| FbcgenError::TemplateParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(FbcTemplate { registry })
    }

    /// Render the template with one catalog version's assembled data.
    pub fn render(&self, data: &TemplateData<'_>) -> Result<String> {
        self.registry
            .render(TEMPLATE_NAME, data)
            .map_err(|e| FbcgenError::TemplateRenderFailed {
                catalog_version: data.catalog_version.canonical().to_string(),
                reason: e.to_string(),
            })
    }
}

/// Load the package-level user values mapping (`fbc-template.values.yaml`).
///
/// The document is passed through to the template verbatim; no shape is
/// imposed on it here.
pub fn load_values(path: &Path) -> Result<serde_yaml::Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| FbcgenError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_yaml::from_str(&contents).map_err(|e| FbcgenError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use std::collections::BTreeSet;
    use std::io::Write;

    fn template_file(source: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        file
    }

    fn sample_bundles() -> Vec<Bundle> {
        vec![
            Bundle {
                package: "example".to_string(),
                name: "example.v1.0.0".to_string(),
                version: Version::new(1, 0, 0),
                image: "quay.io/ns/example:v1.0.0".to_string(),
                catalog_versions: BTreeSet::new(),
            },
            Bundle {
                package: "example".to_string(),
                name: "example.v1.2.0".to_string(),
                version: Version::new(1, 2, 0),
                image: "quay.io/ns/example:v1.2.0".to_string(),
                catalog_versions: BTreeSet::new(),
            },
        ]
    }

    #[test]
    fn test_render_exposes_catalog_version_bundles_and_values() {
        let file = template_file(
            "catalog: v{{catalogVersion.canonical}} ({{catalogVersion.major}}/{{catalogVersion.minor}})\n\
             channel: {{values.defaultChannel}}\n\
             {{#each bundles}}- {{name}} {{version}} {{image}}\n{{/each}}",
        );
        let template = FbcTemplate::parse(file.path()).unwrap();

        let cv: CatalogVersion = "4.17".parse().unwrap();
        let bundles = sample_bundles();
        let values: serde_yaml::Value =
            serde_yaml::from_str("defaultChannel: stable").unwrap();
        let rendered = template
            .render(&TemplateData {
                catalog_version: &cv,
                bundles: &bundles,
                values: &values,
            })
            .unwrap();

        assert_eq!(
            rendered,
            "catalog: v4.17 (4/17)\n\
             channel: stable\n\
             - example.v1.0.0 1.0.0 quay.io/ns/example:v1.0.0\n\
             - example.v1.2.0 1.2.0 quay.io/ns/example:v1.2.0\n"
        );
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let file = template_file("image: \"{{values.ref}}\"\n");
        let template = FbcTemplate::parse(file.path()).unwrap();

        let cv: CatalogVersion = "4.16".parse().unwrap();
        let values: serde_yaml::Value =
            serde_yaml::from_str("ref: quay.io/ns/app@sha256:<digest>").unwrap();
        let rendered = template
            .render(&TemplateData {
                catalog_version: &cv,
                bundles: &[],
                values: &values,
            })
            .unwrap();

        assert_eq!(rendered, "image: \"quay.io/ns/app@sha256:<digest>\"\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let file = template_file("{{#each bundles}}{{name}}\n{{/each}}");
        let template = FbcTemplate::parse(file.path()).unwrap();

        let cv: CatalogVersion = "4.17".parse().unwrap();
        let bundles = sample_bundles();
        let values = serde_yaml::Value::Null;
        let data = TemplateData {
            catalog_version: &cv,
            bundles: &bundles,
            values: &values,
        };
        assert_eq!(
            template.render(&data).unwrap(),
            template.render(&data).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed_template() {
        let file = template_file("{{#each bundles}}{{name}}");
        let err = FbcTemplate::parse(file.path()).unwrap_err();
        assert!(matches!(err, FbcgenError::TemplateParseFailed { .. }));
    }

    #[test]
    fn test_parse_missing_file_is_read_error() {
        let err = FbcTemplate::parse(Path::new("/nonexistent/fbc-template.yaml.tmpl"))
            .unwrap_err();
        assert!(matches!(err, FbcgenError::FileReadFailed { .. }));
    }

    #[test]
    fn test_load_values_passthrough() {
        let file = template_file("defaultChannel: stable\nicon:\n  mediatype: image/svg+xml\n");
        let values = load_values(file.path()).unwrap();
        assert_eq!(values["defaultChannel"], "stable");
        assert_eq!(values["icon"]["mediatype"], "image/svg+xml");
    }

    #[test]
    fn test_load_values_rejects_malformed_yaml() {
        let file = template_file("key: [unclosed");
        let err = load_values(file.path()).unwrap_err();
        assert!(matches!(err, FbcgenError::ConfigParseFailed { .. }));
    }
}
