//! Error types and handling for fbcgen
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Every failure aborts the run: the pipeline is idempotent and cheap to
//! re-invoke in full, so there is no retry or recovery path. Errors propagate
//! with `?` up to `main`, which prints them and exits non-zero.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for fbcgen operations
#[derive(Error, Diagnostic, Debug)]
pub enum FbcgenError {
    // Configuration errors
    #[error("Registry namespace is not set")]
    #[diagnostic(
        code(fbcgen::config::registry_namespace_missing),
        help(
            "Set it with the --registry-namespace flag or the FBCGEN_REGISTRY_NAMESPACE environment variable"
        )
    )]
    RegistryNamespaceMissing,

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(fbcgen::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // Catalog version format errors
    #[error("Invalid catalog version '{value}': {reason}")]
    #[diagnostic(
        code(fbcgen::catalog::invalid_version),
        help("Catalog versions use the '<major>.<minor>' form, e.g. '4.17'")
    )]
    InvalidCatalogVersion { value: String, reason: String },

    // External build/render tool errors
    #[error("External command '{command}' failed: {reason}\nCommand output:\n{output}")]
    #[diagnostic(code(fbcgen::external::tool_failed))]
    ExternalToolFailed {
        command: String,
        reason: String,
        output: String,
    },

    #[error("External command '{command}' produced unparseable output: {reason}")]
    #[diagnostic(code(fbcgen::external::output_invalid))]
    ExternalToolOutputInvalid { command: String, reason: String },

    // Bundle version errors
    #[error("Bundle '{bundle}' has no 'olm.package' property carrying a version")]
    #[diagnostic(
        code(fbcgen::bundle::version_missing),
        help("Check that the bundle manifests declare the package version")
    )]
    BundleVersionMissing { bundle: String },

    #[error("Bundle '{bundle}' has invalid version '{version}': {reason}")]
    #[diagnostic(code(fbcgen::bundle::version_invalid))]
    BundleVersionInvalid {
        bundle: String,
        version: String,
        reason: String,
    },

    // Template errors
    #[error("Failed to parse template: {path}")]
    #[diagnostic(code(fbcgen::template::parse_failed))]
    TemplateParseFailed { path: String, reason: String },

    #[error("Failed to render template for catalog version '{catalog_version}': {reason}")]
    #[diagnostic(code(fbcgen::template::render_failed))]
    TemplateRenderFailed {
        catalog_version: String,
        reason: String,
    },

    // File system errors
    #[error("Failed to read: {path}")]
    #[diagnostic(code(fbcgen::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write: {path}")]
    #[diagnostic(code(fbcgen::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(fbcgen::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for FbcgenError {
    fn from(err: std::io::Error) -> Self {
        FbcgenError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FbcgenError {
    fn from(err: serde_yaml::Error) -> Self {
        FbcgenError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, FbcgenError>;
