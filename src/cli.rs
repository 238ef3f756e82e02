//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// fbcgen - FBC template generator
///
/// Generate one file-based catalog (FBC) template per catalog release line
/// from a package directory of bundle versions.
#[derive(Parser, Debug)]
#[command(
    name = "fbcgen",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Generate per-release-line FBC templates for an operator package",
    long_about = "fbcgen scans a package directory containing one sub-directory per bundle \
                  version, groups the bundles by the catalog versions their release configs \
                  enroll them in, renders one FBC template per catalog version, and \
                  materializes each template into a catalog artifact via kpm.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  fbcgen ./cockroachdb --registry-namespace quay.io/operatorhubio\n    \
                  FBCGEN_REGISTRY_NAMESPACE=quay.io/operatorhubio fbcgen ./cockroachdb\n    \
                  fbcgen ./cockroachdb --skip-catalog-build"
)]
pub struct Cli {
    /// Package directory containing one sub-directory per bundle version
    pub package_dir: PathBuf,

    /// The registry namespace (e.g. quay.io/operatorhubio)
    #[arg(long, env = "FBCGEN_REGISTRY_NAMESPACE", value_name = "NAMESPACE")]
    pub registry_namespace: Option<String>,

    /// Stop after rendering FBC templates, without building catalog artifacts
    #[arg(long)]
    pub skip_catalog_build: bool,
}
