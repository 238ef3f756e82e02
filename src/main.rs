//! fbcgen - FBC template generator
//!
//! Scans an operator package directory (one sub-directory per bundle version),
//! groups bundles by the catalog versions their release configs enroll them
//! in, renders one file-based catalog template per catalog version, and
//! materializes each template into a catalog artifact via the external `kpm`
//! builder.

use clap::Parser;

mod builder;
mod bundle;
mod catalog_version;
mod cli;
mod commands;
mod error;
mod relation;
mod template;

use builder::KpmBuilder;
use cli::Cli;
use error::{FbcgenError, Result};

/// Resolve the registry namespace from the flag/env value clap produced.
///
/// clap already applies precedence (flag over FBCGEN_REGISTRY_NAMESPACE); an
/// unset or empty value is a fatal configuration error before any work starts.
fn resolve_registry_namespace(value: Option<String>) -> Result<String> {
    value
        .filter(|ns| !ns.is_empty())
        .ok_or(FbcgenError::RegistryNamespaceMissing)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry_namespace = resolve_registry_namespace(cli.registry_namespace)?;

    // Scratch dir for kpmspec and intermediate .kpm files, removed on drop
    let scratch = tempfile::tempdir()?;
    let builder = KpmBuilder::new(scratch.path());

    commands::generate::run(
        &cli.package_dir,
        &registry_namespace,
        cli.skip_catalog_build,
        &builder,
    )
}
