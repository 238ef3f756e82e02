//! Generate command implementation
//!
//! Drives the whole pipeline: scan bundle directories, fetch descriptors
//! through the external builder, group bundles by catalog version, render one
//! FBC template per version, and (unless skipped) materialize each template
//! into a catalog artifact. Any error aborts the run; output files are written
//! atomically so a failed run never leaves a partially written file under a
//! final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use console::Style;
use walkdir::WalkDir;

use crate::builder::Builder;
use crate::bundle::{Bundle, ReleaseConfig};
use crate::catalog_version::CatalogVersion;
use crate::error::{FbcgenError, Result};
use crate::relation::group_by_catalog_version;
use crate::template::{FbcTemplate, TemplateData, load_values};

/// Reserved output directory name; never scanned as a bundle source
const OUTPUT_DIR: &str = "catalogs";
/// Template source file, package level
const TEMPLATE_FILE: &str = "fbc-template.yaml.tmpl";
/// User values file, package level, passed through to the template verbatim
const VALUES_FILE: &str = "fbc-template.values.yaml";
/// Rendered template file name inside each per-version output directory
const RENDERED_TEMPLATE_FILE: &str = "fbc-template.yaml";
/// Materialized catalog artifact file name
const CATALOG_FILE: &str = "catalog.json";

/// Run the generate pipeline for one package directory.
pub fn run(
    package_dir: &Path,
    registry_namespace: &str,
    skip_catalog_build: bool,
    builder: &dyn Builder,
) -> Result<()> {
    let bundle_dirs = bundle_dirs(package_dir)?;
    let output_dir = package_dir.join(OUTPUT_DIR);
    clear_output_dir(&output_dir)?;

    let mut bundles = Vec::with_capacity(bundle_dirs.len());
    for bundle_dir in &bundle_dirs {
        println!(
            "{} {}",
            Style::new().bold().apply_to("Building bundle"),
            bundle_dir.display()
        );
        bundles.push(fetch_bundle(bundle_dir, registry_namespace, builder)?);
    }

    let template = FbcTemplate::parse(&package_dir.join(TEMPLATE_FILE))?;
    let values = load_values(&package_dir.join(VALUES_FILE))?;

    let mut rendered_files: Vec<(CatalogVersion, PathBuf)> = Vec::new();
    for (catalog_version, members) in &group_by_catalog_version(&bundles) {
        let rendered = template.render(&TemplateData {
            catalog_version,
            bundles: members,
            values: &values,
        })?;

        let version_dir = output_dir.join(format!("v{}", catalog_version.canonical()));
        std::fs::create_dir_all(&version_dir).map_err(|e| FbcgenError::FileWriteFailed {
            path: version_dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let rendered_path = version_dir.join(RENDERED_TEMPLATE_FILE);
        write_atomic(&rendered_path, rendered.as_bytes())?;

        println!(
            "{} v{}",
            Style::new().bold().green().apply_to("Rendered template"),
            catalog_version
        );
        rendered_files.push((catalog_version.clone(), rendered_path));
    }

    if skip_catalog_build {
        return Ok(());
    }

    for (catalog_version, template_file) in &rendered_files {
        let artifact = builder.build_and_render_catalog(template_file, catalog_version)?;
        let artifact_path = output_dir
            .join(format!("v{}", catalog_version.canonical()))
            .join(CATALOG_FILE);
        write_atomic(&artifact_path, &artifact)?;

        println!(
            "{} v{}",
            Style::new().bold().green().apply_to("Built catalog"),
            catalog_version
        );
    }

    Ok(())
}

/// Fetch one bundle: validate its release config, then build+render it.
///
/// The release config is validated before the builder is invoked so malformed
/// catalog versions fail without spawning a doomed external process.
fn fetch_bundle(
    bundle_dir: &Path,
    registry_namespace: &str,
    builder: &dyn Builder,
) -> Result<Bundle> {
    let release_config = ReleaseConfig::load(bundle_dir)?;
    let catalog_versions = release_config.parsed_catalog_versions()?;

    let descriptor = builder.build_and_render_bundle(bundle_dir, registry_namespace)?;
    let version = descriptor.package_version()?;

    Ok(Bundle {
        package: descriptor.package,
        name: descriptor.name,
        version,
        image: descriptor.image,
        catalog_versions,
    })
}

/// Immediate sub-directories of the package dir, sorted by file name for a
/// deterministic processing order. The reserved output directory is skipped.
fn bundle_dirs(package_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(package_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| FbcgenError::FileReadFailed {
            path: package_dir.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_dir() || entry.file_name().to_string_lossy() == OUTPUT_DIR {
            continue;
        }
        dirs.push(entry.into_path());
    }
    Ok(dirs)
}

/// Remove and recreate the output directory. Every run regenerates the full
/// output tree; there is no incremental merge with prior output.
fn clear_output_dir(output_dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(output_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(FbcgenError::FileWriteFailed {
                path: output_dir.display().to_string(),
                reason: e.to_string(),
            });
        }
    }
    std::fs::create_dir_all(output_dir).map_err(|e| FbcgenError::FileWriteFailed {
        path: output_dir.display().to_string(),
        reason: e.to_string(),
    })
}

/// Write contents to a temp file in the target directory, then rename it into
/// place.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_failed = |reason: String| FbcgenError::FileWriteFailed {
        path: path.display().to_string(),
        reason,
    };

    let dir = path
        .parent()
        .ok_or_else(|| write_failed("no parent directory".to_string()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    tmp.write_all(contents)
        .map_err(|e| write_failed(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;
    Ok(())
}
