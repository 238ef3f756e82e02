//! External builder/renderer boundary
//!
//! The pipeline never inspects bundle manifests itself; it delegates to the
//! `kpm` CLI, which builds a bundle (or catalog) from a kpmspec file and
//! renders it to a normalized descriptor (or catalog artifact). The [`Builder`]
//! trait keeps that boundary narrow so tests can substitute canned results
//! without spawning any process.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::bundle::BundleDescriptor;
use crate::catalog_version::CatalogVersion;
use crate::error::{FbcgenError, Result};

/// The two operations the pipeline needs from the external tool.
pub trait Builder {
    /// Build one bundle source directory and return its rendered descriptor.
    fn build_and_render_bundle(
        &self,
        bundle_dir: &Path,
        registry_namespace: &str,
    ) -> Result<BundleDescriptor>;

    /// Build a catalog from a rendered FBC template file and return the
    /// rendered catalog artifact verbatim.
    fn build_and_render_catalog(
        &self,
        template_file: &Path,
        catalog_version: &CatalogVersion,
    ) -> Result<Vec<u8>>;
}

/// [`Builder`] implementation driving the `kpm` CLI.
///
/// Spec files and intermediate `.kpm` artifacts live in a caller-owned
/// scratch directory, cleaned up when the caller drops it.
pub struct KpmBuilder {
    scratch_dir: PathBuf,
}

impl KpmBuilder {
    pub fn new(scratch_dir: &Path) -> Self {
        KpmBuilder {
            scratch_dir: scratch_dir.to_path_buf(),
        }
    }

    fn write_spec(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.scratch_dir.join(file_name);
        std::fs::write(&path, contents).map_err(|e| FbcgenError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

impl Builder for KpmBuilder {
    fn build_and_render_bundle(
        &self,
        bundle_dir: &Path,
        registry_namespace: &str,
    ) -> Result<BundleDescriptor> {
        let abs_bundle_dir = std::fs::canonicalize(bundle_dir).map_err(|e| {
            FbcgenError::FileReadFailed {
                path: bundle_dir.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let dir_name = abs_bundle_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle".to_string());

        let spec_path = self.write_spec(
            &format!("{dir_name}.bundle.kpmspec.yaml"),
            &bundle_spec_contents(&abs_bundle_dir, registry_namespace),
        )?;
        let kpm_path = self.scratch_dir.join(format!("{dir_name}.bundle.kpm"));

        let output_arg = format!("--output={}", kpm_path.display());
        run_kpm(&[
            OsStr::new("build"),
            OsStr::new("bundle"),
            spec_path.as_os_str(),
            OsStr::new(&output_arg),
        ])?;
        let rendered = run_kpm(&[OsStr::new("render"), kpm_path.as_os_str()])?;

        serde_json::from_slice(&rendered).map_err(|e| FbcgenError::ExternalToolOutputInvalid {
            command: "kpm render".to_string(),
            reason: e.to_string(),
        })
    }

    fn build_and_render_catalog(
        &self,
        template_file: &Path,
        catalog_version: &CatalogVersion,
    ) -> Result<Vec<u8>> {
        let canonical = catalog_version.canonical();
        let spec_path = self.write_spec(
            &format!("{canonical}.catalog.kpmspec.yaml"),
            &catalog_spec_contents(catalog_version, template_file),
        )?;

        let output_arg = format!("--output={}", self.scratch_dir.display());
        run_kpm(&[
            OsStr::new("build"),
            OsStr::new("catalog"),
            spec_path.as_os_str(),
            OsStr::new(&output_arg),
        ])?;

        let kpm_path = self
            .scratch_dir
            .join(format!("catalog-{canonical}.catalog.kpm"));
        run_kpm(&[OsStr::new("render"), kpm_path.as_os_str()])
    }
}

/// Bundle kpmspec pointing the builder at one bundle source directory.
fn bundle_spec_contents(abs_bundle_dir: &Path, registry_namespace: &str) -> String {
    format!(
        "apiVersion: specs.kpm.io/v1\n\
         kind: Bundle\n\
         bundleRoot: {}\n\
         registryNamespace: {}\n",
        abs_bundle_dir.display(),
        registry_namespace
    )
}

/// Catalog kpmspec materializing one rendered FBC template.
fn catalog_spec_contents(catalog_version: &CatalogVersion, template_file: &Path) -> String {
    format!(
        "apiVersion: specs.kpm.io/v1\n\
         kind: Catalog\n\
         \n\
         tag: \"localhost/catalog:{}\"\n\
         migrationLevel: bundle-object-to-csv-metadata\n\
         cacheFormat: pogreb.v1\n\
         \n\
         source:\n\
         \x20 sourceType: fbcTemplate\n\
         \x20 fbcTemplate:\n\
         \x20   templateFile: {}\n",
        catalog_version.canonical(),
        template_file.display()
    )
}

/// Run `kpm` with the given arguments, returning stdout on success.
///
/// Failures carry the combined stdout+stderr for diagnostics; the run aborts,
/// so there is no point separating the streams.
fn run_kpm(args: &[&OsStr]) -> Result<Vec<u8>> {
    let command = std::iter::once("kpm".to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");

    let output = Command::new("kpm")
        .args(args)
        .output()
        .map_err(|e| FbcgenError::ExternalToolFailed {
            command: command.clone(),
            reason: e.to_string(),
            output: String::new(),
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(FbcgenError::ExternalToolFailed {
            command,
            reason: output.status.to_string(),
            output: combined,
        });
    }

    Ok(output.stdout)
}
