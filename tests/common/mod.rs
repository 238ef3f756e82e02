//! Common test utilities for fbcgen integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A package directory fixture: one sub-directory per bundle version plus the
/// package-level template and values files.
#[allow(dead_code)]
pub struct TestPackage {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to the package directory
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestPackage {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let package = Self { temp, path };
        package.write_file(
            "fbc-template.yaml.tmpl",
            "catalog: v{{catalogVersion.canonical}}\n\
             channel: {{values.defaultChannel}}\n\
             {{#each bundles}}- {{name}} ({{version}})\n{{/each}}",
        );
        package.write_file("fbc-template.values.yaml", "defaultChannel: stable\n");
        package
    }

    /// Create one bundle directory: a release config plus the canned
    /// descriptor the stub kpm serves back when asked to render the bundle.
    pub fn add_bundle(&self, dir_name: &str, name: &str, version: &str, catalog_versions: &[&str]) {
        let quoted: Vec<String> = catalog_versions
            .iter()
            .map(|cv| format!("\"{cv}\""))
            .collect();
        self.write_file(
            &format!("{dir_name}/release-config.yaml"),
            &format!("catalogVersions: [{}]\n", quoted.join(", ")),
        );
        self.write_file(
            &format!("{dir_name}/descriptor.json"),
            &format!(
                "{{\"package\":\"example\",\"name\":\"{name}\",\
                 \"image\":\"quay.io/testns/example:{version}\",\
                 \"properties\":[{{\"type\":\"olm.package\",\
                 \"value\":{{\"packageName\":\"example\",\"version\":\"{version}\"}}}}]}}"
            ),
        );
    }

    /// Write a file under the package directory
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the package directory
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the package directory
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

/// Stub `kpm` executable understanding the argv fbcgen drives it with.
///
/// `build bundle` copies the bundle dir's canned descriptor.json into the
/// .kpm file; `build catalog` wraps the rendered template; `render` prints
/// the .kpm file verbatim.
#[cfg(unix)]
const STUB_KPM: &str = r#"#!/bin/sh
set -eu
cmd="$1"; shift
case "$cmd" in
  build)
    kind="$1"; spec="$2"; out="${3#--output=}"
    if [ "$kind" = bundle ]; then
      root=$(sed -n 's/^bundleRoot: //p' "$spec")
      cp "$root/descriptor.json" "$out"
    else
      cv=$(basename "$spec" .catalog.kpmspec.yaml)
      tpl=$(sed -n 's/^ *templateFile: //p' "$spec")
      { printf '# catalog %s\n' "$cv"; cat "$tpl"; } > "$out/catalog-$cv.catalog.kpm"
    fi
    ;;
  render)
    cat "$1"
    ;;
  *)
    echo "kpm stub: unknown command $cmd" >&2
    exit 1
    ;;
esac
"#;

/// Stub `kpm` that always fails, printing to both streams.
#[cfg(unix)]
const FAILING_KPM: &str =
    "#!/bin/sh\necho 'stub stdout diagnostics'\necho 'manifest validation failed' >&2\nexit 1\n";

#[cfg(unix)]
fn write_executable(dir: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("kpm");
    std::fs::write(&path, contents).expect("Failed to write kpm stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make kpm stub executable");
}

/// Directory containing a working stub kpm, for prepending to PATH
#[cfg(unix)]
#[allow(dead_code)]
pub fn stub_kpm_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create stub dir");
    write_executable(dir.path(), STUB_KPM);
    dir
}

/// Directory containing an always-failing stub kpm
#[cfg(unix)]
#[allow(dead_code)]
pub fn failing_kpm_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create stub dir");
    write_executable(dir.path(), FAILING_KPM);
    dir
}

/// PATH value with `stub_dir` resolved ahead of everything else
#[allow(dead_code)]
pub fn path_with(stub_dir: &Path) -> String {
    let path = std::env::var("PATH").unwrap_or_default();
    format!("{}:{}", stub_dir.display(), path)
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn fbcgen_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("fbcgen").expect("Failed to find fbcgen binary")
}
