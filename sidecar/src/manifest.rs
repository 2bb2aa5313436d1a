//! Manifest sidecar files.
//!
//! A manifest lives next to the code it describes, as `manifest.json` or
//! `manifest.yaml`. When both exist the JSON file wins.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use docargs_sidecar::{load_manifest_sidecar, save_manifest};
//!
//! let anchor = Path::new("tools/train.py");
//! let manifest = load_manifest_sidecar(anchor).unwrap().unwrap_or_default();
//! save_manifest("tools/manifest.json", &manifest).unwrap();
//! ```

use std::path::{Path, PathBuf};

use docargs_core::Manifest;
use tracing::debug;

use crate::error::Result;
use crate::format::SidecarFormat;

/// File name of the JSON manifest sidecar.
pub const MANIFEST_JSON: &str = "manifest.json";

/// File name of the YAML manifest sidecar.
pub const MANIFEST_YAML: &str = "manifest.yaml";

/// Loads a manifest, choosing the format from the extension.
///
/// # Errors
///
/// Returns [`UnsupportedExtension`](crate::SidecarError::UnsupportedExtension)
/// for other extensions, or an I/O or parse error.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    SidecarFormat::from_path(path)?.read(path)
}

/// Saves a manifest, choosing the format from the extension.
pub fn save_manifest(path: impl AsRef<Path>, manifest: &Manifest) -> Result<()> {
    let path = path.as_ref();
    SidecarFormat::from_path(path)?.write(path, manifest)?;
    debug!(path = %path.display(), "Saved manifest");
    Ok(())
}

/// Returns the manifest sidecar in `dir`, JSON first.
pub fn find_manifest_sidecar(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();
    [MANIFEST_JSON, MANIFEST_YAML]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Loads the manifest sidecar next to `anchor`, if there is one.
pub fn load_manifest_sidecar(anchor: impl AsRef<Path>) -> Result<Option<Manifest>> {
    let dir = sidecar_dir(anchor.as_ref());
    let Some(path) = find_manifest_sidecar(dir) else {
        debug!(dir = %dir.display(), "No manifest sidecar found");
        return Ok(None);
    };
    debug!(path = %path.display(), "Loading manifest sidecar");
    load_manifest(&path).map(Some)
}

/// Directory holding the sidecars of `anchor`.
pub(crate) fn sidecar_dir(anchor: &Path) -> &Path {
    match anchor.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(sidecar_dir(Path::new("tool.py")), Path::new("."));
        assert_eq!(sidecar_dir(Path::new("pkg/tool.py")), Path::new("pkg"));
    }

    #[test]
    fn test_json_sidecar_wins_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_YAML), "name: from-yaml\n").unwrap();
        std::fs::write(dir.path().join(MANIFEST_JSON), r#"{"name": "from-json"}"#).unwrap();

        let manifest = load_manifest_sidecar(dir.path().join("tool.py")).unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("from-json"));
    }

    #[test]
    fn test_missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_manifest_sidecar(dir.path().join("tool.py")).unwrap().is_none());
    }
}
