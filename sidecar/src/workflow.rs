//! Workflow description sidecar files.
//!
//! The base of an exported workflow description is read from `manifest.cwl`
//! (YAML) next to the anchor, or from `manifest.json` when there is no CWL
//! file. Exported documents are written as YAML.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, SidecarError};
use crate::format::SidecarFormat;
use crate::manifest::{MANIFEST_JSON, sidecar_dir};

/// File name of the workflow description sidecar.
pub const WORKFLOW_SIDECAR: &str = "manifest.cwl";

/// Loads the base mapping for a workflow export next to `anchor`.
///
/// Returns an empty mapping when neither sidecar exists.
pub fn load_workflow_base(anchor: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let dir = sidecar_dir(anchor.as_ref());

    let candidates = [
        (dir.join(WORKFLOW_SIDECAR), SidecarFormat::Yaml),
        (dir.join(MANIFEST_JSON), SidecarFormat::Json),
    ];
    let Some((path, format)) = candidates.into_iter().find(|(path, _)| path.is_file()) else {
        return Ok(Map::new());
    };

    debug!(path = %path.display(), "Loading workflow base");
    match format.read::<Value>(&path)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(SidecarError::NotAMapping(path)),
    }
}

/// Writes a workflow description as YAML.
pub fn save_workflow(path: impl AsRef<Path>, document: &Value) -> Result<()> {
    let path = path.as_ref();
    SidecarFormat::Yaml.write(path, document)?;
    debug!(path = %path.display(), "Saved workflow description");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cwl_sidecar_preferred_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WORKFLOW_SIDECAR), "label: from-cwl\n").unwrap();
        std::fs::write(dir.path().join(MANIFEST_JSON), r#"{"label": "from-json"}"#).unwrap();

        let base = load_workflow_base(dir.path().join("tool.py")).unwrap();
        assert_eq!(base["label"], json!("from-cwl"));
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_JSON), "42").unwrap();
        assert!(matches!(
            load_workflow_base(dir.path().join("tool.py")),
            Err(SidecarError::NotAMapping(_))
        ));
    }
}
