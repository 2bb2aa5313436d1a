use std::fs;

use docargs_core::{CanonicalType, Cardinality, Manifest, ParameterSpec};
use docargs_sidecar::{
    MANIFEST_JSON, MANIFEST_YAML, SidecarError, find_manifest_sidecar, load_manifest,
    load_overlay, save_manifest, save_workflow,
};
use serde_json::json;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_manifest() -> Manifest {
    let mut manifest = Manifest::new();
    manifest.name = Some("resize".to_string());
    manifest.version = Some("3".to_string());
    manifest.description = Some("Resize images".to_string());
    manifest.params = Some(vec![
        ParameterSpec::new("inputs", CanonicalType::Path).with_cardinality(Cardinality::Multiple),
        ParameterSpec::new("scale", CanonicalType::Float).with_default(json!(0.5)),
    ]);
    manifest.extra.insert("container".to_string(), json!("resize:latest"));
    manifest.extra.insert("resources".to_string(), json!({"gpus": 1}));
    manifest
}

// ---------------------------------------------------------------------------
// Manifests
// ---------------------------------------------------------------------------

#[test]
fn test_manifest_json_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(MANIFEST_JSON);

    let original = sample_manifest();
    save_manifest(&path, &original).unwrap();
    assert_eq!(load_manifest(&path).unwrap(), original);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n    \"name\": \"resize\""), "expected four-space indent:\n{text}");
    assert!(text.contains("\"tag\": \"--inputs\""));
    assert!(text.contains("\"nargs\": \"+\""));
}

#[test]
fn test_manifest_yaml_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(MANIFEST_YAML);

    let original = sample_manifest();
    save_manifest(&path, &original).unwrap();
    assert_eq!(load_manifest(&path).unwrap(), original);
}

#[test]
fn test_manifest_with_numeric_version_from_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(MANIFEST_YAML);
    fs::write(
        &path,
        "name: tool\nversion: 2\nparams:\n  - mandatory: true\n    description: First\n    type: int\n    name: x\n    tag: --x\n    value: null\n    nargs: null\n    choices: null\n",
    )
    .unwrap();

    let manifest = load_manifest(&path).unwrap();
    assert_eq!(manifest.version.as_deref(), Some("2"));
    let params = manifest.params.unwrap();
    assert_eq!(params[0].value_type, CanonicalType::Int);
    assert_eq!(params[0].nargs, Cardinality::Scalar);
}

#[test]
fn test_find_manifest_sidecar_prefers_json() {
    let dir = TempDir::new().unwrap();
    assert_eq!(find_manifest_sidecar(dir.path()), None);

    fs::write(dir.path().join(MANIFEST_YAML), "{}").unwrap();
    assert_eq!(
        find_manifest_sidecar(dir.path()),
        Some(dir.path().join(MANIFEST_YAML))
    );

    fs::write(dir.path().join(MANIFEST_JSON), "{}").unwrap();
    assert_eq!(
        find_manifest_sidecar(dir.path()),
        Some(dir.path().join(MANIFEST_JSON))
    );
}

#[test]
fn test_unsupported_manifest_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.toml");
    assert!(matches!(
        save_manifest(&path, &Manifest::new()),
        Err(SidecarError::UnsupportedExtension(_))
    ));
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_overlay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.yml");
    fs::write(&path, "x: 5\ny: ./a.txt\nw: [stefan, doerr]\n").unwrap();

    let overlay = load_overlay(&path).unwrap();
    assert_eq!(overlay.get("x"), Some(&json!(5)));
    assert_eq!(overlay.get("w"), Some(&json!(["stefan", "doerr"])));
    assert_eq!(overlay.execid, None);
}

#[test]
fn test_json_execution_record_overlay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"execid": "job-1", "params": [{"name": "x", "value": 5}, {"name": "k", "value": "choice2"}]}"#,
    )
    .unwrap();

    let overlay = load_overlay(&path).unwrap();
    assert_eq!(overlay.execid, Some(json!("job-1")));
    assert_eq!(
        overlay.entries,
        vec![
            ("x".to_string(), json!(5)),
            ("k".to_string(), json!("choice2")),
        ]
    );
}

#[test]
fn test_overlay_rejects_other_extensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.txt");
    fs::write(&path, "x: 5\n").unwrap();

    assert!(matches!(
        load_overlay(&path),
        Err(SidecarError::UnsupportedExtension(_))
    ));
}

#[test]
fn test_overlay_rejects_list_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(&path, "- 1\n- 2\n").unwrap();

    assert!(matches!(
        load_overlay(&path),
        Err(SidecarError::NotAMapping(_))
    ));
}

// ---------------------------------------------------------------------------
// Workflow descriptions
// ---------------------------------------------------------------------------

#[test]
fn test_save_workflow_writes_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tool.cwl");
    let document = json!({
        "label": "resize",
        "cwlVersion": "v1.2",
        "class": "CommandLineTool",
        "inputs": {"scale": {"type": "float?", "default": 0.5}}
    });

    save_workflow(&path, &document).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("class: CommandLineTool"));
    let reloaded: serde_json::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(reloaded, document);
}
