//! Persisted manifests in the legacy single-command and multi-command
//! layouts, with externally authored fields carried along.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ParameterSpec;

/// Version written to a legacy manifest that does not declare one.
pub const DEFAULT_MANIFEST_VERSION: &str = "1";

/// Persisted schema describing one or more commands.
///
/// A manifest uses one of two layouts:
///
/// - **legacy single-command**: top-level `name`, `version`, `description`
///   and `params`;
/// - **multi-command**: a `functions` list of [`FunctionEntry`] values.
///
/// Any other field is kept in [`extra`](Manifest::extra) and written back
/// untouched, in its original order.
///
/// # Examples
///
/// ```
/// use docargs_core::Manifest;
///
/// let manifest: Manifest = serde_json::from_str(r#"{
///     "name": "train",
///     "version": 2,
///     "description": "Train a model",
///     "params": [],
///     "container": "trainer:latest"
/// }"#).unwrap();
///
/// assert_eq!(manifest.version.as_deref(), Some("2"));
/// assert!(!manifest.is_multi_command());
/// assert_eq!(manifest.extra["container"], "trainer:latest");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Program name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Manifest version, stored as a string.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_version"
    )]
    pub version: Option<String>,
    /// Program description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters of the legacy single-command layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<ParameterSpec>>,
    /// Entries of the multi-command layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionEntry>>,
    /// Externally authored fields. Their relative order is kept; on save they
    /// follow the known fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One command of a multi-command manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Fully qualified reference to the callable (e.g. `tools.train.run`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Subcommand name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Subcommand description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Subcommand parameters.
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
    /// Externally authored fields. Their relative order is kept; on save they
    /// follow the known fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FunctionEntry {
    /// Creates an entry for the given callable reference.
    pub fn new(function: &str) -> Self {
        Self {
            function: Some(function.to_string()),
            ..Default::default()
        }
    }

    /// Returns `true` if the entry's reference names `callable`.
    ///
    /// The reference must end with `.<callable>`.
    pub fn refers_to(&self, callable: &str) -> bool {
        self.function
            .as_deref()
            .is_some_and(|f| f.strip_suffix(callable).is_some_and(|rest| rest.ends_with('.')))
    }
}

/// Borrowed view of one command in a manifest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandView<'a> {
    /// Command name, if declared.
    pub name: Option<&'a str>,
    /// Command description (empty when absent).
    pub description: &'a str,
    /// Parameters, if declared.
    pub params: Option<&'a [ParameterSpec]>,
}

/// How a manifest maps onto commands.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestLayout<'a> {
    /// One command without subcommands.
    Single(CommandView<'a>),
    /// One subcommand per entry.
    Multi(Vec<CommandView<'a>>),
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the manifest uses the `functions` layout.
    pub fn is_multi_command(&self) -> bool {
        self.functions.is_some()
    }

    /// Returns the command layout.
    ///
    /// A `functions` list with exactly one entry is treated as a single
    /// command built from that entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use docargs_core::{FunctionEntry, Manifest, ManifestLayout};
    ///
    /// let mut manifest = Manifest::new();
    /// manifest.functions = Some(vec![FunctionEntry::new("pkg.run")]);
    /// assert!(matches!(manifest.layout(), ManifestLayout::Single(_)));
    ///
    /// manifest.functions.as_mut().unwrap().push(FunctionEntry::new("pkg.stop"));
    /// assert!(matches!(manifest.layout(), ManifestLayout::Multi(ref cmds) if cmds.len() == 2));
    /// ```
    pub fn layout(&self) -> ManifestLayout<'_> {
        match self.functions.as_deref() {
            Some([only]) => ManifestLayout::Single(only.view()),
            Some(entries) => ManifestLayout::Multi(entries.iter().map(FunctionEntry::view).collect()),
            None => ManifestLayout::Single(CommandView {
                name: self.name.as_deref(),
                description: self.description.as_deref().unwrap_or_default(),
                params: self.params.as_deref(),
            }),
        }
    }

    /// Finds the index of the entry whose reference names `callable`.
    pub fn find_function(&self, callable: &str) -> Option<usize> {
        self.functions
            .as_ref()?
            .iter()
            .position(|entry| entry.refers_to(callable))
    }
}

impl FunctionEntry {
    fn view(&self) -> CommandView<'_> {
        CommandView {
            name: self.name.as_deref(),
            description: self.description.as_deref().unwrap_or_default(),
            params: Some(&self.params),
        }
    }
}

fn deserialize_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(version)) => Ok(Some(version)),
        Some(Value::Number(version)) => Ok(Some(version.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "manifest version must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extra_fields_survive_round_trip_in_order() {
        let raw = json!({
            "zeta": 1,
            "name": "tool",
            "alpha": {"nested": true},
            "description": "Does things",
            "params": [],
        });
        let manifest: Manifest = serde_json::from_value(raw).unwrap();
        let keys: Vec<&str> = manifest.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back["zeta"], 1);
        assert_eq!(back["alpha"], json!({"nested": true}));
        assert_eq!(back["name"], "tool");

        let saved: Vec<&str> = back.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(saved, vec!["name", "description", "params", "zeta", "alpha"]);
    }

    #[test]
    fn test_refers_to_requires_dotted_suffix() {
        let entry = FunctionEntry::new("pkg.module.run");
        assert!(entry.refers_to("run"));
        assert!(entry.refers_to("module.run"));
        assert!(!entry.refers_to("un"));
        assert!(!FunctionEntry::new("run").refers_to("run"));
    }

    #[test]
    fn test_layout_for_legacy_manifest() {
        let manifest: Manifest = serde_json::from_value(json!({
            "name": "tool",
            "params": [],
        }))
        .unwrap();

        match manifest.layout() {
            ManifestLayout::Single(view) => {
                assert_eq!(view.name, Some("tool"));
                assert_eq!(view.description, "");
                assert_eq!(view.params.map(<[_]>::len), Some(0));
            }
            ManifestLayout::Multi(_) => panic!("expected single layout"),
        }
    }

    #[test]
    fn test_version_rejects_structured_values() {
        let result: Result<Manifest, _> = serde_json::from_value(json!({"version": [1]}));
        assert!(result.is_err());
    }
}
