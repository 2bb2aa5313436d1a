//! Configuration overlay files.
//!
//! An overlay assigns values to parameters by name. Two layouts are read:
//!
//! - a flat mapping, `{name: value, ...}`;
//! - an execution record, `{"execid": ..., "params": [{"name": ..., "value": ...}]}`.
//!
//! Entries keep their file order.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SidecarError};
use crate::format::SidecarFormat;

/// Parameter values read from a configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    /// Execution id of an execution record.
    pub execid: Option<Value>,
    /// `(name, value)` pairs in file order.
    pub entries: Vec<(String, Value)>,
}

impl Overlay {
    /// Interprets an already parsed document.
    ///
    /// # Examples
    ///
    /// ```
    /// use docargs_sidecar::Overlay;
    /// use serde_json::json;
    ///
    /// let flat = Overlay::from_value(json!({"x": 5, "y": "a.txt"})).unwrap();
    /// assert_eq!(flat.entries.len(), 2);
    ///
    /// let record = Overlay::from_value(json!({
    ///     "execid": "abc",
    ///     "params": [{"name": "x", "value": 7}]
    /// })).unwrap();
    /// assert_eq!(record.execid, Some(json!("abc")));
    /// assert_eq!(record.entries, vec![("x".to_string(), json!(7))]);
    /// ```
    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(mut map) = document else {
            return Err(SidecarError::InvalidOverlay(
                "top level must be a mapping".to_string(),
            ));
        };

        if map.contains_key("execid") && map.contains_key("params") {
            let execid = map.remove("execid");
            let params = map.remove("params").unwrap_or(Value::Null);
            return Ok(Self {
                execid,
                entries: record_entries(params)?,
            });
        }

        Ok(Self {
            execid: None,
            entries: map.into_iter().collect(),
        })
    }

    /// Returns the value assigned to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Loads an overlay from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns [`UnsupportedExtension`](SidecarError::UnsupportedExtension) for
/// any other extension, [`NotAMapping`](SidecarError::NotAMapping) when the
/// document is not a mapping, and [`InvalidOverlay`](SidecarError::InvalidOverlay)
/// for a malformed execution record.
pub fn load_overlay(path: impl AsRef<Path>) -> Result<Overlay> {
    let path = path.as_ref();
    let document: Value = SidecarFormat::from_path(path)?.read(path)?;
    if !document.is_object() {
        return Err(SidecarError::NotAMapping(path.to_path_buf()));
    }
    let overlay = Overlay::from_value(document)?;
    debug!(
        path = %path.display(),
        entries = overlay.entries.len(),
        "Loaded configuration overlay"
    );
    Ok(overlay)
}

fn record_entries(params: Value) -> Result<Vec<(String, Value)>> {
    let Value::Array(items) = params else {
        return Err(SidecarError::InvalidOverlay(
            "'params' must be a list".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(mut entry) = item else {
                return Err(SidecarError::InvalidOverlay(format!(
                    "params[{index}] must be a mapping"
                )));
            };
            let name = match entry.remove("name") {
                Some(Value::String(name)) => name,
                _ => {
                    return Err(SidecarError::InvalidOverlay(format!(
                        "params[{index}] needs a string 'name'"
                    )));
                }
            };
            let value = entry.remove("value").unwrap_or(Value::Null);
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_non_mapping_is_rejected() {
        assert!(matches!(
            Overlay::from_value(json!([1, 2])),
            Err(SidecarError::InvalidOverlay(_))
        ));
    }

    #[test]
    fn test_execid_without_params_is_flat() {
        let overlay = Overlay::from_value(json!({"execid": 3, "x": 1})).unwrap();
        assert_eq!(overlay.execid, None);
        assert_eq!(overlay.get("execid"), Some(&json!(3)));
        assert_eq!(overlay.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_record_entries_need_names() {
        let result = Overlay::from_value(json!({
            "execid": 1,
            "params": [{"value": 2}]
        }));
        assert!(matches!(result, Err(SidecarError::InvalidOverlay(msg)) if msg.contains("params[0]")));
    }

    #[test]
    fn test_flat_entries_keep_file_order() {
        let overlay = Overlay::from_value(json!({"b": 1, "a": 2, "c": 3})).unwrap();
        let keys: Vec<&str> = overlay.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
