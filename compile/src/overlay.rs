//! Applying a configuration file to parsed values.

use std::collections::HashSet;
use std::path::Path;

use docargs_sidecar::load_overlay;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::compiler::{CONF, CompiledCommand, UnknownKeyPolicy};
use crate::error::ParseError;
use crate::value::{ArgValue, coerce_json};

/// Loads `path` and writes its entries into `values`.
///
/// Returns the names of the parameters the file assigned.
pub(crate) fn apply_overlay(
    command: &CompiledCommand,
    path: &Path,
    policy: UnknownKeyPolicy,
    values: &mut IndexMap<String, ArgValue>,
) -> Result<HashSet<String>, ParseError> {
    let overlay = load_overlay(path)?;
    debug!(
        path = %path.display(),
        entries = overlay.entries.len(),
        "Applying configuration file"
    );

    let mut assigned = HashSet::new();
    for (key, raw) in overlay.entries {
        if key == CONF {
            continue;
        }

        let Some(option) = command.find_option(&key) else {
            match policy {
                UnknownKeyPolicy::Error => return Err(ParseError::UnknownConfigKey(key)),
                UnknownKeyPolicy::Warning => {
                    warn!(key = %key, "Unknown argument in config file");
                    values.insert(key, ArgValue::from_json(&raw));
                    continue;
                }
            }
        };

        let value = coerce_json(&option.spec.value_type, &raw).map_err(|reason| {
            ParseError::InvalidConfigValue {
                param: key.clone(),
                reason,
            }
        })?;
        values.insert(key.clone(), value);
        assigned.insert(key);
    }

    Ok(assigned)
}
