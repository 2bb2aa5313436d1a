//! Manifest merging.
//!
//! A manifest is the only persisted artifact; descriptors are rebuilt on
//! every run and merged into it. [`ManifestBuilder`] applies descriptors to a
//! base manifest in place, keeping every field it does not own untouched.
//!
//! # Example
//!
//! ```
//! use docargs_core::*;
//!
//! let descriptor = FunctionDescriptor::new("train", "train_model")
//!     .with_description("Train a model")
//!     .with_param(ParameterSpec::new("epochs", CanonicalType::Int));
//!
//! let manifest = merge_manifest(Manifest::new(), &[descriptor]).unwrap();
//! assert_eq!(manifest.name.as_deref(), Some("train"));
//! assert_eq!(manifest.version.as_deref(), Some("1"));
//! assert_eq!(manifest.params.unwrap().len(), 1);
//! ```

use thiserror::Error;

use crate::{DEFAULT_MANIFEST_VERSION, FunctionDescriptor, Manifest};

/// Manifest merge errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// No `functions` entry references the descriptor's callable.
    #[error("function '{0}' was not found in the manifest's functions list")]
    FunctionNotFound(String),
    /// A legacy single-command manifest received a second descriptor.
    #[error("legacy manifest layout supports a single function; got '{0}' as well")]
    LegacyMultipleFunctions(String),
}

/// Applies function descriptors to a base manifest.
///
/// In the multi-command layout each descriptor updates the entry whose
/// `function` reference ends with `.<callable>`; entries are never created.
/// In the legacy layout only one descriptor may be merged.
///
/// # Examples
///
/// ```
/// use docargs_core::*;
///
/// let mut base = Manifest::new();
/// base.functions = Some(vec![
///     FunctionEntry::new("tools.prepare"),
///     FunctionEntry::new("tools.train"),
/// ]);
///
/// let mut builder = ManifestBuilder::new(base);
/// builder
///     .merge(&FunctionDescriptor::new("Train", "train").with_description("Fit"))
///     .unwrap();
/// let manifest = builder.build();
///
/// let entries = manifest.functions.unwrap();
/// assert_eq!(entries[1].name.as_deref(), Some("train"));
/// assert_eq!(entries[1].description.as_deref(), Some("Fit"));
/// assert_eq!(entries[0].name, None);
/// ```
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    manifest: Manifest,
    legacy_merged: Option<String>,
}

impl ManifestBuilder {
    /// Starts from `base`.
    pub fn new(base: Manifest) -> Self {
        Self {
            manifest: base,
            legacy_merged: None,
        }
    }

    /// Merges one descriptor.
    pub fn merge(&mut self, descriptor: &FunctionDescriptor) -> Result<&mut Self, MergeError> {
        if self.manifest.is_multi_command() {
            self.merge_entry(descriptor)?;
        } else {
            self.merge_legacy(descriptor)?;
        }
        Ok(self)
    }

    /// Returns the merged manifest.
    pub fn build(self) -> Manifest {
        self.manifest
    }

    fn merge_entry(&mut self, descriptor: &FunctionDescriptor) -> Result<(), MergeError> {
        let index = self
            .manifest
            .find_function(&descriptor.callable)
            .ok_or_else(|| MergeError::FunctionNotFound(descriptor.callable.clone()))?;

        let Some(entry) = self
            .manifest
            .functions
            .as_mut()
            .and_then(|entries| entries.get_mut(index))
        else {
            return Err(MergeError::FunctionNotFound(descriptor.callable.clone()));
        };

        entry.name = Some(descriptor.callable.clone());
        entry.description = Some(descriptor.description.clone());
        entry.params = descriptor.params.clone();
        Ok(())
    }

    fn merge_legacy(&mut self, descriptor: &FunctionDescriptor) -> Result<(), MergeError> {
        if self.legacy_merged.is_some() {
            return Err(MergeError::LegacyMultipleFunctions(descriptor.callable.clone()));
        }
        self.legacy_merged = Some(descriptor.callable.clone());

        let manifest = &mut self.manifest;
        if manifest.name.is_none() {
            manifest.name = Some(descriptor.name.clone());
        }
        if manifest.version.is_none() {
            manifest.version = Some(DEFAULT_MANIFEST_VERSION.to_string());
        }
        manifest.description = Some(descriptor.description.clone());
        manifest.params = Some(descriptor.params.clone());
        Ok(())
    }
}

/// Merges `descriptors` into `base` in order.
///
/// Shorthand for [`ManifestBuilder`].
pub fn merge_manifest(
    base: Manifest,
    descriptors: &[FunctionDescriptor],
) -> Result<Manifest, MergeError> {
    let mut builder = ManifestBuilder::new(base);
    for descriptor in descriptors {
        builder.merge(descriptor)?;
    }
    Ok(builder.build())
}
