//! Sidecar files for docargs manifests.
//!
//! Everything that touches the filesystem lives here:
//!
//! - manifests (`manifest.json` / `manifest.yaml`) via [`load_manifest`],
//!   [`save_manifest`] and [`load_manifest_sidecar`];
//! - configuration overlays via [`load_overlay`];
//! - workflow descriptions via [`load_workflow_base`] and [`save_workflow`].
//!
//! # Example
//!
//! ```no_run
//! use docargs_sidecar::{load_overlay, load_manifest};
//!
//! let manifest = load_manifest("tools/manifest.yaml").unwrap();
//! let overlay = load_overlay("run.yml").unwrap();
//! println!("{:?} {}", manifest.name, overlay.entries.len());
//! ```

pub mod error;
mod format;
mod manifest;
mod overlay;
mod workflow;

pub use error::{Result, SidecarError};
pub use format::SidecarFormat;
pub use manifest::{
    MANIFEST_JSON, MANIFEST_YAML, find_manifest_sidecar, load_manifest, load_manifest_sidecar,
    save_manifest,
};
pub use overlay::{Overlay, load_overlay};
pub use workflow::{WORKFLOW_SIDECAR, load_workflow_base, save_workflow};
