//! File formats understood by the sidecar readers and writers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;

use crate::error::{Result, SidecarError};

/// Serialization format of a sidecar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarFormat {
    /// JSON, written with four-space indentation.
    Json,
    /// YAML.
    Yaml,
}

impl SidecarFormat {
    /// Picks the format from a file extension (`json`, `yaml`, `yml`).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use docargs_sidecar::SidecarFormat;
    ///
    /// assert_eq!(SidecarFormat::from_path(Path::new("conf.YML")).unwrap(), SidecarFormat::Yaml);
    /// assert!(SidecarFormat::from_path(Path::new("conf.toml")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(SidecarError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    /// Reads and deserializes a file.
    pub fn read<T: DeserializeOwned>(self, path: &Path) -> Result<T> {
        let reader = BufReader::new(File::open(path)?);
        let value = match self {
            Self::Json => serde_json::from_reader(reader)?,
            Self::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(value)
    }

    /// Serializes `value` into a file, replacing its content.
    pub fn write<T: Serialize>(self, path: &Path, value: &T) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        match self {
            Self::Json => {
                let mut serializer = serde_json::Serializer::with_formatter(
                    &mut writer,
                    PrettyFormatter::with_indent(b"    "),
                );
                value.serialize(&mut serializer)?;
                writer.write_all(b"\n")?;
            }
            Self::Yaml => serde_yaml::to_writer(&mut writer, value)?,
        }
        writer.flush()?;
        Ok(())
    }
}
