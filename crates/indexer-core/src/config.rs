//! Config store for the desired index state
//!
//! The config artifact is an ordered list of [`CollectionConfig`] entries in
//! JSON or YAML, chosen by file extension. [`ConfigStore::save`] always
//! rewrites the whole artifact.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::CollectionConfig;
use crate::{Error, Result, io};

/// Serialization format of the config artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::config(
                path,
                format!("unsupported config format: {extension:?} (expected .json, .yaml or .yml)"),
            )),
        }
    }
}

/// Loads and saves the config artifact at one path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the desired state.
    ///
    /// Descriptors are normalized so they compare equal to the ones decoded
    /// from the live catalog.
    pub fn load(&self) -> Result<Vec<CollectionConfig>> {
        let format = ConfigFormat::from_path(&self.path)?;

        if !self.path.exists() {
            return Err(Error::config(&self.path, "file not found"));
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::config(&self.path, e))?;

        let collections: Vec<CollectionConfig> = match format {
            ConfigFormat::Json => serde_json::from_str(&content)
                .map_err(|e| Error::config(&self.path, format!("invalid JSON: {e}")))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(&self.path, format!("invalid YAML: {e}")))?,
        };

        debug!(
            path = %self.path.display(),
            collections = collections.len(),
            "Loaded index config"
        );

        Ok(collections
            .into_iter()
            .map(|mut collection| {
                collection.indexes = collection
                    .indexes
                    .into_iter()
                    .map(|index| index.normalized())
                    .collect();
                collection
            })
            .collect())
    }

    /// Overwrite the artifact with the given state.
    pub fn save(&self, collections: &[CollectionConfig]) -> Result<()> {
        let format = ConfigFormat::from_path(&self.path)?;

        let content = match format {
            ConfigFormat::Json => {
                let mut json = serde_json::to_string_pretty(collections)
                    .map_err(|e| Error::config(&self.path, e))?;
                json.push('\n');
                json
            }
            ConfigFormat::Yaml => {
                serde_yaml::to_string(collections).map_err(|e| Error::config(&self.path, e))?
            }
        };

        io::write_atomic(&self.path, content.as_bytes())?;

        debug!(
            path = %self.path.display(),
            collections = collections.len(),
            "Saved index config"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("indexes.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("indexes.YML")).unwrap(),
            ConfigFormat::Yaml
        );
        assert!(ConfigFormat::from_path(Path::new("indexes.toml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("indexes")).is_err());
    }
}
