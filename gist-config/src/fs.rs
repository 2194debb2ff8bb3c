//! JSON file settings store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gist_types::Settings;

use crate::error::ConfigError;
use crate::migrate::decode;
use crate::store::ConfigStore;

/// Settings persisted as one pretty-printed JSON file.
///
/// A missing file loads as defaults. Parent directories are created
/// lazily on first save.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store backed by the file at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn load(&self) -> Result<Settings, ConfigError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => return Err(ConfigError::ReadFailed(e.to_string())),
        };

        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }
        let doc: serde_json::Value = serde_json::from_str(&contents)?;
        decode(doc)
    }

    async fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ConfigError::WriteFailed(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| ConfigError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}
