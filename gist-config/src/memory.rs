//! In-memory settings store.

use async_trait::async_trait;
use gist_types::Settings;
use tokio::sync::RwLock;

use crate::error::ConfigError;
use crate::migrate::decode;
use crate::store::ConfigStore;

/// Settings held in memory as a raw JSON document behind a `RwLock`.
///
/// Suitable for tests and embedders that manage persistence themselves.
/// Documents seeded with [`MemoryStore::from_document`] are migrated on
/// every load, like the file store.
pub struct MemoryStore {
    doc: RwLock<serde_json::Value>,
}

impl MemoryStore {
    /// An empty store; loads return defaults.
    pub fn new() -> Self {
        Self {
            doc: RwLock::new(serde_json::Value::Null),
        }
    }

    /// A store seeded with `settings`.
    pub fn with_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            doc: RwLock::new(serde_json::to_value(settings)?),
        })
    }

    /// A store seeded with a raw document, possibly in a legacy layout.
    pub fn from_document(doc: serde_json::Value) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self) -> Result<Settings, ConfigError> {
        let doc = self.doc.read().await.clone();
        decode(doc)
    }

    async fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let value = serde_json::to_value(settings)?;
        *self.doc.write().await = value;
        Ok(())
    }
}
