//! The settings store contract.

use async_trait::async_trait;
use gist_types::Settings;

use crate::env::apply_env_override;
use crate::error::ConfigError;

/// Persistent home of the user's [`Settings`].
///
/// Implementations migrate older documents on load. Object-safe, so the
/// dispatcher can hold an `Arc<dyn ConfigStore>`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the current settings, or defaults if nothing is stored yet.
    async fn load(&self) -> Result<Settings, ConfigError>;

    /// Replace the stored settings.
    async fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

/// Take the read-only snapshot for one request.
///
/// Loads from `store` and applies the `GIST_API_KEY` override.
pub async fn snapshot(store: &dyn ConfigStore) -> Result<Settings, ConfigError> {
    let mut settings = store.load().await?;
    apply_env_override(&mut settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::MemoryStore;

    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn object_safety() {
        _assert_send_sync::<Box<dyn ConfigStore>>();
        _assert_send_sync::<Arc<dyn ConfigStore>>();
        let _: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_store() {
        let store = MemoryStore::new();
        let before = snapshot(&store).await.unwrap();

        let mut edited = before.clone();
        edited.debug = true;
        store.save(&edited).await.unwrap();

        assert!(!before.debug);
        assert!(snapshot(&store).await.unwrap().debug);
    }
}
