//! Last completed summary per page.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A completed summary and the model that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSummary {
    /// Model identifier.
    pub model: String,
    /// Final summary text.
    pub summary: String,
}

/// Remembers the last completed summary for each page URL, so a popup
/// reopened on the same page can show it without a new request.
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<String, CachedSummary>>>,
}

impl ResultCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `summary` for `url`, replacing any earlier one.
    /// Empty summaries are not recorded.
    pub async fn record(&self, url: &str, model: &str, summary: &str) {
        if summary.is_empty() {
            return;
        }
        self.entries.write().await.insert(
            url.to_string(),
            CachedSummary {
                model: model.to_string(),
                summary: summary.to_string(),
            },
        );
    }

    /// The last summary recorded for `url`.
    pub async fn restore(&self, url: &str) -> Option<CachedSummary> {
        self.entries.read().await.get(url).cloned()
    }

    /// Drop whatever is recorded for `url`.
    pub async fn forget(&self, url: &str) {
        self.entries.write().await.remove(url);
    }
}
