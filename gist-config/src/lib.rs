#![deny(missing_docs)]
//! Settings and profile storage for gist.
//!
//! The driver never reads storage directly. Callers take a [`Settings`]
//! snapshot through [`snapshot`] at the start of each request and pass it
//! down; edits saved mid-stream apply to the next request.
//!
//! Stored documents are migrated on load, so configurations written by
//! older releases keep working:
//!
//! - a flat `{apiKey, model, customPrompts, debug}` document becomes a
//!   `default` profile,
//! - retired model names are rewritten to their replacements.
//!
//! [`Settings`]: gist_types::Settings

pub mod env;
pub mod error;
pub mod fs;
pub mod memory;
pub mod migrate;
pub mod store;

pub use env::{API_KEY_ENV, override_api_key};
pub use error::ConfigError;
pub use fs::FileStore;
pub use memory::MemoryStore;
pub use migrate::migrate;
pub use store::{ConfigStore, snapshot};
