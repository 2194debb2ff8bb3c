#![deny(missing_docs)]
//! Completion request driver for gist.
//!
//! Ties the pieces together: a [`Dispatcher`] receives [`Command`]s from
//! UI surfaces, takes a settings snapshot, assembles the conversation and
//! hands it to a [`Driver`], which streams the completion and republishes
//! it over a [`Channel`] such as [`PortChannel`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gist_config::MemoryStore;
//! use gist_driver::{Dispatcher, port};
//! use gist_provider_openai::OpenAi;
//! use gist_types::{Command, SummarizeRequest};
//!
//! # async fn run() {
//! let dispatcher = Dispatcher::new(Arc::new(MemoryStore::new()), OpenAi::new());
//! let (channel, mut events) = port();
//!
//! dispatcher.dispatch(
//!     Command::Summarize(SummarizeRequest {
//!         content: Some("Page text.".into()),
//!         ..Default::default()
//!     }),
//!     channel,
//! );
//!
//! while let Some(event) = events.recv().await {
//!     let terminal = event.is_terminal();
//!     println!("{event:?}");
//!     if terminal {
//!         break;
//!     }
//! }
//! # }
//! ```
//!
//! [`Command`]: gist_types::Command
//! [`Channel`]: gist_types::Channel

pub mod cache;
pub mod dispatch;
pub mod driver;
pub mod port;
pub mod prompts;

pub use cache::{CachedSummary, ResultCache};
pub use dispatch::{Dispatcher, ERR_NO_CONTENT};
pub use driver::{Driver, Outcome, completion_request};
pub use port::{PortChannel, port};
pub use prompts::{form_fill_messages, summary_messages};
