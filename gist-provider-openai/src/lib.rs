#![doc = include_str!("../README.md")]

pub mod client;
pub mod decoder;
pub(crate) mod error;
pub mod mapping;
pub mod streaming;

pub use client::OpenAi;
pub use decoder::{ChunkDecoder, JsonCarry, Parse, Record};
pub use streaming::{ReaderState, ResponseReader};

// Re-export gist-types for convenience
pub use gist_types::{CompletionError, StreamEvent, Transport};
