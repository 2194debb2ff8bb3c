//! Summarize text from stdin and print the streamed summary.
//!
//! Settings come from the JSON file given as the first argument (defaults
//! if it does not exist); `GIST_API_KEY` overrides the stored key:
//!
//!   echo "Some long text" | GIST_API_KEY=sk-... cargo run --example summarize -- settings.json

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use gist_config::{ConfigStore, FileStore, snapshot};
use gist_driver::{Dispatcher, port};
use gist_provider_openai::OpenAi;
use gist_types::{ChannelEvent, Command, SummarizeRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));
    let store: Arc<dyn ConfigStore> = Arc::new(FileStore::new(&path));

    let settings = snapshot(store.as_ref()).await?;
    let level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;

    let dispatcher = Dispatcher::new(store, OpenAi::new());
    let (channel, mut events) = port();
    dispatcher.dispatch(
        Command::Summarize(SummarizeRequest {
            content: Some(content),
            ..SummarizeRequest::default()
        }),
        channel,
    );

    let mut printed = 0;
    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Message { text } => {
                print!("{}", &text[printed..]);
                printed = text.len();
                std::io::stdout().flush()?;
            }
            ChannelEvent::Done { text } => {
                let text = text.unwrap_or_default();
                println!("{}", text.get(printed..).unwrap_or_default());
                break;
            }
            ChannelEvent::Error { text } => {
                eprintln!("error: {text}");
                break;
            }
        }
    }

    Ok(())
}
