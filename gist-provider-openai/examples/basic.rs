//! Stream a short completion from the OpenAI API.
//!
//! Set OPENAI_API_KEY in your environment and run:
//!   cargo run --example basic

use gist_provider_openai::{OpenAi, ResponseReader};
use gist_types::{CompletionRequest, PromptMessage, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY environment variable must be set")?;

    let client = OpenAi::new();
    let request = CompletionRequest {
        model: "gpt-4o-mini".into(),
        messages: vec![PromptMessage::user("Say hello in one sentence.")],
        reasoning_effort: None,
    };

    let mut reader = ResponseReader::new(client.open(&api_key, &request).await?);
    loop {
        let event = reader.next().await;
        if let Some(error) = &event.error {
            eprintln!("error: {error}");
            break;
        }
        if event.terminal {
            println!("{}", event.text.unwrap_or_default());
            break;
        }
    }

    Ok(())
}
