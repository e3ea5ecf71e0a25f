//! # Streaming Chat Completion – Pollinations
//!
//! Consumes structured stream events from a Pollinations reasoning model:
//! reasoning deltas are printed dimmed, answer text as it arrives.
//!
//! ```bash
//! cargo run -p pollen --example pollinations_chat_stream
//! ```
//!
//! Set `SIMULATE=1` to serve the stream from a single non-streaming request.

use futures_util::StreamExt;
use pollen::{
    generic::{GenericMessage, StreamEvent},
    pollinations::{PollinationsChatModelId, PollinationsChatSettings, PollinationsProviderBuilder},
    provider::StreamingEventsProvider as _,
};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let provider = PollinationsProviderBuilder::new_from_env().build()?;

    let settings = PollinationsChatSettings::new()
        .with_simulate_streaming(std::env::var("SIMULATE").is_ok_and(|v| v == "1"));
    let model = provider.chat_model(PollinationsChatModelId::OpenAiReasoning, settings);

    let params = model.parameters(vec![
        GenericMessage::system("You are a real-time narrator. Respond sentence by sentence."),
        GenericMessage::user("Tell me a short story about Rustaceans exploring space."),
    ]);

    let mut stream = model.chat_complete_events_stream(params);

    print!("Assistant: ");
    io::stdout().flush().ok();

    while let Some(event) = stream.next().await {
        match event {
            Ok(StreamEvent::ReasoningDelta(text)) => print!("\x1b[2m{text}\x1b[0m"),
            Ok(StreamEvent::TextDelta(text)) => print!("{text}"),
            Ok(StreamEvent::Usage(usage)) => println!("\n\n[{} tokens]", usage.total_tokens),
            Ok(StreamEvent::MessageEnd) => println!(),
            Ok(_) => {}
            Err(e) => {
                eprintln!("\n\nError while streaming: {e}");
                break;
            }
        }
        io::stdout().flush().ok();
    }

    println!("\nStream finished");
    Ok(())
}
