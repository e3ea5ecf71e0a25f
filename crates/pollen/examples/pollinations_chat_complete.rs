use pollen::pollinations::{PollinationsChatModelId, PollinationsProviderBuilder};
use pollen::{
    PollenClient,
    generic::{GenericMessage, ResponseContent},
    provider::ChatCompletionProvider as _,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// # Chat Completion – Pollinations
///
/// Sends one conversation to a Pollinations model and prints the answer plus
/// token usage.
///
/// ```bash
/// export POLLINATIONS_API_TOKEN=…   # optional, anonymous otherwise
/// RUST_LOG=pollen_openai_compatible=debug \
///     cargo run -p pollen --example pollinations_chat_complete -- mistral
/// ```
///
/// The first argument picks the model; any name is accepted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let model_id = std::env::args()
        .nth(1)
        .map(PollinationsChatModelId::from)
        .unwrap_or(PollinationsChatModelId::OpenAi);

    let provider = PollinationsProviderBuilder::new_from_env().build()?;
    let client = PollenClient::new(provider.chat_model(model_id, Default::default()));

    let messages = vec![
        GenericMessage::system("You are a concise, witty assistant."),
        GenericMessage::user("Why is the Rust borrow checker important?"),
    ];
    let params = client.backend().parameters(messages);

    let response = client.chat_complete(params).await?;

    match response.content {
        ResponseContent::Finished(message) => match message.content {
            Some(answer) => println!("Assistant ({}): {answer}", client.backend().model_id()),
            None => println!("Assistant returned no textual content"),
        },
        ResponseContent::ToolCalls(message) => {
            println!("Assistant requested tools: {:?}", message.tool_calls)
        }
    }

    if let Some(usage) = response.usage {
        println!(
            "Tokens – prompt: {}, completion: {}, total: {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
