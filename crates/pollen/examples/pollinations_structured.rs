//! # Structured output – Pollinations
//!
//! Asks for JSON matching a Rust type and deserialises the reply.
//!
//! ```bash
//! cargo run -p pollen --example pollinations_structured
//! ```

use pollen::{
    generic::GenericMessage,
    pollinations::{PollinationsChatModelId, PollinationsProviderBuilder},
    provider::ChatCompletionProvider as _,
};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct Advice {
    /// One-sentence tip.
    tip: String,
    /// How confident the model is, 0–10.
    confidence: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let provider = PollinationsProviderBuilder::new_from_env().build()?;
    let model = provider.chat_model(PollinationsChatModelId::OpenAi, Default::default());

    let params = model
        .parameters(vec![GenericMessage::user(
            "Give me one piece of advice for writing async Rust.",
        )])
        .with_json_schema::<Advice>("advice");

    let response = model.chat_complete(params).await?;
    let text = response
        .content
        .finished()
        .and_then(|message| message.content)
        .ok_or_else(|| anyhow::anyhow!("model returned no content"))?;

    let advice: Advice = serde_json::from_str(&text)?;
    println!("{advice:#?}");
    Ok(())
}
