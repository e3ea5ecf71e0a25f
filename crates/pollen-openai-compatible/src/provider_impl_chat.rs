use std::sync::Arc;

use pollen_core::{
    error::Result,
    generic::{GenericChatCompletionResponse, GenericMessage, ResponseContent},
    provider::{ChatCompleteParameters, ChatCompletionProvider},
};

use crate::{
    OpenAiCompatibleAdapter,
    api_v1::{ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse, FinishReason},
    error::OpenAiCompatibleError,
};

impl ChatCompletionProvider for OpenAiCompatibleAdapter {
    type Message = ChatCompletionMessage;

    fn chat_complete<'p, M>(
        &'p self,
        params: ChatCompleteParameters<M>,
    ) -> std::pin::Pin<
        Box<
            dyn Future<Output = Result<GenericChatCompletionResponse<GenericMessage>>> + Send + 'p,
        >,
    >
    where
        M: Into<Self::Message> + Clone + Send + Sync + 'p,
    {
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            let request: ChatCompletionRequest = params.try_into()?;
            let request = self.apply_settings(request);

            let response = client.chat_completion(request).await?;
            into_generic_response(response)
        })
    }
}

/// Reduce a full response to its first choice.
pub(crate) fn into_generic_response(
    mut response: ChatCompletionResponse,
) -> Result<GenericChatCompletionResponse<GenericMessage>> {
    let usage = response.usage.map(Into::into);

    if response.choices.is_empty() {
        return Err(OpenAiCompatibleError::Format("response has no choices".into()).into());
    }
    let first_choice = response.choices.swap_remove(0);

    let content = match first_choice.finish_reason {
        Some(FinishReason::ToolCalls) => ResponseContent::ToolCalls(first_choice.message.into()),
        None | Some(FinishReason::Stop) | Some(FinishReason::Length) => {
            ResponseContent::Finished(first_choice.message.into())
        }
        Some(FinishReason::Other) if first_choice.message.tool_calls.is_some() => {
            ResponseContent::ToolCalls(first_choice.message.into())
        }
        Some(FinishReason::Other) => ResponseContent::Finished(first_choice.message.into()),
        Some(FinishReason::ContentFilter) => {
            return Err(OpenAiCompatibleError::Format(
                "response was blocked by the content filter".into(),
            )
            .into());
        }
    };

    Ok(GenericChatCompletionResponse { content, usage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::generic::GenericRole;
    use serde_json::json;

    fn response(value: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn stop_yields_finished_message_and_usage() {
        let generic = into_generic_response(response(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        })))
        .unwrap();

        assert_eq!(generic.usage.map(|u| u.total_tokens), Some(4));
        let message = generic.content.finished().expect("finished");
        assert_eq!(message.role, GenericRole::Assistant);
        assert_eq!(message.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn tool_calls_are_surfaced() {
        let generic = into_generic_response(response(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{"id": "c1", "type": "function", "function": {"name": "f", "arguments": "{}"}}]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .unwrap();

        let ResponseContent::ToolCalls(message) = generic.content else {
            panic!("expected tool calls");
        };
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "f");
    }

    #[test]
    fn empty_choices_and_filtered_content_fail() {
        assert!(into_generic_response(response(json!({"choices": []}))).is_err());
        assert!(
            into_generic_response(response(json!({
                "choices": [{"message": {"role": "assistant", "content": ""}, "finish_reason": "content_filter"}]
            })))
            .is_err()
        );
    }
}
