use std::pin::Pin;

use crate::OpenAiCompatibleAdapter;
use crate::api_v1::ChatCompletionRequest;
use crate::api_v1::FinishReason;
use crate::provider_impl_chat::into_generic_response;
use pollen_core::error::{PollenError, Result};
use pollen_core::generic::{
    GenericChatCompletionResponse, GenericFunctionCall, GenericFunctionCallIntent, GenericMessage,
    ResponseContent, StreamEvent,
};
use pollen_core::provider::{
    ChatCompleteParameters, StreamingChatProvider, StreamingEventsProvider,
};
use futures_core::stream::Stream;
use std::collections::BTreeMap;

impl StreamingChatProvider for OpenAiCompatibleAdapter {
    type Delta<'s>
        = Pin<Box<dyn Stream<Item = Result<String>> + Send + 's>>
    where
        Self: 's;

    fn chat_complete_stream<'s, M>(&'s self, params: ChatCompleteParameters<M>) -> Self::Delta<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        Box::pin(async_stream::try_stream! {
            use futures_util::StreamExt;

            let request: ChatCompletionRequest = params.try_into()?;
            let request = self.apply_settings(request);

            if self.settings.simulates_streaming() {
                let response = self.client.chat_completion(request).await?;
                for event in simulated_events(into_generic_response(response)?) {
                    if let StreamEvent::TextDelta(text) = event {
                        yield text;
                    }
                }
                return;
            }

            let stream = self.client.chat_completion_stream(request);
            futures_util::pin_mut!(stream);

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(PollenError::from)?;
                for choice in chunk.choices {
                    if choice.index != 0 { continue; }
                    if let Some(text) = choice.delta.content
                        && !text.is_empty() {
                            yield text;
                        }
                }
            }
        })
    }
}

impl StreamingEventsProvider for OpenAiCompatibleAdapter {
    type EventStream<'s>
        = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send + 's>>
    where
        Self: 's;

    fn chat_complete_events_stream<'s, M>(
        &'s self,
        params: ChatCompleteParameters<M>,
    ) -> Self::EventStream<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        Box::pin(async_stream::try_stream! {
            use futures_util::StreamExt;

            let request: ChatCompletionRequest = params.try_into()?;
            let request = self.apply_settings(request);

            if self.settings.simulates_streaming() {
                let response = self.client.chat_completion(request).await?;
                for event in simulated_events(into_generic_response(response)?) {
                    yield event;
                }
                return;
            }

            let mut calls = ToolCallAccumulator::default();
            let mut finished = false;

            let stream = self.client.chat_completion_stream(request);
            futures_util::pin_mut!(stream);

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(PollenError::from)?;

                for choice in chunk.choices {
                    // Only the first choice is surfaced, matching `chat_complete`.
                    if choice.index != 0 || finished { continue; }

                    if let Some(delta) = choice.delta.reasoning_content
                        && !delta.is_empty() {
                            yield StreamEvent::ReasoningDelta(delta);
                        }

                    if let Some(delta) = choice.delta.content
                        && !delta.is_empty() {
                            yield StreamEvent::TextDelta(delta);
                        }

                    for tc in choice.delta.tool_calls.unwrap_or_default() {
                        let (name, arguments) = match tc.function {
                            Some(function) => (function.name, function.arguments),
                            None => (None, None),
                        };
                        for event in calls.push(tc.index, tc.id, name, arguments) {
                            yield event;
                        }
                    }

                    if let Some(reason) = choice.finish_reason {
                        if reason == FinishReason::ToolCalls || calls.has_calls() {
                            for event in calls.finish()? {
                                yield event;
                            }
                        }
                        finished = true;
                        yield StreamEvent::MessageEnd;
                    }
                }

                if let Some(usage) = chunk.usage {
                    yield StreamEvent::Usage(usage.into());
                }
            }

            if !finished {
                if calls.has_calls() {
                    for event in calls.finish()? {
                        yield event;
                    }
                }
                yield StreamEvent::MessageEnd;
            }
        })
    }
}

/// Collects indexed tool-call fragments until the model finishes.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<usize, PendingToolCall>,
}

#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
    announced: bool,
}

impl ToolCallAccumulator {
    fn has_calls(&self) -> bool {
        !self.calls.is_empty()
    }

    fn push(
        &mut self,
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    ) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let entry = self.calls.entry(index).or_default();

        if id.is_some() {
            entry.id = id;
        }
        if name.is_some() {
            entry.name = name;
        }

        // Announce once, as soon as either the id or the name is known.
        if !entry.announced && (entry.id.is_some() || entry.name.is_some()) {
            entry.announced = true;
            events.push(StreamEvent::ToolCallStart {
                index,
                id: entry.id.clone(),
                name: entry.name.clone(),
            });
        }

        if let Some(fragment) = arguments
            && !fragment.is_empty()
        {
            entry.arguments.push_str(&fragment);
            events.push(StreamEvent::ToolCallArgumentsDelta {
                index,
                arguments_fragment: fragment,
            });
        }

        events
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>> {
        let calls = std::mem::take(&mut self.calls);
        calls
            .into_iter()
            .map(|(index, call)| {
                let arguments = if call.arguments.trim().is_empty() {
                    serde_json::Value::Object(Default::default())
                } else {
                    serde_json::from_str(&call.arguments).map_err(|e| {
                        PollenError::Invalid(format!("invalid tool arguments JSON: {e}"))
                    })?
                };

                Ok(StreamEvent::ToolCallComplete {
                    index,
                    intent: GenericFunctionCallIntent {
                        id: call.id.unwrap_or_else(|| format!("toolcall-{index}")),
                        function: GenericFunctionCall {
                            name: call.name.unwrap_or_else(|| "tool".to_string()),
                            arguments,
                        },
                    },
                })
            })
            .collect()
    }
}

/// Replay a complete response as the events a real stream would have produced.
fn simulated_events(response: GenericChatCompletionResponse<GenericMessage>) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    let message = match response.content {
        ResponseContent::Finished(message) | ResponseContent::ToolCalls(message) => message,
    };

    if let Some(text) = message.content
        && !text.is_empty()
    {
        events.push(StreamEvent::TextDelta(text));
    }

    for (index, intent) in message.tool_calls.unwrap_or_default().into_iter().enumerate() {
        events.push(StreamEvent::ToolCallStart {
            index,
            id: Some(intent.id.clone()),
            name: Some(intent.function.name.clone()),
        });
        events.push(StreamEvent::ToolCallComplete { index, intent });
    }

    events.push(StreamEvent::MessageEnd);
    if let Some(usage) = response.usage {
        events.push(StreamEvent::Usage(usage));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::generic::GenericUsageReport;
    use serde_json::json;

    #[test]
    fn fragments_are_joined_per_index() {
        let mut calls = ToolCallAccumulator::default();

        let first = calls.push(0, Some("c1".into()), Some("weather".into()), Some("{\"ci".into()));
        assert_eq!(
            first,
            vec![
                StreamEvent::ToolCallStart {
                    index: 0,
                    id: Some("c1".into()),
                    name: Some("weather".into()),
                },
                StreamEvent::ToolCallArgumentsDelta {
                    index: 0,
                    arguments_fragment: "{\"ci".into(),
                },
            ]
        );

        let second = calls.push(0, None, None, Some("ty\":\"Rome\"}".into()));
        assert_eq!(second.len(), 1);

        let done = calls.finish().unwrap();
        let [StreamEvent::ToolCallComplete { index: 0, intent }] = done.as_slice() else {
            panic!("unexpected events: {done:?}");
        };
        assert_eq!(intent.id, "c1");
        assert_eq!(intent.function.arguments, json!({"city": "Rome"}));
        assert!(!calls.has_calls());
    }

    #[test]
    fn missing_arguments_become_empty_object() {
        let mut calls = ToolCallAccumulator::default();
        calls.push(1, None, Some("now".into()), None);

        let done = calls.finish().unwrap();
        let [StreamEvent::ToolCallComplete { intent, .. }] = done.as_slice() else {
            panic!("unexpected events: {done:?}");
        };
        assert_eq!(intent.id, "toolcall-1");
        assert_eq!(intent.function.arguments, json!({}));
    }

    #[test]
    fn invalid_arguments_fail_on_finish() {
        let mut calls = ToolCallAccumulator::default();
        calls.push(0, Some("c1".into()), Some("f".into()), Some("{oops".into()));
        assert!(matches!(calls.finish(), Err(PollenError::Invalid(_))));
    }

    #[test]
    fn simulated_stream_replays_text_then_end_then_usage() {
        let usage = GenericUsageReport {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };
        let events = simulated_events(GenericChatCompletionResponse {
            content: ResponseContent::Finished(GenericMessage::assistant("Hi there")),
            usage: Some(usage),
        });

        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Hi there".into()),
                StreamEvent::MessageEnd,
                StreamEvent::Usage(usage),
            ]
        );
    }
}
