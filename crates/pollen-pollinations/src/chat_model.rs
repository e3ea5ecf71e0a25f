use std::pin::Pin;

use pollen_core::{
    error::Result,
    generic::{GenericChatCompletionResponse, GenericMessage},
    model::Model,
    provider::{
        ChatCompleteParameters, ChatCompletionProvider, StreamingChatProvider,
        StreamingEventsProvider,
    },
};
use pollen_openai_compatible::{OpenAiCompatibleAdapter, api_v1::ChatCompletionMessage};

use crate::{PollinationsChatModelId, PollinationsChatSettings};

/// One Pollinations model with its settings.
///
/// Requests always target [`Self::model_id`]; the model named in incoming
/// [`ChatCompleteParameters`] is overwritten.
#[derive(Debug, Clone)]
pub struct PollinationsChatModel {
    model_id: PollinationsChatModelId,
    model: Model,
    adapter: OpenAiCompatibleAdapter,
    settings: PollinationsChatSettings,
}

impl PollinationsChatModel {
    pub(crate) fn new(
        model_id: PollinationsChatModelId,
        adapter: OpenAiCompatibleAdapter,
        settings: PollinationsChatSettings,
    ) -> Self {
        Self {
            model: model_id.clone().into(),
            model_id,
            adapter,
            settings,
        }
    }

    pub fn model_id(&self) -> &PollinationsChatModelId {
        &self.model_id
    }

    pub fn settings(&self) -> &PollinationsChatSettings {
        &self.settings
    }

    pub fn provider(&self) -> &str {
        self.adapter.provider()
    }

    /// Parameters for this model with default sampling.
    pub fn parameters<M>(&self, messages: Vec<M>) -> ChatCompleteParameters<M> {
        ChatCompleteParameters::new(messages, self.model.clone())
    }

    fn bind<M>(&self, params: ChatCompleteParameters<M>) -> ChatCompleteParameters<M> {
        params.with_model(self.model.clone())
    }
}

impl ChatCompletionProvider for PollinationsChatModel {
    type Message = ChatCompletionMessage;

    fn chat_complete<'p, M>(
        &'p self,
        params: ChatCompleteParameters<M>,
    ) -> Pin<
        Box<dyn Future<Output = Result<GenericChatCompletionResponse<GenericMessage>>> + Send + 'p>,
    >
    where
        M: Into<Self::Message> + Clone + Send + Sync + 'p,
    {
        self.adapter.chat_complete(self.bind(params))
    }
}

impl StreamingChatProvider for PollinationsChatModel {
    type Delta<'s>
        = <OpenAiCompatibleAdapter as StreamingChatProvider>::Delta<'s>
    where
        Self: 's;

    fn chat_complete_stream<'s, M>(&'s self, params: ChatCompleteParameters<M>) -> Self::Delta<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        self.adapter.chat_complete_stream(self.bind(params))
    }
}

impl StreamingEventsProvider for PollinationsChatModel {
    type EventStream<'s>
        = <OpenAiCompatibleAdapter as StreamingEventsProvider>::EventStream<'s>
    where
        Self: 's;

    fn chat_complete_events_stream<'s, M>(
        &'s self,
        params: ChatCompleteParameters<M>,
    ) -> Self::EventStream<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        self.adapter.chat_complete_events_stream(self.bind(params))
    }
}

#[cfg(test)]
mod tests {
    use crate::{PollinationsChatSettings, PollinationsProviderBuilder};
    use pollen_core::generic::GenericMessage;
    use pollen_core::provider::ChatCompleteParameters;

    #[test]
    fn requests_are_bound_to_the_model_id() {
        let provider = PollinationsProviderBuilder::new().build().unwrap();
        let model = provider.chat_model("llama", PollinationsChatSettings::default());

        let params = model.parameters(vec![GenericMessage::user("hi")]);
        assert_eq!(params.model().as_str(), "llama");

        let foreign = ChatCompleteParameters::new(vec![GenericMessage::user("hi")], "mistral");
        assert_eq!(model.bind(foreign).model().as_str(), "llama");
        assert_eq!(model.provider(), "pollinations");
    }
}
