use std::borrow::Cow;

use pollen_core::model::Model;

/// Wire name for `model`, or `None` if the host could never accept it.
///
/// OpenAI-compatible hosts take arbitrary names, so only blank names are
/// refused here. Everything else goes out byte for byte.
pub(crate) fn map_model(model: &Model) -> Option<Cow<'static, str>> {
    if model.as_str().trim().is_empty() {
        return None;
    }

    Some(Cow::Owned(model.as_str().to_owned()))
}
