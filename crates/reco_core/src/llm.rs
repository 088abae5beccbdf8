use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Text-in, text-out completion. The token lets the caller abandon a call;
/// implementations check it before sending and before returning.
pub trait ChatModel {
    fn complete(&self, prompt: &str, cancel: &CancellationToken) -> Result<String>;
}

impl ChatModel for Box<dyn ChatModel> {
    fn complete(&self, prompt: &str, cancel: &CancellationToken) -> Result<String> {
        (**self).complete(prompt, cancel)
    }
}
