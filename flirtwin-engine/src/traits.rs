use async_trait::async_trait;
use flirtwin_core::types::GenerationRequest;

/// Transport to the generative service.
///
/// Returns the model's raw text. Any error here is treated as the service
/// being unavailable; interpreting the text is the client's job.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}
