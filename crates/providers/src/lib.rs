//! Providers - hosted text-generation backends
//!
//! Every backend implements [`TextProvider`]: it receives a fully built
//! [`StreamRequest`] and pushes response fragments into a channel as they
//! arrive.

pub mod error;
pub mod gemini;
pub mod sse;

pub use error::ProviderError;
pub use gemini::GeminiClient;

use async_trait::async_trait;
use shared::agent_api::StreamChunk;
use tokio::sync::mpsc::UnboundedSender;

/// A single-turn generation request, already rendered from a prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub system_instruction: String,
    /// The sole user turn
    pub prompt: String,
    pub temperature: f32,
    /// Provider-defined token cap, not characters
    pub max_output_tokens: u32,
}

/// A backend that can stream a response for a [`StreamRequest`].
///
/// Contract: if the request fails *before* any fragment is sent, return
/// `Err(...)`. Fragments go out as [`StreamChunk::Text`] in the order the
/// backend produced them, followed by [`StreamChunk::Done`]. A failure after
/// streaming started may be reported either by returning `Err` or by sending
/// [`StreamChunk::Error`]. When the receiver has been dropped the provider
/// stops reading and returns `Ok(())`.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn generate_stream(
        &self,
        request: &StreamRequest,
        tx: UnboundedSender<StreamChunk>,
    ) -> Result<(), ProviderError>;
}
