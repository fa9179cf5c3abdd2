//! Generation dispatcher - turns (input, mode) into one streamed provider call.
//!
//! Callers get the full text so far on every fragment, never a delta, so a UI
//! can simply replace what it shows with each snapshot.

use crate::prompts;
use crate::session::GenerationSession;
use providers::{ProviderError, StreamRequest, TextProvider};
use shared::agent_api::StreamChunk;
use shared::WritingMode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// The only message a caller ever sees for a failed generation.
pub const FAILURE_MESSAGE: &str =
    "Augustus encountered an error while thinking. Please check your API key or try again.";

/// What the user asked for, before it is rendered into a provider request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub mode: WritingMode,
    pub raw_input: String,
}

impl GenerationRequest {
    pub fn new(mode: WritingMode, raw_input: impl Into<String>) -> Self {
        Self {
            mode,
            raw_input: raw_input.into(),
        }
    }

    pub fn system_instruction(&self) -> &'static str {
        prompts::lookup(self.mode).system_instruction
    }

    /// The user turn, with the input embedded verbatim.
    pub fn final_prompt(&self) -> String {
        prompts::lookup(self.mode).wrap(&self.raw_input)
    }

    pub fn to_stream_request(&self) -> StreamRequest {
        StreamRequest {
            system_instruction: self.system_instruction().to_string(),
            prompt: self.final_prompt(),
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// A generation that did not complete. Displays as [`FAILURE_MESSAGE`]; the
/// provider-level cause is kept as the error source for logs.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct GenerationFailure {
    message: String,
    #[source]
    cause: ProviderError,
}

impl GenerationFailure {
    fn new(cause: ProviderError) -> Self {
        Self {
            message: FAILURE_MESSAGE.to_string(),
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &ProviderError {
        &self.cause
    }
}

pub struct Dispatcher {
    provider: Arc<dyn TextProvider>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Stream a response for `input` in `mode`.
    ///
    /// Blank input resolves to `""` without touching the provider or calling
    /// `on_chunk`. Otherwise `on_chunk` receives the cumulative text after
    /// every non-empty fragment, in provider order, and the final text is
    /// returned. Any provider failure becomes a [`GenerationFailure`]; partial
    /// text is not returned in that case.
    pub async fn generate<F>(
        &self,
        input: &str,
        mode: WritingMode,
        mut on_chunk: F,
    ) -> Result<String, GenerationFailure>
    where
        F: FnMut(&str),
    {
        if input.trim().is_empty() {
            debug!(%mode, "blank input, skipping generation");
            return Ok(String::new());
        }

        let request = GenerationRequest::new(mode, input).to_stream_request();
        let mut session = GenerationSession::new(mode);
        info!(
            session = %session.id(),
            %mode,
            provider = self.provider.name(),
            input_chars = input.chars().count(),
            "generation started"
        );
        session.begin();

        let (tx, rx) = mpsc::unbounded_channel();
        let produce = self.provider.generate_stream(&request, tx);
        let consume = async {
            // Owned here so the provider sees a closed channel once we stop.
            let mut rx = rx;
            while let Some(chunk) = rx.recv().await {
                match chunk {
                    StreamChunk::Text(fragment) => {
                        if let Some(snapshot) = session.push(&fragment) {
                            on_chunk(snapshot);
                        }
                    }
                    StreamChunk::Done { stop_reason } => {
                        debug!(session = %session.id(), ?stop_reason, "provider finished");
                        break;
                    }
                    StreamChunk::Error(message) => return Err(ProviderError::Stream(message)),
                }
            }
            Ok(())
        };
        let (produced, consumed) = tokio::join!(produce, consume);

        let outcome = match (produced, consumed) {
            (Err(e), _) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        };

        match outcome {
            Ok(()) => {
                let text = session.complete();
                info!(
                    session = %session.id(),
                    fragments = session.fragments(),
                    output_chars = text.chars().count(),
                    elapsed_ms = session.elapsed().as_millis() as u64,
                    "generation completed"
                );
                Ok(text)
            }
            Err(cause) => {
                error!(
                    session = %session.id(),
                    fragments = session.fragments(),
                    error = %cause,
                    "generation failed"
                );
                session.fail(cause.to_string());
                Err(GenerationFailure::new(cause))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::error::Error as _;
    use tokio::sync::mpsc::UnboundedSender;

    enum Step {
        Text(&'static str),
        /// Return an error from the provider call
        Fail(&'static str),
        /// Report an error in-band and keep going
        ErrorChunk(&'static str),
    }

    struct ScriptedProvider {
        steps: Vec<Step>,
        calls: Mutex<Vec<StreamRequest>>,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate_stream(
            &self,
            request: &StreamRequest,
            tx: UnboundedSender<StreamChunk>,
        ) -> Result<(), ProviderError> {
            self.calls.lock().push(request.clone());
            for step in &self.steps {
                match step {
                    Step::Text(text) => {
                        let _ = tx.send(StreamChunk::Text(text.to_string()));
                    }
                    Step::Fail(message) => return Err(ProviderError::Stream(message.to_string())),
                    Step::ErrorChunk(message) => {
                        let _ = tx.send(StreamChunk::Error(message.to_string()));
                    }
                }
                tokio::task::yield_now().await;
            }
            let _ = tx.send(StreamChunk::Done {
                stop_reason: Some("STOP".into()),
            });
            Ok(())
        }
    }

    fn dispatcher(provider: &Arc<ScriptedProvider>) -> Dispatcher {
        Dispatcher::new(provider.clone())
    }

    #[tokio::test]
    async fn test_blank_input_is_a_silent_no_op() {
        let provider = ScriptedProvider::new(vec![Step::Text("unused")]);
        let dispatcher = dispatcher(&provider);

        for input in ["", "   ", "\n\t "] {
            for mode in WritingMode::all() {
                let mut calls = 0;
                let out = dispatcher
                    .generate(input, *mode, |_| calls += 1)
                    .await
                    .unwrap();
                assert_eq!(out, "");
                assert_eq!(calls, 0);
            }
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshots_are_cumulative_and_ordered() {
        let provider =
            ScriptedProvider::new(vec![Step::Text("Hello, "), Step::Text("world"), Step::Text("!")]);
        let mut seen = Vec::new();
        let out = dispatcher(&provider)
            .generate("greet", WritingMode::Draft, |text| seen.push(text.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["Hello, ", "Hello, world", "Hello, world!"]);
        assert_eq!(out, "Hello, world!");
    }

    #[tokio::test]
    async fn test_empty_fragments_do_not_trigger_callbacks() {
        let provider = ScriptedProvider::new(vec![Step::Text(""), Step::Text("a"), Step::Text("")]);
        let mut seen = Vec::new();
        let out = dispatcher(&provider)
            .generate("x", WritingMode::Refine, |text| seen.push(text.to_string()))
            .await
            .unwrap();
        assert_eq!(seen, vec!["a"]);
        assert_eq!(out, "a");
    }

    #[tokio::test]
    async fn test_stream_with_no_fragments_returns_empty() {
        let provider = ScriptedProvider::new(vec![]);
        let mut calls = 0;
        let out = dispatcher(&provider)
            .generate("x", WritingMode::Academic, |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(out, "");
        assert_eq!(calls, 0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_after_first_fragment() {
        let provider = ScriptedProvider::new(vec![
            Step::Text("Hello"),
            Step::Fail("connection reset"),
            Step::Text("never"),
        ]);
        let mut seen = Vec::new();
        let err = dispatcher(&provider)
            .generate("x", WritingMode::Critique, |text| seen.push(text.to_string()))
            .await
            .unwrap_err();

        assert_eq!(seen, vec!["Hello"]);
        assert_eq!(err.to_string(), FAILURE_MESSAGE);
        assert!(!err.message().is_empty());
        assert!(matches!(err.cause(), ProviderError::Stream(m) if m == "connection reset"));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_in_band_error_stops_callbacks() {
        let provider = ScriptedProvider::new(vec![
            Step::Text("Hello"),
            Step::ErrorChunk("quota exceeded"),
            Step::Text(" again"),
        ]);
        let mut seen = Vec::new();
        let err = dispatcher(&provider)
            .generate("x", WritingMode::Draft, |text| seen.push(text.to_string()))
            .await
            .unwrap_err();

        assert_eq!(seen, vec!["Hello"]);
        assert!(matches!(err.cause(), ProviderError::Stream(m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_failure_before_streaming() {
        let provider = ScriptedProvider::new(vec![Step::Fail("401 unauthorized")]);
        let mut calls = 0;
        let err = dispatcher(&provider)
            .generate("x", WritingMode::Draft, |_| calls += 1)
            .await
            .unwrap_err();
        assert_eq!(calls, 0);
        assert_eq!(err.message(), FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_request_carries_template_and_fixed_parameters() {
        let provider = ScriptedProvider::new(vec![Step::Text("ok")]);
        let input = "  The computer thinks like a human  ";
        dispatcher(&provider)
            .generate(input, WritingMode::Academic, |_| {})
            .await
            .unwrap();

        let calls = provider.calls.lock();
        let request = &calls[0];
        let template = prompts::lookup(WritingMode::Academic);
        assert_eq!(request.system_instruction, template.system_instruction);
        // input goes in untrimmed
        assert_eq!(request.prompt, template.wrap(input));
        assert_eq!(request.temperature, TEMPERATURE);
        assert_eq!(request.max_output_tokens, MAX_OUTPUT_TOKENS);
    }

    #[test]
    fn test_generation_request_is_deterministic() {
        let a = GenerationRequest::new(WritingMode::Refine, "text");
        let b = GenerationRequest::new(WritingMode::Refine, "text");
        assert_eq!(a.to_stream_request(), b.to_stream_request());
        assert!(a.final_prompt().contains("\"text\""));
    }
}
