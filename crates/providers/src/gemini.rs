use crate::sse::SseParser;
use crate::{ProviderError, StreamRequest, TextProvider};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::StreamChunk;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    system_instruction: GeminiContent<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// ── Streaming response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
    /// Reasoning summaries, never part of the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// The useful part of one SSE payload.
#[derive(Debug, PartialEq)]
struct DecodedEvent {
    text: String,
    finish_reason: Option<String>,
}

fn decode_event(data: &str) -> Result<DecodedEvent, ProviderError> {
    let resp: GeminiStreamResponse = serde_json::from_str(data)?;

    if let Some(err) = resp.error {
        let mut message = err.message;
        if let Some(status) = err.status {
            message = format!("{} ({})", message, status);
        }
        if let Some(code) = err.code {
            message = format!("{} [{}]", message, code);
        }
        return Err(ProviderError::Api {
            provider: PROVIDER,
            message,
        });
    }

    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked { reason });
    }

    if let Some(usage) = &resp.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            "gemini usage"
        );
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Ok(DecodedEvent {
            text: String::new(),
            finish_reason: None,
        });
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(DecodedEvent {
        text,
        finish_reason: candidate.finish_reason,
    })
}

// ── Client ───────────────────────────────────────────────────────────

pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client. A missing key is not an error here; it surfaces when a
    /// request is made.
    pub fn new(
        api_key: Option<String>,
        model: &str,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        // No request timeout; a response streams until the model stops.
        let http = Client::builder().pool_max_idle_per_host(2).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Decode one SSE payload and pass its text on. Returns `false` once the
    /// receiver is gone.
    fn forward(
        &self,
        data: &str,
        tx: &UnboundedSender<StreamChunk>,
        stop_reason: &mut Option<String>,
    ) -> Result<bool, ProviderError> {
        let decoded = decode_event(data)?;
        if decoded.finish_reason.is_some() {
            *stop_reason = decoded.finish_reason;
        }
        if !decoded.text.is_empty() && tx.send(StreamChunk::Text(decoded.text)).is_err() {
            debug!(model = %self.model, "stream receiver dropped, stopping read");
            return Ok(false);
        }
        Ok(true)
    }
}

#[async_trait]
impl TextProvider for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate_stream(
        &self,
        request: &StreamRequest,
        tx: UnboundedSender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential { provider: PROVIDER })?;

        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let req = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: &request.system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };

        debug!(
            model = %self.model,
            prompt_chars = request.prompt.len(),
            temperature = request.temperature,
            max_output_tokens = request.max_output_tokens,
            "sending gemini stream request"
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&req)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.chars().take(800).collect();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                detail,
            });
        }

        let mut parser = SseParser::new();
        let mut stream = resp.bytes_stream();
        let mut stop_reason = None;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            for event in parser.feed(&bytes) {
                if !self.forward(&event.data, &tx, &mut stop_reason)? {
                    return Ok(());
                }
            }
        }
        if let Some(event) = parser.finish() {
            if !self.forward(&event.data, &tx, &mut stop_reason)? {
                return Ok(());
            }
        }

        debug!(model = %self.model, stop_reason = ?stop_reason, "gemini stream finished");
        let _ = tx.send(StreamChunk::Done { stop_reason });
        Ok(())
    }
}
