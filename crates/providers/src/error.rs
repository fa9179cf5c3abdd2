use reqwest::StatusCode;

/// Everything that can go wrong while talking to a text-generation provider.
///
/// Callers outside this crate usually collapse these into a single
/// user-facing failure; the variants exist for logs.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no {provider} API key configured")]
    MissingCredential { provider: &'static str },

    #[error("{provider} error: {status}{}", format_detail(.detail))]
    Status {
        provider: &'static str,
        status: StatusCode,
        detail: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} returned an error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("prompt blocked by provider: {reason}")]
    Blocked { reason: String },

    #[error("malformed stream event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("stream failed: {0}")]
    Stream(String),
}

fn format_detail(detail: &str) -> String {
    if detail.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", detail)
    }
}
