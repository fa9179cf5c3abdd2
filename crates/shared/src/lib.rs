pub mod writing;

pub use writing::WritingMode;

pub mod settings {
    use crate::writing::WritingMode;
    use serde::{Deserialize, Serialize};

    /// Model used when the settings name none.
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct ProviderAuth {
        pub api_key: Option<String>,
    }

    impl ProviderAuth {
        /// The configured key, treating blank strings as absent.
        pub fn api_key(&self) -> Option<&str> {
            self.api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelProvider {
        pub gemini_model: String, // e.g., "gemini-3-flash-preview"
        pub gemini_auth: ProviderAuth,
        /// Override for the Generative Language API host (proxies, tests)
        #[serde(default)]
        pub gemini_base_url: Option<String>,
    }

    impl Default for ModelProvider {
        fn default() -> Self {
            Self {
                gemini_model: DEFAULT_GEMINI_MODEL.into(),
                gemini_auth: ProviderAuth::default(),
                gemini_base_url: None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct AppSettings {
        pub model: ModelProvider,
        /// Mode selected when the app starts
        #[serde(default)]
        pub default_mode: WritingMode,
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    /// One event of a streamed provider response.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum StreamChunk {
        /// A text fragment (delta, not cumulative)
        Text(String),
        /// The provider finished the response
        Done { stop_reason: Option<String> },
        /// The provider failed after streaming had started
        Error(String),
    }
}
