use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
pub const DEFAULT_SITE_URL: &str = "https://github.com/Nair-Villagran/grow-sql";
pub const DEFAULT_SITE_NAME: &str = "Grow SQL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LLMConfig {
    pub fn new(api_url: String, model: String, timeout_seconds: u64) -> Self {
        Self {
            api_url,
            model,
            timeout_seconds,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Account settings for the chat-completion provider.
///
/// Loaded once at startup and handed to the service by value. A missing key
/// only disables the AI features.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>, site_url: Option<String>, site_name: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            site_url: site_url.filter(|url| !url.trim().is_empty()),
            site_name: site_name.filter(|name| !name.trim().is_empty()),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Title used on the banner and in the `X-Title` header.
    pub fn display_name(&self) -> &str {
        self.site_name.as_deref().unwrap_or(DEFAULT_SITE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_counts_as_missing() {
        let credentials = Credentials::new(Some("   ".to_string()), None, None);
        assert!(!credentials.has_api_key());
        assert_eq!(credentials.api_key(), None);
    }

    #[test]
    fn endpoint_appends_chat_completions_once() {
        let config = LLMConfig::new("https://example.test/v1/".to_string(), "m".to_string(), 5);
        assert_eq!(config.endpoint(), "https://example.test/v1/chat/completions");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn defaults_point_at_openrouter() {
        let config = LLMConfig::default();
        assert_eq!(config.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_seconds, 60);
    }
}
