use crate::constants;

/// The two fixed prompts used by the tutor.
///
/// The introduction asks for an English greeting and a topic list, the
/// conversation prompt only covers German replies. They are kept separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    /// Sent once, as the user turn of the bootstrap request.
    pub introduction: String,
    /// Sent as the system message of every request.
    pub conversation: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            introduction: constants::INTRODUCTION_PROMPT.to_string(),
            conversation: constants::CONVERSATION_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Everything the completion client needs, injected at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub prompts: SystemPrompts,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: constants::DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            top_p: 1.0,
            prompts: SystemPrompts::default(),
        }
    }

    /// Builds a config from `GROQ_ENDPOINT`, `GROQ_MODEL` and `API_KEY`.
    pub fn from_env() -> Self {
        Self::new(constants::GROQ_ENDPOINT.as_str(), constants::API_KEY.as_str())
            .with_model(constants::GROQ_MODEL.as_str())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_fixed_sampling_defaults() {
        let config = ClientConfig::new("http://localhost:1234/v1/chat/completions", "secret");
        assert_eq!(config.endpoint, "http://localhost:1234/v1/chat/completions");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "llama3-8b-8192");
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.top_p, 1.0);
    }

    #[test]
    fn test_prompts_are_not_unified() {
        let prompts = SystemPrompts::default();
        assert_ne!(prompts.introduction, prompts.conversation);
        assert!(prompts.introduction.contains("introducing yourself"));
        assert!(prompts.conversation.contains("constructive feedback"));
    }

    #[test]
    fn test_with_model_overrides_default() {
        let config = ClientConfig::new("http://x", "").with_model("llama3-70b-8192");
        assert_eq!(config.model, "llama3-70b-8192");
        assert!(config.api_key.is_empty());
    }
}
