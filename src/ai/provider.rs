use serde::{Deserialize, Serialize};

/// Supported chat-completion providers. Every provider speaks the
/// OpenAI-compatible `/chat/completions` protocol; they differ only in the
/// row of `PROVIDERS` below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Claude,
    DeepSeek,
    Perplexity,
}

/// Static per-provider data
#[derive(Debug)]
pub struct ProviderEntry {
    pub provider: Provider,
    pub name: &'static str,
    pub base_url: &'static str,
    /// Key under which the API key is kept in the credential store
    pub credential_key: &'static str,
    pub models: &'static [&'static str],
    pub key_hint: &'static str,
}

pub const PROVIDERS: [ProviderEntry; 5] = [
    ProviderEntry {
        provider: Provider::OpenAi,
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        credential_key: "openai_api_key",
        models: &["gpt-4-turbo", "gpt-4o", "gpt-4o-mini", "o1", "o1-mini", "o3-mini"],
        key_hint: "Get your API key from the OpenAI dashboard.",
    },
    ProviderEntry {
        provider: Provider::Gemini,
        name: "Gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai/",
        credential_key: "gemini_api_key",
        models: &[
            "gemini-1.5-pro",
            "gemini-1.5-flash",
            "gemini-2.0-flash",
            "gemini-2.0-flash-lite",
        ],
        key_hint: "Get your API key from the Google AI Studio.",
    },
    ProviderEntry {
        provider: Provider::Claude,
        name: "Claude",
        base_url: "https://api.anthropic.com/v1/",
        credential_key: "claude_api_key",
        models: &[
            "claude-3-7-sonnet-20250219",
            "claude-3-5-sonnet-20240620",
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-3-haiku-20240307",
        ],
        key_hint: "Get your API key from Anthropic's dashboard.",
    },
    ProviderEntry {
        provider: Provider::DeepSeek,
        name: "DeepSeek",
        base_url: "https://api.deepseek.com/v1",
        credential_key: "deepseek_api_key",
        models: &["deepseek-chat", "deepseek-reasoner"],
        key_hint: "Get your API key from the DeepSeek platform.",
    },
    ProviderEntry {
        provider: Provider::Perplexity,
        name: "Perplexity",
        base_url: "https://api.perplexity.ai",
        credential_key: "perplexity_api_key",
        models: &[
            "sonar",
            "sonar-pro",
            "sonar-reasoning",
            "sonar-reasoning-pro",
            "sonar-deep-research",
        ],
        key_hint: "Get your API key from the Perplexity dashboard.",
    },
];

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::Claude,
        Provider::DeepSeek,
        Provider::Perplexity,
    ];

    fn index(self) -> usize {
        match self {
            Provider::OpenAi => 0,
            Provider::Gemini => 1,
            Provider::Claude => 2,
            Provider::DeepSeek => 3,
            Provider::Perplexity => 4,
        }
    }

    pub fn entry(self) -> &'static ProviderEntry {
        &PROVIDERS[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn credential_key(self) -> &'static str {
        self.entry().credential_key
    }

    pub fn default_model(self) -> &'static str {
        self.entry().models[0]
    }

    /// `{base}/chat/completions`, tolerating a trailing slash on the base
    pub fn completions_url(self) -> String {
        format!("{}/chat/completions", self.entry().base_url.trim_end_matches('/'))
    }

    pub fn next(self) -> Provider {
        Provider::ALL[(self.index() + 1) % Provider::ALL.len()]
    }

    /// Parse a provider tag from config ("openai", "Gemini", ...)
    pub fn from_tag(tag: &str) -> Option<Provider> {
        let tag = tag.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.name().to_lowercase() == tag)
    }

    /// The model after `current` in this provider's list (wrapping)
    pub fn next_model(self, current: &str) -> &'static str {
        let models = self.entry().models;
        match models.iter().position(|m| *m == current) {
            Some(i) => models[(i + 1) % models.len()],
            None => models[0],
        }
    }

    pub fn offers_model(self, model: &str) -> bool {
        self.entry().models.contains(&model)
    }
}

/// Human-readable model name; unknown ids are shown as-is
pub fn display_model(model: &str) -> String {
    let known = match model {
        "gemini-1.5-pro" => "Gemini 1.5 Pro",
        "gemini-1.5-flash" => "Gemini 1.5 Flash",
        "gemini-2.0-flash" => "Gemini 2.0 Flash",
        "gemini-2.0-flash-lite" => "Gemini 2.0 Flash-Lite",
        "o1" => "GPT o1",
        "o1-mini" => "GPT o1-mini",
        "o3-mini" => "GPT o3-mini",
        "gpt-4o" => "GPT 4o",
        "gpt-4o-mini" => "GPT 4o-mini",
        "gpt-4-turbo" => "GPT 4-turbo",
        "claude-3-7-sonnet-20250219" => "Claude 3.7 Sonnet",
        "claude-3-5-sonnet-20240620" => "Claude 3.5 Sonnet",
        "claude-3-opus-20240229" => "Claude 3 Opus",
        "claude-3-sonnet-20240229" => "Claude 3 Sonnet",
        "claude-3-haiku-20240307" => "Claude 3 Haiku",
        other => return other.to_string(),
    };
    known.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_line_up_with_enum() {
        for p in Provider::ALL {
            assert_eq!(p.entry().provider, p);
            assert!(!p.entry().models.is_empty());
            assert!(p.credential_key().ends_with("_api_key"));
        }
    }

    #[test]
    fn completions_url_handles_trailing_slash() {
        assert_eq!(
            Provider::Claude.completions_url(),
            "https://api.anthropic.com/v1/chat/completions"
        );
        assert_eq!(
            Provider::Perplexity.completions_url(),
            "https://api.perplexity.ai/chat/completions"
        );
        assert_eq!(
            Provider::Gemini.completions_url(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn next_cycles_through_all_providers() {
        let mut p = Provider::OpenAi;
        for _ in 0..Provider::ALL.len() {
            p = p.next();
        }
        assert_eq!(p, Provider::OpenAi);
    }

    #[test]
    fn next_model_wraps_and_recovers_from_unknown() {
        assert_eq!(Provider::DeepSeek.next_model("deepseek-chat"), "deepseek-reasoner");
        assert_eq!(Provider::DeepSeek.next_model("deepseek-reasoner"), "deepseek-chat");
        assert_eq!(Provider::DeepSeek.next_model("gpt-4o"), "deepseek-chat");
    }

    #[test]
    fn from_tag_is_case_insensitive() {
        assert_eq!(Provider::from_tag("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::from_tag(" deepseek "), Some(Provider::DeepSeek));
        assert_eq!(Provider::from_tag("mistral"), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(display_model("gpt-4o"), "GPT 4o");
        assert_eq!(display_model("sonar"), "sonar");
    }
}
