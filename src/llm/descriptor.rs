//! Provider descriptors
//!
//! Static configuration for each supported LLM backend: endpoint base,
//! auth scheme, model aliases in preference order, and per-mode budgets.
//! Descriptors are plain data; all HTTP behavior lives in the client.

use super::GenerationMode;
use super::extract::ResponseShape;

/// How the API key is attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// Key in a custom header, e.g. `x-api-key`
    ApiKeyHeader { header: &'static str },
    /// Key as a URL query parameter, e.g. `?key=<key>`
    QueryParam { param: &'static str },
}

/// Output and time budget for one attempt at a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBudget {
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
}

/// Per-mode budget table. Richer tiers get both a larger output budget and
/// a longer timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBudgets {
    pub basic: ModeBudget,
    pub advanced: ModeBudget,
    pub premium: ModeBudget,
}

impl Default for ModeBudgets {
    fn default() -> Self {
        Self {
            basic: ModeBudget {
                max_output_tokens: 1000,
                timeout_ms: 10_000,
            },
            advanced: ModeBudget {
                max_output_tokens: 2000,
                timeout_ms: 20_000,
            },
            premium: ModeBudget {
                max_output_tokens: 4000,
                timeout_ms: 30_000,
            },
        }
    }
}

/// Static description of one upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    /// Provider name used in logs and the `provider` response field
    pub name: String,
    /// API base URL (overridable for tests)
    pub endpoint_base: String,
    /// How the API key is attached
    pub auth: AuthScheme,
    /// Extra static headers every request needs
    pub extra_headers: Vec<(&'static str, &'static str)>,
    /// Model aliases, tried in order until one returns a completion
    pub models: Vec<String>,
    /// Request/response wire shape
    pub shape: ResponseShape,
    /// Per-mode output/timeout budgets
    pub budgets: ModeBudgets,
}

impl ProviderDescriptor {
    /// Budget for one attempt in the given mode.
    pub fn budget(&self, mode: GenerationMode) -> ModeBudget {
        match mode {
            GenerationMode::Basic => self.budgets.basic,
            GenerationMode::Advanced => self.budgets.advanced,
            GenerationMode::Premium => self.budgets.premium,
        }
    }

    /// Full request URL for the given model alias (auth query params are
    /// appended by the client).
    pub fn request_url(&self, model: &str) -> String {
        match self.shape {
            ResponseShape::OpenAiChat => format!("{}/chat/completions", self.endpoint_base),
            ResponseShape::GeminiGenerateContent => {
                format!("{}/v1/models/{}:generateContent", self.endpoint_base, model)
            }
            ResponseShape::AnthropicMessages => format!("{}/v1/messages", self.endpoint_base),
        }
    }

    /// Replace the endpoint base, keeping everything else (test hook).
    pub fn with_endpoint_base<S: Into<String>>(mut self, base: S) -> Self {
        self.endpoint_base = base.into();
        self
    }

    pub fn gemini() -> Self {
        Self {
            name: "gemini".to_string(),
            endpoint_base: "https://generativelanguage.googleapis.com".to_string(),
            auth: AuthScheme::QueryParam { param: "key" },
            extra_headers: Vec::new(),
            models: vec!["gemini-1.5-flash".to_string(), "gemini-1.5-pro".to_string()],
            shape: ResponseShape::GeminiGenerateContent,
            budgets: ModeBudgets::default(),
        }
    }

    pub fn openai() -> Self {
        Self {
            name: "openai".to_string(),
            endpoint_base: "https://api.openai.com/v1".to_string(),
            auth: AuthScheme::Bearer,
            extra_headers: Vec::new(),
            models: vec!["gpt-4o-mini".to_string(), "gpt-3.5-turbo".to_string()],
            shape: ResponseShape::OpenAiChat,
            budgets: ModeBudgets::default(),
        }
    }

    pub fn deepseek() -> Self {
        Self {
            name: "deepseek".to_string(),
            endpoint_base: "https://api.deepseek.com/v1".to_string(),
            auth: AuthScheme::Bearer,
            extra_headers: Vec::new(),
            models: vec!["deepseek-chat".to_string()],
            shape: ResponseShape::OpenAiChat,
            budgets: ModeBudgets::default(),
        }
    }

    pub fn anthropic() -> Self {
        Self {
            name: "anthropic".to_string(),
            endpoint_base: "https://api.anthropic.com".to_string(),
            auth: AuthScheme::ApiKeyHeader { header: "x-api-key" },
            extra_headers: vec![("anthropic-version", "2023-06-01")],
            models: vec!["claude-3-haiku-20240307".to_string()],
            shape: ResponseShape::AnthropicMessages,
            budgets: ModeBudgets::default(),
        }
    }

    pub fn perplexity() -> Self {
        Self {
            name: "perplexity".to_string(),
            endpoint_base: "https://api.perplexity.ai".to_string(),
            auth: AuthScheme::Bearer,
            extra_headers: Vec::new(),
            models: vec!["llama-3.1-sonar-small-128k-online".to_string()],
            shape: ResponseShape::OpenAiChat,
            budgets: ModeBudgets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_scale_with_mode() {
        let descriptor = ProviderDescriptor::openai();
        let basic = descriptor.budget(GenerationMode::Basic);
        let advanced = descriptor.budget(GenerationMode::Advanced);
        let premium = descriptor.budget(GenerationMode::Premium);

        assert!(basic.max_output_tokens < advanced.max_output_tokens);
        assert!(advanced.max_output_tokens < premium.max_output_tokens);
        assert!(basic.timeout_ms < advanced.timeout_ms);
        assert!(advanced.timeout_ms < premium.timeout_ms);
    }

    #[test]
    fn gemini_url_embeds_model() {
        let descriptor = ProviderDescriptor::gemini();
        assert_eq!(
            descriptor.request_url("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn openai_compatible_url_ignores_model() {
        let descriptor = ProviderDescriptor::deepseek().with_endpoint_base("http://localhost:9999");
        assert_eq!(
            descriptor.request_url("deepseek-chat"),
            "http://localhost:9999/chat/completions"
        );
    }
}
