//! Provider registry
//!
//! Immutable, ordered table of providers eligible for the fallback loop.
//! Built once from [`AppConfig`] at startup and injected wherever needed;
//! only descriptors with a resolved API key are registered, so an entry in
//! the registry is always attemptable.

use crate::config::AppConfig;

use super::descriptor::ProviderDescriptor;

/// A provider descriptor paired with its resolved API key.
#[derive(Debug, Clone)]
pub struct ConfiguredProvider {
    pub descriptor: ProviderDescriptor,
    pub api_key: String,
}

/// Ordered set of eligible providers; index order is fallback priority.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<ConfiguredProvider>,
}

impl ProviderRegistry {
    /// Build a registry from an explicit provider list (test hook and the
    /// backing constructor for [`Self::from_config`]).
    pub fn new(providers: Vec<ConfiguredProvider>) -> Self {
        Self { providers }
    }

    /// Build the registry from configuration using the built-in priority
    /// order: gemini, openai, deepseek, anthropic, perplexity.
    pub fn from_config(config: &AppConfig) -> Self {
        let candidates = [
            (ProviderDescriptor::gemini(), config.llm.gemini.as_ref()),
            (ProviderDescriptor::openai(), config.llm.openai.as_ref()),
            (ProviderDescriptor::deepseek(), config.llm.deepseek.as_ref()),
            (
                ProviderDescriptor::anthropic(),
                config.llm.anthropic.as_ref(),
            ),
            (
                ProviderDescriptor::perplexity(),
                config.llm.perplexity.as_ref(),
            ),
        ];

        let mut providers = Vec::new();
        for (descriptor, key) in candidates {
            match key {
                Some(key) if !key.is_empty() => providers.push(ConfiguredProvider {
                    descriptor,
                    api_key: key.clone(),
                }),
                _ => {
                    tracing::debug!(
                        provider = %descriptor.name,
                        "Provider not registered: no API key resolved"
                    );
                }
            }
        }

        Self { providers }
    }

    /// Eligible providers in fallback priority order.
    pub fn eligible(&self) -> &[ConfiguredProvider] {
        &self.providers
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}
