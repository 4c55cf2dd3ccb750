//! Provider wire shapes
//!
//! Each LLM backend returns a differently-shaped JSON body. Rather than
//! scattering field-path branching through the fallback loop, every shape
//! is a variant here with exactly two capabilities: build a request body
//! and extract the completion text from a raw response.

use serde_json::{Value, json};

/// Request/response wire shape of a provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// OpenAI-compatible chat completions (OpenAI, DeepSeek, Perplexity)
    OpenAiChat,
    /// Google Gemini `generateContent`
    GeminiGenerateContent,
    /// Anthropic Messages API
    AnthropicMessages,
}

impl ResponseShape {
    /// Build the JSON request body for this shape.
    pub fn build_body(&self, model: &str, prompt: &str, max_output_tokens: u32) -> Value {
        match self {
            Self::OpenAiChat => json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": max_output_tokens,
                "temperature": 0.7,
            }),
            Self::GeminiGenerateContent => json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "maxOutputTokens": max_output_tokens,
                    "temperature": 0.7,
                },
            }),
            Self::AnthropicMessages => json!({
                "model": model,
                "max_tokens": max_output_tokens,
                "messages": [{ "role": "user", "content": prompt }],
            }),
        }
    }

    /// Extract the completion text from a raw response body.
    ///
    /// Returns `None` for missing paths AND for whitespace-only text: an
    /// empty completion is a failed attempt even on HTTP 200.
    pub fn extract_text(&self, raw: &Value) -> Option<String> {
        let text = match self {
            Self::OpenAiChat => raw
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str()?,
            Self::GeminiGenerateContent => raw
                .get("candidates")?
                .get(0)?
                .get("content")?
                .get("parts")?
                .get(0)?
                .get("text")?
                .as_str()?,
            Self::AnthropicMessages => raw.get("content")?.get(0)?.get("text")?.as_str()?,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_shape_extracts_message_content() {
        let raw = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Plan de clase" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        });

        assert_eq!(
            ResponseShape::OpenAiChat.extract_text(&raw),
            Some("Plan de clase".to_string())
        );
    }

    #[test]
    fn gemini_shape_extracts_candidate_text() {
        let raw = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Evaluación lista" }] } }]
        });

        assert_eq!(
            ResponseShape::GeminiGenerateContent.extract_text(&raw),
            Some("Evaluación lista".to_string())
        );
    }

    #[test]
    fn anthropic_shape_extracts_first_block() {
        let raw = json!({
            "content": [{ "type": "text", "text": "Actividad generada" }]
        });

        assert_eq!(
            ResponseShape::AnthropicMessages.extract_text(&raw),
            Some("Actividad generada".to_string())
        );
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let raw = json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert_eq!(ResponseShape::OpenAiChat.extract_text(&raw), None);

        let raw = json!({ "candidates": [] });
        assert_eq!(ResponseShape::GeminiGenerateContent.extract_text(&raw), None);
    }

    #[test]
    fn malformed_body_counts_as_missing() {
        let raw = json!({ "error": { "message": "quota exceeded" } });
        assert_eq!(ResponseShape::OpenAiChat.extract_text(&raw), None);
        assert_eq!(ResponseShape::GeminiGenerateContent.extract_text(&raw), None);
        assert_eq!(ResponseShape::AnthropicMessages.extract_text(&raw), None);
    }

    #[test]
    fn openai_body_includes_model_and_budget() {
        let body = ResponseShape::OpenAiChat.build_body("gpt-4o-mini", "hola", 1000);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["content"], "hola");
    }

    #[test]
    fn gemini_body_uses_generation_config() {
        let body = ResponseShape::GeminiGenerateContent.build_body("gemini-1.5-flash", "hola", 2000);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hola");
    }
}
