//! Answers from an OpenAI chat model.

use super::{fallback_answer, format_context, AnswerGenerator, ContextPassage};
use crate::config::{Prompts, RagSettings};
use crate::error::{Result, VidqaError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Cleanup stops adding lines once the answer is longer than this.
const MAX_ANSWER_CHARS: usize = 300;

const NO_CLEAR_ANSWER: &str = "I couldn't generate a clear answer based on the provided context.";

/// Strip model artifacts and echoed prompt lines from a completion.
pub fn clean_response(response: &str) -> String {
    let response = response.replace("<|endoftext|>", "").replace("<pad>", "");

    let mut lines: Vec<&str> = Vec::new();
    let mut length = 0;
    for line in response.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with("Question:")
            || line.starts_with("Context:")
            || line.starts_with("Answer:")
        {
            continue;
        }
        if !lines.is_empty() {
            length += 1;
        }
        length += line.chars().count();
        lines.push(line);
        if length > MAX_ANSWER_CHARS {
            break;
        }
    }

    lines.join(" ")
}

/// Generator backed by the chat completions API.
pub struct LlmAnswerGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    prompts: Prompts,
}

impl LlmAnswerGenerator {
    pub fn new(settings: &RagSettings, prompts: Prompts) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            prompts,
        })
    }

    /// Use a specific API client (e.g. a different API base).
    pub fn with_client(
        mut self,
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
    ) -> Self {
        self.client = client;
        self
    }

    fn messages(
        &self,
        question: &str,
        context: &[ContextPassage],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context(context));
        let user_prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.rag.system.clone())
                .build()
                .map_err(|e| VidqaError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| VidqaError::Generation(e.to_string()))?
                .into(),
        ])
    }

    async fn complete(&self, question: &str, context: &[ContextPassage]) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.messages(question, context)?)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| VidqaError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VidqaError::Model(format!("Failed to generate response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VidqaError::Generation("Empty response from LLM".to_string()))
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    #[instrument(skip(self, context), fields(model = %self.model, passages = context.len()))]
    async fn generate(&self, question: &str, context: &[ContextPassage]) -> String {
        match self.complete(question, context).await {
            Ok(raw) => {
                let answer = clean_response(&raw);
                debug!("Generated {} character answer", answer.len());
                if answer.is_empty() {
                    NO_CLEAR_ANSWER.to_string()
                } else {
                    answer
                }
            }
            Err(e) => {
                warn!("Answer generation failed, using fallback: {}", e);
                fallback_answer(question, context)
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_drops_artifacts_and_echoes() {
        let raw = "Answer: \n\nRust uses ownership.<|endoftext|>\nQuestion: what else?\n  \
                   Borrowing is checked at compile time.<pad>\nContext: Source 1";
        assert_eq!(
            clean_response(raw),
            "Rust uses ownership. Borrowing is checked at compile time."
        );
    }

    #[test]
    fn test_clean_response_stops_after_limit() {
        let line = "a".repeat(200);
        let raw = format!("{line}\n{line}\n{line}");
        let cleaned = clean_response(&raw);
        assert_eq!(cleaned, format!("{line} {line}"));
    }

    #[test]
    fn test_clean_response_can_be_empty() {
        assert_eq!(clean_response("Question: x\nAnswer:\n<pad>"), "");
    }

    #[tokio::test]
    async fn test_unreachable_model_falls_back() {
        let client = async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key("test")
                .with_api_base("http://127.0.0.1:9"),
        );
        let generator = LlmAnswerGenerator::new(&RagSettings::default(), Prompts::default())
            .unwrap()
            .with_client(client);
        let context = vec![ContextPassage {
            document: "Lifetimes name regions of code.".to_string(),
            metadata: crate::vector_store::tests::metadata("v", 0),
            similarity: 0.7,
        }];

        let answer = generator.generate("What are lifetimes?", &context).await;
        assert!(answer.starts_with("Based on the video transcripts from: Title of v"));
    }
}
