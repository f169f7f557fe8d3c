use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are a metabolic biochemistry assistant. Answer the user's \
question using only the supplied graph context. Cite compound, reaction, pathway, and enzyme \
identifiers where relevant. If the context does not contain the answer, say so plainly.";

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Degrades to a deterministic fallback string when no API key is configured
/// or the request fails, so the pipeline stays usable without credentials.
/// Every request carries a timeout; a stalled endpoint becomes a fallback
/// answer instead of a hung pipeline.
#[derive(Clone)]
pub struct AnswerClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl AnswerClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate(&self, question: &str, context: &str) -> String {
        let Some(api_key) = self.api_key.clone() else {
            return fallback_answer(question, context, "missing LLM API key");
        };
        match self.request(&api_key, question, context).await {
            Ok(answer) if !answer.is_empty() => answer,
            Ok(_) => fallback_answer(question, context, "empty model response"),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "answer generation failed");
                fallback_answer(question, context, "request failure")
            }
        }
    }

    async fn request(&self, api_key: &str, question: &str, context: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let user_prompt = format!("Context:\n{context}\n\nQuestion: {}", question.trim());
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat completion request")?;
        if !response.status().is_success() {
            anyhow::bail!("chat completion failed: {}", response.status());
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }
}

fn fallback_answer(question: &str, context: &str, reason: &str) -> String {
    format!(
        "LLM response unavailable. Reason: {reason}. Question: {} | Context length: {}",
        question.trim(),
        context.len()
    )
}
