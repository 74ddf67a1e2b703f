//! Grounded answers from a local Ollama server via `POST /api/chat`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docqa_core::config::CompletionConfig;
use docqa_core::traits::{CompletionModel, CompletionRequest};
use docqa_core::{Error, Result};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

pub struct OllamaCompletion {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaCompletion {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn body<'a>(&'a self, request: &CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system".into(), content: system_message(request) },
                ChatMessage { role: "user".into(), content: request.query.clone() },
            ],
            stream: false,
            options: ChatOptions { temperature: self.temperature },
        }
    }
}

/// The system prompt followed by the retrieved context block.
fn system_message(request: &CompletionRequest) -> String {
    format!(
        "{}\n\nContext information is below.\n---------------------\n{}\n---------------------",
        request.system_prompt, request.context
    )
}

#[async_trait]
impl CompletionModel for OllamaCompletion {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("ollama returned {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("malformed chat response: {e}")))?;
        Ok(parsed.message.content)
    }
}
