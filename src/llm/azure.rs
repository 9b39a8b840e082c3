//! Azure OpenAI client for embeddings and chat completions

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AzureOpenAiConfig;
use crate::errors::CarelineError;
use crate::errors::Result;
use crate::llm::ChatClient;
use crate::llm::CompletionRequest;
use crate::llm::EmbeddingClient;

/// Client for the Azure OpenAI REST API.
///
/// Covers both deployments the system uses: the embedding deployment and the
/// chat deployment. Authentication is the `api-key` header; the API version
/// travels as a query parameter.
pub struct AzureOpenAi {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    chat_deployment: String,
    embedding_deployment: String,
}

impl AzureOpenAi {
    /// Create a client from configuration
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn from_config(config: &AzureOpenAiConfig) -> Result<Self> {
        // Every collaborator call gets an explicit timeout; a timeout is a
        // collaborator failure like any other.
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CarelineError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            chat_deployment: config.chat_deployment.clone(),
            embedding_deployment: config.embedding_deployment.clone(),
        })
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment, operation, self.api_version
        )
    }
}

#[async_trait]
impl EmbeddingClient for AzureOpenAi {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbeddingRequest<'a> {
            input: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let url = self.deployment_url(&self.embedding_deployment, "embeddings");
        debug!("Calling Azure OpenAI embeddings API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&EmbeddingRequest { input: text })
            .send()
            .await
            .map_err(|e| CarelineError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CarelineError::Embedding(format!(
                "Azure OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CarelineError::Embedding(format!("Failed to parse response: {e}")))?;

        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| CarelineError::Embedding("No embedding in response".to_string()))
    }
}

#[async_trait]
impl ChatClient for AzureOpenAi {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        #[derive(Serialize)]
        struct WireMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            messages: Vec<WireMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let mut messages = vec![WireMessage {
            role: "system",
            content: &request.system_prompt,
        }];
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: &m.role,
            content: &m.content,
        }));

        let url = self.deployment_url(&self.chat_deployment, "chat/completions");
        debug!("Calling Azure OpenAI chat completions API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&ChatRequest {
                messages,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            })
            .send()
            .await
            .map_err(|e| CarelineError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CarelineError::Chat(format!(
                "Azure OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| CarelineError::Chat(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| CarelineError::Chat("No completion in response".to_string()))
    }
}
