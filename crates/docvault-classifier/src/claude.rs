//! Document classification through Anthropic's Messages API

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use docvault_core::models::{ClassificationResult, DocumentType};
use docvault_core::{ClassifierSettings, Config};
use serde::{Deserialize, Serialize};

use crate::classifier::DocumentClassifier;
use crate::prompt::{build_classification_prompt, parse_classification_response};

const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Clone)]
pub struct ClaudeClassifierConfig {
    pub api_key: String,
    /// Without trailing slash, e.g. `https://api.anthropic.com/v1`
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_input_chars: usize,
}

impl Debug for ClaudeClassifierConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClaudeClassifierConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_input_chars", &self.max_input_chars)
            .finish_non_exhaustive()
    }
}

impl ClaudeClassifierConfig {
    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.anthropic_api_key()?.to_string();
        Some(Self::from_settings(api_key, &config.classifier_settings()))
    }

    pub fn from_settings(api_key: String, settings: &ClassifierSettings) -> Self {
        Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: settings.timeout,
            max_input_chars: settings.max_input_chars,
        }
    }
}

pub struct ClaudeDocumentClassifier {
    http_client: reqwest::Client,
    config: ClaudeClassifierConfig,
}

impl Debug for ClaudeDocumentClassifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClaudeDocumentClassifier")
            .field("model", &self.config.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ClaudeDocumentClassifier {
    pub fn new(config: ClaudeClassifierConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client for document classifier")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    async fn request_classification(
        &self,
        text: &str,
        declared: DocumentType,
    ) -> Result<ClassificationResult> {
        let prompt = build_classification_prompt(text, declared, self.config.max_input_chars);
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Anthropic API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        let answer = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .context("Anthropic API response contained no text block")?;

        parse_classification_response(&answer)
    }
}

#[async_trait]
impl DocumentClassifier for ClaudeDocumentClassifier {
    #[tracing::instrument(skip(self, text), fields(model = %self.config.model, chars = text.len()))]
    async fn classify(&self, text: &str, declared: DocumentType) -> ClassificationResult {
        match self.request_classification(text, declared).await {
            Ok(result) => {
                tracing::info!(
                    declared = %declared,
                    inferred = %result.inferred_type,
                    confidence = result.confidence,
                    "Document classified"
                );
                result
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Classification unavailable");
                ClassificationResult::unavailable(declared)
            }
        }
    }
}
