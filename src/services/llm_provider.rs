use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::SentenceOracle;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

const SYSTEM_PROMPT: &str = "你是一个中文例句生成助手。严格按照要求的格式输出，不要添加任何解释。";

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response")]
    EmptyChoices,
}

/// Client for the external text-generation oracle (an OpenAI-compatible chat
/// endpoint). Each call is a single blocking request; retry belongs to the
/// generation orchestrator, not to this client.
#[derive(Clone)]
pub struct LLMProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl LLMProvider {
    pub fn from_env() -> Self {
        let api_key = env_string("LLM_API_KEY");
        let model = env_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_endpoint = normalize_endpoint(
            env_string("LLM_API_ENDPOINT")
                .or_else(|| env_string("LLM_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        );
        let timeout = Duration::from_millis(env_u64("LLM_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config: LLMConfig {
                api_key,
                model,
                api_endpoint,
                timeout,
            },
            client,
        }
    }

    pub fn is_available(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && !self.config.model.trim().is_empty()
            && !self.config.api_endpoint.trim().is_empty()
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, OracleError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(OracleError::NotConfigured("LLM_API_KEY"))?;

        let url = format!(
            "{}/chat/completions",
            self.config.api_endpoint.trim_end_matches('/')
        );
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OracleError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(v) => Ok(v),
            Err(e) => {
                let body = String::from_utf8_lossy(&bytes);
                tracing::error!("Failed to parse LLM response JSON: {}. Body: {}", e, body);
                Err(OracleError::Json(e))
            }
        }
    }
}

#[async_trait]
impl SentenceOracle for LLMProvider {
    async fn generate_sentences(
        &self,
        allowed_characters: &[String],
        count: usize,
    ) -> Result<String, OracleError> {
        let messages = [
            ChatMessage {
                role: "system".into(),
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: build_sentence_prompt(allowed_characters, count),
            },
        ];

        let response = self.chat(&messages).await?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or(OracleError::EmptyChoices)
    }
}

/// The prompt enumerates the full character pool and demands tagged output
/// (`SENTENCE_1:` …). The oracle is not guaranteed to comply; the extractor
/// revalidates everything it returns.
pub fn build_sentence_prompt(allowed_characters: &[String], count: usize) -> String {
    format!(
        "请只使用下面列出的词汇，写出{count}个简短、符合语法的中文句子。\n\
         要求：\n\
         1. 每个句子单独一行，以 SENTENCE_<编号>: 开头（例如 SENTENCE_1: 你好。）\n\
         2. 不要使用词汇表之外的任何汉字\n\
         3. 不要输出编号句子以外的内容\n\
         词汇表：{pool}",
        count = count,
        pool = allowed_characters.join("、")
    )
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_enumerates_pool_and_requests_tagged_output() {
        let pool = vec!["你".to_string(), "好".to_string(), "学生".to_string()];
        let prompt = build_sentence_prompt(&pool, 30);

        assert!(prompt.contains("30"));
        assert!(prompt.contains("SENTENCE_1"));
        assert!(prompt.contains("你、好、学生"));
    }

    #[test]
    fn endpoint_normalization_appends_v1_once() {
        assert_eq!(
            normalize_endpoint("https://api.example.com".into()),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_endpoint("https://api.example.com/v1/".into()),
            "https://api.example.com/v1"
        );
    }
}
