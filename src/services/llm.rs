//! 语言模型客户端
//!
//! 所有对外部文本生成服务的调用都经过 [`LlmClient`]。默认实现对接
//! OpenAI 兼容的 `/chat/completions` 接口。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::config::LlmConfig;
use crate::error::{AppError, Result};

/// 对话消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// 输出格式约束
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

/// 补全请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(model: &str, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.to_string(),
            messages,
            temperature: None,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// 要求模型只输出一个 JSON 对象
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            kind: "json_object".into(),
        });
        self
    }
}

/// 文本生成服务
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送一次补全请求，返回首个候选的文本
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI 兼容接口客户端
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        debug!("LLM request to model {}", request.model);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Completion failed with {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::Llm("Completion returned no content".to_string()))
    }
}

/// 未配置 API Key 时使用，所有调用都失败并触发回退文本
pub struct DisabledLlmClient;

#[async_trait]
impl LlmClient for DisabledLlmClient {
    async fn complete(&self, _request: ChatRequest) -> Result<String> {
        Err(AppError::Llm("LLM API key is not configured".to_string()))
    }
}

/// 根据配置创建客户端
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    if config.api_key.is_empty() {
        info!("LLM API key not set, narrative features will use fallback text");
        return Ok(Arc::new(DisabledLlmClient));
    }
    info!("Using LLM endpoint {}", config.base_url);
    Ok(Arc::new(OpenAiCompatibleClient::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new(
            "openai/gpt-oss-20b",
            vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
        )
        .with_temperature(0.7)
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "openai/gpt-oss-20b" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "  Hello there.  " } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new(&server.uri(), "test-key", Duration::from_secs(5)).unwrap();
        let text = client.complete(request()).await.unwrap();
        assert_eq!(text, "Hello there.");
    }

    #[tokio::test]
    async fn test_upstream_error_maps_to_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = OpenAiCompatibleClient::new(&server.uri(), "k", Duration::from_secs(5)).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = OpenAiCompatibleClient::new(&server.uri(), "k", Duration::from_secs(5)).unwrap();
        assert!(client.complete(request()).await.is_err());
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new(&server.uri(), "k", Duration::from_millis(200)).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_request_serialization_skips_unset_options() {
        let value = serde_json::to_value(ChatRequest::new("m", vec![])).unwrap();
        assert!(value.get("temperature").is_none());

        let value = serde_json::to_value(ChatRequest::new("m", vec![]).json_object()).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[tokio::test]
    async fn test_disabled_client_fails() {
        assert!(DisabledLlmClient.complete(request()).await.is_err());
    }
}
