use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use crate::config::Config;
use crate::models::{
    Content, GeminiErrorEnvelope, GeminiRequest, GeminiResponse, GenerationConfig, Part
};

pub const GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const GEMINI_PROVIDER_NAME: &str = "Google Gemini 1.5 Flash";
const MAX_OUTPUT_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.8;

/// Ways a generation call can fail. Nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Gemini API key not configured. Please set GEMINI_API_KEY in your .env file.")]
    NotConfigured,

    #[error("Invalid Gemini API key. Please check your .env file.")]
    InvalidApiKey,

    #[error("API quota exceeded. Please check your Google AI Studio account.")]
    QuotaExceeded,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Gemini AI error: {0}")]
    Upstream(String)
}

/// Anything that can turn a prompt into a line of raw text.
#[async_trait]
pub trait LineGenerator: Send + Sync {

    fn provider_name(&self) -> &str;

    fn is_configured(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

}

#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: Option<String>,
    api_base: String,
    timeout: Duration
}

impl GeminiClient {

    pub fn new(http_client: Client, config: &Config) -> Self {

        GeminiClient {
            http_client,
            api_key: config.gemini_api_key.clone(),
            api_base: config.gemini_api_base.clone(),
            timeout: config.request_timeout
        }

    }

    fn endpoint(&self) -> String {

        format!("{}/models/{}:generateContent", self.api_base, GEMINI_MODEL)

    }

}

#[async_trait]
impl LineGenerator for GeminiClient {

    fn provider_name(&self) -> &str {

        GEMINI_PROVIDER_NAME

    }

    fn is_configured(&self) -> bool {

        self.api_key.is_some()

    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {

        // fail before touching the network
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt.to_string()) }]
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE
            }
        };

        let response = self.http_client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Upstream(format!("request timed out after {}s", self.timeout.as_secs_f32()))
                } else {
                    GenerationError::Upstream(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(%status, "gemini responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_error(status, &body);
            error!(%status, "Gemini AI error: {}", body);
            return Err(err);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Upstream(format!("could not decode response: {}", e)))?;

        extract_text(gemini_response)
            .ok_or_else(|| GenerationError::Upstream("response contained no text".to_string()))

    }

}

// concatenates the text parts of the first candidate
fn extract_text(response: GeminiResponse) -> Option<String> {

    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() { None } else { Some(text) }

}

/// Maps a non-success reply onto a failure kind using the structured error
/// envelope (`error.status` and `error.details[].reason`), falling back to the
/// HTTP status when the body isn't the usual shape.
pub fn classify_error(status: StatusCode, body: &str) -> GenerationError {

    let envelope = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();

    let (message, error_status, reasons) = match &envelope {
        Some(env) => (
            env.error.message.clone(),
            env.error.status.clone().unwrap_or_default(),
            env.error.details.iter().filter_map(|d| d.reason.clone()).collect::<Vec<_>>()
        ),
        None => (body.trim().to_string(), String::new(), Vec::new())
    };

    let has_reason = |wanted: &str| reasons.iter().any(|r| r == wanted);

    if has_reason("API_KEY_INVALID")
        || error_status == "UNAUTHENTICATED"
        || status == StatusCode::UNAUTHORIZED
    {
        return GenerationError::InvalidApiKey;
    }

    if has_reason("RATE_LIMIT_EXCEEDED") {
        return GenerationError::RateLimited;
    }

    if error_status == "RESOURCE_EXHAUSTED" || status == StatusCode::TOO_MANY_REQUESTS {
        return GenerationError::QuotaExceeded;
    }

    if message.is_empty() {
        GenerationError::Upstream(format!("provider returned {}", status))
    } else {
        GenerationError::Upstream(message)
    }

}

#[cfg(test)]
mod tests {

    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::{post, Router};
    use axum::Json;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn spawn_stub(app: Router) -> SocketAddr {

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind stub");
        let addr = listener.local_addr().expect("Failed to get stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });
        addr

    }

    fn client_for(addr: SocketAddr, api_key: Option<&str>, timeout: Duration) -> GeminiClient {

        GeminiClient {
            http_client: Client::new(),
            api_key: api_key.map(str::to_string),
            api_base: format!("http://{}/v1beta", addr),
            timeout
        }

    }

    #[test]
    fn test_invalid_key_is_detected_from_reason() {

        let body = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        }).to_string();

        assert_eq!(classify_error(StatusCode::BAD_REQUEST, &body), GenerationError::InvalidApiKey);

    }

    #[test]
    fn test_quota_and_rate_limit_are_distinct() {

        let quota = json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        }).to_string();
        assert_eq!(classify_error(StatusCode::TOO_MANY_REQUESTS, &quota), GenerationError::QuotaExceeded);

        let throttled = json!({
            "error": {
                "code": 429,
                "message": "Too many requests",
                "status": "RESOURCE_EXHAUSTED",
                "details": [{"reason": "RATE_LIMIT_EXCEEDED"}]
            }
        }).to_string();
        assert_eq!(classify_error(StatusCode::TOO_MANY_REQUESTS, &throttled), GenerationError::RateLimited);

    }

    #[test]
    fn test_other_errors_carry_provider_message() {

        let body = json!({
            "error": {"code": 500, "message": "An internal error has occurred.", "status": "INTERNAL"}
        }).to_string();
        assert_eq!(
            classify_error(StatusCode::INTERNAL_SERVER_ERROR, &body),
            GenerationError::Upstream("An internal error has occurred.".to_string())
        );

        // message text alone never decides the kind
        let body = json!({"error": {"message": "quota talk but a bad request", "status": "INVALID_ARGUMENT"}}).to_string();
        assert!(matches!(classify_error(StatusCode::BAD_REQUEST, &body), GenerationError::Upstream(_)));

        assert_eq!(
            classify_error(StatusCode::BAD_GATEWAY, ""),
            GenerationError::Upstream("provider returned 502 Bad Gateway".to_string())
        );

    }

    #[test]
    fn test_bare_status_codes_without_envelope() {

        assert_eq!(classify_error(StatusCode::UNAUTHORIZED, ""), GenerationError::InvalidApiKey);
        assert_eq!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, "<html>slow down</html>"),
            GenerationError::QuotaExceeded
        );

    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {

        // nothing listens on port 9, a network attempt would surface as Upstream
        let client = client_for(([127, 0, 0, 1], 9).into(), None, Duration::from_secs(1));

        assert!(!client.is_configured());
        assert_eq!(client.generate("prompt").await, Err(GenerationError::NotConfigured));

    }

    #[tokio::test]
    async fn test_generate_against_stub_server() {

        let app = Router::new().route(
            "/v1beta/models/:call",
            post(|Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(call, "gemini-1.5-flash:generateContent");
                assert_eq!(headers["x-goog-api-key"], "test-key");
                assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
                assert_eq!(body["contents"][0]["parts"][0]["text"], "write a line");

                Json(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "  \"Silver "}, {"text": "rain\"\n"}], "role": "model"}
                    }]
                }))
            })
        );
        let addr = spawn_stub(app).await;
        let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

        let text = client.generate("write a line").await.expect("generation should succeed");
        assert_eq!(text, "  \"Silver rain\"\n");

    }

    #[tokio::test]
    async fn test_provider_error_is_classified() {

        let app = Router::new().route(
            "/v1beta/models/:call",
            post(|| async {
                (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}))
                )
            })
        );
        let addr = spawn_stub(app).await;
        let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

        assert_eq!(client.generate("p").await, Err(GenerationError::QuotaExceeded));

    }

    #[tokio::test]
    async fn test_empty_candidates_is_upstream_error() {

        let app = Router::new().route(
            "/v1beta/models/:call",
            post(|| async { Json(json!({"candidates": []})) })
        );
        let addr = spawn_stub(app).await;
        let client = client_for(addr, Some("test-key"), Duration::from_secs(5));

        assert_eq!(
            client.generate("p").await,
            Err(GenerationError::Upstream("response contained no text".to_string()))
        );

    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {

        let app = Router::new().route(
            "/v1beta/models/:call",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"candidates": []}))
            })
        );
        let addr = spawn_stub(app).await;
        let client = client_for(addr, Some("test-key"), Duration::from_millis(200));

        match client.generate("p").await {
            Err(GenerationError::Upstream(msg)) => assert!(msg.contains("timed out"), "got {}", msg),
            other => panic!("expected timeout, got {:?}", other)
        }

    }

}
