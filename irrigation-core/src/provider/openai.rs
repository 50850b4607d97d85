use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::LlmConfig,
    error::{Error, Result},
    model::RecommendationRequest,
    prompt, validate,
};

use super::{Advisor, Service};

const SERVICE: Service = Service::LanguageModel;

/// Sampling temperature for advice generation.
pub const TEMPERATURE: f32 = 0.7;
/// Cap on generated tokens; room for the six advice sections.
pub const MAX_TOKENS: u32 = 800;

/// Chat-completions client producing irrigation advice.
#[derive(Debug, Clone)]
pub struct OpenAiAdvisor {
    config: LlmConfig,
    http: Client,
}

impl OpenAiAdvisor {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    async fn complete(&self, body: &ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let start = Instant::now();

        debug!(model = %body.model, "sending chat completion request");

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| Error::transport(SERVICE, e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "OpenAI returned an error");
            return Err(status_error(status, &text));
        }

        let content = parse_completion(&text)?;
        info!(
            model = %body.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "recommendation generated"
        );
        Ok(content)
    }
}

#[async_trait]
impl Advisor for OpenAiAdvisor {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<String> {
        let crop_type = validate::crop_type(&request.crop_type)?;
        let request = RecommendationRequest::new(crop_type, request.weather.clone());
        let user_prompt = prompt::render(&request);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: prompt::SYSTEM_INSTRUCTION },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        self.complete(&body).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Extract `choices[0].message.content`, unmodified.
fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        Error::MalformedResponse { service: SERVICE, field: format!("invalid JSON: {e}") }
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(Error::EmptyResponse { service: SERVICE })
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let api_error = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Authentication { service: SERVICE, status: status.as_u16() }
        }
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            service: SERVICE,
            status: 429,
            code: api_error.and_then(|e| e.code.or(e.kind)),
        },
        s if s.is_server_error() => Error::ServiceUnavailable {
            service: SERVICE,
            status: Some(s.as_u16()),
            reason: format!("HTTP {s}"),
        },
        s => Error::InvalidRequest {
            service: SERVICE,
            status: s.as_u16(),
            message: api_error
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {s}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_content_verbatim() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  1. IRRIGATION DECISION: No\n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "  1. IRRIGATION DECISION: No\n");
    }

    #[test]
    fn no_choices_is_empty_response() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#,
        ] {
            let err = parse_completion(body).unwrap_err();
            assert!(matches!(err, Error::EmptyResponse { .. }), "{body}");
        }
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = parse_completion("upstream connect error").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn quota_errors_keep_provider_code() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","param":null,"code":"insufficient_quota"}}"#;
        match status_error(StatusCode::TOO_MANY_REQUESTS, body) {
            Error::RateLimited { code, .. } => assert_eq!(code.as_deref(), Some("insufficient_quota")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        for s in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(status_error(s, ""), Error::Authentication { .. }));
        }
    }

    #[test]
    fn unknown_model_is_invalid_request_with_message() {
        let body = r#"{"error":{"message":"The model `gpt-9` does not exist","type":"invalid_request_error","code":"model_not_found"}}"#;
        match status_error(StatusCode::NOT_FOUND, body) {
            Error::InvalidRequest { status, message, .. } => {
                assert_eq!(status, 404);
                assert!(message.contains("gpt-9"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn server_errors_are_unavailable() {
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, ""),
            Error::ServiceUnavailable { status: Some(502), .. }
        ));
    }
}
