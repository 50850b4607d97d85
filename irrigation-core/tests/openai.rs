//! HTTP-level tests for the advice client against a mock server.

use std::time::Duration;

use irrigation_core::{
    Advisor, Error, LlmConfig, RecommendationRequest, WeatherRecord,
    provider::openai::OpenAiAdvisor,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{bearer_token, method, path},
};

fn advisor(base_url: String) -> OpenAiAdvisor {
    OpenAiAdvisor::new(LlmConfig {
        api_key: "sk-test".into(),
        model: "gpt-4o-mini".into(),
        base_url,
        timeout: Duration::from_secs(10),
    })
    .expect("client should build")
}

fn tomato_in_london() -> RecommendationRequest {
    RecommendationRequest::new(
        "tomato",
        WeatherRecord {
            city: "London".into(),
            country: "GB".into(),
            temperature_c: 15.3,
            feels_like_c: 14.8,
            humidity_pct: 72,
            condition: "Light rain".into(),
            description: "light rain".into(),
            wind_speed_mps: 3.5,
            cloud_cover_pct: 85,
            rain_1h_mm: Some(2.3),
            rain_3h_mm: None,
            observed_at: None,
        },
    )
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn sends_one_system_and_one_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("1. IRRIGATION DECISION: No")))
        .expect(1)
        .mount(&server)
        .await;

    let text = advisor(server.uri()).recommend(&tomato_in_london()).await.unwrap();
    assert_eq!(text, "1. IRRIGATION DECISION: No");

    let requests = server.received_requests().await.expect("recording is on");
    let body: Value = requests[0].body_json().unwrap();

    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["max_tokens"], 800);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("irrigation expert"));
    assert_eq!(messages[1]["role"], "user");

    let prompt = messages[1]["content"].as_str().unwrap();
    assert!(prompt.contains("Crop Type: tomato"));
    assert!(prompt.contains("Recent Rainfall: 2.3 mm (last hour)"));
}

#[tokio::test]
async fn error_statuses_map_to_error_kinds() {
    for status in [401u16, 429, 500] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"message": "failed", "type": "rate_limit_exceeded", "code": "rate_limit_exceeded"}
            })))
            .mount(&server)
            .await;

        let err = advisor(server.uri()).recommend(&tomato_in_london()).await.unwrap_err();

        let mapped = match (status, &err) {
            (401, Error::Authentication { status: 401, .. }) => true,
            (429, Error::RateLimited { code, .. }) => code.as_deref() == Some("rate_limit_exceeded"),
            (500, Error::ServiceUnavailable { status: Some(500), .. }) => true,
            _ => false,
        };
        assert!(mapped, "HTTP {status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn empty_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = advisor(server.uri()).recommend(&tomato_in_london()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse { .. }));
}

#[tokio::test]
async fn blank_crop_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("advice")))
        .expect(0)
        .mount(&server)
        .await;

    let mut request = tomato_in_london();
    request.crop_type = "  ".into();

    let err = advisor(server.uri()).recommend(&request).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn unreachable_provider_is_unavailable() {
    let err = advisor("http://127.0.0.1:9".into())
        .recommend(&tomato_in_london())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable { .. }));
}
