//! Integration tests for the chat-completion gateway against a mock server.

use std::time::Duration;

use commit_assist::llm::{ChatMessage, LlmGateway, OpenAiCompatClient};
use commit_assist::{LlmError, Settings};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings pointing at the mock server, with a trailing slash to exercise trimming.
fn settings_for(server: &MockServer) -> Settings {
    Settings {
        base_url: format!("{}/v1/", server.uri()),
        model: "qwen2.5-coder".to_string(),
        ..Settings::default()
    }
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn test_complete_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "qwen2.5-coder",
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "diff here" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Summary: Add X\nDescription:\n- did Y")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    let reply = client
        .complete(&[ChatMessage::system("sys"), ChatMessage::user("diff here")])
        .await
        .unwrap();

    assert_eq!(reply, "Summary: Add X\nDescription:\n- did Y");
}

#[tokio::test]
async fn test_request_carries_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    client.complete(&[ChatMessage::user("hi")]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.2).abs() < 1e-6);
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'qwen2.5-coder' not found"))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    let result = client.complete(&[ChatMessage::user("hi")]).await;

    match result {
        Err(LlmError::Status { code, body }) => {
            assert_eq!(code, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reply_without_content_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    let result = client.complete(&[ChatMessage::user("hi")]).await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    let result = client.complete(&[ChatMessage::user("hi")]).await;
    match result {
        Err(LlmError::InvalidResponse(detail)) => assert!(detail.contains("proxy page")),
        other => panic!("Expected InvalidResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let settings = Settings {
        llm_timeout: Duration::from_millis(200),
        ..settings_for(&server)
    };
    let client = OpenAiCompatClient::new(&settings).unwrap();
    let result = client.complete(&[ChatMessage::user("hi")]).await;
    match result {
        Err(err @ LlmError::Timeout(_)) => {
            assert_eq!(err.to_string(), "Model request timed out after 200ms");
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind and drop a listener so the port is closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let settings = Settings {
        base_url: format!("http://127.0.0.1:{port}/v1"),
        ..Settings::default()
    };

    let client = OpenAiCompatClient::new(&settings).unwrap();
    let result = client.complete(&[ChatMessage::user("hi")]).await;
    assert!(matches!(result, Err(LlmError::Transport(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_connection_sends_one_word_prompt_at_zero_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{ "role": "user", "content": "Say hello in one word." }],
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Hello!\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(&settings_for(&server)).unwrap();
    let reply = client.test_connection().await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn test_blank_model_is_sent_as_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "local-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        model: "   ".to_string(),
        ..settings_for(&server)
    };
    let client = OpenAiCompatClient::new(&settings).unwrap();
    assert_eq!(client.complete(&[ChatMessage::user("hi")]).await.unwrap(), "ok");
}
