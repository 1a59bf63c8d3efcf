//! Gemini client and response client contract tests.
//!
//! These run the real HTTP path against a mock server and check:
//! - request shape (path, auth header, persona turn, role mapping, sampling)
//! - fail-soft mapping of empty, malformed and failed responses
//! - the full controller turn cycle on top of the response client

use std::sync::Arc;

use folio_core::ai::{Content, GeminiClient};
use folio_core::responder::{EMPTY_RESPONSE, ERROR_RESPONSE, NO_KEY_RESPONSE};
use folio_core::{ChatController, ChatRole, GenerationError, Persona, Respond, ResponseClient, SpeechInput};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "test-model";
const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

fn responder_for(server: &MockServer) -> ResponseClient {
    let client = GeminiClient::new("test-key").with_base_url(&server.uri());
    ResponseClient::new(Some(client), MODEL, &Persona::default())
}

fn controller_for(server: &MockServer) -> ChatController {
    ChatController::new(Arc::new(responder_for(server)), SpeechInput::unavailable())
}

// ────────────────────────────────────────────────────────────────────────────
// Request format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_carries_key_and_sampling_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.95,
                "maxOutputTokens": 500
            }
        })))
        .respond_with(reply("Hi"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = responder_for(&mock_server).respond("Hello", &[]).await;
    assert_eq!(text, "Hi");
}

#[tokio::test]
async fn test_persona_first_then_prompt_last() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(reply("ok"))
        .mount(&mock_server)
        .await;

    responder_for(&mock_server).respond("Who are you?", &[]).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0]["role"], "user");
    assert!(contents[0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("You are the AI assistant for Suyash Tiwari"));
    assert_eq!(contents[1]["role"], "user");
    assert_eq!(contents[1]["parts"][0]["text"], "Who are you?");
}

#[tokio::test]
async fn test_history_on_turn_n_has_prior_messages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(reply("noted"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut chat = controller_for(&mock_server);
    for prompt in ["first", "second", "third"] {
        chat.set_input(prompt);
        assert!(chat.send());
        chat.finish_pending().await;
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    for (turn, request) in requests.iter().enumerate() {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let contents = body["contents"].as_array().unwrap();

        // persona + prior messages + prompt
        assert_eq!(contents.len(), 1 + 2 * turn + 1);

        for (i, prior) in chat.messages()[..2 * turn].iter().enumerate() {
            let sent = &contents[1 + i];
            let expected_role = match prior.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            assert_eq!(sent["role"], expected_role);
            assert_eq!(sent["parts"][0]["text"], prior.content.as_str());
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response handling
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_reply_is_last_assistant_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(reply("Hello"))
        .mount(&mock_server)
        .await;

    let mut chat = controller_for(&mock_server);
    chat.set_input("  hi there  ");
    assert!(chat.send());
    chat.finish_pending().await;

    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "hi there");
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, "Hello");
}

#[tokio::test]
async fn test_multi_part_reply_is_concatenated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hel"}, {"text": "lo"}]}
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(&mock_server.uri());
    let text = client.generate(MODEL, &[Content::user("hi")]).await.unwrap();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn test_server_error_becomes_error_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&mock_server)
        .await;

    let mut chat = controller_for(&mock_server);
    chat.set_input("hello?");
    chat.send();
    chat.finish_pending().await;

    let last = chat.conversation().last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, ERROR_RESPONSE);
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn test_status_error_is_typed_at_client_level() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new("wrong").with_base_url(&mock_server.uri());
    let err = client.generate(MODEL, &[Content::user("hi")]).await.unwrap_err();

    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "bad key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_becomes_error_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let text = responder_for(&mock_server).respond("hi", &[]).await;
    assert_eq!(text, ERROR_RESPONSE);
}

#[tokio::test]
async fn test_empty_generation_has_its_own_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&mock_server)
        .await;

    let text = responder_for(&mock_server).respond("hi", &[]).await;
    assert_eq!(text, EMPTY_RESPONSE);
    assert_ne!(EMPTY_RESPONSE, ERROR_RESPONSE);
}

#[tokio::test]
async fn test_unreachable_endpoint_becomes_error_fallback() {
    // Nothing listens on this port once the server is dropped.
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let client = GeminiClient::new("test-key").with_base_url(&uri);
    let responder = ResponseClient::new(Some(client), MODEL, &Persona::default());
    assert_eq!(responder.respond("hi", &[]).await, ERROR_RESPONSE);
}

#[tokio::test]
async fn test_missing_key_never_touches_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(reply("should not happen"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let responder = ResponseClient::new(None, MODEL, &Persona::default());
    let mut chat = ChatController::new(Arc::new(responder), SpeechInput::unavailable());

    chat.set_input("anyone there?");
    chat.send();
    chat.finish_pending().await;

    assert_eq!(chat.conversation().last().unwrap().content, NO_KEY_RESPONSE);
}
