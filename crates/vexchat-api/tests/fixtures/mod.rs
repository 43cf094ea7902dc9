use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock chat backend for transport tests
pub struct ChatMockServer {
    server: MockServer,
}

impl ChatMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.server.uri())
    }

    /// Successful reply carrying `session_state`
    pub async fn mock_reply(&self, bot_response: &str, session_state: Value) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bot_response": bot_response,
                "session_state": session_state
            })))
            .mount(&self.server)
            .await;
    }

    /// Reply for exactly one request, then fall through to later mocks
    pub async fn mock_reply_once(&self, bot_response: &str, session_state: Value) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bot_response": bot_response,
                "session_state": session_state
            })))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Any status with a raw body
    pub async fn mock_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Backend-style error with a `detail` field
    pub async fn mock_detail_error(&self, status: u16, detail: &str) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "detail": detail })))
            .mount(&self.server)
            .await;
    }

    /// Liveness route at the backend root
    pub async fn mock_health(&self, message: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": message })))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request the server received, in order
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.body_json::<Value>().ok())
            .collect()
    }
}
