use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock agent server used by the client tests
pub struct AgentMockServer {
    server: MockServer,
}

impl AgentMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub async fn mock_create_user(&self, user_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/user/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userId": user_id })))
            .mount(&self.server)
            .await;
    }

    /// Reply to the stream endpoint with raw SSE text
    pub async fn mock_stream(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/finance-assistant/stream"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_conversations(&self, user_id: &str, agent_name: &str, conversations: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/user/{}/conversations", user_id)))
            .and(query_param("agentName", agent_name))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "conversations": conversations })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_error(&self, http_method: &str, url_path: &str, status: u16, error: &str) {
        Mock::given(method(http_method))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": error })))
            .mount(&self.server)
            .await;
    }
}

/// Frames of a two-chunk reply ending in the sentinel
pub fn sse_reply(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("data: {}\n\n", json!({ "chunk": chunk })));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
