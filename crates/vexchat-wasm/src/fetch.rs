use async_trait::async_trait;
use gloo_net::http::Request;

use vexchat_session::{parse_reply, ChatTransport, TransportError};
use vexchat_types::{ChatReply, OutboundMessage};

/// `fetch`-backed transport for the browser build
#[derive(Debug, Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl ChatTransport for FetchTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<ChatReply, TransportError> {
        let response = Request::post(&self.endpoint)
            .json(message)
            .map_err(|e| TransportError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !response.ok() {
            return Err(TransportError::from_status(status, &body));
        }

        parse_reply(&body)
    }
}
