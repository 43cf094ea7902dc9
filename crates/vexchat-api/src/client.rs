use async_trait::async_trait;
use serde::Deserialize;

use vexchat_session::{parse_reply, ChatTransport, TransportError};
use vexchat_types::{ChatReply, OutboundMessage};

use crate::config::{health_url, ClientConfig};

/// reqwest-backed transport for the chat backend
pub struct HttpChatClient {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    message: String,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the backend's root route whether it is up.
    ///
    /// Returns the backend's status message, or the raw body if it is not
    /// the usual `{"message": ...}` shape.
    pub async fn check_health(&self) -> Result<String, TransportError> {
        let url = health_url(&self.endpoint).ok_or_else(|| {
            TransportError::Network(format!("Invalid endpoint URL: {}", self.endpoint))
        })?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::from_status(status.as_u16(), &body));
        }

        Ok(serde_json::from_str::<HealthBody>(&body)
            .map(|h| h.message)
            .unwrap_or(body))
    }
}

#[async_trait(?Send)]
impl ChatTransport for HttpChatClient {
    async fn send(&self, message: &OutboundMessage) -> Result<ChatReply, TransportError> {
        log::debug!("POST {} for {}", self.endpoint, message.user_id);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(message)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            log::debug!("Backend returned {}: {}", status, body);
            return Err(TransportError::from_status(status.as_u16(), &body));
        }

        parse_reply(&body)
    }
}
