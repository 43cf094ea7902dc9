use async_trait::async_trait;
use thiserror::Error;
use vexchat_types::{error_reason, ChatReply, OutboundMessage};

/// Every way a send can fail. The controller treats all variants alike;
/// the split only exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (connection refused, DNS, aborted fetch).
    #[error("{0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}, message: {reason}")]
    Status { status: u16, reason: String },

    /// 2xx status whose body is not a valid reply.
    #[error("Malformed response from backend: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Build a status failure, pulling the reason out of the response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        TransportError::Status {
            status,
            reason: error_reason(body),
        }
    }
}

/// Parse a success body into a [`ChatReply`].
pub fn parse_reply(body: &str) -> Result<ChatReply, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Single request/response exchange with the chat backend.
///
/// Futures are not required to be `Send`: the browser front end runs on a
/// single-threaded executor.
#[async_trait(?Send)]
pub trait ChatTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<ChatReply, TransportError>;
}
