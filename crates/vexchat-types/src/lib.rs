//! Core types and wire protocol for vexchat
//!
//! This crate provides the data model shared by the session core, the
//! native HTTP transport and the browser front end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Constants
// ============================================================================

/// Backend chat endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";

/// User-side transcript text for a turn that carried only attachments
pub const ATTACHMENT_PLACEHOLDER: &str = "[Sent with attachment]";

/// Media type recorded for files that do not declare one
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Error reason when a non-success body cannot be parsed at all
pub const UNKNOWN_ERROR_REASON: &str = "Unknown error occurred";

/// Error reason when a non-success body parses but carries no `detail`
pub const MISSING_DETAIL_REASON: &str = "Failed to get response";

// ============================================================================
// Identity and session token
// ============================================================================

/// Unauthenticated per-run identifier used only to label requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier, `user_` followed by a v4 UUID.
    pub fn generate() -> Self {
        Self(format!("user_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-defined conversation context.
///
/// The client stores whatever the backend last returned and echoes it back
/// verbatim on the next request. There is deliberately no API here that
/// reads or writes individual keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(Map<String, Value>);

impl SessionState {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read-only view, for display and diagnostics.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for SessionState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// One of the two fixed attachment positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentSlot {
    Image,
    Audio,
}

impl AttachmentSlot {
    pub const ALL: [AttachmentSlot; 2] = [AttachmentSlot::Image, AttachmentSlot::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentSlot::Image => "image",
            AttachmentSlot::Audio => "audio",
        }
    }
}

impl FromStr for AttachmentSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" | "img" => Ok(AttachmentSlot::Image),
            "audio" => Ok(AttachmentSlot::Audio),
            _ => Err(format!(
                "Unknown attachment slot: '{}'. Valid options: 'image', 'audio'",
                s.trim()
            )),
        }
    }
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded file content waiting to be sent with the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    /// Standard base64, no `data:` URL prefix
    pub encoded_data: String,
    pub mime_type: String,
}

// ============================================================================
// Wire protocol
// ============================================================================

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub user_id: UserId,
    pub message: String,
    #[serde(default)]
    pub session_state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio_mime_type: Option<String>,
}

impl OutboundMessage {
    pub fn new(user_id: UserId, message: impl Into<String>, session_state: SessionState) -> Self {
        Self {
            user_id,
            message: message.into(),
            session_state,
            image_base64: None,
            image_mime_type: None,
            audio_base64: None,
            audio_mime_type: None,
        }
    }

    /// Fill the payload/media-type pair for `slot`. Both fields are always set together.
    pub fn with_attachment(mut self, slot: AttachmentSlot, attachment: PendingAttachment) -> Self {
        let PendingAttachment {
            encoded_data,
            mime_type,
        } = attachment;
        match slot {
            AttachmentSlot::Image => {
                self.image_base64 = Some(encoded_data);
                self.image_mime_type = Some(mime_type);
            }
            AttachmentSlot::Audio => {
                self.audio_base64 = Some(encoded_data);
                self.audio_mime_type = Some(mime_type);
            }
        }
        self
    }

    pub fn attachment(&self, slot: AttachmentSlot) -> Option<PendingAttachment> {
        let (data, mime) = match slot {
            AttachmentSlot::Image => (&self.image_base64, &self.image_mime_type),
            AttachmentSlot::Audio => (&self.audio_base64, &self.audio_mime_type),
        };
        match (data, mime) {
            (Some(encoded_data), Some(mime_type)) => Some(PendingAttachment {
                encoded_data: encoded_data.clone(),
                mime_type: mime_type.clone(),
            }),
            _ => None,
        }
    }
}

/// Success body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub bot_response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_state: Option<SessionState>,
}

impl ChatReply {
    pub fn new(bot_response: impl Into<String>, session_state: SessionState) -> Self {
        Self {
            bot_response: bot_response.into(),
            session_state: Some(session_state),
        }
    }

    /// Split into reply text and the state to store; absent state becomes empty.
    pub fn into_parts(self) -> (String, SessionState) {
        (self.bot_response, self.session_state.unwrap_or_default())
    }
}

/// Body of a non-success response, `{"detail": ...}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Human-readable reason carried by the body.
    pub fn reason(&self) -> String {
        match &self.detail {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) | Some(Value::Null) | Some(Value::Bool(false)) | None => {
                MISSING_DETAIL_REASON.to_string()
            }
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => MISSING_DETAIL_REASON.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Reason string for a non-success response body.
pub fn error_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.reason(),
        Err(_) => UNKNOWN_ERROR_REASON.to_string(),
    }
}

// ============================================================================
// Transcript
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One turn of the conversation as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}
