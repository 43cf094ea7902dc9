use std::time::Duration;

use vexchat_types::DEFAULT_ENDPOINT;

/// Path of the chat route on the backend
pub const CHAT_PATH: &str = "/chat";

/// Connection settings for [`HttpChatClient`](crate::HttpChatClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Whole-request timeout; `None` waits for the backend indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ensure the URL points at the chat route.
///
/// A bare backend address (`http://host:8000` or `http://host:8000/`) gets
/// `/chat` appended; anything with a path is left alone.
pub fn normalize_endpoint(url: &str) -> String {
    let url = url.trim();
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return url.to_string();
    };

    if parsed.path() == "/" || parsed.path().is_empty() {
        format!("{}{}", url.trim_end_matches('/'), CHAT_PATH)
    } else {
        url.to_string()
    }
}

/// Root URL of the backend serving `endpoint`, where its liveness route lives.
pub fn health_url(endpoint: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(endpoint).ok()?;
    parsed.join("/").ok().map(|u| u.to_string())
}
