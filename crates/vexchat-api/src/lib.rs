//! # vexchat-api
//!
//! HTTP transport for the vexchat backend on native targets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vexchat_api::{ClientConfig, HttpChatClient};
//! use vexchat_session::ChatTransport;
//! use vexchat_types::{OutboundMessage, SessionState, UserId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpChatClient::from_config(&ClientConfig::new("http://localhost:8000"))?;
//!     let message = OutboundMessage::new(UserId::generate(), "Hello", SessionState::default());
//!     let reply = client.send(&message).await?;
//!     println!("Bot: {}", reply.bot_response);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;


pub use client::HttpChatClient;
pub use config::{health_url, normalize_endpoint, ClientConfig, CHAT_PATH};
