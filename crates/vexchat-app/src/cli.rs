use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

use vexchat_api::ClientConfig;
use vexchat_types::{UserId, DEFAULT_ENDPOINT};

/// CLI arguments for vexchat
#[derive(Parser, Debug)]
#[command(name = "vexchat")]
#[command(about = "Vexchat - terminal client for the Vexere chatbot backend")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Chat endpoint, or the backend address (`/chat` is appended when no path is given)
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "VEXCHAT_ENDPOINT")]
    pub endpoint: String,

    /// Identifier sent with every request (random when omitted)
    #[arg(long, value_name = "ID", env = "VEXCHAT_USER_ID")]
    pub user_id: Option<String>,

    /// Give up on a request after this many seconds (no limit by default)
    #[arg(long, value_name = "SECS", env = "VEXCHAT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Skip the backend liveness check at start-up
    #[arg(long)]
    pub no_health_check: bool,

    /// Send a single message, print the reply and exit
    #[arg(long, value_name = "TEXT")]
    pub send: Option<String>,

    /// Image to attach to the --send message
    #[arg(long, value_name = "PATH", requires = "send")]
    pub image: Option<PathBuf>,

    /// Audio clip to attach to the --send message
    #[arg(long, value_name = "PATH", requires = "send")]
    pub audio: Option<PathBuf>,

    /// Enable verbose debug output (request dispatch, backend errors)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.endpoint).with_timeout(self.timeout_secs.map(Duration::from_secs))
    }

    pub fn user_id(&self) -> UserId {
        match self.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => UserId::new(id),
            _ => UserId::generate(),
        }
    }
}
