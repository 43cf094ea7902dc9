use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use vexchat_api::HttpChatClient;

mod app;
mod cli;
mod local_file;
mod logging;
mod terminal_view;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(shell) = cli.generate {
        clap_complete::generate(shell, &mut Cli::command(), "vexchat", &mut std::io::stdout());
        return Ok(());
    }

    logging::init_logging(cli.verbose);

    let config = cli.client_config();
    log::debug!("Using endpoint {}", config.endpoint);
    let client = HttpChatClient::from_config(&config).context("Failed to build HTTP client")?;
    let user_id = cli.user_id();

    if let Some(text) = cli.send.clone() {
        return app::run_task_mode(&cli, client, user_id, text).await;
    }

    app::run_repl_mode(&cli, client, user_id).await
}
