use anyhow::{anyhow, bail, Context, Result};

use vexchat_api::HttpChatClient;
use vexchat_session::{SessionController, SubmitOutcome};
use vexchat_types::{AttachmentSlot, UserId};

use crate::app::{report_backend_health, send_line};
use crate::cli::Cli;
use crate::local_file::LocalFile;
use crate::terminal_view::TerminalView;

/// Send a single message with optional attachments and exit
pub async fn run_task_mode(
    cli: &Cli,
    client: HttpChatClient,
    user_id: UserId,
    text: String,
) -> Result<()> {
    if cli.verbose && !cli.no_health_check {
        report_backend_health(&client).await;
    }

    let mut controller = SessionController::new(user_id, TerminalView::stdout());

    let attachments = [
        (AttachmentSlot::Image, cli.image.as_ref()),
        (AttachmentSlot::Audio, cli.audio.as_ref()),
    ];
    for (slot, path) in attachments {
        if let Some(path) = path {
            controller
                .attach(slot, &LocalFile::new(path))
                .await
                .with_context(|| format!("Failed to attach {} {}", slot, path.display()))?;
        }
    }

    match send_line(&mut controller, &client, &text).await {
        Some(SubmitOutcome::Replied) => Ok(()),
        Some(SubmitOutcome::Failed(e)) => Err(anyhow!(e).context("Message was not delivered")),
        Some(SubmitOutcome::Ignored) | None => {
            bail!("Nothing to send: provide message text, --image or --audio")
        }
    }
}
