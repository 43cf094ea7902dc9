pub mod repl;
pub mod task;

pub use repl::run_repl_mode;
pub use task::run_task_mode;

use colored::Colorize;

use vexchat_api::HttpChatClient;
use vexchat_session::{ChatTransport, ChatView, SessionController, SubmitOutcome, SubmitRejected};

/// The one commit path for typed text, shared by the REPL and task mode.
pub async fn send_line<V, T>(
    controller: &mut SessionController<V>,
    transport: &T,
    text: &str,
) -> Option<SubmitOutcome>
where
    V: ChatView,
    T: ChatTransport + ?Sized,
{
    match controller.submit(transport, text).await {
        Ok(outcome) => Some(outcome),
        Err(SubmitRejected::Empty) => {
            log::debug!("Nothing to send");
            None
        }
        Err(e @ SubmitRejected::InFlight) => {
            log::warn!("{}", e);
            None
        }
    }
}

/// Print the backend's liveness message. Never fatal.
pub async fn report_backend_health(client: &HttpChatClient) {
    match client.check_health().await {
        Ok(message) => println!("{}", format!("Backend: {}", message).bright_black()),
        Err(e) => eprintln!(
            "{} Backend not reachable at {}: {}",
            "⚠️".yellow(),
            client.endpoint(),
            e
        ),
    }
}
