use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use vexchat_api::HttpChatClient;
use vexchat_session::SessionController;
use vexchat_types::{AttachmentSlot, UserId};

use crate::app::{report_backend_health, send_line};
use crate::cli::Cli;
use crate::local_file::LocalFile;
use crate::terminal_view::TerminalView;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Message(String),
    Attach { slot: AttachmentSlot, path: PathBuf },
    Clear(Option<AttachmentSlot>),
    State,
    WhoAmI,
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "exit" | "quit" | "/exit" | "/quit" => return ReplCommand::Quit,
            "/help" | "/?" => return ReplCommand::Help,
            "/state" => return ReplCommand::State,
            "/whoami" => return ReplCommand::WhoAmI,
            _ => {}
        }

        if !trimmed.starts_with('/') {
            return ReplCommand::Message(line.to_string());
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "/image" | "/audio" => {
                let slot = if command == "/image" {
                    AttachmentSlot::Image
                } else {
                    AttachmentSlot::Audio
                };
                if rest.is_empty() {
                    ReplCommand::Invalid(format!("Usage: {} <path>", command))
                } else {
                    ReplCommand::Attach {
                        slot,
                        path: PathBuf::from(rest),
                    }
                }
            }
            "/clear" if rest.is_empty() || rest == "all" => ReplCommand::Clear(None),
            "/clear" => match rest.parse() {
                Ok(slot) => ReplCommand::Clear(Some(slot)),
                Err(message) => ReplCommand::Invalid(message),
            },
            _ => ReplCommand::Invalid(format!("Unknown command: {}", command)),
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_cyan().bold());
    println!("  <text>           send a message (Enter on an empty line sends attachments alone)");
    println!("  /image <path>    attach an image to the next message");
    println!("  /audio <path>    attach an audio clip to the next message");
    println!("  /clear [slot]    drop the pending image, audio, or both");
    println!("  /state           show the session state held for the backend");
    println!("  /whoami          show the user id sent with requests");
    println!("  /quit            leave");
}

/// Run interactive REPL mode
pub async fn run_repl_mode(cli: &Cli, client: HttpChatClient, user_id: UserId) -> Result<()> {
    println!("{}", "🚌 Vexchat".bright_cyan().bold());
    println!("{}", format!("Endpoint: {}", client.endpoint()).bright_black());
    println!("{}", "Type /help for commands, 'exit' or 'quit' to leave\n".bright_black());

    if !cli.no_health_check {
        report_backend_health(&client).await;
    }

    let view = TerminalView::stdout().with_echo_user(false);
    let mut controller = SessionController::new(user_id, view);
    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;

    loop {
        let prompt = controller.view().prompt();
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Message(text) => {
                send_line(&mut controller, &client, &text).await;
            }
            ReplCommand::Attach { slot, path } => {
                if let Err(e) = controller.attach(slot, &LocalFile::new(&path)).await {
                    eprintln!("{} {}", "⚠️".yellow(), e);
                }
            }
            ReplCommand::Clear(Some(slot)) => controller.clear_attachment(slot),
            ReplCommand::Clear(None) => {
                for slot in AttachmentSlot::ALL {
                    controller.clear_attachment(slot);
                }
            }
            ReplCommand::State => {
                let state = serde_json::to_string_pretty(controller.session_state())
                    .unwrap_or_else(|_| controller.session_state().to_string());
                println!("{}", state.bright_black());
            }
            ReplCommand::WhoAmI => println!("{}", controller.user_id()),
            ReplCommand::Invalid(message) => eprintln!("{} {}", "⚠️".yellow(), message),
        }
    }

    println!("{}", "Goodbye".bright_black());
    Ok(())
}
