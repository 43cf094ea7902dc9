use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

use vexchat_session::{ChatView, TranscriptRenderer};
use vexchat_types::{AttachmentSlot, Sender, TranscriptEntry};

/// Terminal rendering of the chat: one coloured line per turn, pending
/// attachments folded into the prompt.
pub struct TerminalView {
    out: Box<dyn Write>,
    labels: BTreeMap<&'static str, String>,
    inputs_enabled: bool,
    echo_user: bool,
}

impl TerminalView {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            labels: BTreeMap::new(),
            inputs_enabled: true,
            echo_user: true,
        }
    }

    /// Skip re-printing user turns (the line editor already shows them).
    pub fn with_echo_user(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    /// Prompt for the next line, listing pending attachments.
    pub fn prompt(&self) -> String {
        if self.labels.is_empty() {
            return "> ".to_string();
        }
        let pending: Vec<String> = self
            .labels
            .iter()
            .map(|(slot, name)| format!("{}: {}", slot, name))
            .collect();
        format!("[{}] > ", pending.join(", "))
    }

    fn line(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            log::warn!("Failed to write to terminal: {}", e);
        }
        let _ = self.out.flush();
    }
}

impl TranscriptRenderer for TerminalView {
    fn render(&mut self, entry: &TranscriptEntry) {
        match entry.sender {
            Sender::User if !self.echo_user => {}
            Sender::User => self.line(format!("{} {}", "You:".bright_green().bold(), entry.text)),
            Sender::Bot => self.line(format!("{} {}", "Bot:".bright_cyan().bold(), entry.text)),
        }
    }
}

impl ChatView for TerminalView {
    fn set_inputs_enabled(&mut self, enabled: bool) {
        if !enabled && self.inputs_enabled {
            self.line("…".bright_black().to_string());
        }
        self.inputs_enabled = enabled;
    }

    fn clear_text_input(&mut self) {}

    fn focus_text_input(&mut self) {}

    fn show_attachment(&mut self, slot: AttachmentSlot, file_name: Option<&str>) {
        match file_name {
            Some(name) => {
                let notice = format!("📎 {} attached: {}", slot, name);
                self.line(notice.bright_black().to_string());
                self.labels.insert(slot.as_str(), name.to_string());
            }
            None => {
                self.labels.remove(slot.as_str());
            }
        }
    }

    fn reset_picker(&mut self, _slot: AttachmentSlot, _enabled: bool) {}
}
