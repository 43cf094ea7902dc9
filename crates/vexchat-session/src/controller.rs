use thiserror::Error;
use vexchat_types::{
    AttachmentSlot, ChatReply, OutboundMessage, PendingAttachment, SessionState, TranscriptEntry,
    UserId, ATTACHMENT_PLACEHOLDER,
};

use crate::attachment::{
    read_attachment, AttachmentError, AttachmentSlots, AttachmentSource, SelectionTicket,
};
use crate::transcript::{Transcript, TranscriptRenderer};
use crate::transport::{ChatTransport, TransportError};

/// Whether a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    InFlight,
}

/// Why a submit did not start a request. Neither case changes any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("Nothing to send: no text and no attachment")]
    Empty,

    #[error("A message is already being sent")]
    InFlight,
}

/// How a completed request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied,
    Failed(TransportError),
    /// `finish_submit` was called with no request outstanding
    Ignored,
}

/// Input surface the controller drives, on top of the transcript display.
pub trait ChatView: TranscriptRenderer {
    /// Text field, send action and both pickers, all at once.
    fn set_inputs_enabled(&mut self, enabled: bool);

    fn clear_text_input(&mut self);

    fn focus_text_input(&mut self);

    /// Show the selected file name for `slot`, or hide it with `None`.
    fn show_attachment(&mut self, slot: AttachmentSlot, file_name: Option<&str>);

    /// Drop the picker's selection so the same file can be chosen again,
    /// leaving the picker usable when `enabled`.
    fn reset_picker(&mut self, slot: AttachmentSlot, enabled: bool);
}

/// Owns the conversation: transcript, session token, pending attachments
/// and the Idle/InFlight lifecycle.
///
/// Front ends with a single-threaded executor should use
/// [`begin_submit`](Self::begin_submit) / [`finish_submit`](Self::finish_submit)
/// around their own transport call so the controller is not borrowed while
/// the request is suspended. Everything else can call [`submit`](Self::submit).
pub struct SessionController<V: ChatView> {
    user_id: UserId,
    session_state: SessionState,
    lifecycle: Lifecycle,
    attachments: AttachmentSlots,
    transcript: Transcript,
    view: V,
}

impl<V: ChatView> SessionController<V> {
    pub fn new(user_id: UserId, view: V) -> Self {
        Self {
            user_id,
            session_state: SessionState::default(),
            lifecycle: Lifecycle::Idle,
            attachments: AttachmentSlots::new(),
            transcript: Transcript::new(),
            view,
        }
    }

    pub fn with_generated_user(view: V) -> Self {
        Self::new(UserId::generate(), view)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending(&self, slot: AttachmentSlot) -> Option<&PendingAttachment> {
        self.attachments.get(slot)
    }

    pub fn pending_file_name(&self, slot: AttachmentSlot) -> Option<&str> {
        self.attachments.file_name(slot)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn append(&mut self, entry: TranscriptEntry) {
        self.transcript.append(entry, &mut self.view);
    }

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    /// Read `source` into `slot`, replacing any previous selection.
    pub async fn attach<S>(
        &mut self,
        slot: AttachmentSlot,
        source: &S,
    ) -> Result<(), AttachmentError>
    where
        S: AttachmentSource + ?Sized,
    {
        let ticket = self.begin_attachment(slot)?;
        let file_name = source.file_name();
        let result = read_attachment(source).await;
        self.apply_attachment(ticket, file_name, result)
    }

    /// Start picking a file for `slot`.
    ///
    /// Front ends that read the file outside the controller take the ticket
    /// before the read and hand it back to
    /// [`apply_attachment`](Self::apply_attachment).
    pub fn begin_attachment(
        &mut self,
        slot: AttachmentSlot,
    ) -> Result<SelectionTicket, AttachmentError> {
        if self.lifecycle == Lifecycle::InFlight {
            return Err(AttachmentError::Busy);
        }
        Ok(self.attachments.begin_selection(slot))
    }

    /// Store the result of an attachment read done outside the controller.
    ///
    /// A failed read leaves the slot empty. A result whose slot was cleared
    /// or re-picked since `ticket` was issued is dropped with
    /// [`AttachmentError::Superseded`] and changes nothing.
    pub fn apply_attachment(
        &mut self,
        ticket: SelectionTicket,
        file_name: String,
        result: Result<PendingAttachment, AttachmentError>,
    ) -> Result<(), AttachmentError> {
        if self.lifecycle == Lifecycle::InFlight {
            return Err(AttachmentError::Busy);
        }
        if !self.attachments.is_current(ticket) {
            log::debug!("Dropping stale {} selection {}", ticket.slot(), file_name);
            return Err(AttachmentError::Superseded { file_name });
        }

        let slot = ticket.slot();
        match result {
            Ok(attachment) => {
                self.view.show_attachment(slot, Some(&file_name));
                self.attachments.set(slot, file_name, attachment);
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not attach {} file: {}", slot, e);
                self.clear_attachment(slot);
                Err(e)
            }
        }
    }

    /// Empty `slot`. Safe to call on an empty slot.
    pub fn clear_attachment(&mut self, slot: AttachmentSlot) {
        if self.attachments.take(slot).is_some() {
            log::debug!("Cleared {} attachment", slot);
        }
        self.view.show_attachment(slot, None);
        self.view.reset_picker(slot, self.lifecycle == Lifecycle::Idle);
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Guard and first half of a send.
    ///
    /// On success the user turn is already in the transcript, inputs are
    /// disabled and the returned message must be handed to a transport and
    /// its result to [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(&mut self, text: &str) -> Result<OutboundMessage, SubmitRejected> {
        if self.lifecycle == Lifecycle::InFlight {
            log::warn!("Submit ignored: a request is already in flight");
            return Err(SubmitRejected::InFlight);
        }

        let text = text.trim();
        if text.is_empty() && self.attachments.is_empty() {
            return Err(SubmitRejected::Empty);
        }

        let shown = if text.is_empty() { ATTACHMENT_PLACEHOLDER } else { text };
        self.append(TranscriptEntry::user(shown));
        self.view.clear_text_input();
        self.lifecycle = Lifecycle::InFlight;
        self.view.set_inputs_enabled(false);

        let mut message =
            OutboundMessage::new(self.user_id.clone(), text, self.session_state.clone());
        for slot in AttachmentSlot::ALL {
            if let Some(attachment) = self.attachments.get(slot) {
                message = message.with_attachment(slot, attachment.clone());
            }
        }

        log::debug!(
            "Sending message for {} ({} chars, image: {}, audio: {})",
            self.user_id,
            message.message.len(),
            message.image_base64.is_some(),
            message.audio_base64.is_some()
        );
        Ok(message)
    }

    /// Second half of a send: record the outcome and restore the inputs.
    pub fn finish_submit(&mut self, result: Result<ChatReply, TransportError>) -> SubmitOutcome {
        if self.lifecycle != Lifecycle::InFlight {
            log::warn!("Discarding response with no request in flight");
            return SubmitOutcome::Ignored;
        }

        let outcome = match result {
            Ok(reply) => {
                let (text, state) = reply.into_parts();
                self.session_state = state;
                self.append(TranscriptEntry::bot(text));
                SubmitOutcome::Replied
            }
            Err(e) => {
                log::error!("Error sending message: {}", e);
                self.append(TranscriptEntry::bot(format!(
                    "Error: Could not connect to the chatbot. {}",
                    e
                )));
                SubmitOutcome::Failed(e)
            }
        };

        self.lifecycle = Lifecycle::Idle;
        self.view.set_inputs_enabled(true);
        for slot in AttachmentSlot::ALL {
            self.clear_attachment(slot);
        }
        self.view.focus_text_input();

        outcome
    }

    /// Full send: guard, transport round trip, completion.
    pub async fn submit<T>(
        &mut self,
        transport: &T,
        text: &str,
    ) -> Result<SubmitOutcome, SubmitRejected>
    where
        T: ChatTransport + ?Sized,
    {
        let message = self.begin_submit(text)?;
        let result = transport.send(&message).await;
        Ok(self.finish_submit(result))
    }
}
