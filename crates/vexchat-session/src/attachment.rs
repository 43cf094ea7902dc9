//! Attachment encoding and the two pending-attachment slots.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use vexchat_types::{AttachmentSlot, PendingAttachment, FALLBACK_MIME_TYPE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error("Failed to read {file_name}: {reason}")]
    Read { file_name: String, reason: String },

    #[error("Attachments cannot change while a message is being sent")]
    Busy,

    #[error("Selection of {file_name} was cleared or replaced before it finished loading")]
    Superseded { file_name: String },
}

/// A file the user picked for a slot.
#[async_trait(?Send)]
pub trait AttachmentSource {
    /// Name shown next to the picker
    fn file_name(&self) -> String;

    /// Declared media type, possibly empty
    fn mime_type(&self) -> String;

    /// Full binary content of the file
    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError>;
}

/// Encode raw file content for transport.
pub fn encode_attachment(bytes: &[u8], mime_type: &str) -> PendingAttachment {
    let mime_type = mime_type.trim();
    PendingAttachment {
        encoded_data: STANDARD.encode(bytes),
        mime_type: if mime_type.is_empty() {
            FALLBACK_MIME_TYPE.to_string()
        } else {
            mime_type.to_string()
        },
    }
}

/// Read a source to the end and encode it.
pub async fn read_attachment<S>(source: &S) -> Result<PendingAttachment, AttachmentError>
where
    S: AttachmentSource + ?Sized,
{
    let bytes = source.read_bytes().await?;
    log::debug!(
        "Encoded attachment {} ({} bytes)",
        source.file_name(),
        bytes.len()
    );
    Ok(encode_attachment(&bytes, &source.mime_type()))
}

#[derive(Debug, Clone)]
struct Selected {
    file_name: String,
    attachment: PendingAttachment,
}

/// Marks one pick of a file for a slot.
///
/// Clearing the slot or starting another pick makes earlier tickets stale,
/// so a read that completes late can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    slot: AttachmentSlot,
    generation: u64,
}

impl SelectionTicket {
    pub fn slot(&self) -> AttachmentSlot {
        self.slot
    }
}

/// At most one pending attachment per slot.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSlots {
    image: Option<Selected>,
    audio: Option<Selected>,
    image_generation: u64,
    audio_generation: u64,
}

impl AttachmentSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: AttachmentSlot) -> &Option<Selected> {
        match slot {
            AttachmentSlot::Image => &self.image,
            AttachmentSlot::Audio => &self.audio,
        }
    }

    fn slot_mut(&mut self, slot: AttachmentSlot) -> &mut Option<Selected> {
        match slot {
            AttachmentSlot::Image => &mut self.image,
            AttachmentSlot::Audio => &mut self.audio,
        }
    }

    fn generation_mut(&mut self, slot: AttachmentSlot) -> &mut u64 {
        match slot {
            AttachmentSlot::Image => &mut self.image_generation,
            AttachmentSlot::Audio => &mut self.audio_generation,
        }
    }

    /// Start a new pick for `slot`, superseding any pick still loading.
    pub fn begin_selection(&mut self, slot: AttachmentSlot) -> SelectionTicket {
        let generation = self.generation_mut(slot);
        *generation += 1;
        SelectionTicket {
            slot,
            generation: *generation,
        }
    }

    /// Whether `ticket` belongs to the latest pick or clear of its slot.
    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        let generation = match ticket.slot {
            AttachmentSlot::Image => self.image_generation,
            AttachmentSlot::Audio => self.audio_generation,
        };
        generation == ticket.generation
    }

    pub fn get(&self, slot: AttachmentSlot) -> Option<&PendingAttachment> {
        self.slot(slot).as_ref().map(|s| &s.attachment)
    }

    pub fn file_name(&self, slot: AttachmentSlot) -> Option<&str> {
        self.slot(slot).as_ref().map(|s| s.file_name.as_str())
    }

    /// Replace whatever the slot held.
    pub fn set(&mut self, slot: AttachmentSlot, file_name: String, attachment: PendingAttachment) {
        *self.slot_mut(slot) = Some(Selected {
            file_name,
            attachment,
        });
    }

    /// Empty the slot. Picks still loading for it become stale.
    pub fn take(&mut self, slot: AttachmentSlot) -> Option<PendingAttachment> {
        *self.generation_mut(slot) += 1;
        self.slot_mut(slot).take().map(|s| s.attachment)
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.audio.is_none()
    }
}
