//! # vexchat-session
//!
//! Client-side conversation core: collects text and attachments, keeps the
//! opaque session token, runs one request at a time through a
//! [`ChatTransport`] and feeds the results to a [`ChatView`].
//!
//! The crate is platform-neutral. Native and browser front ends supply the
//! transport, the attachment sources and the view.

pub mod attachment;
pub mod controller;
pub mod transcript;
pub mod transport;

pub use attachment::{
    encode_attachment, read_attachment, AttachmentError, AttachmentSlots, AttachmentSource,
    SelectionTicket,
};
pub use controller::{ChatView, Lifecycle, SessionController, SubmitOutcome, SubmitRejected};
pub use transcript::{Transcript, TranscriptRenderer};
pub use transport::{parse_reply, ChatTransport, TransportError};

pub use vexchat_types as types;
