use async_trait::async_trait;
use mockall::mock;
use proptest::prelude::*;
use serde_json::json;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use vexchat_session::types::{
    AttachmentSlot, ChatReply, OutboundMessage, SessionState, TranscriptEntry, UserId,
    ATTACHMENT_PLACEHOLDER, UNKNOWN_ERROR_REASON,
};
use vexchat_session::{
    encode_attachment, AttachmentError, AttachmentSource, ChatTransport, ChatView, Lifecycle,
    SessionController, SubmitOutcome, SubmitRejected, TranscriptRenderer, TransportError,
};

mock! {
    pub Transport {}

    #[async_trait(?Send)]
    impl ChatTransport for Transport {
        async fn send(&self, message: &OutboundMessage) -> Result<ChatReply, TransportError>;
    }
}

#[cfg(test)]
mod controller_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records everything the controller asks of the UI.
    #[derive(Debug)]
    struct RecordingView {
        rendered: Vec<TranscriptEntry>,
        inputs_enabled: bool,
        disable_calls: usize,
        text_cleared: usize,
        focused: usize,
        labels: HashMap<AttachmentSlot, String>,
        picker_resets: Vec<AttachmentSlot>,
    }

    impl Default for RecordingView {
        fn default() -> Self {
            Self {
                rendered: Vec::new(),
                inputs_enabled: true,
                disable_calls: 0,
                text_cleared: 0,
                focused: 0,
                labels: HashMap::new(),
                picker_resets: Vec::new(),
            }
        }
    }

    impl TranscriptRenderer for RecordingView {
        fn render(&mut self, entry: &TranscriptEntry) {
            self.rendered.push(entry.clone());
        }
    }

    impl ChatView for RecordingView {
        fn set_inputs_enabled(&mut self, enabled: bool) {
            if !enabled {
                self.disable_calls += 1;
            }
            self.inputs_enabled = enabled;
        }

        fn clear_text_input(&mut self) {
            self.text_cleared += 1;
        }

        fn focus_text_input(&mut self) {
            self.focused += 1;
        }

        fn show_attachment(&mut self, slot: AttachmentSlot, file_name: Option<&str>) {
            match file_name {
                Some(name) => {
                    self.labels.insert(slot, name.to_string());
                }
                None => {
                    self.labels.remove(&slot);
                }
            }
        }

        fn reset_picker(&mut self, slot: AttachmentSlot, enabled: bool) {
            assert!(enabled, "picker left disabled after clear");
            self.picker_resets.push(slot);
        }
    }

    /// Plays back canned backend results and keeps every request it saw.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: RefCell<VecDeque<Result<ChatReply, TransportError>>>,
        sent: RefCell<Vec<OutboundMessage>>,
    }

    impl ScriptedTransport {
        fn with(replies: Vec<Result<ChatReply, TransportError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, message: &OutboundMessage) -> Result<ChatReply, TransportError> {
            self.sent.borrow_mut().push(message.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
        }
    }

    struct MemoryFile {
        name: &'static str,
        mime: &'static str,
        bytes: Option<Vec<u8>>,
    }

    impl MemoryFile {
        fn ok(name: &'static str, mime: &'static str, bytes: &[u8]) -> Self {
            Self {
                name,
                mime,
                bytes: Some(bytes.to_vec()),
            }
        }

        fn unreadable(name: &'static str) -> Self {
            Self {
                name,
                mime: "image/png",
                bytes: None,
            }
        }
    }

    #[async_trait(?Send)]
    impl AttachmentSource for MemoryFile {
        fn file_name(&self) -> String {
            self.name.to_string()
        }

        fn mime_type(&self) -> String {
            self.mime.to_string()
        }

        async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
            self.bytes.clone().ok_or_else(|| AttachmentError::Read {
                file_name: self.name.to_string(),
                reason: "permission denied".to_string(),
            })
        }
    }

    fn create_test_controller() -> SessionController<RecordingView> {
        SessionController::new(UserId::new("user_test"), RecordingView::default())
    }

    fn state(value: serde_json::Value) -> SessionState {
        serde_json::from_value(value).unwrap()
    }

    fn assert_settled(controller: &SessionController<RecordingView>) {
        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert!(controller.view().inputs_enabled);
        assert!(controller.pending(AttachmentSlot::Image).is_none());
        assert!(controller.pending(AttachmentSlot::Audio).is_none());
        assert!(controller.view().labels.is_empty());
    }

    #[tokio::test]
    async fn test_text_turn_stores_reply_and_state() {
        let mut controller = create_test_controller();
        let transport = ScriptedTransport::with(vec![Ok(ChatReply::new(
            "Hi!",
            state(json!({"turn": 1})),
        ))]);

        let outcome = controller.submit(&transport, "Hello").await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Replied);
        assert_eq!(
            controller.transcript().entries(),
            &[TranscriptEntry::user("Hello"), TranscriptEntry::bot("Hi!")]
        );
        assert_eq!(controller.session_state(), &state(json!({"turn": 1})));
        assert_eq!(controller.view().rendered, controller.transcript().entries());
        assert_eq!(controller.view().text_cleared, 1);
        assert_eq!(controller.view().focused, 1);
        assert_settled(&controller);
    }

    #[tokio::test]
    async fn test_text_turn_with_mocked_transport() {
        let mut controller = create_test_controller();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|msg| msg.message == "Hello" && msg.session_state.is_empty())
            .times(1)
            .returning(|_| Ok(ChatReply::new("Hi!", SessionState::default())));

        let outcome = controller.submit(&transport, "  Hello  ").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Replied);
    }

    #[tokio::test]
    async fn test_empty_submit_is_rejected_without_side_effects() {
        let mut controller = create_test_controller();
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let result = controller.submit(&transport, "").await;

        assert_eq!(result, Err(SubmitRejected::Empty));
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        assert_eq!(controller.view().disable_calls, 0);
        assert_eq!(controller.view().text_cleared, 0);
    }

    #[tokio::test]
    async fn test_attachment_only_turn_uses_placeholder() {
        let mut controller = create_test_controller();
        controller
            .attach(
                AttachmentSlot::Image,
                &MemoryFile::ok("cat.png", "image/png", b"png"),
            )
            .await
            .unwrap();
        assert_eq!(controller.view().labels.get(&AttachmentSlot::Image).unwrap(), "cat.png");

        let transport =
            ScriptedTransport::with(vec![Ok(ChatReply::new("Nice cat", SessionState::default()))]);
        controller.submit(&transport, "").await.unwrap();

        assert_eq!(
            controller.transcript().entries()[0],
            TranscriptEntry::user(ATTACHMENT_PLACEHOLDER)
        );

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].message, "");
        assert_eq!(sent[0].image_base64.as_deref(), Some("cG5n"));
        assert_eq!(sent[0].image_mime_type.as_deref(), Some("image/png"));
        assert!(sent[0].audio_base64.is_none());
        assert_settled(&controller);
    }

    #[tokio::test]
    async fn test_http_error_detail_is_shown_and_state_kept() {
        let mut controller = create_test_controller();
        let transport = ScriptedTransport::with(vec![
            Ok(ChatReply::new("first", state(json!({"turn": 1})))),
            Err(TransportError::from_status(500, r#"{"detail":"overloaded"}"#)),
        ]);

        controller.submit(&transport, "one").await.unwrap();
        let outcome = controller.submit(&transport, "two").await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(TransportError::Status { status: 500, .. })
        ));
        let bot = controller.transcript().last().unwrap();
        assert!(bot.text.contains("500"));
        assert!(bot.text.contains("overloaded"));
        assert_eq!(controller.session_state(), &state(json!({"turn": 1})));
        assert_settled(&controller);
    }

    #[tokio::test]
    async fn test_unparsable_error_body_falls_back_to_generic_reason() {
        let mut controller = create_test_controller();
        let transport =
            ScriptedTransport::with(vec![Err(TransportError::from_status(500, "<h1>oops</h1>"))]);

        controller.submit(&transport, "hi").await.unwrap();

        let bot = controller.transcript().last().unwrap();
        assert!(bot.text.contains(UNKNOWN_ERROR_REASON));
        assert!(bot.text.contains("500"));
    }

    #[tokio::test]
    async fn test_network_failure_restores_inputs_and_clears_slots() {
        let mut controller = create_test_controller();
        controller
            .attach(
                AttachmentSlot::Audio,
                &MemoryFile::ok("note.wav", "audio/wav", b"RIFF"),
            )
            .await
            .unwrap();
        let transport = ScriptedTransport::with(vec![Err(TransportError::Network(
            "connection refused".to_string(),
        ))]);

        let outcome = controller.submit(&transport, "listen").await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Failed(TransportError::Network(_))));
        assert!(controller.transcript().last().unwrap().text.contains("connection refused"));
        assert!(controller.session_state().is_empty());
        assert_settled(&controller);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_refused() {
        let mut controller = create_test_controller();

        let message = controller.begin_submit("first").unwrap();
        assert_eq!(message.message, "first");
        assert_eq!(controller.lifecycle(), Lifecycle::InFlight);
        assert!(!controller.view().inputs_enabled);

        assert_eq!(controller.begin_submit("second"), Err(SubmitRejected::InFlight));
        assert_eq!(controller.transcript().len(), 1);

        let outcome = controller.finish_submit(Ok(ChatReply::new("ok", SessionState::default())));
        assert_eq!(outcome, SubmitOutcome::Replied);
        assert_eq!(controller.transcript().len(), 2);
        assert_settled(&controller);
    }

    #[test]
    fn test_finish_without_request_is_ignored() {
        let mut controller = create_test_controller();
        let outcome =
            controller.finish_submit(Ok(ChatReply::new("stray", SessionState::default())));
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_attachments_refused_while_in_flight() {
        let mut controller = create_test_controller();
        controller.begin_submit("busy").unwrap();

        let result = controller
            .attach(
                AttachmentSlot::Image,
                &MemoryFile::ok("a.png", "image/png", b"a"),
            )
            .await;

        assert_eq!(result, Err(AttachmentError::Busy));
        assert!(controller.pending(AttachmentSlot::Image).is_none());
    }

    #[tokio::test]
    async fn test_failed_read_leaves_slot_empty() {
        let mut controller = create_test_controller();
        controller
            .attach(
                AttachmentSlot::Image,
                &MemoryFile::ok("old.png", "image/png", b"old"),
            )
            .await
            .unwrap();

        let result = controller
            .attach(AttachmentSlot::Image, &MemoryFile::unreadable("new.png"))
            .await;

        assert!(matches!(result, Err(AttachmentError::Read { .. })));
        assert!(controller.pending(AttachmentSlot::Image).is_none());
        assert!(controller.view().labels.get(&AttachmentSlot::Image).is_none());
        assert!(controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_new_selection_replaces_slot() {
        let mut controller = create_test_controller();
        controller
            .attach(
                AttachmentSlot::Audio,
                &MemoryFile::ok("a.mp3", "audio/mpeg", b"a"),
            )
            .await
            .unwrap();
        controller
            .attach(
                AttachmentSlot::Audio,
                &MemoryFile::ok("b.wav", "audio/wav", b"b"),
            )
            .await
            .unwrap();

        assert_eq!(controller.pending_file_name(AttachmentSlot::Audio), Some("b.wav"));
        assert_eq!(controller.pending(AttachmentSlot::Audio).unwrap().mime_type, "audio/wav");
    }

    #[test]
    fn test_read_finishing_after_clear_is_dropped() {
        let mut controller = create_test_controller();
        let ticket = controller.begin_attachment(AttachmentSlot::Image).unwrap();

        controller.clear_attachment(AttachmentSlot::Image);
        let result = controller.apply_attachment(
            ticket,
            "a.png".to_string(),
            Ok(encode_attachment(b"a", "image/png")),
        );

        assert_eq!(
            result,
            Err(AttachmentError::Superseded {
                file_name: "a.png".to_string()
            })
        );
        assert!(controller.pending(AttachmentSlot::Image).is_none());
        assert!(controller.view().labels.is_empty());
    }

    #[test]
    fn test_out_of_order_reads_keep_latest_pick() {
        let mut controller = create_test_controller();
        let big = controller.begin_attachment(AttachmentSlot::Image).unwrap();
        let small = controller.begin_attachment(AttachmentSlot::Image).unwrap();

        controller
            .apply_attachment(
                small,
                "small.png".to_string(),
                Ok(encode_attachment(b"s", "image/png")),
            )
            .unwrap();
        let late = controller.apply_attachment(
            big,
            "big.png".to_string(),
            Ok(encode_attachment(b"big", "image/png")),
        );

        assert!(matches!(late, Err(AttachmentError::Superseded { .. })));
        assert_eq!(controller.pending_file_name(AttachmentSlot::Image), Some("small.png"));
        assert_eq!(
            controller.view().labels.get(&AttachmentSlot::Image).map(String::as_str),
            Some("small.png")
        );
    }

    #[test]
    fn test_stale_failed_read_keeps_current_pick() {
        let mut controller = create_test_controller();
        let old = controller.begin_attachment(AttachmentSlot::Audio).unwrap();
        let current = controller.begin_attachment(AttachmentSlot::Audio).unwrap();
        controller
            .apply_attachment(
                current,
                "b.wav".to_string(),
                Ok(encode_attachment(b"b", "audio/wav")),
            )
            .unwrap();

        let late = controller.apply_attachment(
            old,
            "a.wav".to_string(),
            Err(AttachmentError::Read {
                file_name: "a.wav".to_string(),
                reason: "permission denied".to_string(),
            }),
        );

        assert!(matches!(late, Err(AttachmentError::Superseded { .. })));
        assert_eq!(controller.pending_file_name(AttachmentSlot::Audio), Some("b.wav"));
    }

    #[test]
    fn test_read_finishing_after_send_is_dropped() {
        let mut controller = create_test_controller();
        let ticket = controller.begin_attachment(AttachmentSlot::Image).unwrap();

        controller.begin_submit("hello").unwrap();
        let during = controller.apply_attachment(
            ticket,
            "a.png".to_string(),
            Ok(encode_attachment(b"a", "image/png")),
        );
        assert_eq!(during, Err(AttachmentError::Busy));

        controller.finish_submit(Ok(ChatReply::new("hi", SessionState::default())));
        let after = controller.apply_attachment(
            ticket,
            "a.png".to_string(),
            Ok(encode_attachment(b"a", "image/png")),
        );

        assert!(matches!(after, Err(AttachmentError::Superseded { .. })));
        assert_settled(&controller);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let mut controller = create_test_controller();
        controller
            .attach(
                AttachmentSlot::Image,
                &MemoryFile::ok("a.png", "image/png", b"a"),
            )
            .await
            .unwrap();

        controller.clear_attachment(AttachmentSlot::Image);
        assert!(controller.pending(AttachmentSlot::Image).is_none());
        controller.clear_attachment(AttachmentSlot::Image);
        assert!(controller.pending(AttachmentSlot::Image).is_none());

        assert!(controller.view().labels.is_empty());
        assert_eq!(
            controller.view().picker_resets,
            vec![AttachmentSlot::Image, AttachmentSlot::Image]
        );
    }

    proptest! {
        #[test]
        fn prop_blank_text_without_attachments_is_noop(text in "[ \t\n]{0,12}") {
            let mut controller = create_test_controller();
            let transport = ScriptedTransport::default();

            let result = tokio_test::block_on(controller.submit(&transport, &text));

            prop_assert_eq!(result, Err(SubmitRejected::Empty));
            prop_assert!(controller.transcript().is_empty());
            prop_assert!(transport.sent.borrow().is_empty());
            prop_assert_eq!(controller.lifecycle(), Lifecycle::Idle);
        }

        #[test]
        fn prop_session_state_round_trips(
            values in prop::collection::vec(any::<i64>(), 1..8),
            failures in prop::collection::vec(any::<bool>(), 8),
        ) {
            let mut controller = create_test_controller();
            let mut replies = Vec::new();
            let mut expected_states = vec![SessionState::default()];
            for (turn, value) in values.iter().enumerate() {
                if failures[turn] {
                    replies.push(Err(TransportError::Network("down".to_string())));
                    let last = expected_states.last().cloned().unwrap_or_default();
                    expected_states.push(last);
                } else {
                    let next =
                        state(json!({"turn": turn, "value": value, "tags": ["x", {"y": turn}]}));
                    replies.push(Ok(ChatReply::new("ok", next.clone())));
                    expected_states.push(next);
                }
            }
            let transport = ScriptedTransport::with(replies);

            for turn in 0..values.len() {
                let outcome = tokio_test::block_on(
                    controller.submit(&transport, &format!("turn {}", turn)),
                );
                prop_assert!(outcome.is_ok());
                prop_assert_eq!(controller.lifecycle(), Lifecycle::Idle);
                prop_assert!(controller.view().inputs_enabled);
            }

            let sent = transport.sent.borrow();
            for (turn, message) in sent.iter().enumerate() {
                prop_assert_eq!(&message.session_state, &expected_states[turn]);
            }
            prop_assert_eq!(controller.session_state(), &expected_states[values.len()]);
        }
    }
}
