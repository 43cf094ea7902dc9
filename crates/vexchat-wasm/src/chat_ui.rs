use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use vexchat_session::{
    read_attachment, AttachmentError, AttachmentSource, ChatTransport, ChatView,
    SessionController, TranscriptRenderer,
};
use vexchat_types::{AttachmentSlot, Sender, TranscriptEntry, UserId, DEFAULT_ENDPOINT};

use crate::browser_file::BrowserFile;
use crate::dom;
use crate::fetch::FetchTransport;

/// Picker, file-name label and clear button for one attachment slot
struct SlotControls {
    picker: HtmlInputElement,
    label: HtmlElement,
    clear_button: HtmlElement,
}

impl SlotControls {
    fn from_document(document: &Document, prefix: &str) -> Result<Self, JsValue> {
        Ok(Self {
            picker: dom::get_input_by_id(document, &format!("{}Upload", prefix))?,
            label: dom::get_html_element_by_id(document, &format!("{}FileName", prefix))?,
            clear_button: dom::get_html_element_by_id(
                document,
                &format!("clear{}Button", capitalize(prefix)),
            )?,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The chat page's DOM, as driven by the session controller
pub struct DomView {
    document: Document,
    messages: Element,
    input: HtmlInputElement,
    send_button: HtmlButtonElement,
    image: SlotControls,
    audio: SlotControls,
}

impl DomView {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            messages: dom::get_element_by_id(document, "chatMessages")?,
            input: dom::get_input_by_id(document, "userInput")?,
            send_button: dom::get_button_by_id(document, "sendButton")?,
            image: SlotControls::from_document(document, "image")?,
            audio: SlotControls::from_document(document, "audio")?,
        })
    }

    fn slot(&self, slot: AttachmentSlot) -> &SlotControls {
        match slot {
            AttachmentSlot::Image => &self.image,
            AttachmentSlot::Audio => &self.audio,
        }
    }

    /// Current contents of the text field
    pub fn text_value(&self) -> String {
        self.input.value()
    }

    /// Endpoint from `data-endpoint` on the message log, if the page sets one
    pub fn configured_endpoint(&self) -> Option<String> {
        self.messages
            .get_attribute("data-endpoint")
            .filter(|e| !e.trim().is_empty())
    }

    fn append_message(&self, entry: &TranscriptEntry) -> Result<(), JsValue> {
        let class = match entry.sender {
            Sender::User => "message user-message",
            Sender::Bot => "message bot-message",
        };
        let message_div = dom::create_element_with_class(&self.document, "div", class)?;
        let paragraph = self.document.create_element("p")?;
        // textContent, never innerHTML: replies are untrusted
        paragraph.set_text_content(Some(&entry.text));
        message_div.append_child(&paragraph)?;
        self.messages.append_child(&message_div)?;
        dom::scroll_to_bottom(&self.messages);
        Ok(())
    }
}

impl TranscriptRenderer for DomView {
    fn render(&mut self, entry: &TranscriptEntry) {
        if let Err(e) = self.append_message(entry) {
            log::error!("Failed to render message: {:?}", e);
        }
    }
}

impl ChatView for DomView {
    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.input.set_disabled(!enabled);
        self.send_button.set_disabled(!enabled);
        self.image.picker.set_disabled(!enabled);
        self.audio.picker.set_disabled(!enabled);
    }

    fn clear_text_input(&mut self) {
        self.input.set_value("");
    }

    fn focus_text_input(&mut self) {
        let _ = self.input.focus();
    }

    fn show_attachment(&mut self, slot: AttachmentSlot, file_name: Option<&str>) {
        let controls = self.slot(slot);
        controls.label.set_text_content(file_name);
        match file_name {
            Some(_) => dom::show_inline(&controls.clear_button),
            None => dom::hide_element(&controls.clear_button),
        }
    }

    fn reset_picker(&mut self, slot: AttachmentSlot, enabled: bool) {
        let picker = &self.slot(slot).picker;
        picker.set_value("");
        picker.set_disabled(!enabled);
    }
}

type SharedController = Rc<RefCell<SessionController<DomView>>>;

pub struct ChatApp {
    document: Document,
    controller: SharedController,
    transport: FetchTransport,
}

impl ChatApp {
    pub fn new() -> Result<Self, JsValue> {
        let document = crate::document()?;
        let view = DomView::from_document(&document)?;
        let endpoint = view
            .configured_endpoint()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let controller = SessionController::new(UserId::generate(), view);

        log::info!("Chat endpoint: {} (user {})", endpoint, controller.user_id());

        Ok(Self {
            document,
            controller: Rc::new(RefCell::new(controller)),
            transport: FetchTransport::new(endpoint),
        })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_message_sender()?;
        for slot in AttachmentSlot::ALL {
            self.setup_attachment_slot(slot)?;
        }
        self.controller.borrow_mut().view_mut().focus_text_input();
        Ok(())
    }

    fn setup_message_sender(&self) -> Result<(), JsValue> {
        // Send button
        let send_btn = dom::get_element_by_id(&self.document, "sendButton")?;
        let controller = self.controller.clone();
        let transport = self.transport.clone();
        dom::add_listener(&send_btn, "click", move |_: web_sys::Event| {
            spawn_submit(controller.clone(), transport.clone());
        })?;

        // Enter key handler
        let input = dom::get_element_by_id(&self.document, "userInput")?;
        let controller = self.controller.clone();
        let transport = self.transport.clone();
        dom::add_listener(&input, "keydown", move |event: web_sys::KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                spawn_submit(controller.clone(), transport.clone());
            }
        })?;

        Ok(())
    }

    fn setup_attachment_slot(&self, slot: AttachmentSlot) -> Result<(), JsValue> {
        let (picker, clear_button) = {
            let controller = self.controller.borrow();
            let controls = controller.view().slot(slot);
            (controls.picker.clone(), controls.clear_button.clone())
        };

        let controller = self.controller.clone();
        let picker_for_change = picker.clone();
        dom::add_listener(&picker, "change", move |_: web_sys::Event| {
            let controller = controller.clone();
            let picker = picker_for_change.clone();
            wasm_bindgen_futures::spawn_local(async move {
                select_attachment(controller, slot, picker).await;
            });
        })?;

        let controller = self.controller.clone();
        dom::add_listener(&clear_button, "click", move |_: web_sys::Event| {
            controller.borrow_mut().clear_attachment(slot);
        })?;

        Ok(())
    }
}

fn spawn_submit(controller: SharedController, transport: FetchTransport) {
    wasm_bindgen_futures::spawn_local(async move {
        submit(controller, &transport).await;
    });
}

/// Button and Enter key both land here.
///
/// The controller is only borrowed before and after the request, never
/// across it; the in-flight guard in `begin_submit` refuses overlapping sends.
async fn submit<T: ChatTransport>(controller: SharedController, transport: &T) {
    let text = controller.borrow().view().text_value();
    let message = match controller.borrow_mut().begin_submit(&text) {
        Ok(message) => message,
        Err(e) => {
            log::debug!("Submit rejected: {}", e);
            return;
        }
    };

    let result = transport.send(&message).await;
    controller.borrow_mut().finish_submit(result);
}

async fn select_attachment(
    controller: SharedController,
    slot: AttachmentSlot,
    picker: HtmlInputElement,
) {
    let Some(file) = picker.files().and_then(|files| files.get(0)) else {
        controller.borrow_mut().clear_attachment(slot);
        return;
    };

    // Taken before the read: a clear or a newer pick meanwhile makes it stale
    let ticket = match controller.borrow_mut().begin_attachment(slot) {
        Ok(ticket) => ticket,
        Err(e) => {
            log::warn!("Attachment not started: {}", e);
            return;
        }
    };

    let source = BrowserFile::new(file);
    let file_name = source.file_name();
    let result = read_attachment(&source).await;
    let applied = controller
        .borrow_mut()
        .apply_attachment(ticket, file_name, result);
    match applied {
        Ok(()) => {}
        Err(e @ AttachmentError::Superseded { .. }) => log::debug!("{}", e),
        Err(e) => log::warn!("Attachment not applied: {}", e),
    }
}
