use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod browser_file;
mod chat_ui;
mod dom;
mod fetch;

pub use browser_file::BrowserFile;
pub use chat_ui::DomView;
pub use fetch::FetchTransport;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Vexchat WASM initialized");
}

/// Wire the chat page's controls to a fresh session
#[wasm_bindgen]
pub fn init_chat() -> Result<(), JsValue> {
    log::info!("Initializing chat page");
    chat_ui::ChatApp::new()?.start()
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
