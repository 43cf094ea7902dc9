use async_trait::async_trait;
use js_sys::Uint8Array;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use vexchat_session::{AttachmentError, AttachmentSource};

/// A file handed over by an `<input type="file">` picker
pub struct BrowserFile {
    file: File,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

#[async_trait(?Send)]
impl AttachmentSource for BrowserFile {
    fn file_name(&self) -> String {
        self.file.name()
    }

    fn mime_type(&self) -> String {
        self.file.type_()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        let buffer = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|e| AttachmentError::Read {
                file_name: self.file_name(),
                reason: e.as_string().unwrap_or_else(|| format!("{:?}", e)),
            })?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}
