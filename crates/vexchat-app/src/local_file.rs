use async_trait::async_trait;
use std::path::PathBuf;

use vexchat_session::{AttachmentError, AttachmentSource};

/// A file on the local disk chosen as an attachment.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl AttachmentSource for LocalFile {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| AttachmentError::Read {
                file_name: self.file_name(),
                reason: e.to_string(),
            })
    }
}
