use arboard::Clipboard;
use tracing::debug;

use crate::errors::DigestError;
use crate::slack::thread_ref::is_thread_link;

/// System clipboard access, abstracted so commands can be tested without a display.
pub trait ClipboardAccess {
    fn read_text(&mut self) -> Option<String>;

    /// # Errors
    ///
    /// Returns `ClipboardError` if the clipboard rejects the write.
    fn write_text(&mut self, text: &str) -> Result<(), DigestError>;
}

/// Arboard-based clipboard implementation.
pub struct ArboardClipboard {
    clipboard: Clipboard,
}

impl ArboardClipboard {
    /// # Errors
    ///
    /// Returns `ClipboardError` when no clipboard is available (e.g. headless sessions).
    pub fn new() -> Result<Self, DigestError> {
        let clipboard = Clipboard::new().map_err(|e| DigestError::ClipboardError(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardAccess for ArboardClipboard {
    fn read_text(&mut self) -> Option<String> {
        match self.clipboard.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("Clipboard read failed: {}", e);
                None
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), DigestError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| DigestError::ClipboardError(e.to_string()))
    }
}

/// Reads the clipboard once and returns its trimmed content if it is a thread link.
pub fn detect_thread_link(clipboard: &mut dyn ClipboardAccess) -> Option<String> {
    clipboard
        .read_text()
        .map(|text| text.trim().to_string())
        .filter(|text| is_thread_link(text))
}
