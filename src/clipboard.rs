//! System clipboard access

use anyhow::{anyhow, Result};
use tracing::debug;

/// Write-only clipboard with overwrite semantics
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard via arboard.
///
/// The handle is opened on first use and kept alive; on X11 the copied text
/// is only served while it exists.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| anyhow!("Failed to open clipboard: {}", e))?;
            self.inner = Some(clipboard);
        }

        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| anyhow!("Clipboard unavailable"))?;

        if let Err(e) = clipboard.set_text(text.to_string()) {
            // Reopen on the next copy
            self.inner = None;
            return Err(anyhow!("Failed to write clipboard: {}", e));
        }

        debug!("Copied {} characters to clipboard", text.chars().count());
        Ok(())
    }
}
