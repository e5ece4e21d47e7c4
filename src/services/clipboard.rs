use arboard::Clipboard;
use color_eyre::Result;

/// System clipboard, opened lazily so headless sessions still start.
pub struct ClipboardService {
    clipboard: Option<Clipboard>,
}

impl ClipboardService {
    pub fn new() -> Self {
        Self {
            clipboard: Clipboard::new().ok(),
        }
    }

    /// Copies a result link or saved path.
    pub fn copy_link(&mut self, link: &str) -> Result<()> {
        let link = link.trim();
        if link.is_empty() {
            return Err(color_eyre::eyre::eyre!("Nothing to copy"));
        }
        self.clipboard()?.set_text(link.to_string())?;
        tracing::debug!(chars = link.len(), "copied link to clipboard");
        Ok(())
    }

    fn clipboard(&mut self) -> Result<&mut Clipboard> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| color_eyre::eyre::eyre!("Clipboard unavailable"))
    }
}

impl Default for ClipboardService {
    fn default() -> Self {
        Self::new()
    }
}
