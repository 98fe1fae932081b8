// THEORY:
// The clipboard is an outside collaborator the engine writes a hex string into.
// The environment may refuse the write (permissions, headless session), so the
// sink reports failure and the session turns it into `ClipboardWriteFailure`.

/// Anything that can receive copied text.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// In-process clipboard; `denied()` builds one that refuses every write.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
    deny: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denied() -> Self {
        Self {
            contents: None,
            deny: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        if self.deny {
            return Err("clipboard access denied".to_string());
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}
