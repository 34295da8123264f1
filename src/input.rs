// Raw input events from the message box and the send button.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    SendClicked,
    Key { key: Key, shift: bool },
}

impl InputEvent {
    /// Send button, or Enter without Shift. Shift+Enter is left to the input box.
    pub fn is_submit(&self) -> bool {
        match self {
            InputEvent::SendClicked => true,
            InputEvent::Key { key: Key::Enter, shift } => !shift,
            InputEvent::Key { .. } => false,
        }
    }
}

/// The message box contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_submits() {
        let event = InputEvent::Key { key: Key::Enter, shift: false };
        assert!(event.is_submit());
    }

    #[test]
    fn test_shift_enter_does_not_submit() {
        let event = InputEvent::Key { key: Key::Enter, shift: true };
        assert!(!event.is_submit());
    }

    #[test]
    fn test_other_key_does_not_submit() {
        assert!(!InputEvent::Key { key: Key::Other, shift: false }.is_submit());
    }

    #[test]
    fn test_click_submits() {
        assert!(InputEvent::SendClicked.is_submit());
    }

    #[test]
    fn test_buffer_take_clears() {
        let mut input = InputBuffer::new();
        input.set("  hi ");
        assert!(!input.is_blank());
        assert_eq!(input.take(), "  hi ");
        assert!(input.is_blank());
        assert_eq!(input.as_str(), "");
    }
}
