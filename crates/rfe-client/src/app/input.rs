//! Keyboard shortcuts of the file list.

/// A key, as far as the shortcuts care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
    Other,
}

/// One key press with its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    /// Focus is in a text input.
    pub typing: bool,
}

impl KeyPress {
    /// A plain key press outside any text input.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            typing: false,
        }
    }

    /// A Ctrl/Cmd chord.
    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            ctrl: true,
            typing: false,
        }
    }

    /// Mark the press as happening inside a text input.
    pub fn while_typing(mut self) -> Self {
        self.typing = true;
        self
    }
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Open the first selected entry.
    OpenSelected,
    /// Navigate to the parent directory.
    GoUp,
    /// Stage the first selected entry for copy.
    Copy,
    /// Stage the first selected entry for cut.
    Cut,
    /// Paste into the current directory.
    Paste,
    /// Apply the undo token.
    Undo,
    None,
}

impl KeyAction {
    /// Map a key press to an action.
    ///
    /// Enter and Backspace belong to the text input while typing; the
    /// Ctrl/Cmd chords always apply.
    pub fn from_key_press(press: KeyPress) -> Self {
        match (press.key, press.ctrl) {
            (Key::Char(c), true) => match c.to_ascii_lowercase() {
                'c' => KeyAction::Copy,
                'x' => KeyAction::Cut,
                'v' => KeyAction::Paste,
                'z' => KeyAction::Undo,
                _ => KeyAction::None,
            },
            (Key::Enter, _) if !press.typing => KeyAction::OpenSelected,
            (Key::Backspace, _) if !press.typing => KeyAction::GoUp,
            _ => KeyAction::None,
        }
    }
}
