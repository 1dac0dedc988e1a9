//! Query line editing
//!
//! Provides unified input processing with support for Emacs-style key bindings.
//! All edit operations are a single enum; positions are counted in chars so
//! multi-byte input never splits a character.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input operations for unified input handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOperation {
    InsertChar(char),
    MoveCursorToStart,
    MoveCursorToEnd,
    MoveCursorLeft,
    MoveCursorRight,
    DeleteCharForward,
    DeleteCharBackward,
    DeleteWordBackward,
    KillLine,
    Yank,
}

impl InputOperation {
    /// Editing operation bound to `key`, if any
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => Some(Self::MoveCursorToStart),
            KeyCode::Char('e') if ctrl => Some(Self::MoveCursorToEnd),
            KeyCode::Char('b') if ctrl => Some(Self::MoveCursorLeft),
            KeyCode::Char('f') if ctrl => Some(Self::MoveCursorRight),
            KeyCode::Char('d') if ctrl => Some(Self::DeleteCharForward),
            KeyCode::Char('h') if ctrl => Some(Self::DeleteCharBackward),
            KeyCode::Char('w') if ctrl => Some(Self::DeleteWordBackward),
            KeyCode::Char('k') if ctrl => Some(Self::KillLine),
            KeyCode::Char('y') if ctrl => Some(Self::Yank),
            KeyCode::Char(_) if ctrl => None,
            KeyCode::Char(c) => Some(Self::InsertChar(c)),
            KeyCode::Home => Some(Self::MoveCursorToStart),
            KeyCode::End => Some(Self::MoveCursorToEnd),
            KeyCode::Left => Some(Self::MoveCursorLeft),
            KeyCode::Right => Some(Self::MoveCursorRight),
            KeyCode::Delete => Some(Self::DeleteCharForward),
            KeyCode::Backspace => Some(Self::DeleteCharBackward),
            _ => None,
        }
    }

    /// Whether applying this operation can change the text
    pub fn edits_text(&self) -> bool {
        !matches!(
            self,
            Self::MoveCursorToStart
                | Self::MoveCursorToEnd
                | Self::MoveCursorLeft
                | Self::MoveCursorRight
        )
    }
}

/// Caret and kill ring of the query line; the text itself is owned by the
/// search controller.
#[derive(Debug, Default, Clone)]
pub struct LineEditor {
    pub cursor_position: usize,
    pub kill_ring: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the caret at the end of `text`
    pub fn move_to_end(&mut self, text: &str) {
        self.cursor_position = text.chars().count();
    }

    /// Apply `operation` to a copy of `text` and return the edited text
    pub fn apply(&mut self, operation: InputOperation, text: &str) -> String {
        let mut edited = text.to_string();
        self.cursor_position = self.cursor_position.min(edited.chars().count());
        InputHandler::apply_operation(
            operation,
            &mut edited,
            &mut self.cursor_position,
            &mut self.kill_ring,
        );
        edited
    }
}

/// Input handler for managing text editing state
pub struct InputHandler;

impl InputHandler {
    /// Apply an input operation to the given text and cursor state
    pub fn apply_operation(
        operation: InputOperation,
        text: &mut String,
        cursor_position: &mut usize,
        kill_ring: &mut String,
    ) {
        let len = text.chars().count();
        match operation {
            InputOperation::InsertChar(c) => {
                text.insert(byte_offset(text, *cursor_position), c);
                *cursor_position += 1;
            }
            InputOperation::MoveCursorToStart => {
                *cursor_position = 0;
            }
            InputOperation::MoveCursorToEnd => {
                *cursor_position = len;
            }
            InputOperation::MoveCursorLeft => {
                if *cursor_position > 0 {
                    *cursor_position -= 1;
                }
            }
            InputOperation::MoveCursorRight => {
                if *cursor_position < len {
                    *cursor_position += 1;
                }
            }
            InputOperation::DeleteCharForward => {
                if *cursor_position < len {
                    text.remove(byte_offset(text, *cursor_position));
                }
            }
            InputOperation::DeleteCharBackward => {
                if *cursor_position > 0 {
                    *cursor_position -= 1;
                    text.remove(byte_offset(text, *cursor_position));
                }
            }
            InputOperation::DeleteWordBackward => {
                let chars: Vec<char> = text.chars().collect();
                let mut start = *cursor_position;
                while start > 0 && chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                if start == *cursor_position {
                    return;
                }
                let from = byte_offset(text, start);
                let to = byte_offset(text, *cursor_position);
                *kill_ring = text[from..to].to_string();
                text.replace_range(from..to, "");
                *cursor_position = start;
            }
            InputOperation::KillLine => {
                if *cursor_position < len {
                    let from = byte_offset(text, *cursor_position);
                    *kill_ring = text[from..].to_string();
                    text.truncate(from);
                }
            }
            InputOperation::Yank => {
                if !kill_ring.is_empty() {
                    text.insert_str(byte_offset(text, *cursor_position), kill_ring);
                    *cursor_position += kill_ring.chars().count();
                }
            }
        }
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_operations() {
        let mut text = "hello".to_string();
        let mut cursor = 2; // Between 'e' and 'l'
        let mut kill_ring = String::new();

        // Test insert character
        InputHandler::apply_operation(
            InputOperation::InsertChar('X'),
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(text, "heXllo");
        assert_eq!(cursor, 3);

        InputHandler::apply_operation(
            InputOperation::MoveCursorToStart,
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(cursor, 0);

        InputHandler::apply_operation(
            InputOperation::MoveCursorToEnd,
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(cursor, 6);
    }

    #[test]
    fn test_kill_and_yank() {
        let mut text = "hello world".to_string();
        let mut cursor = 6; // After "hello "
        let mut kill_ring = String::new();

        InputHandler::apply_operation(
            InputOperation::KillLine,
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(text, "hello ");
        assert_eq!(kill_ring, "world");

        cursor = 5; // Before the space
        InputHandler::apply_operation(InputOperation::Yank, &mut text, &mut cursor, &mut kill_ring);
        assert_eq!(text, "helloworld ");
        assert_eq!(cursor, 10);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut editor = LineEditor::new();
        let text = editor.apply(InputOperation::InsertChar('₹'), "");
        let text = editor.apply(InputOperation::InsertChar('5'), &text);
        assert_eq!(text, "₹5");
        assert_eq!(editor.cursor_position, 2);

        let text = editor.apply(InputOperation::MoveCursorLeft, &text);
        let text = editor.apply(InputOperation::DeleteCharBackward, &text);
        assert_eq!(text, "5");
        assert_eq!(editor.cursor_position, 0);
    }

    #[test]
    fn test_delete_word_backward() {
        let mut editor = LineEditor::new();
        editor.move_to_end("gaming laptop ");
        let text = editor.apply(InputOperation::DeleteWordBackward, "gaming laptop ");
        assert_eq!(text, "gaming ");
        assert_eq!(editor.kill_ring, "laptop ");
        assert_eq!(editor.cursor_position, 7);
    }

    #[test]
    fn test_caret_clamped_to_external_text() {
        let mut editor = LineEditor::new();
        editor.cursor_position = 10;
        let text = editor.apply(InputOperation::InsertChar('s'), "lap");
        assert_eq!(text, "laps");
        assert_eq!(editor.cursor_position, 4);
    }

    #[test]
    fn test_key_bindings() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(
            InputOperation::from_key(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            Some(InputOperation::MoveCursorToStart)
        );
        assert_eq!(
            InputOperation::from_key(&key(KeyCode::Char('L'), KeyModifiers::SHIFT)),
            Some(InputOperation::InsertChar('L'))
        );
        assert_eq!(
            InputOperation::from_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            None
        );
        assert!(!InputOperation::MoveCursorLeft.edits_text());
        assert!(InputOperation::Yank.edits_text());
    }

    #[test]
    fn test_delete_word_at_start_keeps_kill_ring() {
        let mut text = "abc".to_string();
        let mut cursor = 0;
        let mut kill_ring = "saved".to_string();

        InputHandler::apply_operation(
            InputOperation::DeleteWordBackward,
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(text, "abc");
        assert_eq!(cursor, 0);
        assert_eq!(kill_ring, "saved");

        cursor = 3;
        InputHandler::apply_operation(
            InputOperation::DeleteWordBackward,
            &mut text,
            &mut cursor,
            &mut kill_ring,
        );
        assert_eq!(text, "");
        assert_eq!(kill_ring, "abc");
    }
}
