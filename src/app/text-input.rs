/// Single-line editable text with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    content: String,
    cursor_index: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor starts at the end.
    pub fn with_content(content: String) -> Self {
        let cursor_index = content.chars().count();
        Self {
            content,
            cursor_index,
        }
    }

    pub fn add_char(&mut self, character: char) {
        let insert_index = char_to_byte_index(&self.content, self.cursor_index);
        self.content.insert(insert_index, character);
        self.cursor_index = self.cursor_index.saturating_add(1);
    }

    /// Inserts pasted text at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        for character in text.chars().filter(|c| *c != '\r') {
            self.add_char(if character == '\n' { ' ' } else { character });
        }
    }

    /// Backspace
    pub fn remove_char(&mut self) {
        if self.cursor_index == 0 {
            return;
        }
        let end_index = char_to_byte_index(&self.content, self.cursor_index);
        let start_index = char_to_byte_index(&self.content, self.cursor_index.saturating_sub(1));
        if start_index < end_index {
            self.content.replace_range(start_index..end_index, "");
            self.cursor_index = self.cursor_index.saturating_sub(1);
        }
    }

    /// Delete
    pub fn delete_char(&mut self) {
        if self.cursor_index >= self.content.chars().count() {
            return;
        }
        let start_index = char_to_byte_index(&self.content, self.cursor_index);
        let end_index = char_to_byte_index(&self.content, self.cursor_index.saturating_add(1));
        if start_index < end_index {
            self.content.replace_range(start_index..end_index, "");
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_index = self.cursor_index.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_index < self.content.chars().count() {
            self.cursor_index += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor_index = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_index = self.content.chars().count();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    pub fn cursor_position(&self) -> usize {
        self.cursor_index
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_index = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn char_to_byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or_else(|| value.len(), |(index, _)| index)
}

impl From<&str> for TextInput {
    fn from(content: &str) -> Self {
        Self::with_content(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_in_the_middle() {
        let mut input = TextInput::from("red shoe");
        input.move_to_start();
        for _ in 0..3 {
            input.move_right();
        }
        input.insert_str(" leather");
        assert_eq!(input.content(), "red leather shoe");
        input.remove_char();
        assert_eq!(input.content(), "red leathe shoe");
        input.delete_char();
        assert_eq!(input.content(), "red leatheshoe");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = TextInput::new();
        input.insert_str("café\nbar");
        assert_eq!(input.content(), "café bar");
        input.move_to_start();
        input.move_right();
        input.move_right();
        input.move_right();
        input.delete_char();
        assert_eq!(input.content(), "caf bar");
        assert_eq!(input.cursor_position(), 3);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut input = TextInput::from("ab");
        input.move_right();
        assert_eq!(input.cursor_position(), 2);
        input.move_to_start();
        input.move_left();
        input.remove_char();
        assert_eq!(input.content(), "ab");
        input.move_to_end();
        input.delete_char();
        assert_eq!(input.content(), "ab");
    }
}
