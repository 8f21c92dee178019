use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Text input box for commit summaries, descriptions and branch names
pub struct InputWidget {
    title: String,
    input: String,
    /// Cursor position in chars, not bytes
    cursor_position: usize,
    multiline: bool,
    active: bool,
}

impl InputWidget {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            input: String::new(),
            cursor_position: 0,
            multiline: false,
            active: false,
        }
    }

    /// Enter inserts a newline instead of being left to the caller
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Set whether the input widget is active (focused)
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn insert(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
    }

    /// Handle keyboard input. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return false;
                }
                self.insert(c);
                true
            }
            KeyCode::Enter if self.multiline => {
                self.insert('\n');
                true
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let index = self.byte_index();
                    self.input.remove(index);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor_position < self.char_count() {
                    let index = self.byte_index();
                    self.input.remove(index);
                }
                true
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                if self.cursor_position < self.char_count() {
                    self.cursor_position += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor_position = 0;
                true
            }
            KeyCode::End => {
                self.cursor_position = self.char_count();
                true
            }
            _ => false,
        }
    }

    /// Get the current input (without clearing)
    pub fn get_input(&self) -> &str {
        &self.input
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }
}

impl Widget for &InputWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let display_text = if self.active {
            let index = self.byte_index();
            format!("{}▊{}", &self.input[..index], &self.input[index..])
        } else {
            self.input.clone()
        };

        let style = if self.active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .border_style(style);

        Paragraph::new(display_text)
            .style(style)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
