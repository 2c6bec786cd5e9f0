//! Terminal-only view state: text fields and transcript scrolling.
//!
//! Nothing here is part of [`App`](crate::core::app::App). The reducer never
//! sees keystrokes, only the trimmed text handed over on submit.

use ratatui::crossterm::event::KeyEvent;
use tui_textarea::{CursorMove, Input, TextArea};

use crate::core::constants::SUGGESTION_PROMPTS;
use crate::ui::theme::Theme;

const KEY_MASK_CHAR: char = '\u{2022}';

pub struct ChatView {
    input: TextArea<'static>,
    key_input: TextArea<'static>,
    /// Visual lines scrolled up from the bottom of the transcript.
    scroll_from_bottom: u16,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        let mut key_input = TextArea::default();
        key_input.set_mask_char(KEY_MASK_CHAR);
        key_input.set_placeholder_text("Enter your API key");
        let mut input = TextArea::default();
        input.set_placeholder_text("Type your message...");
        Self {
            input,
            key_input,
            scroll_from_bottom: 0,
        }
    }

    pub fn input(&self) -> &TextArea<'static> {
        &self.input
    }

    pub fn key_input(&self) -> &TextArea<'static> {
        &self.key_input
    }

    pub fn apply_theme(&mut self, theme: &Theme) {
        for area in [&mut self.input, &mut self.key_input] {
            area.set_style(theme.input_text_style);
            area.set_cursor_style(theme.input_cursor_style);
            area.set_cursor_line_style(ratatui::style::Style::default());
            area.set_placeholder_style(theme.hint_style);
        }
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Returns the message text and clears the field.
    pub fn take_input(&mut self) -> String {
        let text = self.input_text();
        clear(&mut self.input);
        text
    }

    /// Returns the entered key and clears the field.
    pub fn take_key(&mut self) -> String {
        let text = self.key_input.lines().join("");
        clear(&mut self.key_input);
        text
    }

    pub fn handle_input_key(&mut self, key: KeyEvent) {
        self.input.input(Input::from(key));
    }

    pub fn handle_key_field_key(&mut self, key: KeyEvent) {
        self.key_input.input(Input::from(key));
    }

    pub fn insert_into_input(&mut self, text: &str) {
        self.input.insert_str(text);
    }

    /// Key fields are single-line; pasted newlines are dropped.
    pub fn insert_into_key(&mut self, text: &str) {
        let flattened: String = text.chars().filter(|c| *c != '\n').collect();
        self.key_input.insert_str(flattened);
    }

    /// Prepends the `index`th suggestion prefix unless the input already
    /// starts with it. Returns `false` for an unknown index.
    pub fn insert_suggestion(&mut self, index: usize) -> bool {
        let Some(suggestion) = SUGGESTION_PROMPTS.get(index) else {
            return false;
        };
        let current = self.input_text();
        if !current.starts_with(suggestion.prefix) {
            let combined = format!("{}{}", suggestion.prefix, current);
            self.input = TextArea::from(combined.split('\n').map(str::to_string));
            self.input.move_cursor(CursorMove::Bottom);
            self.input.move_cursor(CursorMove::End);
        }
        true
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_from_bottom
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Keeps the offset within the scrollable range of the last frame.
    pub fn clamp_scroll(&mut self, max_offset: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_offset);
    }
}

fn clear(area: &mut TextArea<'static>) {
    area.select_all();
    area.cut();
}
