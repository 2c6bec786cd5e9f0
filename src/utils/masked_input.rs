//! Masked single-line prompt used by `geechat auth`.
//!
//! Keys are echoed as `*`. F2 reveals the last four characters so a pasted
//! key can be checked without printing it in full.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

use crate::utils::input::sanitize_text_input;

const REVEALED_TAIL: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedInputState {
    text: String,
    /// Cursor position in characters.
    cursor: usize,
    reveal_tail: bool,
}

impl MaskedInputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// What the terminal shows in place of the text.
    pub fn display(&self) -> String {
        let len = self.text.chars().count();
        if self.reveal_tail && len >= REVEALED_TAIL {
            let hidden = len - REVEALED_TAIL;
            let tail: String = self.text.chars().skip(hidden).collect();
            format!("{}{}", "*".repeat(hidden), tail)
        } else {
            "*".repeat(len)
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    fn insert_str(&mut self, text: &str) {
        let at = self.byte_index(self.cursor);
        self.text.insert_str(at, text);
        self.cursor += text.chars().count();
        self.reveal_tail = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedEdit {
    Insert(char),
    Paste(String),
    Backspace,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    ClearAll,
    ToggleReveal,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedOutcome {
    Continue,
    Submit(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MaskedInputError {
    message: String,
}

impl MaskedInputError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<io::Error> for MaskedInputError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for MaskedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MaskedInputError {}

pub fn map_key(key: &KeyEvent) -> Option<MaskedEdit> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(MaskedEdit::Submit),
        KeyCode::Esc => Some(MaskedEdit::Cancel),
        KeyCode::Char('c') if ctrl => Some(MaskedEdit::Cancel),
        KeyCode::Char('a') if ctrl => Some(MaskedEdit::MoveStart),
        KeyCode::Char('e') if ctrl => Some(MaskedEdit::MoveEnd),
        KeyCode::Char('u') if ctrl => Some(MaskedEdit::ClearAll),
        KeyCode::Backspace => Some(MaskedEdit::Backspace),
        KeyCode::Left => Some(MaskedEdit::MoveLeft),
        KeyCode::Right => Some(MaskedEdit::MoveRight),
        KeyCode::Home => Some(MaskedEdit::MoveStart),
        KeyCode::End => Some(MaskedEdit::MoveEnd),
        KeyCode::F(2) => Some(MaskedEdit::ToggleReveal),
        KeyCode::Char(c) if !ctrl => Some(MaskedEdit::Insert(c)),
        _ => None,
    }
}

pub fn apply_edit(state: &mut MaskedInputState, edit: MaskedEdit) -> MaskedOutcome {
    match edit {
        MaskedEdit::Insert(c) => {
            let mut buf = [0u8; 4];
            state.insert_str(c.encode_utf8(&mut buf));
        }
        MaskedEdit::Paste(text) => {
            // Keys are one line; a pasted newline ends the prompt.
            let first_line = text.split('\n').next().unwrap_or_default();
            state.insert_str(first_line);
            if text.contains('\n') {
                return MaskedOutcome::Submit(state.text.clone());
            }
        }
        MaskedEdit::Backspace => {
            if state.cursor > 0 {
                let start = state.byte_index(state.cursor - 1);
                let end = state.byte_index(state.cursor);
                state.text.replace_range(start..end, "");
                state.cursor -= 1;
                state.reveal_tail = false;
            }
        }
        MaskedEdit::MoveLeft => state.cursor = state.cursor.saturating_sub(1),
        MaskedEdit::MoveRight => {
            state.cursor = (state.cursor + 1).min(state.text.chars().count());
        }
        MaskedEdit::MoveStart => state.cursor = 0,
        MaskedEdit::MoveEnd => state.cursor = state.text.chars().count(),
        MaskedEdit::ClearAll => {
            state.text.clear();
            state.cursor = 0;
            state.reveal_tail = false;
        }
        MaskedEdit::ToggleReveal => state.reveal_tail = !state.reveal_tail,
        MaskedEdit::Submit => return MaskedOutcome::Submit(state.text.clone()),
        MaskedEdit::Cancel => return MaskedOutcome::Cancelled,
    }
    MaskedOutcome::Continue
}

/// Reads one masked line from the terminal.
pub fn prompt_masked(prompt: &str) -> Result<String, MaskedInputError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let paste_enabled = execute!(stdout, event::EnableBracketedPaste);

    let result = paste_enabled
        .map_err(MaskedInputError::from)
        .and_then(|()| read_masked(prompt));

    let restored = disable_raw_mode();
    let _ = execute!(stdout, event::DisableBracketedPaste);
    println!();

    let value = result?;
    restored?;
    Ok(value)
}

fn read_masked(prompt: &str) -> Result<String, MaskedInputError> {
    let mut state = MaskedInputState::default();
    redraw(prompt, &state)?;
    loop {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let edit = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => map_key(&key),
            Event::Paste(text) => Some(MaskedEdit::Paste(sanitize_text_input(&text))),
            _ => None,
        };
        let Some(edit) = edit else {
            continue;
        };
        match apply_edit(&mut state, edit) {
            MaskedOutcome::Continue => redraw(prompt, &state)?,
            MaskedOutcome::Submit(value) => return Ok(value),
            MaskedOutcome::Cancelled => return Err(MaskedInputError::new("Cancelled by user")),
        }
    }
}

fn redraw(prompt: &str, state: &MaskedInputState) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{}{}", prompt, state.display())?;
    // The mask is one column per character, so the cursor column is exact.
    let column = prompt.chars().count() + state.cursor();
    if column > 0 {
        write!(stdout, "\r\x1b[{}C", column)?;
    } else {
        write!(stdout, "\r")?;
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> MaskedInputState {
        let mut state = MaskedInputState::default();
        for c in text.chars() {
            apply_edit(&mut state, MaskedEdit::Insert(c));
        }
        state
    }

    #[test]
    fn typed_characters_are_masked() {
        let state = typed("secret");
        assert_eq!(state.text(), "secret");
        assert_eq!(state.display(), "******");
    }

    #[test]
    fn reveal_shows_only_the_tail() {
        let mut state = typed("AIzaSyExample1234");
        apply_edit(&mut state, MaskedEdit::ToggleReveal);
        assert_eq!(state.display(), format!("{}1234", "*".repeat(13)));

        apply_edit(&mut state, MaskedEdit::Insert('5'));
        assert_eq!(state.display(), "*".repeat(18));
    }

    #[test]
    fn backspace_after_moving_left_removes_the_right_char() {
        let mut state = typed("abc");
        apply_edit(&mut state, MaskedEdit::MoveLeft);
        apply_edit(&mut state, MaskedEdit::Backspace);
        assert_eq!(state.text(), "ac");
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn pasted_newline_submits_the_first_line() {
        let mut state = MaskedInputState::default();
        let outcome = apply_edit(&mut state, MaskedEdit::Paste("good-key\ntrailing".into()));
        assert_eq!(outcome, MaskedOutcome::Submit("good-key".to_string()));
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&esc), Some(MaskedEdit::Cancel));
        assert_eq!(map_key(&ctrl_c), Some(MaskedEdit::Cancel));
        assert_eq!(
            apply_edit(&mut MaskedInputState::default(), MaskedEdit::Cancel),
            MaskedOutcome::Cancelled
        );
    }
}
