//! Key resolution for the chat screen and the settings panel.
//!
//! Resolution is pure: it maps a key press plus the current surface to a
//! [`KeyIntent`]. The event loop decides what each intent does.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::constants::SUGGESTION_PROMPTS;

/// Lines moved per PageUp/PageDown.
pub const SCROLL_PAGE: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Quit,
    OpenSettings,
    CloseSettings,
    ToggleTheme,
    DismissError,
    Submit,
    SaveKey,
    NewLine,
    InsertSuggestion(usize),
    ScrollUp,
    ScrollDown,
    /// Forward to the focused text field.
    Edit,
}

pub fn resolve_key(key: &KeyEvent, settings_open: bool) -> KeyIntent {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyIntent::Quit,
        KeyCode::Char('t') if ctrl => KeyIntent::ToggleTheme,
        KeyCode::Char('s') if ctrl && !settings_open => KeyIntent::OpenSettings,
        KeyCode::F(2) if !settings_open => KeyIntent::OpenSettings,
        KeyCode::Esc if settings_open => KeyIntent::CloseSettings,
        KeyCode::Esc => KeyIntent::DismissError,
        KeyCode::Enter if settings_open => KeyIntent::SaveKey,
        KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
            KeyIntent::NewLine
        }
        KeyCode::Enter => KeyIntent::Submit,
        KeyCode::PageUp if !settings_open => KeyIntent::ScrollUp,
        KeyCode::PageDown if !settings_open => KeyIntent::ScrollDown,
        KeyCode::Char(ch) if alt && !settings_open => match suggestion_index(ch) {
            Some(index) => KeyIntent::InsertSuggestion(index),
            None => KeyIntent::Edit,
        },
        _ => KeyIntent::Edit,
    }
}

fn suggestion_index(ch: char) -> Option<usize> {
    let digit = ch.to_digit(10)? as usize;
    (1..=SUGGESTION_PROMPTS.len())
        .contains(&digit)
        .then(|| digit - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn enter_submits_on_chat_and_saves_in_settings() {
        let enter = press(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(resolve_key(&enter, false), KeyIntent::Submit);
        assert_eq!(resolve_key(&enter, true), KeyIntent::SaveKey);
        assert_eq!(
            resolve_key(&press(KeyCode::Enter, KeyModifiers::ALT), false),
            KeyIntent::NewLine
        );
    }

    #[test]
    fn escape_depends_on_surface() {
        let esc = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(resolve_key(&esc, true), KeyIntent::CloseSettings);
        assert_eq!(resolve_key(&esc, false), KeyIntent::DismissError);
    }

    #[test]
    fn global_shortcuts_work_everywhere() {
        for settings_open in [false, true] {
            assert_eq!(
                resolve_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL), settings_open),
                KeyIntent::Quit
            );
            assert_eq!(
                resolve_key(&press(KeyCode::Char('t'), KeyModifiers::CONTROL), settings_open),
                KeyIntent::ToggleTheme
            );
        }
    }

    #[test]
    fn settings_shortcuts_only_open_from_chat() {
        let f2 = press(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(resolve_key(&f2, false), KeyIntent::OpenSettings);
        assert_eq!(resolve_key(&f2, true), KeyIntent::Edit);
    }

    #[test]
    fn alt_digits_pick_suggestions() {
        assert_eq!(
            resolve_key(&press(KeyCode::Char('1'), KeyModifiers::ALT), false),
            KeyIntent::InsertSuggestion(0)
        );
        assert_eq!(
            resolve_key(&press(KeyCode::Char('5'), KeyModifiers::ALT), false),
            KeyIntent::InsertSuggestion(4)
        );
        assert_eq!(
            resolve_key(&press(KeyCode::Char('6'), KeyModifiers::ALT), false),
            KeyIntent::Edit
        );
        assert_eq!(
            resolve_key(&press(KeyCode::Char('1'), KeyModifiers::NONE), false),
            KeyIntent::Edit
        );
    }
}
