use ratatui::style::{Color, Modifier, Style};

use crate::core::config::ThemePreference;

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,

    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub model_prefix_style: Style,
    pub model_text_style: Style,
    pub typing_indicator_style: Style,

    // Chrome
    pub title_style: Style,
    pub hint_style: Style,
    pub error_banner_style: Style,
    pub notice_banner_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_disabled_style: Style,
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Settings overlay
    pub overlay_border_style: Style,
    pub status_ok_style: Style,
    pub status_error_style: Style,

    // Idle screen
    pub clock_style: Style,
    pub date_style: Style,
}

impl Theme {
    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        let accent = Color::Rgb(0x8a, 0xb4, 0xf8);
        Theme {
            background_color: Color::Rgb(0x12, 0x14, 0x18),
            user_prefix_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(accent),
            model_prefix_style: Style::default()
                .fg(Color::Rgb(0xc5, 0x8a, 0xf9))
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(Color::Rgb(0xe8, 0xea, 0xed)),
            typing_indicator_style: Style::default().fg(Color::Rgb(0x9a, 0xa0, 0xa6)),

            title_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            hint_style: Style::default().fg(Color::Rgb(0x80, 0x86, 0x8b)),
            error_banner_style: Style::default()
                .fg(Color::Rgb(0xf2, 0x8b, 0x82))
                .add_modifier(Modifier::BOLD),
            notice_banner_style: Style::default().fg(Color::Rgb(0xfd, 0xd6, 0x63)),

            input_border_style: Style::default().fg(Color::Rgb(0x5f, 0x63, 0x68)),
            input_disabled_style: Style::default().fg(Color::Rgb(0x5f, 0x63, 0x68)),
            input_text_style: Style::default().fg(Color::Rgb(0xe8, 0xea, 0xed)),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            overlay_border_style: Style::default().fg(accent),
            status_ok_style: Style::default().fg(Color::Rgb(0x81, 0xc9, 0x95)),
            status_error_style: Style::default().fg(Color::Rgb(0xf2, 0x8b, 0x82)),

            clock_style: Style::default()
                .fg(Color::Rgb(0xe8, 0xea, 0xed))
                .add_modifier(Modifier::BOLD),
            date_style: Style::default().fg(Color::Rgb(0x9a, 0xa0, 0xa6)),
        }
    }

    pub fn light() -> Self {
        let accent = Color::Rgb(0x1a, 0x73, 0xe8);
        Theme {
            background_color: Color::Rgb(0xfa, 0xfa, 0xfa),
            user_prefix_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(accent),
            model_prefix_style: Style::default()
                .fg(Color::Rgb(0x81, 0x39, 0xc9))
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(Color::Rgb(0x20, 0x21, 0x24)),
            typing_indicator_style: Style::default().fg(Color::Rgb(0x5f, 0x63, 0x68)),

            title_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            hint_style: Style::default().fg(Color::Rgb(0x70, 0x75, 0x7a)),
            error_banner_style: Style::default()
                .fg(Color::Rgb(0xc5, 0x22, 0x1f))
                .add_modifier(Modifier::BOLD),
            notice_banner_style: Style::default().fg(Color::Rgb(0xb0, 0x60, 0x00)),

            input_border_style: Style::default().fg(Color::Rgb(0x9a, 0xa0, 0xa6)),
            input_disabled_style: Style::default().fg(Color::Rgb(0xbd, 0xc1, 0xc6)),
            input_text_style: Style::default().fg(Color::Rgb(0x20, 0x21, 0x24)),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            overlay_border_style: Style::default().fg(accent),
            status_ok_style: Style::default().fg(Color::Rgb(0x18, 0x80, 0x38)),
            status_error_style: Style::default().fg(Color::Rgb(0xc5, 0x22, 0x1f)),

            clock_style: Style::default()
                .fg(Color::Rgb(0x20, 0x21, 0x24))
                .add_modifier(Modifier::BOLD),
            date_style: Style::default().fg(Color::Rgb(0x5f, 0x63, 0x68)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_selects_matching_palette() {
        let dark = Theme::for_preference(ThemePreference::Dark);
        let light = Theme::for_preference(ThemePreference::Light);
        assert_eq!(dark.background_color, Theme::dark().background_color);
        assert_eq!(light.background_color, Theme::light().background_color);
        assert_ne!(dark.background_color, light.background_color);
    }
}
