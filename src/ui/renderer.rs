use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::core::app::actions::SAVE_WHILE_SENDING;
use crate::core::app::{PresentationState, VerificationStatus};
use crate::core::constants::{KEY_REQUIRED_NOTICE, SUGGESTION_PROMPTS};
use crate::core::message::{Message, Role};
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;
use crate::ui::wrap::wrap_text;

pub const HEADER_TITLE: &str = "GeeChat";
const INPUT_HEIGHT: u16 = 3;

pub fn ui(
    f: &mut Frame,
    state: &PresentationState<'_>,
    view: &mut ChatView,
    theme: &Theme,
    now: DateTime<Local>,
) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    if state.is_idle {
        render_idle_screen(f, area, theme, now);
        return;
    }

    let banners = banner_lines(state, theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banners.len() as u16),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT + 2),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, chunks[0], state, theme);
    f.render_widget(Paragraph::new(banners), chunks[1]);
    render_transcript(f, chunks[2], state, view, theme);
    render_suggestions(f, chunks[3], theme);
    render_input(f, chunks[4], state, view, theme);
    render_footer(f, chunks[5], state, theme);

    if state.settings_open {
        render_settings(f, area, state, view, theme);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &PresentationState<'_>, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(HEADER_TITLE, theme.title_style),
        Span::styled(
            format!("  {}", state.orchestrator_state.label()),
            theme.hint_style,
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn banner_lines(state: &PresentationState<'_>, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if !state.is_credential_valid {
        lines.push(Line::styled(
            KEY_REQUIRED_NOTICE.to_string(),
            theme.notice_banner_style,
        ));
    }
    if let Some(error) = state.last_error {
        lines.push(Line::styled(error.to_string(), theme.error_banner_style));
    }
    lines
}

/// Builds the wrapped transcript. The in-flight placeholder is shown as a
/// typing indicator until its first fragment arrives.
pub(crate) fn transcript_lines(
    messages: &[Message],
    is_sending: bool,
    width: u16,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        let is_tail = idx + 1 == messages.len();
        if idx > 0 {
            lines.push(Line::default());
        }
        let (label, label_style, text_style) = match message.role {
            Role::User => ("You", theme.user_prefix_style, theme.user_text_style),
            Role::Model => ("Gee", theme.model_prefix_style, theme.model_text_style),
        };
        lines.push(Line::styled(label, label_style));

        if is_tail && is_sending && message.role == Role::Model && message.text.is_empty() {
            lines.push(Line::styled("Gee is typing...", theme.typing_indicator_style));
            continue;
        }
        for wrapped in wrap_text(&message.text, width) {
            lines.push(Line::styled(wrapped, text_style));
        }
    }
    lines
}

fn render_transcript(
    f: &mut Frame,
    area: Rect,
    state: &PresentationState<'_>,
    view: &mut ChatView,
    theme: &Theme,
) {
    let lines = transcript_lines(state.conversation, state.is_sending, area.width, theme);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_offset = total.saturating_sub(area.height);
    view.clamp_scroll(max_offset);
    let top = max_offset - view.scroll_offset();

    f.render_widget(Paragraph::new(lines).scroll((top, 0)), area);
}

fn render_suggestions(f: &mut Frame, area: Rect, theme: &Theme) {
    let mut spans = Vec::with_capacity(SUGGESTION_PROMPTS.len() * 2);
    for (idx, suggestion) in SUGGESTION_PROMPTS.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[Alt+{}] {}", idx + 1, suggestion.label),
            theme.hint_style,
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(
    f: &mut Frame,
    area: Rect,
    state: &PresentationState<'_>,
    view: &ChatView,
    theme: &Theme,
) {
    let enabled = state.is_credential_valid && !state.is_sending;
    let (title, border_style) = if state.is_sending {
        ("Waiting for the reply...", theme.input_disabled_style)
    } else if !state.is_credential_valid {
        ("Set an API key to start chatting", theme.input_disabled_style)
    } else {
        ("Message", theme.input_border_style)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, border_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if enabled && !state.settings_open {
        f.render_widget(view.input(), inner);
    } else {
        let text = view.input_text();
        f.render_widget(
            Paragraph::new(text).style(theme.input_disabled_style),
            inner,
        );
    }
}

fn render_footer(f: &mut Frame, area: Rect, state: &PresentationState<'_>, theme: &Theme) {
    let hint = if state.settings_open {
        "Enter save & verify • Esc close • Ctrl+T theme • Ctrl+C quit"
    } else {
        "Enter send • PgUp/PgDn scroll • F2 settings • Ctrl+T theme • Ctrl+C quit"
    };
    f.render_widget(Paragraph::new(Span::styled(hint, theme.hint_style)), area);
}

fn status_line(status: VerificationStatus, theme: &Theme) -> Option<Line<'static>> {
    let (text, style) = match status {
        VerificationStatus::Idle => return None,
        VerificationStatus::Verifying => ("Verifying API Key...", theme.hint_style),
        VerificationStatus::Success => (
            "API Key verified and saved successfully!",
            theme.status_ok_style,
        ),
        VerificationStatus::Error => (
            "Invalid API Key. Please check and try again.",
            theme.status_error_style,
        ),
        VerificationStatus::Rejected => (SAVE_WHILE_SENDING, theme.status_error_style),
    };
    Some(Line::styled(text, style))
}

fn render_settings(
    f: &mut Frame,
    area: Rect,
    state: &PresentationState<'_>,
    view: &ChatView,
    theme: &Theme,
) {
    let popup = centered_rect(area, 76, 13);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.overlay_border_style)
        .title(Span::styled(" Settings ", theme.title_style))
        .style(Style::default().bg(theme.background_color));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled("Gemini API Key", theme.title_style)),
        rows[0],
    );

    let field = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style);
    let field_inner = field.inner(rows[1]);
    f.render_widget(field, rows[1]);
    f.render_widget(view.key_input(), field_inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            "[ Save & Verify Key ]  (Enter)",
            theme.overlay_border_style,
        )),
        rows[2],
    );
    if let Some(status) = status_line(state.settings_status, theme) {
        f.render_widget(Paragraph::new(status), rows[3]);
    }
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Interface Theme: ", theme.model_text_style),
            Span::styled(state.theme.as_str(), theme.title_style),
            Span::styled("  (Ctrl+T to toggle)", theme.hint_style),
        ])),
        rows[4],
    );
    let close_hint = if state.is_credential_valid {
        "Esc to close"
    } else {
        "A valid API key is required to continue."
    };
    f.render_widget(
        Paragraph::new(Span::styled(close_hint, theme.hint_style)),
        rows[5],
    );
}

fn render_idle_screen(f: &mut Frame, area: Rect, theme: &Theme, now: DateTime<Local>) {
    let (time, date) = idle_clock_text(now);
    let lines = vec![
        Line::styled(time, theme.clock_style),
        Line::default(),
        Line::styled(date, theme.date_style),
    ];
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let clock_area = Rect {
        y: area.y + top,
        height: area.height.saturating_sub(top),
        ..area
    };
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        clock_area,
    );
}

/// Time and long date shown on the idle screen.
pub(crate) fn idle_clock_text(now: DateTime<Local>) -> (String, String) {
    (
        now.format("%I:%M:%S %p").to_string(),
        now.format("%A, %B %-d, %Y").to_string(),
    )
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
