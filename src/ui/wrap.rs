//! Word wrapping for the transcript pane.
//!
//! The transcript is wrapped here rather than by ratatui's `Paragraph` so the
//! scroll offset can be computed from an exact visual line count.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wraps `text` to at most `width` columns per line.
///
/// Explicit newlines are kept, and runs of spaces are preserved inside a
/// line. Words wider than `width` are broken at the column limit. An empty
/// input yields a single empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        wrap_paragraph(raw, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(raw: &str, width: usize, out: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_width = 0usize;

    for token in split_keep_spaces(raw) {
        let token_width = UnicodeWidthStr::width(token);
        let is_space = token.starts_with(' ');

        if line_width + token_width <= width {
            line.push_str(token);
            line_width += token_width;
            continue;
        }

        if is_space {
            // Break at the gap; the spaces themselves are dropped.
            push_broken(&mut line, out);
            line_width = 0;
            continue;
        }

        if line_width > 0 && token_width <= width {
            push_broken(&mut line, out);
            line.push_str(token);
            line_width = token_width;
            continue;
        }

        for ch in token.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if line_width + ch_width > width && line_width > 0 {
                out.push(std::mem::take(&mut line));
                line_width = 0;
            }
            line.push(ch);
            line_width += ch_width;
        }
    }

    out.push(line);
}

/// Ends a line at a wrap point. Spaces left dangling at the break are trimmed.
fn push_broken(line: &mut String, out: &mut Vec<String>) {
    let kept = line.trim_end_matches(' ').len();
    line.truncate(kept);
    out.push(std::mem::take(line));
}

/// Splits into alternating runs of spaces and non-spaces.
fn split_keep_spaces(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (idx, ch) in text.char_indices() {
        let space = ch == ' ';
        match in_space {
            Some(previous) if previous != space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
