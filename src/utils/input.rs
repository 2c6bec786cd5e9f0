//! Text cleanup for pasted and typed input.

/// Normalizes pasted text before it reaches a text field.
///
/// Tabs become four spaces, `\r\n` and lone `\r` become `\n`, and every
/// other control character is dropped so it cannot reach the terminal.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                sanitized.push('\n');
            }
            '\n' => sanitized.push('\n'),
            _ if c.is_control() => {}
            _ => sanitized.push(c),
        }
    }

    sanitized
}
