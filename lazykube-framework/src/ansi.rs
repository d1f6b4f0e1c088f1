//! The escape-sequence subset the tree renderer emits, and the conversion of
//! such text into ratatui [`Text`] for drawing.

use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};

pub const RESET: &str = "\x1b[0m";

/// 256-color background, `\x1b[48;5;<n>m`
pub fn background(color: u8) -> String {
    format!("\x1b[48;5;{}m", color)
}

/// 256-color foreground, `\x1b[38;5;<n>m`
pub fn foreground(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Remove every CSI escape sequence, keeping newlines.
pub fn strip(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for ch in chars.by_ref() {
                    if ch.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        result.push(c);
    }

    result
}

fn apply_sgr(style: Style, params: &str) -> Style {
    let codes: Vec<&str> = params.split(';').collect();
    let mut style = style;
    let mut i = 0;
    while i < codes.len() {
        match codes[i] {
            "" | "0" => style = Style::default(),
            "38" | "48" if codes.get(i + 1) == Some(&"5") => {
                if let Some(index) = codes.get(i + 2).and_then(|n| n.parse::<u8>().ok()) {
                    style = if codes[i] == "38" {
                        style.fg(Color::Indexed(index))
                    } else {
                        style.bg(Color::Indexed(index))
                    };
                }
                i += 2;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

/// Convert renderer output into styled ratatui text.
///
/// Understands reset and the 256-color foreground/background forms; any
/// other CSI sequence is dropped.
pub fn to_text(text: &str) -> Text<'static> {
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut spans = Vec::new();
        let mut style = Style::default();
        let mut current = String::new();
        let mut chars = raw_line.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\x1b' {
                current.push(c);
                continue;
            }
            if chars.peek() != Some(&'[') {
                continue;
            }
            chars.next();

            let mut params = String::new();
            let mut terminator = None;
            for ch in chars.by_ref() {
                if ch.is_ascii_alphabetic() {
                    terminator = Some(ch);
                    break;
                }
                params.push(ch);
            }

            if terminator == Some('m') {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), style));
                }
                style = apply_sgr(style, &params);
            }
        }

        if !current.is_empty() {
            spans.push(Span::styled(current, style));
        }
        lines.push(Line::from(spans));
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_builders() {
        assert_eq!(background(237), "\x1b[48;5;237m");
        assert_eq!(foreground(33), "\x1b[38;5;33m");
    }

    #[test]
    fn test_strip_removes_sequences_keeps_newlines() {
        let text = "\x1b[48;5;237m─ ns\x1b[0m\n   pod\x1b[0m\n";
        assert_eq!(strip(text), "─ ns\n   pod\n");
    }

    #[test]
    fn test_to_text_builds_styled_spans() {
        let text = to_text("\x1b[48;5;237m+ \x1b[38;5;33mns1  \x1b[0m\nplain\x1b[0m\n");

        assert_eq!(text.lines.len(), 2);
        let first = &text.lines[0];
        assert_eq!(first.spans.len(), 2);
        assert_eq!(first.spans[0].content, "+ ");
        assert_eq!(first.spans[0].style.bg, Some(Color::Indexed(237)));
        assert_eq!(first.spans[1].content, "ns1  ");
        assert_eq!(first.spans[1].style.fg, Some(Color::Indexed(33)));
        assert_eq!(first.spans[1].style.bg, Some(Color::Indexed(237)));

        assert_eq!(text.lines[1].spans[0].content, "plain");
        assert_eq!(text.lines[1].spans[0].style, Style::default());
    }

    #[test]
    fn test_to_text_ignores_unknown_sequences() {
        let text = to_text("a\x1b[2Kb\x1b[1mc");
        assert_eq!(text.lines[0].to_string(), "abc");
    }
}
