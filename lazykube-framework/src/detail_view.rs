use ratatui::text::Line;
use std::collections::VecDeque;
use unicode_width::UnicodeWidthChar;

pub const DEFAULT_MAX_DETAIL_LINES: usize = 10_000;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WrappingMode {
    Wrapped,
    Unwrapped,
}

/// Bounded text buffer behind the details panel.
///
/// Streamed chunks are split into lines as they arrive; an unterminated last
/// line is kept apart until its newline shows up. Once `max_lines` is
/// exceeded the oldest lines are discarded.
pub struct DetailView {
    title: Option<String>,
    lines: VecDeque<String>,
    partial: String,
    max_lines: usize,
    discarded: usize,
}

impl DetailView {
    pub fn new(max_lines: usize) -> Self {
        Self {
            title: None,
            lines: VecDeque::new(),
            partial: String::new(),
            max_lines: max_lines.max(1),
            discarded: 0,
        }
    }

    pub fn clear(&mut self) {
        self.title = None;
        self.lines.clear();
        self.partial.clear();
        self.discarded = 0;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// replace the whole content, e.g. with one-shot describe output
    pub fn set_text(&mut self, text: &str) {
        self.lines.clear();
        self.partial.clear();
        self.discarded = 0;
        self.append(text);
    }

    pub fn append(&mut self, chunk: &str) {
        let sanitized = sanitize_control_chars(chunk);
        let mut rest = sanitized.as_str();

        while let Some(newline) = rest.find('\n') {
            self.partial.push_str(&rest[..newline]);
            let line = std::mem::take(&mut self.partial);
            self.push_line(line);
            rest = &rest[newline + 1..];
        }
        self.partial.push_str(rest);
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            if self.discarded == 0 {
                log::info!(
                    "Details reached {} lines, dropping the oldest",
                    self.max_lines
                );
            }
            self.lines.pop_front();
            self.discarded += 1;
        }
    }

    /// complete lines plus the pending partial one
    pub fn line_count(&self) -> usize {
        self.lines.len() + usize::from(!self.partial.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    /// lines dropped because the buffer was full
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// title for the panel, noting how many lines fell off the top
    pub fn heading(&self) -> Option<String> {
        let title = self.title.as_deref()?;
        Some(match self.discarded {
            0 => title.to_string(),
            n => format!("{} ({} older lines dropped)", title, n),
        })
    }

    pub fn iter_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .chain((!self.partial.is_empty()).then_some(self.partial.as_str()))
    }

    pub fn to_plain_string(&self) -> String {
        self.iter_lines().collect::<Vec<_>>().join("\n")
    }

    /// widest line in terminal columns
    pub fn content_width(&self) -> usize {
        self.iter_lines().map(display_width).max().unwrap_or(0)
    }

    pub fn to_lines(&self, width: u16, mode: WrappingMode) -> Vec<Line<'static>> {
        match mode {
            WrappingMode::Unwrapped => self
                .iter_lines()
                .map(|line| Line::from(line.to_string()))
                .collect(),
            WrappingMode::Wrapped => self
                .iter_lines()
                .flat_map(|line| wrap_line(line, width as usize))
                .map(Line::from)
                .collect(),
        }
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DETAIL_LINES)
    }
}

fn display_width(line: &str) -> usize {
    line.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// drop escape sequences and control characters, keeping newlines and
/// expanding tabs
fn sanitize_control_chars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\t' => result.push_str("    "),
            '\n' => result.push('\n'),
            c if c.is_control() => {}
            c => result.push(c),
        }
    }

    result
}

/// split one line into pieces of at most `width` columns
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![];
    }
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_joins_partial_lines() {
        let mut view = DetailView::default();
        view.append("hel");
        view.append("lo\nwor");
        assert_eq!(view.line_count(), 2);
        view.append("ld\n");

        let lines: Vec<&str> = view.iter_lines().collect();
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn test_buffer_discards_oldest_lines() {
        let mut view = DetailView::new(3);
        view.append("1\n2\n3\n4\n5\n");

        assert_eq!(view.to_plain_string(), "3\n4\n5");
        assert_eq!(view.discarded(), 2);
    }

    #[test]
    fn test_heading_reports_dropped_lines() {
        let mut view = DetailView::new(2);
        assert_eq!(view.heading(), None);

        view.set_title("logs default/pod/web");
        view.append("a\nb\n");
        assert_eq!(view.heading().as_deref(), Some("logs default/pod/web"));

        view.append("c\nd\ne\n");
        assert_eq!(
            view.heading().as_deref(),
            Some("logs default/pod/web (3 older lines dropped)")
        );

        view.clear();
        view.set_title("logs default/pod/api");
        assert_eq!(view.heading().as_deref(), Some("logs default/pod/api"));
    }

    #[test]
    fn test_set_text_replaces_content() {
        let mut view = DetailView::default();
        view.append("streamed\n");
        view.set_text("Name: web\nStatus: Running");
        assert_eq!(view.to_plain_string(), "Name: web\nStatus: Running");
    }

    #[test]
    fn test_clear_resets_title_and_lines() {
        let mut view = DetailView::default();
        view.set_title("pod/web");
        view.append("x\n");
        view.clear();
        assert!(view.is_empty());
        assert!(view.title().is_none());
    }

    #[test]
    fn test_sanitize_removes_ansi_and_carriage_returns() {
        assert_eq!(
            sanitize_control_chars("\x1b[31mred\x1b[0m\r\nok"),
            "red\nok"
        );
    }

    #[test]
    fn test_sanitize_expands_tabs() {
        assert_eq!(sanitize_control_chars("a\tb"), "a    b");
    }

    #[test]
    fn test_wrap_line_by_width() {
        assert_eq!(wrap_line("hello world", 5), vec!["hello", " worl", "d"]);
        assert_eq!(wrap_line("", 5), vec![""]);
        assert!(wrap_line("abc", 0).is_empty());
    }

    #[test]
    fn test_wrap_line_counts_wide_chars() {
        assert_eq!(wrap_line("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn test_to_lines_modes() {
        let mut view = DetailView::default();
        view.append("abcdef\ngh");

        let wrapped = view.to_lines(4, WrappingMode::Wrapped);
        let wrapped: Vec<String> = wrapped.iter().map(|l| l.to_string()).collect();
        assert_eq!(wrapped, vec!["abcd", "ef", "gh"]);

        let unwrapped = view.to_lines(4, WrappingMode::Unwrapped);
        assert_eq!(unwrapped.len(), 2);
        assert_eq!(view.content_width(), 6);
    }
}
