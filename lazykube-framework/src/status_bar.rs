use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Short-lived footer message.
pub struct DisplayEvent {
    pub text: String,
    pub style: Style,
    duration: Duration,
    start_time: Instant,
}

impl DisplayEvent {
    pub fn new(text: impl Into<String>, duration: Duration, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            duration,
            start_time: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }

    pub fn check_and_clear(event: Option<Self>) -> Option<Self> {
        event.filter(|e| !e.is_expired())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StatusGravity {
    Left,
    Mid,
    Right,
}

struct StatusSegment {
    text: String,
    style: Style,
}

/// One-line footer with left, centered and right-aligned segments.
#[derive(Default)]
pub struct StatusBar {
    left_segments: Vec<StatusSegment>,
    mid_segments: Vec<StatusSegment>,
    right_segments: Vec<StatusSegment>,
    style: Style,
}

impl StatusBar {
    const SEPARATOR: &'static str = " | ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_status(mut self, gravity: StatusGravity, text: impl Into<String>, style: Style) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        let segment = StatusSegment { text, style };
        match gravity {
            StatusGravity::Left => self.left_segments.push(segment),
            StatusGravity::Mid => self.mid_segments.push(segment),
            StatusGravity::Right => self.right_segments.push(segment),
        }
        self
    }

    pub fn set_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn build_gravity_spans(segments: &[StatusSegment]) -> (Vec<Span<'_>>, usize) {
        let mut spans = Vec::new();
        let mut total_width = 0;
        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(Self::SEPARATOR));
                total_width += Self::SEPARATOR.width();
            }
            spans.push(Span::styled(seg.text.as_str(), seg.style));
            total_width += seg.text.width();
        }
        (spans, total_width)
    }

    fn line(&self, total_width: usize) -> Line<'_> {
        let (left_spans, left_len) = Self::build_gravity_spans(&self.left_segments);
        let (mid_spans, mid_len) = Self::build_gravity_spans(&self.mid_segments);
        let (right_spans, right_len) = Self::build_gravity_spans(&self.right_segments);

        let mid_start = total_width.saturating_sub(mid_len) / 2;
        let left_to_mid = mid_start.saturating_sub(left_len);
        let right_start = total_width.saturating_sub(right_len);
        let mid_to_right = right_start.saturating_sub(mid_start.max(left_len) + mid_len);

        let mut spans = left_spans;
        spans.push(Span::raw(" ".repeat(left_to_mid)));
        spans.extend(mid_spans);
        spans.push(Span::raw(" ".repeat(mid_to_right)));
        spans.extend(right_spans);
        Line::from(spans)
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line(area.width as usize))
            .style(self.style)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_land_on_their_side() {
        let bar = StatusBar::new()
            .add_status(StatusGravity::Left, "idle", Style::default())
            .add_status(StatusGravity::Mid, "?: help", Style::default())
            .add_status(StatusGravity::Right, "v1", Style::default());

        let text = bar.line(21).to_string();
        assert_eq!(text.chars().count(), 21);
        assert!(text.starts_with("idle"));
        assert!(text.ends_with("v1"));
        assert_eq!(text.find("?: help"), Some(7));
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let bar = StatusBar::new()
            .add_status(StatusGravity::Left, "", Style::default())
            .add_status(StatusGravity::Left, "a", Style::default())
            .add_status(StatusGravity::Left, "b", Style::default());
        assert!(bar.line(10).to_string().starts_with("a | b"));
    }

    #[test]
    fn test_display_event_expires() {
        let event = DisplayEvent::new("copied", Duration::ZERO, Style::default());
        assert!(DisplayEvent::check_and_clear(Some(event)).is_none());

        let event = DisplayEvent::new("copied", Duration::from_secs(60), Style::default());
        assert!(DisplayEvent::check_and_clear(Some(event)).is_some());
    }
}
