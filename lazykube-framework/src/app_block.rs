use crate::theme;
use ratatui::{
    layout::Rect,
    prelude::Stylize,
    style::{Color, Style},
    symbols::scrollbar,
    text::Line,
    widgets::{
        Block, BorderType, Borders, Padding, Scrollbar, ScrollbarOrientation, ScrollbarState,
    },
};
use uuid::Uuid;

fn border_color(focused: bool) -> Color {
    if focused {
        theme::FOCUSED_BORDER_COLOR
    } else {
        theme::BORDER_COLOR
    }
}

/// Panel chrome plus the scroll state of whatever the panel shows.
pub struct AppBlock {
    id: Uuid,
    title: Option<String>,
    padding: Option<Padding>,
    lines_count: usize,
    scroll_position: usize,
    scrollbar_state: ScrollbarState,
    horizontal_scroll_position: usize,
    horizontal_scrollbar_state: ScrollbarState,
}

impl AppBlock {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: None,
            padding: None,
            lines_count: 0,
            scroll_position: 0,
            scrollbar_state: ScrollbarState::default(),
            horizontal_scroll_position: 0,
            horizontal_scrollbar_state: ScrollbarState::default(),
        }
    }

    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.update_title(title);
        self
    }

    pub fn set_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = Some(format!("─{}", title.into()));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn build(&self, focused: bool) -> Block<'_> {
        let mut block = Block::default()
            .borders(Borders::TOP | Borders::LEFT)
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(border_color(focused)));

        if let Some(title) = &self.title {
            let title_style = if focused {
                Style::new().bold()
            } else {
                Style::new()
            };
            block = block.title(Line::from(title.as_str()).style(title_style).left_aligned());
        }

        if let Some(padding) = self.padding {
            block = block.padding(padding);
        }

        block
    }

    /// area left for content inside the borders and padding
    pub fn get_content_rect(&self, area: Rect) -> Rect {
        self.build(false).inner(area)
    }

    pub fn set_lines_count(&mut self, lines_count: usize) {
        self.lines_count = lines_count;
    }

    pub fn get_lines_count(&self) -> usize {
        self.lines_count
    }

    pub fn get_scroll_position(&self) -> usize {
        self.scroll_position
    }

    /// Scroll to `position`, keeping the last page full.
    pub fn set_scroll_position(&mut self, position: usize, viewport_height: usize) {
        let max_top = self.lines_count.saturating_sub(viewport_height.max(1));
        self.scroll_position = position.min(max_top);
        self.update_scrollbar_state();
    }

    pub fn is_at_bottom(&self, viewport_height: usize) -> bool {
        self.scroll_position + viewport_height.max(1) >= self.lines_count
    }

    pub fn scroll_to_bottom(&mut self, viewport_height: usize) {
        self.set_scroll_position(usize::MAX, viewport_height);
    }

    fn update_scrollbar_state(&mut self) {
        // an empty panel shows a full-height thumb
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(self.lines_count.max(1))
            .position(self.scroll_position);
    }

    pub fn get_scrollbar_state(&mut self) -> &mut ScrollbarState {
        &mut self.scrollbar_state
    }

    pub fn get_horizontal_scroll_position(&self) -> usize {
        self.horizontal_scroll_position
    }

    pub fn scroll_horizontally(&mut self, delta: isize) {
        self.horizontal_scroll_position = self.horizontal_scroll_position.saturating_add_signed(delta);
    }

    pub fn update_horizontal_scrollbar_state(&mut self, content_width: usize, viewport_width: usize) {
        let overflow = content_width.saturating_sub(viewport_width);
        self.horizontal_scroll_position = self.horizontal_scroll_position.min(overflow);
        self.horizontal_scrollbar_state = self
            .horizontal_scrollbar_state
            .content_length(overflow.max(1))
            .position(self.horizontal_scroll_position);
    }

    pub fn get_horizontal_scrollbar_state(&mut self) -> &mut ScrollbarState {
        &mut self.horizontal_scrollbar_state
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_position = 0;
        self.horizontal_scroll_position = 0;
        self.update_scrollbar_state();
    }

    pub fn create_scrollbar(focused: bool) -> Scrollbar<'static> {
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(scrollbar::VERTICAL)
            .style(Style::default().fg(border_color(focused)))
            .begin_symbol(Some("╮"))
            .end_symbol(Some("╯"))
            .track_symbol(Some("│"))
            .thumb_symbol("█")
    }

    pub fn create_horizontal_scrollbar(focused: bool, overflowing: bool) -> Scrollbar<'static> {
        // without overflow the thumb looks like the track
        let thumb = if overflowing { "🬋" } else { "─" };
        Scrollbar::new(ScrollbarOrientation::HorizontalBottom)
            .symbols(scrollbar::HORIZONTAL)
            .style(Style::default().fg(border_color(focused)))
            .begin_symbol(Some("╰"))
            .end_symbol(Some("─"))
            .track_symbol(Some("─"))
            .thumb_symbol(thumb)
    }
}

impl Default for AppBlock {
    fn default() -> Self {
        Self::new()
    }
}
