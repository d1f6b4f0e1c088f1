use super::{App, HELP_POPUP_WIDTH, ScrollableBlockType};
use crate::{
    ansi,
    app_block::AppBlock,
    detail_view::WrappingMode,
    session::SessionState,
    status_bar::{StatusBar, StatusGravity},
    theme,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

fn diagnostic_style(entry: &str) -> Style {
    if entry.contains(" ERROR ") {
        theme::ERROR_STYLE
    } else if entry.contains(" WARN ") {
        theme::WARN_STYLE
    } else if entry.contains(" DEBUG ") || entry.contains(" TRACE ") {
        theme::DEBUG_STYLE
    } else {
        theme::INFO_STYLE
    }
}

impl App {
    pub(super) fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let sessions = self.browser.sessions();
        let (session_text, session_style) = match (sessions.state(), sessions.active_leaf()) {
            (SessionState::Streaming, Some(leaf)) => (
                format!("● streaming {}", leaf),
                Style::default().fg(theme::STREAMING_COLOR),
            ),
            (SessionState::Cancelling, _) => (
                "○ stopping".to_string(),
                Style::default().fg(theme::FOOTER_DIM_COLOR),
            ),
            _ => ("○ idle".to_string(), Style::default().fg(theme::FOOTER_DIM_COLOR)),
        };

        let mut status_bar = StatusBar::new();
        if let Some(event) = &self.display_event {
            status_bar = status_bar
                .add_status(StatusGravity::Mid, event.text.as_str(), Style::default())
                .set_style(event.style);
        } else {
            let wrap_text = match self.wrapping_mode {
                WrappingMode::Wrapped => "wrap on",
                WrappingMode::Unwrapped => "wrap off",
            };
            let dim = Style::default().fg(theme::FOOTER_DIM_COLOR);
            status_bar = status_bar
                .add_status(StatusGravity::Left, session_text, session_style)
                .add_status(StatusGravity::Mid, "?: help | q: quit", Style::default())
                .add_status(StatusGravity::Right, wrap_text, dim)
                .add_status(
                    StatusGravity::Right,
                    format!("v{}", env!("CARGO_PKG_VERSION")),
                    dim,
                );
        }

        status_bar.render(area, buf);
    }

    pub(super) fn render_help_popup(&self, area: Rect, buf: &mut Buffer) {
        let help_text = vec![
            Line::from("Navigation:".bold()),
            Line::from("  j/k/↑/↓  - Select prev/next resource (scroll in other panels)"),
            Line::from("  enter    - Open the selected resource again"),
            Line::from("  g/G      - Jump to top/bottom"),
            Line::from("  h/l/←/→  - Scroll details horizontally"),
            Line::from(""),
            Line::from("Actions:".bold()),
            Line::from("  d        - Describe the selected resource"),
            Line::from("  r        - Reload namespaces"),
            Line::from("  c        - Clear details"),
            Line::from("  w        - Toggle text wrapping"),
            Line::from("  y        - Copy details to clipboard"),
            Line::from("  b        - Toggle diagnostics panel"),
            Line::from("  q        - Quit program"),
            Line::from(""),
            Line::from("Focus:".bold()),
            Line::from("  1/2/3    - Focus resources/details/diagnostics"),
            Line::from("  click    - Open a resource or focus a panel"),
        ];

        // content lines + 2 for borders
        let popup_height = help_text.len() as u16 + 2;

        let popup_area = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(popup_height),
            Constraint::Fill(1),
        ])
        .split(area)[1];

        let popup_area = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(HELP_POPUP_WIDTH),
            Constraint::Fill(1),
        ])
        .split(popup_area)[1];

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::TEXT_FG_COLOR));

        Paragraph::new(help_text)
            .block(block)
            .fg(theme::TEXT_FG_COLOR)
            .render(popup_area, buf);
    }

    pub(super) fn render_tree(&mut self, area: Rect, buf: &mut Buffer) {
        self.last_tree_area = Some(area);
        let is_focused = self.is_focused(self.tree_block.id());

        let [content_area, scrollbar_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)])
                .margin(0)
                .areas(area);

        let inner = self.tree_block.get_content_rect(content_area);
        self.last_tree_content_area = Some(inner);

        // this render is what mouse rows are routed against
        let text = self.browser.render_tree(inner.width as usize);
        let lines_count = self.browser.tree().visible_line_count();

        let viewport_height = inner.height as usize;
        self.tree_block.set_lines_count(lines_count);
        let scroll_position = self.tree_block.get_scroll_position();
        self.tree_block
            .set_scroll_position(scroll_position, viewport_height);

        Paragraph::new(ansi::to_text(&text))
            .block(self.tree_block.build(is_focused))
            .scroll((self.tree_block.get_scroll_position() as u16, 0))
            .render(content_area, buf);

        StatefulWidget::render(
            AppBlock::create_scrollbar(is_focused),
            scrollbar_area,
            buf,
            self.tree_block.get_scrollbar_state(),
        );
    }

    pub(super) fn render_details(&mut self, area: Rect, buf: &mut Buffer) {
        if let Some(title) = self.browser.details().heading() {
            self.details_block.update_title(format!("[2]─{}", title));
        } else {
            self.details_block.update_title("[2]─Details");
        }

        // wrapping width, same split as render_scrollable_block
        let [vertical_content_area, _] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)])
                .margin(0)
                .areas(area);
        let [content_area, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
            .margin(0)
            .areas(vertical_content_area);
        let inner = self.details_block.get_content_rect(content_area);

        let details = self.browser.details();
        let (content, max_content_width) = if details.is_empty() {
            (
                vec![Line::from("Select a pod to follow its log...".italic())],
                0,
            )
        } else {
            let lines = details.to_lines(inner.width, self.wrapping_mode);
            let width = match self.wrapping_mode {
                WrappingMode::Wrapped => inner.width as usize,
                WrappingMode::Unwrapped => details.content_width(),
            };
            (lines, width)
        };

        self.render_scrollable_block(
            area,
            buf,
            ScrollableBlockType::Details,
            content,
            max_content_width,
        );
    }

    pub(super) fn render_diagnostics(&mut self, area: Rect, buf: &mut Buffer) {
        let (lines, max_content_width) = match self.diagnostics.lock() {
            Ok(entries) if entries.is_empty() => (vec![Line::from("No diagnostics...".italic())], 0),
            Ok(entries) => {
                // most recent first
                let lines = entries
                    .iter()
                    .rev()
                    .map(|entry| Line::styled(entry.clone(), diagnostic_style(entry)))
                    .collect();
                let width = entries.iter().map(|entry| entry.width()).max().unwrap_or(0);
                (lines, width)
            }
            Err(_) => (vec![Line::from("Failed to read diagnostics...".italic())], 0),
        };

        self.render_scrollable_block(
            area,
            buf,
            ScrollableBlockType::Diagnostics,
            lines,
            max_content_width,
        );
    }

    /// Common rendering for the details and diagnostics blocks
    fn render_scrollable_block(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        block_type: ScrollableBlockType,
        content: Vec<Line<'static>>,
        max_content_width: usize,
    ) {
        let block_id = match block_type {
            ScrollableBlockType::Details => {
                self.last_details_area = Some(area);
                self.details_block.id()
            }
            ScrollableBlockType::Diagnostics => self.diagnostics_block.id(),
        };
        let is_focused = self.is_focused(block_id);
        let follow = matches!(block_type, ScrollableBlockType::Details) && self.follow_details;

        let [vertical_content_area, scrollbar_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)])
                .margin(0)
                .areas(area);
        let [content_area, horizontal_scrollbar_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
                .margin(0)
                .areas(vertical_content_area);

        let block = match block_type {
            ScrollableBlockType::Details => &mut self.details_block,
            ScrollableBlockType::Diagnostics => &mut self.diagnostics_block,
        };

        let content_rect = block.get_content_rect(content_area);
        let viewport_height = content_rect.height as usize;
        let overflowing = max_content_width > content_rect.width as usize;

        block.set_lines_count(content.len());
        if follow {
            block.scroll_to_bottom(viewport_height);
        } else {
            let position = block.get_scroll_position();
            block.set_scroll_position(position, viewport_height);
        }
        block.update_horizontal_scrollbar_state(max_content_width, content_rect.width as usize);

        let scroll = (
            block.get_scroll_position() as u16,
            block.get_horizontal_scroll_position() as u16,
        );

        Paragraph::new(content)
            .block(block.build(is_focused))
            .fg(theme::TEXT_FG_COLOR)
            .scroll(scroll)
            .render(content_area, buf);

        StatefulWidget::render(
            AppBlock::create_scrollbar(is_focused),
            scrollbar_area,
            buf,
            block.get_scrollbar_state(),
        );
        StatefulWidget::render(
            AppBlock::create_horizontal_scrollbar(is_focused, overflowing),
            horizontal_scrollbar_area,
            buf,
            block.get_horizontal_scrollbar_state(),
        );

        if matches!(block_type, ScrollableBlockType::Details) {
            self.details_viewport_height = viewport_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_style_by_level() {
        assert_eq!(
            diagnostic_style("12:00:00.000 ERROR listing failed"),
            theme::ERROR_STYLE
        );
        assert_eq!(diagnostic_style("12:00:00.000 WARN  slow"), theme::WARN_STYLE);
        assert_eq!(diagnostic_style("12:00:00.000 DEBUG x"), theme::DEBUG_STYLE);
        assert_eq!(diagnostic_style("12:00:00.000 INFO  ok"), theme::INFO_STYLE);
    }
}
