use super::{App, SCROLL_PAD};

impl App {
    /// Scroll the tree so the selected line stays inside the viewport, with
    /// `SCROLL_PAD` lines of context where possible.
    pub(super) fn ensure_selection_visible(&mut self) {
        let (Some(line), Some(area)) = (
            self.browser.tree().selected_line(),
            self.last_tree_content_area,
        ) else {
            return;
        };

        let viewport_height = area.height as usize;
        if viewport_height == 0 {
            return;
        }

        // keep the block's line count current for the clamp below
        self.tree_block
            .set_lines_count(self.browser.tree().visible_line_count());

        let index = line.saturating_sub(1);
        let top = self.tree_block.get_scroll_position();
        let pad = SCROLL_PAD.min(viewport_height.saturating_sub(1) / 2);

        let new_top = if index < top + pad {
            index.saturating_sub(pad)
        } else if index + pad >= top + viewport_height {
            index + pad + 1 - viewport_height
        } else {
            top
        };

        if new_top != top {
            log::debug!("Scrolling tree from {} to {}", top, new_top);
            self.tree_block.set_scroll_position(new_top, viewport_height);
        }
    }
}
