use super::{App, HORIZONTAL_SCROLL_STEP};
use uuid::Uuid;

impl App {
    fn viewport_height_of(&self, block_id: Uuid) -> usize {
        if block_id == self.tree_block.id() {
            self.last_tree_content_area
                .map(|area| area.height as usize)
                .unwrap_or(0)
        } else if block_id == self.details_block.id() {
            self.details_viewport_height
        } else {
            // diagnostics block has a fixed height
            super::DIAGNOSTICS_HEIGHT.saturating_sub(2) as usize
        }
    }

    /// Scroll a block by one line.
    ///
    /// Scrolling the details up stops following the feed; reaching the
    /// bottom again resumes it.
    pub(super) fn handle_vertical_scrolling(&mut self, block_id: Uuid, move_down: bool) {
        let viewport_height = self.viewport_height_of(block_id);
        let Some(block) = self.block_mut(block_id) else {
            return;
        };

        let position = block.get_scroll_position();
        let new_position = if move_down {
            position.saturating_add(1)
        } else {
            position.saturating_sub(1)
        };
        block.set_scroll_position(new_position, viewport_height);
        let at_bottom = block.is_at_bottom(viewport_height);

        if block_id == self.details_block.id() {
            self.follow_details = at_bottom;
        }
    }

    pub(super) fn scroll_to_edge(&mut self, block_id: Uuid, bottom: bool) {
        let viewport_height = self.viewport_height_of(block_id);
        let Some(block) = self.block_mut(block_id) else {
            return;
        };

        if bottom {
            block.scroll_to_bottom(viewport_height);
        } else {
            block.set_scroll_position(0, viewport_height);
        }
        let at_bottom = block.is_at_bottom(viewport_height);

        if block_id == self.details_block.id() {
            self.follow_details = at_bottom;
        }
    }

    /// only the details block scrolls sideways
    pub(super) fn handle_horizontal_scrolling(&mut self, move_right: bool) {
        let step = if move_right {
            HORIZONTAL_SCROLL_STEP
        } else {
            -HORIZONTAL_SCROLL_STEP
        };
        self.details_block.scroll_horizontally(step);
    }

    fn block_mut(&mut self, block_id: Uuid) -> Option<&mut crate::app_block::AppBlock> {
        if block_id == self.tree_block.id() {
            Some(&mut self.tree_block)
        } else if block_id == self.details_block.id() {
            Some(&mut self.details_block)
        } else if block_id == self.diagnostics_block.id() {
            Some(&mut self.diagnostics_block)
        } else {
            None
        }
    }
}
