use super::App;
use crate::{detail_view::WrappingMode, theme};
use anyhow::Result;
use arboard::Clipboard;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

impl App {
    pub(super) fn handle_mouse_event(&mut self, mouse: &MouseEvent) -> Result<()> {
        let Some(block_under_mouse) = self.get_block_under_mouse(mouse.column, mouse.row) else {
            return Ok(());
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.set_hard_focused_block(block_under_mouse);
                if block_under_mouse == self.tree_block.id() {
                    self.handle_tree_click(mouse.column, mouse.row);
                }
            }
            MouseEventKind::ScrollDown => {
                if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                    self.handle_horizontal_scrolling(true);
                } else {
                    self.handle_vertical_scrolling(block_under_mouse, true);
                }
            }
            MouseEventKind::ScrollUp => {
                if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                    self.handle_horizontal_scrolling(false);
                } else {
                    self.handle_vertical_scrolling(block_under_mouse, false);
                }
            }
            MouseEventKind::ScrollLeft => self.handle_horizontal_scrolling(false),
            MouseEventKind::ScrollRight => self.handle_horizontal_scrolling(true),
            _ => {}
        }
        Ok(())
    }

    // rows map to lines of the render currently on screen
    fn handle_tree_click(&mut self, column: u16, row: u16) {
        let Some(content) = self.last_tree_content_area else {
            return;
        };
        if !self.is_mouse_in_area(column, row, content) {
            return;
        }

        let line = (row - content.y) as usize + self.tree_block.get_scroll_position() + 1;
        if self.browser.activate_line(line) {
            self.after_activation();
        }
    }

    fn after_activation(&mut self) {
        self.follow_details = true;
        self.details_block.reset_scroll();
        self.ensure_selection_visible();
    }

    pub(super) fn yank_details(&mut self) -> Result<()> {
        let details = self.browser.details();
        if details.is_empty() {
            log::debug!("Nothing to copy");
            return Ok(());
        }

        let content = details.to_plain_string();
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(&content)?;

        log::debug!("Copied {} chars to clipboard", content.len());
        self.set_display_event("Details copied to clipboard", None);
        Ok(())
    }

    fn reload(&mut self) {
        match self.browser.reload() {
            Ok(()) => {
                self.tree_block.reset_scroll();
                self.details_block.reset_scroll();
                self.follow_details = true;
                self.set_display_event("Namespaces reloaded", None);
            }
            Err(e) => {
                log::error!("Reload failed: {}", e);
                self.set_display_event(format!("Reload failed: {}", e), Some(theme::ERROR_STYLE));
            }
        }
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // help popup mode has higher priority
        if self.show_help_popup {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => {
                    self.show_help_popup = false;
                    return Ok(());
                }
                KeyCode::Char('q') => {
                    // let 'q' fall through to quit the program
                }
                _ => return Ok(()),
            }
        }

        let focused_block = self.hard_focused_block_id;
        let tree_focused = focused_block == self.tree_block.id();

        match key.code {
            KeyCode::Char('q') => {
                log::debug!("Quit key pressed");
                self.is_exiting = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.is_exiting = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if tree_focused {
                    if self.browser.move_selection(1) {
                        self.after_activation();
                    }
                } else {
                    self.handle_vertical_scrolling(focused_block, true);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if tree_focused {
                    if self.browser.move_selection(-1) {
                        self.after_activation();
                    }
                } else {
                    self.handle_vertical_scrolling(focused_block, false);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.browser.activate_selected() {
                    self.after_activation();
                }
            }
            KeyCode::Char('g') => self.scroll_to_edge(focused_block, false),
            KeyCode::Char('G') => self.scroll_to_edge(focused_block, true),
            KeyCode::Char('h') | KeyCode::Left => self.handle_horizontal_scrolling(false),
            KeyCode::Char('l') | KeyCode::Right => self.handle_horizontal_scrolling(true),
            KeyCode::Char('d') => {
                self.browser.describe_selected();
                self.details_block.reset_scroll();
                self.follow_details = false;
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('c') => {
                self.browser.details_mut().clear();
                self.details_block.reset_scroll();
                self.follow_details = true;
            }
            KeyCode::Char('w') => {
                self.wrapping_mode = match self.wrapping_mode {
                    WrappingMode::Wrapped => WrappingMode::Unwrapped,
                    WrappingMode::Unwrapped => WrappingMode::Wrapped,
                };
                let message = match self.wrapping_mode {
                    WrappingMode::Wrapped => "Text wrapping enabled",
                    WrappingMode::Unwrapped => "Text wrapping disabled",
                };
                log::debug!("{}", message);
                self.set_display_event(message, None);
            }
            KeyCode::Char('y') => {
                if let Err(e) = self.yank_details() {
                    log::warn!("Failed to copy details: {}", e);
                }
            }
            KeyCode::Char('b') => {
                self.show_diagnostics = !self.show_diagnostics;
                if !self.show_diagnostics && focused_block == self.diagnostics_block.id() {
                    self.set_hard_focused_block(self.tree_block.id());
                }
                log::debug!("Diagnostics visibility toggled: {}", self.show_diagnostics);
            }
            KeyCode::Char('1') => self.set_hard_focused_block(self.tree_block.id()),
            KeyCode::Char('2') => self.set_hard_focused_block(self.details_block.id()),
            KeyCode::Char('3') => {
                if self.show_diagnostics {
                    self.set_hard_focused_block(self.diagnostics_block.id());
                }
            }
            KeyCode::Char('?') => self.show_help_popup = !self.show_help_popup,
            _ => {}
        }
        Ok(())
    }
}
