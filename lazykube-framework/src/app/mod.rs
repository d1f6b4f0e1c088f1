use crate::{
    app_block::AppBlock,
    browser::{Browser, Services},
    detail_view::{DEFAULT_MAX_DETAIL_LINES, WrappingMode},
    session::DEFAULT_QUEUE_CAPACITY,
    status_bar::DisplayEvent,
    theme,
    ui_logger::{self, Diagnostics},
};
use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event};
use log::LevelFilter;
use ratatui::{Terminal, backend::CrosstermBackend, prelude::*, widgets::Widget};
use std::{
    io,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use uuid::Uuid;

mod events;
mod render;
mod scrolling;
mod selection;

// constants
const DEFAULT_EVENT_POLL_INTERVAL_MS: u64 = 16;
const DEFAULT_SESSION_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_TREE_WIDTH_PERCENT: u16 = 30;
const HELP_POPUP_WIDTH: u16 = 60;
const SCROLL_PAD: usize = 1;
const HORIZONTAL_SCROLL_STEP: isize = 5;
const DISPLAY_EVENT_DURATION_MS: u64 = 1200;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);
const DIAGNOSTICS_HEIGHT: u16 = 8;

#[derive(Clone)]
pub struct AppDesc {
    pub event_poll_interval: Duration,
    pub session_poll_interval: Duration,
    pub queue_capacity: usize,
    pub max_detail_lines: usize,
    pub show_diagnostics: bool,
    pub tree_width_percent: u16,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// raised from outside (e.g. a signal handler) to leave the run loop
    pub exit_requested: Arc<AtomicBool>,
}

impl AppDesc {
    pub fn new() -> Self {
        Self {
            event_poll_interval: Duration::from_millis(DEFAULT_EVENT_POLL_INTERVAL_MS),
            session_poll_interval: Duration::from_millis(DEFAULT_SESSION_POLL_INTERVAL_MS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_detail_lines: DEFAULT_MAX_DETAIL_LINES,
            show_diagnostics: false,
            tree_width_percent: DEFAULT_TREE_WIDTH_PERCENT,
            log_level: LevelFilter::Info,
            log_file: None,
            exit_requested: Arc::default(),
        }
    }
}

impl Default for AppDesc {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the browser with default configuration
pub fn start_with_services(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    services: Services,
) -> Result<()> {
    start_with_desc(terminal, services, AppDesc::new())
}

/// Start the browser with custom configuration
///
/// Fails when the first namespace listing fails; everything after that is
/// reported in the diagnostics panel instead.
pub fn start_with_desc(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    services: Services,
    desc: AppDesc,
) -> Result<()> {
    color_eyre::install().or(Err(anyhow!("Error installing color_eyre")))?;
    let diagnostics = ui_logger::init(desc.log_level, desc.log_file.as_deref())?;

    let browser = Browser::new(services, &desc).context("Cannot list namespaces")?;
    let app = App::new(browser, diagnostics, &desc);
    app.run(terminal, &desc)
}

#[derive(Copy, Clone)]
pub(super) enum ScrollableBlockType {
    Details,
    Diagnostics,
}

struct App {
    is_exiting: bool,
    browser: Browser,
    diagnostics: Diagnostics, // entries shown in the diagnostics block
    hard_focused_block_id: Uuid, // set by clicking or number keys
    tree_block: AppBlock,
    details_block: AppBlock,
    diagnostics_block: AppBlock,
    last_tree_area: Option<Rect>,
    last_tree_content_area: Option<Rect>, // rows inside here map to tree lines
    last_details_area: Option<Rect>,
    last_diagnostics_area: Option<Rect>,
    details_viewport_height: usize,
    follow_details: bool, // keep the newest detail line in view
    wrapping_mode: WrappingMode,
    tree_width_percent: u16,
    show_diagnostics: bool,
    show_help_popup: bool,
    display_event: Option<DisplayEvent>,
}

// ============================================================================
// Initialization
// ============================================================================
impl App {
    fn new(browser: Browser, diagnostics: Diagnostics, desc: &AppDesc) -> Self {
        let tree_block = AppBlock::new().set_title("[1]─Resources");
        let details_block = AppBlock::new()
            .set_title("[2]─Details")
            .set_padding(ratatui::widgets::Padding::horizontal(1));
        let diagnostics_block = AppBlock::new()
            .set_title("[3]─Diagnostics")
            .set_padding(ratatui::widgets::Padding::horizontal(1));

        let tree_block_id = tree_block.id();

        Self {
            is_exiting: false,
            browser,
            diagnostics,
            hard_focused_block_id: tree_block_id,
            tree_block,
            details_block,
            diagnostics_block,
            last_tree_area: None,
            last_tree_content_area: None,
            last_details_area: None,
            last_diagnostics_area: None,
            details_viewport_height: 0,
            follow_details: true,
            wrapping_mode: WrappingMode::Wrapped,
            tree_width_percent: desc.tree_width_percent.clamp(10, 90),
            show_diagnostics: desc.show_diagnostics,
            show_help_popup: false,
            display_event: None,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================
impl App {
    fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        desc: &AppDesc,
    ) -> Result<()> {
        let session_poll_interval = desc.session_poll_interval;
        let event_poll_interval = desc.event_poll_interval;
        let mut last_pump = Instant::now();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> Result<()> {
            while !self.is_exiting {
                self.poll_event(event_poll_interval)?;
                self.check_exit_request(&desc.exit_requested);

                if last_pump.elapsed() >= session_poll_interval {
                    self.pump_browser();
                    last_pump = Instant::now();
                }

                self.check_and_clear_expired_event();
                terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            }
            Ok(())
        }));

        // stop session workers before returning
        self.cleanup();

        match result {
            Ok(r) => r,
            Err(_) => {
                eprintln!("Application panicked, terminal restored");
                std::process::exit(1);
            }
        }
    }

    fn cleanup(&mut self) {
        log::debug!("Waiting for session workers to finish...");
        self.browser.shutdown(SHUTDOWN_TIMEOUT);
    }

    fn poll_event(&mut self, poll_interval: Duration) -> Result<()> {
        if event::poll(poll_interval)? {
            match event::read()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Mouse(mouse) => self.handle_mouse_event(&mouse)?,
                Event::Resize(width, height) => {
                    log::debug!("Terminal resized to {}x{}", width, height);
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn check_exit_request(&mut self, exit_requested: &AtomicBool) {
        if exit_requested.load(Ordering::Acquire) && !self.is_exiting {
            log::info!("Exit requested, stopping");
            self.is_exiting = true;
        }
    }

    fn pump_browser(&mut self) {
        // following the feed is applied when the details block is laid out
        self.browser.pump();
    }
}

// ============================================================================
// Focus management
// ============================================================================
impl App {
    fn set_hard_focused_block(&mut self, block_id: Uuid) {
        self.hard_focused_block_id = block_id;
    }

    fn is_focused(&self, block_id: Uuid) -> bool {
        self.hard_focused_block_id == block_id
    }

    fn is_mouse_in_area(&self, column: u16, row: u16, area: Rect) -> bool {
        area.contains(Position::new(column, row))
    }

    fn get_block_under_mouse(&self, column: u16, row: u16) -> Option<Uuid> {
        if let Some(area) = self.last_tree_area
            && self.is_mouse_in_area(column, row, area)
        {
            return Some(self.tree_block.id());
        }

        if let Some(area) = self.last_details_area
            && self.is_mouse_in_area(column, row, area)
        {
            return Some(self.details_block.id());
        }

        if let Some(area) = self.last_diagnostics_area
            && self.is_mouse_in_area(column, row, area)
        {
            return Some(self.diagnostics_block.id());
        }

        None
    }
}

// ============================================================================
// Display events
// ============================================================================
impl App {
    /// Show a message in the footer for a short while
    fn set_display_event(&mut self, text: impl Into<String>, style: Option<Style>) {
        self.display_event = Some(DisplayEvent::new(
            text,
            Duration::from_millis(DISPLAY_EVENT_DURATION_MS),
            style.unwrap_or(theme::DISPLAY_EVENT_STYLE),
        ));
    }

    /// Check if the current display event has expired and clear it if so
    fn check_and_clear_expired_event(&mut self) {
        self.display_event = DisplayEvent::check_and_clear(self.display_event.take());
    }
}

// ============================================================================
// Widget implementation
// ============================================================================
impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (main_area, diagnostics_area, footer_area) = if self.show_diagnostics {
            let [main, diagnostics_area, footer_area] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(DIAGNOSTICS_HEIGHT),
                Constraint::Length(1),
            ])
            .areas(area);
            (main, Some(diagnostics_area), footer_area)
        } else {
            let [main, footer_area] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            (main, None, footer_area)
        };

        let [tree_area, details_area] = Layout::horizontal([
            Constraint::Percentage(self.tree_width_percent),
            Constraint::Fill(1),
        ])
        .areas(main_area);

        self.render_tree(tree_area, buf);
        self.render_details(details_area, buf);
        self.last_diagnostics_area = diagnostics_area;
        if let Some(diagnostics_area) = diagnostics_area {
            self.render_diagnostics(diagnostics_area, buf);
        }
        self.render_footer(footer_area, buf);

        // render help popup on top if visible
        if self.show_help_popup {
            self.render_help_popup(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{LookupError, StreamError},
        resource::{CategoryRef, LeafRef},
        source::{Inventory, LogSource, LogStream},
    };

    struct NoInventory;

    impl Inventory for NoInventory {
        fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
            Ok(vec!["default".to_string()])
        }

        fn list_children(&self, _category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
            Ok(Vec::new())
        }
    }

    struct NoLogs;

    impl LogSource for NoLogs {
        fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
            Err(StreamError::Open {
                target: leaf.to_string(),
                reason: "no logs here".to_string(),
            })
        }
    }

    #[test]
    fn test_exit_request_stops_the_loop() {
        let desc = AppDesc::new();
        let services = Services {
            inventory: Box::new(NoInventory),
            logs: Arc::new(NoLogs),
            describer: None,
        };
        let browser = Browser::new(services, &desc).unwrap();
        let mut app = App::new(browser, Diagnostics::default(), &desc);

        app.check_exit_request(&desc.exit_requested);
        assert!(!app.is_exiting);

        // a clone handed to a signal watcher shares the flag
        let handle = desc.clone().exit_requested;
        handle.store(true, Ordering::Release);
        app.check_exit_request(&desc.exit_requested);
        assert!(app.is_exiting);
    }
}
