use ratatui::{prelude::*, style::Color};

// 256-color indices used inside the rendered tree text
pub const TREE_HIGHLIGHT_BG: u8 = 237;
pub const ROOT_FG: u8 = 75;
pub const NAMESPACE_FG: u8 = 33;
pub const CATEGORY_FG: u8 = 71;
pub const LOGGABLE_FG: u8 = 114;
pub const LEAF_FG: u8 = 108;

pub const BORDER_COLOR: Color = Color::DarkGray;

pub const FOCUSED_BORDER_COLOR: Color = Color::Gray;

pub const STREAMING_COLOR: Color = Color::LightGreen;

pub const TEXT_FG_COLOR: Color = Color::Gray;

pub const INFO_STYLE: Style = Style::new().fg(Color::White);

pub const WARN_STYLE: Style = Style::new().fg(Color::LightYellow);

pub const ERROR_STYLE: Style = Style::new().fg(Color::LightRed);

pub const DEBUG_STYLE: Style = Style::new().fg(Color::LightGreen);

pub const DISPLAY_EVENT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_DIM_COLOR: Color = Color::DarkGray;
