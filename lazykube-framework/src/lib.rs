//! # lazykube-framework
//!
//! Terminal tree browser for cluster resources with a live log panel.
//!
//! ## Overview
//!
//! The framework shows a lazily populated tree (namespaces, resource
//! categories, resources) next to a details panel. Activating a pod follows
//! its log; activating any other resource shows its description. Where the
//! tree's contents and the log bytes come from is up to you: implement
//! [`Inventory`], [`LogSource`] and optionally [`Describer`], and the
//! framework handles rendering, input and session management.
//!
//! ## Core Concepts
//!
//! ### Line addressing
//!
//! [`Tree::render_as_text`] produces one text line per visible node and, in
//! the same pass, records which node landed on which 1-based line. Input is
//! routed back with [`Tree::process_line_event`], so a click on a screen row
//! reaches the node that was drawn there.
//!
//! ### Single-flight streaming
//!
//! [`SessionManager`] runs at most one log session at a time. Each session
//! reads its stream on a worker thread into a small bounded queue; switching
//! to another pod cancels the previous worker first. Workers check for
//! cancellation before every read, so [`LogStream::read_chunk`] should return
//! [`Chunk::Idle`] now and then when the feed is quiet.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lazykube_framework::{
//!     CategoryRef, Chunk, Inventory, LeafRef, LogSource, LogStream, LookupError, Services,
//!     StreamError, start_with_services,
//! };
//! use std::sync::Arc;
//!
//! struct MyInventory;
//!
//! impl Inventory for MyInventory {
//!     fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
//!         Ok(vec!["default".to_string()])
//!     }
//!
//!     fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
//!         Ok(vec![category.leaf("web")])
//!     }
//! }
//!
//! struct MyStream;
//!
//! impl LogStream for MyStream {
//!     fn read_chunk(&mut self) -> Result<Chunk, StreamError> {
//!         Ok(Chunk::End)
//!     }
//!
//!     fn close(&mut self) -> Result<(), StreamError> {
//!         Ok(())
//!     }
//! }
//!
//! struct MySource;
//!
//! impl LogSource for MySource {
//!     fn open_stream(&self, _leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
//!         Ok(Box::new(MyStream))
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     use ratatui::{Terminal, backend::CrosstermBackend};
//!     use std::io;
//!
//!     let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
//!     let services = Services {
//!         inventory: Box::new(MyInventory),
//!         logs: Arc::new(MySource),
//!         describer: None,
//!     };
//!     start_with_services(&mut terminal, services)
//! }
//! ```
//!
//! ## Advanced Configuration
//!
//! Use [`AppDesc`] to customize behavior:
//!
//! ```rust
//! use lazykube_framework::AppDesc;
//! use std::time::Duration;
//!
//! let mut desc = AppDesc::new();
//! desc.session_poll_interval = Duration::from_millis(20);
//! desc.max_detail_lines = 50_000;
//! desc.show_diagnostics = true;
//! ```

pub mod ansi;
pub mod browser;
pub mod detail_view;
pub mod error;
pub mod resource;
pub mod session;
pub mod source;
pub mod tree;

pub(crate) mod app;
pub(crate) mod app_block;
pub(crate) mod status_bar;
pub(crate) mod theme;
pub(crate) mod ui_logger;

pub use app::{AppDesc, start_with_desc, start_with_services};
pub use browser::{Browser, Services, build_tree};
pub use detail_view::{DetailView, WrappingMode};
pub use error::{DescribeError, LookupError, StreamError};
pub use resource::{CategoryRef, LeafRef, ResourceKind, ResourceRef};
pub use session::{
    CancelToken, EndReason, SessionEvent, SessionManager, SessionState, StreamingSession,
};
pub use source::{Chunk, Describer, Inventory, LogSource, LogStream};
pub use tree::{Glyphs, Node, NodePath, Tree};
