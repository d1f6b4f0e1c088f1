//! Simple example: a single namespace whose pods print a counter.
//!
//! This demonstrates the bare minimum needed to browse a tree:
//! - Implement Inventory to list namespaces and category members
//! - Implement LogSource and LogStream to feed the details panel
//! - Call start_with_services() to launch the TUI
//!
//! Run with: cargo run --example simple

use anyhow::Result;
use lazykube_framework::{
    CategoryRef, Chunk, Inventory, LeafRef, LogSource, LogStream, LookupError, ResourceKind,
    Services, StreamError, start_with_services,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;

// one namespace, two pods, nothing else
struct StaticInventory;

impl Inventory for StaticInventory {
    fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
        Ok(vec!["default".to_string()])
    }

    fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
        match category.kind {
            ResourceKind::Pods => Ok(vec![category.leaf("counter-a"), category.leaf("counter-b")]),
            _ => Ok(Vec::new()),
        }
    }
}

// one line every half second
struct CounterStream {
    name: String,
    counter: usize,
}

impl LogStream for CounterStream {
    fn read_chunk(&mut self) -> Result<Chunk, StreamError> {
        // slow down generation to make it visible
        std::thread::sleep(Duration::from_millis(500));
        self.counter += 1;
        Ok(Chunk::Data(
            format!("{}: message #{}\n", self.name, self.counter).into_bytes(),
        ))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

struct CounterSource;

impl LogSource for CounterSource {
    fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
        Ok(Box::new(CounterStream {
            name: leaf.name.clone(),
            counter: 0,
        }))
    }
}

fn main() -> Result<()> {
    // setup terminal
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let services = Services {
        inventory: Box::new(StaticInventory),
        logs: Arc::new(CounterSource),
        describer: None,
    };

    // run the application
    let result = start_with_services(&mut terminal, services);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
