//! Collaborator interfaces: where the tree's contents and the live log bytes
//! come from.
//!
//! ```text
//! ┌────────────┐ list_children() ┌───────────┐
//! │ Inventory  │ ──────────────> │ tree nodes│
//! └────────────┘                 └───────────┘
//! ┌────────────┐ open_stream()   ┌───────────┐ read_chunk() ┌─────────────┐
//! │ LogSource  │ ──────────────> │ LogStream │ ───────────> │ worker queue│
//! └────────────┘                 └───────────┘              └─────────────┘
//! ```

use crate::{
    error::{DescribeError, LookupError, StreamError},
    resource::{CategoryRef, LeafRef},
};

/// Lists what the tree shows. Called from the UI thread.
pub trait Inventory: Send {
    /// top level of the tree, in display order
    fn list_namespaces(&self) -> Result<Vec<String>, LookupError>;

    /// members of one category, in display order
    fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError>;
}

/// Result of one read from a [`LogStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Data(Vec<u8>),
    /// nothing arrived within the stream's poll window
    Idle,
    End,
}

/// A live, append-only byte stream owned by one session worker.
///
/// # Contract
///
/// `read_chunk` may block, but should return [`Chunk::Idle`] after a bounded
/// wait when the source is quiet. That keeps the worker's cancellation
/// latency bounded even when a feed goes silent.
pub trait LogStream: Send {
    fn read_chunk(&mut self) -> Result<Chunk, StreamError>;

    /// Release the underlying handle. Called exactly once by the worker.
    fn close(&mut self) -> Result<(), StreamError>;
}

/// Opens log streams. Shared with worker threads, which do the opening.
pub trait LogSource: Send + Sync {
    fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError>;
}

/// One-shot textual description of a leaf.
pub trait Describer: Send + Sync {
    fn describe(&self, leaf: &LeafRef) -> Result<String, DescribeError>;
}
