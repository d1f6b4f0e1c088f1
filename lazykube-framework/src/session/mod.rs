//! Single-flight streaming sessions.
//!
//! A session streams one leaf's log through a dedicated worker thread into a
//! small bounded queue that the UI loop drains with [`SessionManager::pump`].
//! Starting a session always cancels the current one first, so at most one
//! session is ever [`SessionState::Streaming`].
//!
//! ```text
//!        start()            cancel() / new start()
//!  Idle ─────────> Streaming ──────────────────────> Cancelling
//!   ^                 │                                   │
//!   │   end of stream │                                   │ worker reaches
//!   │   or read error │                                   │ a poll point
//!   └─────────────────┴───────────────────────────────────┘
//! ```

mod cancel;
mod worker;

pub use cancel::CancelToken;
pub use worker::EndReason;

use crate::{resource::LeafRef, source::LogSource};
use crossbeam_channel::{Receiver, TryRecvError, bounded};
use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};
use uuid::Uuid;
use worker::SessionMessage;

pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

// upper bound of messages handled per pump so a fast feed cannot starve input
const MAX_MESSAGES_PER_PUMP: usize = 256;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Cancelling,
}

/// What the UI loop learns from [`SessionManager::pump`].
#[derive(Debug)]
pub enum SessionEvent {
    Chunk(String),
    Ended {
        session: Uuid,
        leaf: LeafRef,
        reason: EndReason,
    },
}

pub struct StreamingSession {
    id: Uuid,
    leaf: LeafRef,
    cancel: CancelToken,
    worker_running: Arc<AtomicBool>,
    queue: Option<Receiver<SessionMessage>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl StreamingSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn leaf(&self) -> &LeafRef {
        &self.leaf
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Raise cancellation and stop listening. Safe to call any number of
    /// times, including after the worker has already exited.
    pub fn cancel(&mut self) {
        if self.cancel.cancel() {
            log::debug!("Cancelling session {} ({})", self.id, self.leaf);
        }
        // a worker blocked on a full queue wakes up on the disconnect too
        self.queue = None;
    }

    fn worker_finished(&self) -> bool {
        !self.worker_running.load(Ordering::Acquire)
            || self.worker.as_ref().is_none_or(|handle| handle.is_finished())
    }

    pub fn state(&self) -> SessionState {
        if self.worker_finished() {
            SessionState::Idle
        } else if self.cancel.is_cancelled() {
            SessionState::Cancelling
        } else {
            SessionState::Streaming
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Streaming
    }

    fn join(&mut self) {
        if let Some(handle) = self.worker.take()
            && let Err(e) = handle.join()
        {
            log::error!("Session worker for {} panicked: {:?}", self.leaf, e);
        }
    }
}

pub struct SessionManager {
    queue_capacity: usize,
    current: Option<StreamingSession>,
    retiring: Vec<StreamingSession>,
}

impl SessionManager {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            current: None,
            retiring: Vec::new(),
        }
    }

    /// Cancel whatever is streaming, then start streaming `leaf`.
    ///
    /// Selecting the same leaf again starts a fresh session; nothing resumes.
    pub fn start(&mut self, leaf: LeafRef, source: Arc<dyn LogSource>) -> io::Result<Uuid> {
        self.cancel();

        let id = Uuid::new_v4();
        let (queue_tx, queue_rx) = bounded(self.queue_capacity);
        let cancel = CancelToken::new();
        let worker_running = Arc::new(AtomicBool::new(true));

        let worker = {
            let leaf = leaf.clone();
            let cancel = cancel.clone();
            let worker_running = worker_running.clone();
            thread::Builder::new()
                .name(format!("session-{}", leaf.name))
                .spawn(move || worker::run_reader(leaf, source, queue_tx, cancel, worker_running))?
        };

        log::info!("Streaming logs of {}", leaf);
        self.current = Some(StreamingSession {
            id,
            leaf,
            cancel,
            worker_running,
            queue: Some(queue_rx),
            worker: Some(worker),
        });
        Ok(id)
    }

    /// Cancel the current session, if any. Never blocks.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(mut session) => {
                session.cancel();
                self.retiring.push(session);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&StreamingSession> {
        self.current.as_ref()
    }

    /// leaf of the session that is currently streaming
    pub fn active_leaf(&self) -> Option<&LeafRef> {
        self.current
            .as_ref()
            .filter(|session| session.is_active())
            .map(StreamingSession::leaf)
    }

    pub fn state(&self) -> SessionState {
        if let Some(session) = &self.current {
            return session.state();
        }
        if self
            .retiring
            .iter()
            .any(|session| session.state() == SessionState::Cancelling)
        {
            SessionState::Cancelling
        } else {
            SessionState::Idle
        }
    }

    /// Drain queued messages of the current session without blocking.
    ///
    /// Chunks come out in the order the worker read them. When the stream
    /// ends on its own the session is retired and an `Ended` event reports
    /// why.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let mut ended = None;

        if let Some(session) = &mut self.current
            && let Some(queue) = &session.queue
        {
            while events.len() < MAX_MESSAGES_PER_PUMP {
                match queue.try_recv() {
                    Ok(SessionMessage::Chunk(text)) => events.push(SessionEvent::Chunk(text)),
                    Ok(SessionMessage::Ended(reason)) => {
                        ended = Some(reason);
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // worker left without a final message
                        ended = Some(EndReason::WorkerPanicked);
                        break;
                    }
                }
            }
        }

        if let Some(reason) = ended
            && let Some(mut session) = self.current.take()
        {
            session.queue = None;
            events.push(SessionEvent::Ended {
                session: session.id,
                leaf: session.leaf.clone(),
                reason,
            });
            self.retiring.push(session);
        }

        events
    }

    /// Join workers that have exited. Never blocks on a running worker.
    pub fn reap(&mut self) {
        let mut still_running = Vec::with_capacity(self.retiring.len());
        for mut session in self.retiring.drain(..) {
            if session.worker_finished() {
                session.join();
            } else {
                still_running.push(session);
            }
        }
        self.retiring = still_running;
    }

    /// number of workers cancelled or ended but not yet joined
    pub fn retiring_count(&self) -> usize {
        self.retiring.len()
    }

    /// Cancel everything and wait up to `timeout` for workers to exit.
    ///
    /// Workers stuck inside a read past the deadline are left detached.
    pub fn shutdown(&mut self, timeout: Duration) {
        self.cancel();
        let deadline = Instant::now() + timeout;
        loop {
            self.reap();
            if self.retiring.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                log::warn!(
                    "{} session worker(s) still running at shutdown",
                    self.retiring.len()
                );
                break;
            }
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.cancel();
        for session in &mut self.retiring {
            session.cancel();
        }
    }
}
