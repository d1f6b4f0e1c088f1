use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

/// One-shot, idempotent cancellation signal.
///
/// Besides the flag, the token exposes a channel that becomes ready (it
/// disconnects) once cancelled, so a worker can wait on "cancelled" and on
/// other channel operations in the same `select!`.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    raised: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                raised: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Raise the signal. Returns `true` only for the call that raised it;
    /// later calls do nothing.
    pub fn cancel(&self) -> bool {
        if self.inner.raised.swap(true, Ordering::AcqRel) {
            return false;
        }
        // dropping the only sender disconnects `signal`, waking any select!
        if let Ok(mut trigger) = self.inner.trigger.lock() {
            trigger.take();
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.raised.load(Ordering::Acquire)
    }

    /// never yields a message; becomes ready once cancelled
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::RecvTimeoutError;
    use std::{thread, time::Duration};

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(!token.clone().cancel());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_signal_blocks_until_cancelled() {
        let token = CancelToken::new();
        assert_eq!(
            token.signal().recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );

        let remote = token.clone();
        let handle = thread::spawn(move || remote.signal().recv().is_err());
        token.cancel();
        assert!(handle.join().unwrap());
    }
}
