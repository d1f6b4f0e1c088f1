use super::CancelToken;
use crate::{
    error::StreamError,
    resource::LeafRef,
    source::{Chunk, LogSource},
};
use crossbeam_channel::{Sender, select};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// why a session stopped on its own
#[derive(Debug)]
pub enum EndReason {
    EndOfStream,
    Failed(StreamError),
    /// the worker died without reporting, e.g. the stream panicked
    WorkerPanicked,
}

pub(crate) enum SessionMessage {
    Chunk(String),
    Ended(EndReason),
}

/// Decodes UTF-8 across chunk boundaries, carrying an incomplete trailing
/// sequence into the next chunk.
#[derive(Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_len]));
                    match e.error_len() {
                        // incomplete sequence at the end, wait for more bytes
                        None => {
                            self.pending.drain(..valid_len);
                            break;
                        }
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_len + invalid_len);
                        }
                    }
                }
            }
        }

        out
    }

    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Enqueue `message`, giving up as soon as cancellation is raised or the
/// receiving side is gone.
fn deliver(queue: &Sender<SessionMessage>, cancel: &CancelToken, message: SessionMessage) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    select! {
        send(queue, message) -> res => res.is_ok(),
        recv(cancel.signal()) -> _ => false,
    }
}

/// Body of a session's background thread.
///
/// Opens the stream, forwards decoded text in read order, and closes the
/// stream before returning. `active` is cleared exactly once, on exit.
pub(crate) fn run_reader(
    leaf: LeafRef,
    source: Arc<dyn LogSource>,
    queue: Sender<SessionMessage>,
    cancel: CancelToken,
    active: Arc<AtomicBool>,
) {
    log::debug!("Session worker for {} started", leaf);

    let mut stream = match source.open_stream(&leaf) {
        Ok(stream) => stream,
        Err(e) => {
            deliver(&queue, &cancel, SessionMessage::Ended(EndReason::Failed(e)));
            active.store(false, Ordering::Release);
            log::debug!("Session worker for {} stopped before streaming", leaf);
            return;
        }
    };

    let mut decoder = Utf8Carry::default();
    let reason = loop {
        if cancel.is_cancelled() {
            break None;
        }
        match stream.read_chunk() {
            Ok(Chunk::Data(bytes)) => {
                let text = decoder.push(&bytes);
                if !text.is_empty() && !deliver(&queue, &cancel, SessionMessage::Chunk(text)) {
                    break None;
                }
            }
            Ok(Chunk::Idle) => {}
            Ok(Chunk::End) => break Some(EndReason::EndOfStream),
            Err(e) => break Some(EndReason::Failed(e)),
        }
    };

    if let Err(e) = stream.close() {
        log::warn!("Failed to close log stream for {}: {}", leaf, e);
    }
    drop(stream);

    if let Some(reason) = reason {
        let tail = decoder.finish();
        if tail.is_empty() || deliver(&queue, &cancel, SessionMessage::Chunk(tail)) {
            deliver(&queue, &cancel, SessionMessage::Ended(reason));
        }
    }

    active.store(false, Ordering::Release);
    log::debug!("Session worker for {} stopped", leaf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_carry_joins_split_sequence() {
        let bytes = "héllo".as_bytes();
        let mut carry = Utf8Carry::default();

        // split inside the two-byte 'é'
        assert_eq!(carry.push(&bytes[..2]), "h");
        assert_eq!(carry.push(&bytes[2..]), "éllo");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn test_utf8_carry_replaces_invalid_bytes() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_utf8_carry_flushes_incomplete_tail() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(b"ok\xe2\x82"), "ok");
        assert_eq!(carry.finish(), "\u{FFFD}");
    }
}
