//! Switching between log feeds through the public API.

use lazykube_framework::{
    AppDesc, Browser, CategoryRef, Chunk, EndReason, Inventory, LeafRef, LogSource, LogStream,
    LookupError, ResourceKind, SessionEvent, SessionManager, SessionState, Services, StreamError,
    ansi,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

/// Streams `<name> <seq>` lines forever and records how many streams are open.
#[derive(Default)]
struct CountingSource {
    open: Arc<AtomicUsize>,
    opened: Mutex<Vec<String>>,
}

struct CountingStream {
    name: String,
    seq: usize,
    open: Arc<AtomicUsize>,
}

impl LogSource for CountingSource {
    fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
        if leaf.name == "broken" {
            return Err(StreamError::Open {
                target: leaf.to_string(),
                reason: "container not ready".to_string(),
            });
        }
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.lock().unwrap().push(leaf.name.clone());
        Ok(Box::new(CountingStream {
            name: leaf.name.clone(),
            seq: 0,
            open: self.open.clone(),
        }))
    }
}

impl LogStream for CountingStream {
    fn read_chunk(&mut self) -> Result<Chunk, StreamError> {
        thread::sleep(Duration::from_millis(1));
        if self.seq % 2 == 1 {
            self.seq += 1;
            return Ok(Chunk::Idle);
        }
        let line = format!("{} {}\n", self.name, self.seq);
        self.seq += 1;
        Ok(Chunk::Data(line.into_bytes()))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

struct PodsOnly;

impl Inventory for PodsOnly {
    fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
        Ok(vec!["default".to_string()])
    }

    fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
        match category.kind {
            ResourceKind::Pods => Ok(vec![category.leaf("api"), category.leaf("web")]),
            _ => Ok(Vec::new()),
        }
    }
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn pod(name: &str) -> LeafRef {
    LeafRef::new(ResourceKind::Pods, "default", name)
}

#[test]
fn test_switching_leaves_at_most_one_stream_open() {
    let source = Arc::new(CountingSource::default());
    let mut sessions = SessionManager::new(2);

    for name in ["api", "web", "api", "web"] {
        sessions.start(pod(name), source.clone()).unwrap();
    }
    assert_eq!(sessions.active_leaf().map(|leaf| leaf.name.as_str()), Some("web"));

    // retired workers close their streams on their own
    assert!(wait_for(|| {
        sessions.reap();
        sessions.retiring_count() == 0
    }));
    assert!(wait_for(|| source.open.load(Ordering::SeqCst) == 1));

    sessions.shutdown(Duration::from_secs(2));
    assert_eq!(source.open.load(Ordering::SeqCst), 0);
    assert_eq!(sessions.state(), SessionState::Idle);
}

#[test]
fn test_chunks_come_from_current_session_in_order() {
    let source = Arc::new(CountingSource::default());
    let mut sessions = SessionManager::new(2);
    sessions.start(pod("api"), source.clone()).unwrap();
    sessions.start(pod("web"), source.clone()).unwrap();

    let mut text = String::new();
    assert!(wait_for(|| {
        for event in sessions.pump() {
            if let SessionEvent::Chunk(chunk) = event {
                text.push_str(&chunk);
            }
        }
        text.lines().count() >= 3
    }));

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.iter().all(|line| line.starts_with("web ")));
    assert_eq!(&lines[..3], ["web 0", "web 2", "web 4"]);
    sessions.shutdown(Duration::from_secs(2));
}

#[test]
fn test_open_failure_ends_session_with_reason() {
    let source = Arc::new(CountingSource::default());
    let mut sessions = SessionManager::new(2);
    sessions.start(pod("broken"), source).unwrap();

    let mut reason = None;
    assert!(wait_for(|| {
        for event in sessions.pump() {
            if let SessionEvent::Ended { reason: r, .. } = event {
                reason = Some(r);
            }
        }
        reason.is_some()
    }));
    assert!(matches!(
        reason,
        Some(EndReason::Failed(StreamError::Open { .. }))
    ));
    assert!(sessions.current().is_none());
}

#[test]
fn test_browser_routes_rows_to_pods() {
    let source = Arc::new(CountingSource::default());
    let services = Services {
        inventory: Box::new(PodsOnly),
        logs: source.clone(),
        describer: None,
    };
    let mut browser = Browser::new(services, &AppDesc::default()).unwrap();

    // Namespaces / default / Pods / api, web
    browser.render_tree(40);
    assert!(browser.activate_line(2));
    browser.render_tree(40);
    assert!(browser.activate_line(3));
    let text = ansi::strip(&browser.render_tree(40));
    assert!(text.contains("api"));
    assert!(text.contains("web"));

    assert!(browser.activate_line(5));
    assert!(wait_for(|| {
        browser.pump();
        browser.details().iter_lines().any(|line| line.starts_with("web "))
    }));
    assert_eq!(browser.details().title(), Some("logs default/pod/web"));

    // a row below the last line selects nothing
    assert!(!browser.activate_line(40));
    assert_eq!(
        browser.sessions().active_leaf().map(|leaf| leaf.name.as_str()),
        Some("web")
    );

    browser.shutdown(Duration::from_secs(2));
    assert_eq!(source.open.load(Ordering::SeqCst), 0);
    assert_eq!(*source.opened.lock().unwrap(), vec!["web".to_string()]);
}
