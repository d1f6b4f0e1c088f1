//! In-memory cluster for trying the browser without `kubectl`.

use lazykube_framework::{
    CategoryRef, Chunk, DescribeError, Describer, Inventory, LeafRef, LogSource, LogStream,
    LookupError, ResourceKind, Services, StreamError,
};
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

const TICK: Duration = Duration::from_millis(400);
const IDLE_WAIT: Duration = Duration::from_millis(50);

const NAMESPACES: &[&str] = &["default", "kube-system", "monitoring"];

fn members(category: &CategoryRef) -> &'static [&'static str] {
    match (category.namespace.as_str(), category.kind) {
        ("default", ResourceKind::Pods) => &["frontend-7d9c", "backend-5f2a", "worker-0"],
        ("default", ResourceKind::ConfigMaps) => &["app-settings", "kube-root-ca.crt"],
        ("default", ResourceKind::Services) => &["frontend", "backend"],
        ("kube-system", ResourceKind::Pods) => &["coredns-6c8f", "kube-proxy-x2lq"],
        ("kube-system", ResourceKind::ConfigMaps) => &["coredns", "kube-proxy"],
        ("kube-system", ResourceKind::Services) => &["kube-dns"],
        ("monitoring", ResourceKind::Pods) => &["prometheus-0"],
        ("monitoring", ResourceKind::Services) => &["prometheus"],
        _ => &[],
    }
}

struct DemoInventory;

impl Inventory for DemoInventory {
    fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
        Ok(NAMESPACES.iter().map(|ns| ns.to_string()).collect())
    }

    fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
        Ok(members(category)
            .iter()
            .map(|name| category.leaf(*name))
            .collect())
    }
}

struct DemoLogSource;

impl LogSource for DemoLogSource {
    fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
        Ok(Box::new(DemoLogStream::new(leaf.clone())))
    }
}

/// Emits one synthetic line per tick, forever.
struct DemoLogStream {
    leaf: LeafRef,
    seq: u64,
    next_tick: Instant,
}

impl DemoLogStream {
    fn new(leaf: LeafRef) -> Self {
        Self {
            leaf,
            seq: 0,
            next_tick: Instant::now(),
        }
    }

    fn line(&self) -> String {
        let level = match self.seq % 7 {
            3 => "\x1b[33mWARN\x1b[0m ",
            6 => "\x1b[31mERROR\x1b[0m",
            _ => "\x1b[32mINFO\x1b[0m ",
        };
        format!(
            "{} [{}] request {} handled in {}ms\n",
            level,
            self.leaf.name,
            self.seq,
            (self.seq * 37) % 250
        )
    }
}

impl LogStream for DemoLogStream {
    fn read_chunk(&mut self) -> Result<Chunk, StreamError> {
        let now = Instant::now();
        if now < self.next_tick {
            thread::sleep((self.next_tick - now).min(IDLE_WAIT));
            return Ok(Chunk::Idle);
        }

        let line = self.line();
        self.seq += 1;
        self.next_tick = now + TICK;
        Ok(Chunk::Data(line.into_bytes()))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        log::debug!("Demo stream for {} closed after {} lines", self.leaf, self.seq);
        Ok(())
    }
}

struct DemoDescriber;

impl Describer for DemoDescriber {
    fn describe(&self, leaf: &LeafRef) -> Result<String, DescribeError> {
        Ok(format!(
            "Name:         {}\nNamespace:    {}\nKind:         {}\nLabels:       app={}\n",
            leaf.name,
            leaf.namespace,
            leaf.kind.label(),
            leaf.name
        ))
    }
}

pub fn services() -> Services {
    Services {
        inventory: Box::new(DemoInventory),
        logs: Arc::new(DemoLogSource),
        describer: Some(Arc::new(DemoDescriber)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_namespace_has_pods() {
        let inventory = DemoInventory;
        for ns in inventory.list_namespaces().unwrap() {
            let pods = inventory
                .list_children(&CategoryRef::new(ResourceKind::Pods, ns))
                .unwrap();
            assert!(!pods.is_empty());
        }
    }

    #[test]
    fn test_stream_alternates_data_and_idle() {
        let leaf = LeafRef::new(ResourceKind::Pods, "default", "worker-0");
        let mut stream = DemoLogStream::new(leaf);

        match stream.read_chunk().unwrap() {
            Chunk::Data(bytes) => {
                let line = String::from_utf8(bytes).unwrap();
                assert!(line.contains("[worker-0] request 0"));
                assert!(line.ends_with('\n'));
            }
            other => panic!("expected data, got {:?}", other),
        }
        assert_eq!(stream.read_chunk().unwrap(), Chunk::Idle);
        stream.close().unwrap();
    }
}
