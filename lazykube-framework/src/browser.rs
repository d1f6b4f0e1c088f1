//! Application context: the tree, the session manager and the detail view,
//! plus the per-kind handlers that run when a line is activated.

use crate::{
    app::AppDesc,
    detail_view::DetailView,
    error::{DescribeError, LookupError},
    resource::{CategoryRef, LeafRef, ResourceKind, ResourceRef},
    session::{EndReason, SessionEvent, SessionManager},
    source::{Describer, Inventory, LogSource},
    tree::{Node, Tree},
};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::{sync::Arc, thread, time::Duration};

pub const ROOT_NAME: &str = "Namespaces";

/// Collaborators the browser talks to.
pub struct Services {
    pub inventory: Box<dyn Inventory>,
    pub logs: Arc<dyn LogSource>,
    pub describer: Option<Arc<dyn Describer>>,
}

pub struct Browser {
    tree: Tree<ResourceRef>,
    sessions: SessionManager,
    details: DetailView,
    services: Services,
    describe: DescribeJobs,
}

struct HandlerContext<'a> {
    inventory: &'a dyn Inventory,
    logs: &'a Arc<dyn LogSource>,
    describer: Option<&'a Arc<dyn Describer>>,
    sessions: &'a mut SessionManager,
    details: &'a mut DetailView,
    describe: &'a mut DescribeJobs,
}

impl Browser {
    /// Bootstrap from the namespace listing. Failing here is fatal to the
    /// caller; later lookup failures are not.
    pub fn new(services: Services, desc: &AppDesc) -> Result<Self, LookupError> {
        let namespaces = services.inventory.list_namespaces()?;
        log::info!("Loaded {} namespaces", namespaces.len());

        Ok(Self {
            tree: build_tree(namespaces),
            sessions: SessionManager::new(desc.queue_capacity),
            details: DetailView::new(desc.max_detail_lines),
            services,
            describe: DescribeJobs::new(),
        })
    }

    pub fn tree(&self) -> &Tree<ResourceRef> {
        &self.tree
    }

    pub fn details(&self) -> &DetailView {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut DetailView {
        &mut self.details
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Render the tree and refresh line addressing for the next event.
    pub fn render_tree(&mut self, width: usize) -> String {
        self.tree.render_as_text(width)
    }

    /// Select the node at `line` of the latest render and run its handler.
    ///
    /// Any running session is cancelled first; a loggable leaf then starts a
    /// fresh one. A line with no node does nothing.
    pub fn activate_line(&mut self, line: usize) -> bool {
        if !self.tree.select_line(line) {
            log::debug!("No node at line {}", line);
            return false;
        }

        self.sessions.cancel();
        self.describe.forget();
        self.details.clear();

        let Self {
            tree,
            sessions,
            details,
            services,
            describe,
        } = self;
        let mut ctx = HandlerContext {
            inventory: services.inventory.as_ref(),
            logs: &services.logs,
            describer: services.describer.as_ref(),
            sessions,
            details,
            describe,
        };
        tree.process_line_event(line, |node| handle_node(node, &mut ctx))
    }

    /// Run the handler of the selected node again.
    pub fn activate_selected(&mut self) -> bool {
        self.refresh_addressing();
        match self.tree.selected_line() {
            Some(line) => self.activate_line(line),
            None => false,
        }
    }

    /// Move the selection by `delta` visible lines and activate the target.
    pub fn move_selection(&mut self, delta: isize) -> bool {
        self.refresh_addressing();
        let visible = self.tree.visible_line_count();
        if visible == 0 {
            return false;
        }

        let target = match self.tree.selected_line() {
            Some(current) => current.saturating_add_signed(delta).clamp(1, visible),
            None => 1,
        };
        if self.tree.selected_line() == Some(target) {
            return false;
        }
        self.activate_line(target)
    }

    /// Show the one-shot description of the selected leaf.
    pub fn describe_selected(&mut self) {
        let Some(leaf) = self
            .tree
            .selected_node()
            .and_then(|node| node.payload().as_leaf())
            .cloned()
        else {
            log::info!("Select a resource to describe it");
            return;
        };

        self.sessions.cancel();
        self.details.clear();
        request_describe(
            self.services.describer.as_ref(),
            &mut self.details,
            &mut self.describe,
            leaf,
        );
    }

    /// Rebuild the tree from a fresh namespace listing.
    ///
    /// On failure the current tree stays as it is.
    pub fn reload(&mut self) -> Result<(), LookupError> {
        let namespaces = self.services.inventory.list_namespaces()?;
        self.sessions.cancel();
        self.describe.forget();
        self.details.clear();
        self.tree = build_tree(namespaces);
        log::info!("Inventory reloaded");
        Ok(())
    }

    /// Move queued session output and finished describe calls into the
    /// detail view. Returns whether the detail view changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;

        for event in self.sessions.pump() {
            match event {
                SessionEvent::Chunk(text) => {
                    self.details.append(&text);
                    changed = true;
                }
                SessionEvent::Ended {
                    session,
                    leaf,
                    reason: EndReason::EndOfStream,
                } => log::info!("Log stream of {} ended (session {})", leaf, session),
                SessionEvent::Ended {
                    leaf,
                    reason: EndReason::Failed(e),
                    ..
                } => log::warn!("Log stream of {} failed: {}", leaf, e),
                SessionEvent::Ended {
                    leaf,
                    reason: EndReason::WorkerPanicked,
                    ..
                } => log::error!("Log reader for {} crashed", leaf),
            }
        }
        self.sessions.reap();

        if let Some(result) = self.describe.take_ready() {
            match result.outcome {
                Ok(text) => self.details.set_text(&text),
                Err(e) => {
                    log::warn!("Describe {} failed: {}", result.leaf, e);
                    self.details.set_text(&e.to_string());
                }
            }
            changed = true;
        }

        changed
    }

    pub fn shutdown(&mut self, timeout: Duration) {
        self.describe.forget();
        self.sessions.shutdown(timeout);
    }

    // line numbers only exist right after a render
    fn refresh_addressing(&mut self) {
        let width = self.tree.char_width();
        self.tree.render_as_text(width);
    }
}

/// Root, one node per namespace (sorted), three categories under each.
pub fn build_tree(mut namespaces: Vec<String>) -> Tree<ResourceRef> {
    namespaces.sort();
    namespaces.dedup();

    let root_ref = ResourceRef::Root;
    let mut root = Node::new(ROOT_NAME, root_ref.clone(), root_ref.glyphs(), false, true);
    root.set_color(root_ref.color());

    for namespace in namespaces {
        let ns_node = attach(
            &mut root,
            namespace.clone(),
            ResourceRef::Namespace(namespace.clone()),
        );
        for kind in ResourceKind::ALL {
            attach(
                ns_node,
                kind.label(),
                ResourceRef::Category(CategoryRef::new(kind, namespace.clone())),
            );
        }
    }

    Tree::new(root)
}

fn attach(
    parent: &mut Node<ResourceRef>,
    name: impl Into<String>,
    payload: ResourceRef,
) -> &mut Node<ResourceRef> {
    let glyphs = payload.glyphs();
    let color = payload.color();
    parent
        .add_child(name, payload, glyphs, false, false)
        .set_color(color)
}

fn handle_node(node: &mut Node<ResourceRef>, ctx: &mut HandlerContext) {
    match node.payload().clone() {
        ResourceRef::Root | ResourceRef::Namespace(_) => node.toggle_expanded(),
        ResourceRef::Category(category) => populate_or_toggle(node, &category, ctx),
        ResourceRef::Leaf(leaf) if leaf.is_loggable() => start_streaming(leaf, ctx),
        ResourceRef::Leaf(leaf) => {
            request_describe(ctx.describer, ctx.details, ctx.describe, leaf)
        }
    }
}

// an empty category is fetched again on every activation
fn populate_or_toggle(
    node: &mut Node<ResourceRef>,
    category: &CategoryRef,
    ctx: &mut HandlerContext,
) {
    if node.has_children() {
        node.toggle_expanded();
        return;
    }

    match ctx.inventory.list_children(category) {
        Ok(leaves) => {
            log::debug!(
                "{} {} in {}",
                leaves.len(),
                category.kind.label(),
                category.namespace
            );
            for leaf in leaves {
                attach(node, leaf.name.clone(), ResourceRef::Leaf(leaf));
            }
            node.set_expanded(true);
        }
        Err(e) => {
            log::error!(
                "Listing {} in {} failed: {}",
                category.kind.label(),
                category.namespace,
                e
            );
            node.set_expanded(false);
        }
    }
}

fn start_streaming(leaf: LeafRef, ctx: &mut HandlerContext) {
    ctx.details.set_title(format!("logs {}", leaf));
    match ctx.sessions.start(leaf.clone(), Arc::clone(ctx.logs)) {
        Ok(session) => log::debug!("Session {} started", session),
        Err(e) => log::error!("Cannot start log session for {}: {}", leaf, e),
    }
}

fn request_describe(
    describer: Option<&Arc<dyn Describer>>,
    details: &mut DetailView,
    jobs: &mut DescribeJobs,
    leaf: LeafRef,
) {
    details.set_title(format!("describe {}", leaf));
    match describer {
        Some(describer) => {
            details.set_text("loading...");
            jobs.request(Arc::clone(describer), leaf);
        }
        None => {
            log::warn!("Describe is not available for {}", leaf);
            details.set_text(&DescribeError::Unsupported(leaf.to_string()).to_string());
        }
    }
}

struct DescribeResult {
    request: u64,
    leaf: LeafRef,
    outcome: Result<String, DescribeError>,
}

/// Describe calls run off the UI thread; only the latest request is shown.
struct DescribeJobs {
    results_tx: Sender<DescribeResult>,
    results_rx: Receiver<DescribeResult>,
    next_request: u64,
    pending: Option<u64>,
}

impl DescribeJobs {
    fn new() -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            results_tx,
            results_rx,
            next_request: 0,
            pending: None,
        }
    }

    fn request(&mut self, describer: Arc<dyn Describer>, leaf: LeafRef) {
        self.next_request += 1;
        let request = self.next_request;
        let results = self.results_tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("describe-{}", leaf.name))
            .spawn(move || {
                let outcome = describer.describe(&leaf);
                // receiver only goes away with the browser
                let _ = results.send(DescribeResult {
                    request,
                    leaf,
                    outcome,
                });
            });

        match spawned {
            Ok(_) => self.pending = Some(request),
            Err(e) => {
                log::error!("Cannot spawn describe worker: {}", e);
                self.pending = None;
            }
        }
    }

    fn forget(&mut self) {
        self.pending = None;
    }

    fn take_ready(&mut self) -> Option<DescribeResult> {
        let mut ready = None;
        while let Ok(result) = self.results_rx.try_recv() {
            if self.pending == Some(result.request) {
                self.pending = None;
                ready = Some(result);
            }
        }
        ready
    }
}
