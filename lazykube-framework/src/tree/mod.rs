//! Hierarchical tree model with text rendering and line addressing.
//!
//! [`Tree::render_as_text`] walks the visible nodes in preorder and gives each
//! one a 1-based line number while producing its text. Those numbers are what
//! [`Tree::process_line_event`] routes clicks and cursor moves against, so the
//! caller contract is: render, then route against that same render.
//!
//! ```text
//! ─ ⎈ Namespaces          line 1
//!    ─ ◆ ns1              line 2
//!       ─ ▪ Pods          line 3
//!             ● pod-a     line 4
//!       + ▫ Configs       line 5
//! ```

mod node;
mod render;

pub use node::{Glyphs, Node};
pub use render::{COLLAPSED_MARKER, EXPANDED_MARKER, INDENT};

/// Child indices leading from the root to a node.
///
/// Stays valid for the lifetime of a tree because nodes are only ever
/// appended, never removed or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn join(mut self, index: usize) -> Self {
        self.0.push(index);
        self
    }

    pub fn extend(mut self, other: NodePath) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

pub struct Tree<T> {
    root: Node<T>,
    char_width: usize,
    selected: Option<NodePath>,
    visible_lines: usize,
}

impl<T> Tree<T> {
    pub fn new(root: Node<T>) -> Self {
        let selected = root.is_selected().then(NodePath::root);
        Self {
            root,
            char_width: 0,
            selected,
            visible_lines: 0,
        }
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// width used by the most recent render
    pub fn char_width(&self) -> usize {
        self.char_width
    }

    /// number of lines produced by the most recent render
    pub fn visible_line_count(&self) -> usize {
        self.visible_lines
    }

    /// Render every visible node, one newline-terminated line each.
    ///
    /// This is the only place line numbers are assigned; numbers from any
    /// previous render are discarded first.
    pub fn render_as_text(&mut self, width: usize) -> String {
        self.char_width = width;
        self.root.reset_line_numbers();

        let mut line = 1;
        let mut out = String::new();
        render::render_node(&mut self.root, "", width, &mut line, &mut out);
        self.visible_lines = line - 1;
        out
    }

    /// Invoke `handler` on the node the last render placed at `line`.
    ///
    /// Returns whether a node matched; an unmatched line is not an error, it
    /// may be padding below the tree or a row left over from before a resize.
    pub fn process_line_event<F>(&mut self, line: usize, handler: F) -> bool
    where
        F: FnOnce(&mut Node<T>),
    {
        let Some(path) = self.root.path_to_line(line) else {
            return false;
        };
        match self.root.descend_mut(path.indices()) {
            Some(node) => {
                handler(node);
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.root.clear_selection();
        self.selected = None;
    }

    /// Make the node at `line` the only selected node.
    ///
    /// A line that resolves to nothing leaves the current selection intact.
    pub fn select_line(&mut self, line: usize) -> bool {
        let Some(path) = self.root.path_to_line(line) else {
            return false;
        };
        self.select_path(path)
    }

    pub fn select_path(&mut self, path: NodePath) -> bool {
        if self.root.descend(path.indices()).is_none() {
            return false;
        }
        self.root.clear_selection();
        if let Some(node) = self.root.descend_mut(path.indices()) {
            node.selected = true;
        }
        self.selected = Some(path);
        true
    }

    pub fn selected_node(&self) -> Option<&Node<T>> {
        self.selected
            .as_ref()
            .and_then(|path| self.root.descend(path.indices()))
    }

    /// line of the selected node in the most recent render
    pub fn selected_line(&self) -> Option<usize> {
        self.selected_node().and_then(Node::line_number)
    }

    pub fn find_by_line(&self, line: usize) -> Option<&Node<T>> {
        self.root.find_by_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;

    fn scenario_tree() -> Tree<&'static str> {
        let mut root = Node::new("Namespaces", "root", Glyphs::default(), false, true);
        let ns = root.add_child("ns1", "ns", Glyphs::default(), false, true);
        ns.add_child("Pods", "pods", Glyphs::default(), false, true);
        ns.add_child("Configs", "configs", Glyphs::default(), false, false);
        Tree::new(root)
    }

    fn visible_names(tree: &Tree<&'static str>) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        for line in 1..=tree.visible_line_count() {
            if let Some(node) = tree.find_by_line(line) {
                found.push((line, node.name().to_string()));
            }
        }
        found
    }

    fn collect_lines<T>(node: &Node<T>, out: &mut Vec<usize>) {
        if let Some(line) = node.line_number() {
            out.push(line);
        }
        for child in node.children() {
            collect_lines(child, out);
        }
    }

    #[test]
    fn test_scenario_lazy_population_shifts_lines() {
        let mut tree = scenario_tree();
        let text = tree.render_as_text(20);

        assert_eq!(text.lines().count(), 4);
        assert_eq!(
            visible_names(&tree),
            vec![
                (1, "Namespaces".to_string()),
                (2, "ns1".to_string()),
                (3, "Pods".to_string()),
                (4, "Configs".to_string()),
            ]
        );

        let handled = tree.process_line_event(3, |node| {
            node.add_child("pod-a", "pod", Glyphs::default(), false, false);
            node.add_child("pod-b", "pod", Glyphs::default(), false, false);
        });
        assert!(handled);

        let text = tree.render_as_text(20);
        assert_eq!(text.lines().count(), 6);
        assert_eq!(tree.find_by_line(4).map(Node::name), Some("pod-a"));
        assert_eq!(tree.find_by_line(5).map(Node::name), Some("pod-b"));
        assert_eq!(tree.find_by_line(6).map(Node::name), Some("Configs"));
    }

    #[test]
    fn test_line_numbers_are_dense_in_preorder() {
        let mut tree = scenario_tree();
        tree.process_line_event(0, |_| unreachable!());
        tree.render_as_text(0);
        tree.process_line_event(4, |node| {
            node.add_child("cm", "cm", Glyphs::default(), false, false);
            node.set_expanded(true);
        });
        tree.process_line_event(3, |node| {
            node.add_child("hidden-parent", "x", Glyphs::default(), false, false)
                .add_child("hidden", "x", Glyphs::default(), false, false);
        });
        tree.render_as_text(0);

        let mut lines = Vec::new();
        collect_lines(tree.root(), &mut lines);

        assert_eq!(tree.visible_line_count(), 6);
        assert_eq!(lines, (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_collapse_hides_but_keeps_children() {
        let mut tree = scenario_tree();
        tree.render_as_text(20);
        tree.process_line_event(3, |node| {
            node.add_child("pod-a", "pod", Glyphs::fixed("●"), false, false);
            node.add_child("pod-b", "pod", Glyphs::fixed("●"), false, false);
        });
        let before = tree.render_as_text(20);

        tree.process_line_event(3, Node::toggle_expanded);
        let collapsed = tree.render_as_text(20);
        assert_eq!(collapsed.lines().count(), 4);
        assert!(!ansi::strip(&collapsed).contains("pod-a"));

        tree.process_line_event(3, Node::toggle_expanded);
        let after = tree.render_as_text(20);

        assert_eq!(before, after);
        let pods = tree.find_by_line(3).unwrap();
        let names: Vec<&str> = pods.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["pod-a", "pod-b"]);
    }

    #[test]
    fn test_routing_past_last_line_is_a_noop() {
        let mut tree = scenario_tree();
        tree.render_as_text(20);

        let mut calls = 0;
        assert!(!tree.process_line_event(5, |_| calls += 1));
        assert!(!tree.process_line_event(0, |_| calls += 1));
        assert_eq!(calls, 0);

        let mut seen = None;
        assert!(tree.process_line_event(2, |node| seen = Some(node.name().to_string())));
        assert_eq!(seen.as_deref(), Some("ns1"));
    }

    #[test]
    fn test_routing_uses_previous_render_until_redrawn() {
        let mut tree = scenario_tree();
        tree.render_as_text(20);
        tree.process_line_event(3, |node| {
            node.add_child("pod-a", "pod", Glyphs::default(), false, false);
        });

        // not redrawn yet: line 4 still addresses Configs
        assert_eq!(tree.find_by_line(4).map(Node::name), Some("Configs"));
        tree.render_as_text(20);
        assert_eq!(tree.find_by_line(4).map(Node::name), Some("pod-a"));
    }

    #[test]
    fn test_single_selection() {
        let mut tree = scenario_tree();
        tree.render_as_text(20);

        fn count_selected<T>(node: &Node<T>) -> usize {
            usize::from(node.is_selected())
                + node.children().iter().map(count_selected).sum::<usize>()
        }

        assert_eq!(count_selected(tree.root()), 0);
        for line in [1, 3, 2, 4, 4, 3] {
            assert!(tree.select_line(line));
            assert_eq!(count_selected(tree.root()), 1);
            assert_eq!(tree.selected_line(), Some(line));
        }

        // a miss keeps the current selection
        assert!(!tree.select_line(42));
        assert_eq!(tree.selected_node().map(Node::name), Some("Pods"));

        tree.clear_selection();
        assert_eq!(count_selected(tree.root()), 0);
        assert!(tree.selected_node().is_none());
    }

    #[test]
    fn test_render_records_width_and_selection_highlight() {
        let mut tree = scenario_tree();
        tree.render_as_text(20);
        tree.select_line(2);
        let text = tree.render_as_text(30);

        assert_eq!(tree.char_width(), 30);
        let second = text.lines().nth(1).unwrap();
        assert!(second.starts_with("\x1b[48;5;237m"));
        assert_eq!(ansi::strip(second).trim_end(), "   ─  ns1");
    }
}
