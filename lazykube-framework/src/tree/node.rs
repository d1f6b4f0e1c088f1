use super::NodePath;

/// display symbols drawn in front of a node's name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyphs {
    pub collapsed: String,
    pub expanded: String,
}

impl Glyphs {
    pub fn new(collapsed: impl Into<String>, expanded: impl Into<String>) -> Self {
        Self {
            collapsed: collapsed.into(),
            expanded: expanded.into(),
        }
    }

    /// same symbol regardless of expansion
    pub fn fixed(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            collapsed: symbol.clone(),
            expanded: symbol,
        }
    }

    pub fn for_state(&self, expanded: bool) -> &str {
        if expanded {
            &self.expanded
        } else {
            &self.collapsed
        }
    }
}

/// A single element of the tree.
///
/// Children are owned exclusively by their parent and kept in insertion order,
/// which is also display order. There is no back-pointer: every traversal
/// starts at the tree root.
#[derive(Debug, Clone)]
pub struct Node<T> {
    name: String,
    payload: T,
    glyphs: Glyphs,
    color: Option<u8>,
    pub(crate) selected: bool,
    expanded: bool,
    pub(crate) line_number: Option<usize>,
    children: Vec<Node<T>>,
}

impl<T> Node<T> {
    pub fn new(
        name: impl Into<String>,
        payload: T,
        glyphs: Glyphs,
        selected: bool,
        expanded: bool,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            glyphs,
            color: None,
            selected,
            expanded,
            line_number: None,
            children: Vec::new(),
        }
    }

    /// Append a child at the end and return it for further nesting.
    ///
    /// Names need not be unique. Prefer [`crate::Tree::select_line`] over
    /// passing `selected = true` here, since only the tree keeps the
    /// single-selection invariant.
    pub fn add_child(
        &mut self,
        name: impl Into<String>,
        payload: T,
        glyphs: Glyphs,
        selected: bool,
        expanded: bool,
    ) -> &mut Node<T> {
        let index = self.children.len();
        self.children
            .push(Node::new(name, payload, glyphs, selected, expanded));
        &mut self.children[index]
    }

    pub fn set_color(&mut self, color: u8) -> &mut Self {
        self.color = Some(color);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn glyphs(&self) -> &Glyphs {
        &self.glyphs
    }

    pub fn color(&self) -> Option<u8> {
        self.color
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// line assigned by the most recent render, `None` when hidden or stale
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_at_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.children.get_mut(index)
    }

    pub(crate) fn reset_line_numbers(&mut self) {
        self.line_number = None;
        for child in &mut self.children {
            child.reset_line_numbers();
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = false;
        for child in &mut self.children {
            child.clear_selection();
        }
    }

    pub fn find_by_line(&self, line: usize) -> Option<&Node<T>> {
        if self.line_number == Some(line) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_line(line))
    }

    /// index path (relative to this node) of the node rendered at `line`
    pub(crate) fn path_to_line(&self, line: usize) -> Option<NodePath> {
        if self.line_number == Some(line) {
            return Some(NodePath::root());
        }
        self.children.iter().enumerate().find_map(|(i, child)| {
            child
                .path_to_line(line)
                .map(|rest| NodePath::root().join(i).extend(rest))
        })
    }

    pub(crate) fn descend(&self, path: &[usize]) -> Option<&Node<T>> {
        match path.split_first() {
            None => Some(self),
            Some((&first, rest)) => self.children.get(first)?.descend(rest),
        }
    }

    pub(crate) fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Node<T>> {
        match path.split_first() {
            None => Some(self),
            Some((&first, rest)) => self.children.get_mut(first)?.descend_mut(rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Node<u32> {
        Node::new(name, 0, Glyphs::default(), false, false)
    }

    #[test]
    fn test_add_child_keeps_insertion_order() {
        let mut root = leaf("root");
        root.add_child("b", 1, Glyphs::default(), false, false);
        root.add_child("a", 2, Glyphs::default(), false, false);
        root.add_child("b", 3, Glyphs::default(), false, false);

        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert_eq!(*root.children()[2].payload(), 3);
    }

    #[test]
    fn test_add_child_returns_nestable_reference() {
        let mut root = leaf("root");
        root.add_child("ns", 1, Glyphs::default(), false, true)
            .add_child("Pods", 2, Glyphs::default(), false, false)
            .set_color(34);

        let pods = &root.children()[0].children()[0];
        assert_eq!(pods.name(), "Pods");
        assert_eq!(pods.color(), Some(34));
    }

    #[test]
    fn test_clear_selection_is_recursive() {
        let mut root = Node::new("root", 0, Glyphs::default(), true, true);
        root.add_child("a", 1, Glyphs::default(), true, false)
            .add_child("b", 2, Glyphs::default(), true, false);

        root.clear_selection();

        assert!(!root.is_selected());
        assert!(!root.children()[0].is_selected());
        assert!(!root.children()[0].children()[0].is_selected());
    }

    #[test]
    fn test_find_by_line_ignores_unassigned_nodes() {
        let mut root = leaf("root");
        root.add_child("a", 1, Glyphs::default(), false, false);
        root.line_number = Some(1);

        assert_eq!(root.find_by_line(1).map(|n| n.name()), Some("root"));
        assert!(root.find_by_line(2).is_none());
    }

    #[test]
    fn test_path_to_line_and_descend_agree() {
        let mut root = leaf("root");
        root.add_child("a", 1, Glyphs::default(), false, false);
        root.add_child("b", 2, Glyphs::default(), false, false)
            .add_child("c", 3, Glyphs::default(), false, false);
        root.line_number = Some(1);
        root.children[1].children[0].line_number = Some(7);

        let path = root.path_to_line(7).unwrap();
        assert_eq!(path.indices(), &[1, 0]);
        assert_eq!(root.descend(path.indices()).map(|n| n.name()), Some("c"));
    }

    #[test]
    fn test_glyphs_for_state() {
        let glyphs = Glyphs::new("▸", "▾");
        assert_eq!(glyphs.for_state(false), "▸");
        assert_eq!(glyphs.for_state(true), "▾");
        assert_eq!(Glyphs::fixed("●").for_state(true), "●");
    }
}
