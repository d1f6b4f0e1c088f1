use super::node::Node;
use crate::{ansi, theme};
use unicode_width::UnicodeWidthStr;

/// one indentation unit per depth level
pub const INDENT: &str = "   ";
pub const EXPANDED_MARKER: &str = "─ ";
pub const COLLAPSED_MARKER: &str = "+ ";

/// Render `node` and its visible descendants in preorder, assigning line
/// numbers from `line` onward. `line` is left pointing at the next free line.
pub(crate) fn render_node<T>(
    node: &mut Node<T>,
    prefix: &str,
    width: usize,
    line: &mut usize,
    out: &mut String,
) {
    node.line_number = Some(*line);
    *line += 1;

    let mut tree_prefix = String::from(prefix);
    if node.has_children() {
        tree_prefix.push_str(if node.is_expanded() {
            EXPANDED_MARKER
        } else {
            COLLAPSED_MARKER
        });
    }
    tree_prefix.push_str(node.glyphs().for_state(node.is_expanded()));
    tree_prefix.push(' ');

    // pad out to width, never truncate
    let used = tree_prefix.width() + node.name().width();
    let padding = width.saturating_sub(used);

    if node.is_selected() {
        out.push_str(&ansi::background(theme::TREE_HIGHLIGHT_BG));
    }
    out.push_str(&tree_prefix);
    if let Some(color) = node.color() {
        out.push_str(&ansi::foreground(color));
    }
    out.push_str(node.name());
    out.extend(std::iter::repeat_n(' ', padding));
    out.push_str(ansi::RESET);
    out.push('\n');

    if node.is_expanded() {
        let child_prefix = format!("{}{}", prefix, INDENT);
        for index in 0..node.children().len() {
            if let Some(child) = node.child_at_mut(index) {
                render_node(child, &child_prefix, width, line, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Glyphs;

    fn render(node: &mut Node<()>, width: usize) -> (String, usize) {
        let mut line = 1;
        let mut out = String::new();
        render_node(node, "", width, &mut line, &mut out);
        (out, line - 1)
    }

    #[test]
    fn test_leaf_line_is_padded_to_width() {
        let mut node = Node::new("abc", (), Glyphs::fixed("●"), false, false);
        let (text, count) = render(&mut node, 10);

        // "● " is two columns, "abc" three, five spaces of padding
        assert_eq!(text, "● abc     \x1b[0m\n");
        assert_eq!(count, 1);
        assert_eq!(node.line_number(), Some(1));
    }

    #[test]
    fn test_long_name_is_never_truncated() {
        let mut node = Node::new("a-very-long-pod-name", (), Glyphs::default(), false, false);
        let (text, _) = render(&mut node, 5);
        assert_eq!(text, " a-very-long-pod-name\x1b[0m\n");
    }

    #[test]
    fn test_selected_line_gets_background_and_color() {
        let mut node = Node::new("ns1", (), Glyphs::fixed("◆"), true, false);
        node.set_color(33);
        let (text, _) = render(&mut node, 0);
        assert_eq!(text, "\x1b[48;5;237m◆ \x1b[38;5;33mns1\x1b[0m\n");
    }

    #[test]
    fn test_markers_and_indentation() {
        let mut root = Node::new("root", (), Glyphs::new("c", "o"), false, true);
        root.add_child("open", (), Glyphs::new("c", "o"), false, true)
            .add_child("leaf", (), Glyphs::default(), false, false);
        root.add_child("shut", (), Glyphs::new("c", "o"), false, false)
            .add_child("hidden", (), Glyphs::default(), false, false);

        let (text, count) = render(&mut root, 0);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(count, 4);
        assert_eq!(lines[0], "─ o root\x1b[0m");
        assert_eq!(lines[1], "   ─ o open\x1b[0m");
        assert_eq!(lines[2], "       leaf\x1b[0m");
        assert_eq!(lines[3], "   + c shut\x1b[0m");
        assert_eq!(root.children()[1].children()[0].line_number(), None);
    }
}
