use std::collections::HashSet;

use crate::model::store::{SiblingIndex, sibling_index};
use crate::model::task::{Task, TreeNode};
use crate::model::view::ViewState;

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Build the full tree from a flat task list.
///
/// Real roots (no parent) come first, in display order. Tasks that can't be
/// reached from a real root follow as extra roots: orphans whose parent isn't
/// loaded, then members of parent cycles. Every task appears exactly once.
pub fn build_tree(tasks: &[Task]) -> Vec<TreeNode> {
    let index = sibling_index(tasks);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut roots = build_level(&index, None, 0, &mut visited);

    let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut orphans: Vec<&Task> = Vec::new();
    let mut stranded: Vec<&Task> = Vec::new();
    for task in tasks {
        if visited.contains(task.id.as_str()) {
            continue;
        }
        match task.parent() {
            Some(p) if !ids.contains(p) => orphans.push(task),
            _ => stranded.push(task),
        }
    }
    orphans.sort_by_key(|t| t.display_order);
    stranded.sort_by_key(|t| t.display_order);

    for task in orphans.into_iter().chain(stranded) {
        if visited.insert(task.id.as_str()) {
            roots.push(build_node(&index, task, 0, &mut visited));
        }
    }
    roots
}

/// Build the ordered children of `parent` at depth `level`.
pub fn build_subtree(tasks: &[Task], parent: Option<&str>, level: usize) -> Vec<TreeNode> {
    let index = sibling_index(tasks);
    let mut visited = HashSet::new();
    build_level(&index, parent, level, &mut visited)
}

fn build_level<'a>(
    index: &SiblingIndex<'a>,
    parent: Option<&'a str>,
    level: usize,
    visited: &mut HashSet<&'a str>,
) -> Vec<TreeNode> {
    let Some(group) = index.get(&parent) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(group.len());
    for &task in group {
        // A task reachable twice means a parent cycle; render it once
        if visited.insert(task.id.as_str()) {
            nodes.push(build_node(index, task, level, visited));
        }
    }
    nodes
}

fn build_node<'a>(
    index: &SiblingIndex<'a>,
    task: &'a Task,
    level: usize,
    visited: &mut HashSet<&'a str>,
) -> TreeNode {
    TreeNode {
        task: task.clone(),
        level,
        children: build_level(index, Some(task.id.as_str()), level + 1, visited),
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Depth-first pre-order walk of a tree.
pub fn flatten(tree: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    for_each_node(tree, &mut |node| out.push(node));
    out
}

fn for_each_node<'a>(nodes: &'a [TreeNode], f: &mut dyn FnMut(&'a TreeNode)) {
    for node in nodes {
        f(node);
        for_each_node(&node.children, f);
    }
}

/// Find a node anywhere in a tree.
pub fn find_node<'a>(tree: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in tree {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// All descendants of `id` in the flat list, pre-order by display order.
/// Does not include `id` itself. Cycle-safe.
pub fn descendant_ids(tasks: &[Task], id: &str) -> Vec<String> {
    let index = sibling_index(tasks);
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(id);
    let mut out = Vec::new();
    collect_descendants(&index, id, &mut visited, &mut out);
    out
}

fn collect_descendants<'a>(
    index: &SiblingIndex<'a>,
    id: &'a str,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<String>,
) {
    let Some(children) = index.get(&Some(id)) else {
        return;
    };
    for &child in children {
        if visited.insert(child.id.as_str()) {
            out.push(child.id.clone());
            collect_descendants(index, child.id.as_str(), visited, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Visible rows
// ---------------------------------------------------------------------------

/// A row the rendering layer paints: one node plus its display flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub node: &'a TreeNode,
    pub selected: bool,
    pub expanded: bool,
    /// First among its siblings (move-up disabled)
    pub is_first: bool,
    /// Last among its siblings (move-down disabled)
    pub is_last: bool,
}

/// Rows in display order. A node's children are visible only while the node
/// is expanded (or when `expand_all` is set).
pub fn visible_rows<'a>(tree: &'a [TreeNode], view: &ViewState, expand_all: bool) -> Vec<Row<'a>> {
    let mut rows = Vec::new();
    push_rows(tree, view, expand_all, &mut rows);
    rows
}

fn push_rows<'a>(nodes: &'a [TreeNode], view: &ViewState, expand_all: bool, rows: &mut Vec<Row<'a>>) {
    let last = nodes.len().saturating_sub(1);
    for (i, node) in nodes.iter().enumerate() {
        let expanded = node.has_children() && (expand_all || view.is_expanded(node.id()));
        rows.push(Row {
            node,
            selected: view.is_selected(node.id()),
            expanded,
            is_first: i == 0,
            is_last: i == last,
        });
        if expanded {
            push_rows(&node.children, view, expand_all, rows);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("B", "Bravo", 2),
            Task::new("C", "Charlie", 1).with_parent("A"),
            Task::new("A", "Alpha", 1),
            Task::new("D", "Delta", 2).with_parent("A"),
            Task::new("E", "Echo", 1).with_parent("D"),
        ]
    }

    fn ids<'a>(nodes: &[&'a TreeNode]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.id()).collect()
    }

    #[test]
    fn builds_hierarchy_with_levels() {
        let tree = build_tree(&sample_tasks());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id(), "A");
        assert_eq!(tree[1].id(), "B");
        assert_eq!(tree[0].children[1].id(), "D");
        assert_eq!(tree[0].children[1].level, 1);
        assert_eq!(tree[0].children[1].children[0].id(), "E");
        assert_eq!(tree[0].children[1].children[0].level, 2);
    }

    #[test]
    fn flatten_is_preorder() {
        let tree = build_tree(&sample_tasks());
        assert_eq!(ids(&flatten(&tree)), vec!["A", "C", "D", "E", "B"]);
    }

    #[test]
    fn empty_list_builds_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn equal_orders_keep_first_seen() {
        let tasks = vec![
            Task::new("X", "x", 1),
            Task::new("Y", "y", 1),
            Task::new("Z", "z", 1),
        ];
        let tree = build_tree(&tasks);
        assert_eq!(ids(&flatten(&tree)), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn orphans_become_extra_roots() {
        let tasks = vec![
            Task::new("A", "Alpha", 5),
            Task::new("O2", "Orphan two", 2).with_parent("missing"),
            Task::new("O1", "Orphan one", 1).with_parent("gone"),
            Task::new("K", "Kid", 1).with_parent("O1"),
        ];
        let tree = build_tree(&tasks);
        let roots: Vec<&str> = tree.iter().map(|n| n.id()).collect();
        assert_eq!(roots, vec!["A", "O1", "O2"]);
        assert_eq!(tree[1].level, 0);
        assert_eq!(tree[1].children[0].id(), "K");
        assert_eq!(tree[1].children[0].level, 1);
    }

    #[test]
    fn cycles_terminate_and_render_once() {
        let tasks = vec![
            Task::new("R", "Root", 1),
            Task::new("P", "P", 1).with_parent("Q"),
            Task::new("Q", "Q", 2).with_parent("P"),
            Task::new("S", "Self", 3).with_parent("S"),
        ];
        let tree = build_tree(&tasks);
        let mut all = ids(&flatten(&tree));
        all.sort();
        assert_eq!(all, vec!["P", "Q", "R", "S"]);
        // P is entered first (lower order) and carries Q beneath it
        assert_eq!(tree[1].id(), "P");
        assert_eq!(tree[1].children[0].id(), "Q");
        assert!(tree[1].children[0].children.is_empty());
        assert_eq!(tree[2].id(), "S");
        assert!(tree[2].children.is_empty());
    }

    #[test]
    fn build_subtree_starts_at_parent() {
        let sub = build_subtree(&sample_tasks(), Some("A"), 1);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub[0].id(), "C");
        assert_eq!(sub[0].level, 1);
        assert_eq!(sub[1].children[0].level, 2);
    }

    #[test]
    fn descendants_full_depth() {
        assert_eq!(descendant_ids(&sample_tasks(), "A"), vec!["C", "D", "E"]);
        assert_eq!(descendant_ids(&sample_tasks(), "B"), Vec::<String>::new());
        assert_eq!(descendant_ids(&sample_tasks(), "nope"), Vec::<String>::new());
    }

    #[test]
    fn descendants_cycle_safe() {
        let tasks = vec![
            Task::new("P", "P", 1).with_parent("Q"),
            Task::new("Q", "Q", 1).with_parent("P"),
        ];
        assert_eq!(descendant_ids(&tasks, "P"), vec!["Q"]);
    }

    #[test]
    fn find_node_nested() {
        let tree = build_tree(&sample_tasks());
        assert_eq!(find_node(&tree, "E").map(|n| n.level), Some(2));
        assert!(find_node(&tree, "Z").is_none());
    }

    #[test]
    fn visible_rows_follow_expansion() {
        let tree = build_tree(&sample_tasks());
        let mut view = ViewState::default();

        let rows = visible_rows(&tree, &view, false);
        let visible: Vec<&str> = rows.iter().map(|r| r.node.id()).collect();
        assert_eq!(visible, vec!["A", "B"]);
        assert!(rows[0].is_first && !rows[0].is_last);
        assert!(rows[1].is_last);

        view.expanded.insert("A".into());
        view.selected.insert("C".into());
        let rows = visible_rows(&tree, &view, false);
        let visible: Vec<&str> = rows.iter().map(|r| r.node.id()).collect();
        assert_eq!(visible, vec!["A", "C", "D", "B"]);
        assert!(rows[0].expanded);
        assert!(rows[1].selected);
        // D has children but is collapsed
        assert!(!rows[2].expanded);
    }

    #[test]
    fn collapsed_parent_hides_expanded_descendants() {
        let tree = build_tree(&sample_tasks());
        let mut view = ViewState::default();
        view.expanded.insert("D".into());
        let visible: Vec<&str> = visible_rows(&tree, &view, false)
            .iter()
            .map(|r| r.node.id())
            .collect();
        assert_eq!(visible, vec!["A", "B"]);

        view.expanded.insert("A".into());
        let visible: Vec<&str> = visible_rows(&tree, &view, false)
            .iter()
            .map(|r| r.node.id())
            .collect();
        assert_eq!(visible, vec!["A", "C", "D", "E", "B"]);
    }

    #[test]
    fn expand_all_shows_everything() {
        let tree = build_tree(&sample_tasks());
        let rows = visible_rows(&tree, &ViewState::default(), true);
        assert_eq!(rows.len(), 5);
        // Leaves never report expanded
        assert!(!rows[1].expanded);
    }
}
