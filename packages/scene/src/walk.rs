//! Tree walking primitives.
//!
//! Free functions over [`Node`] in the style of a visitor walk: traversal
//! is depth-first pre-order, and the depth bound truncates descent rather
//! than filtering afterwards, so nodes past the bound are never touched.

use crate::node::Node;

/// Pre-order walk of `root` and its subtree, including `root` itself at
/// depth 0. `max_depth` of 1 yields the root and its direct children.
pub fn descendants<'a>(root: &'a Node, max_depth: Option<u32>) -> Vec<&'a Node> {
    let mut out = Vec::new();
    collect(root, 0, max_depth, &mut out);
    out
}

/// Pre-order walk of a container's subtree, excluding the container
/// itself: children sit at depth 1. Used when the traversal root is a
/// page, which anchors the walk but is not itself a result.
pub fn child_descendants<'a>(container: &'a Node, max_depth: Option<u32>) -> Vec<&'a Node> {
    let mut out = Vec::new();
    for child in &container.children {
        collect(child, 1, max_depth, &mut out);
    }
    out
}

fn collect<'a>(node: &'a Node, depth: u32, max_depth: Option<u32>, out: &mut Vec<&'a Node>) {
    if let Some(max) = max_depth {
        if depth > max {
            return;
        }
    }
    out.push(node);
    for child in &node.children {
        collect(child, depth + 1, max_depth, out);
    }
}

/// Path from `root` down to the node with `id`, both inclusive.
pub fn find_path<'a>(root: &'a Node, id: &str) -> Option<Vec<&'a Node>> {
    if root.id == id {
        return Some(vec![root]);
    }
    for child in &root.children {
        if let Some(mut path) = find_path(child, id) {
            path.insert(0, root);
            return Some(path);
        }
    }
    None
}

/// First node with `id` in `root`'s subtree, including `root`.
pub fn find<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find(child, id))
}

pub fn find_mut<'a>(root: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if root.id == id {
        return Some(root);
    }
    root.children
        .iter_mut()
        .find_map(|child| find_mut(child, id))
}
