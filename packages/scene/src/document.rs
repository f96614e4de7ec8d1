//! In-memory document: the reference [`SceneTree`] implementation.
//!
//! A document is a list of pages, each an independent subtree rooted at a
//! page node. Exactly one page is active. Pages may start out deferred
//! (their subtree present but not yet visible to lookup or traversal) to
//! model lazy loading; [`SceneTree::load_page`] makes them resident.

use crate::errors::SceneError;
use crate::node::{Node, NodeKind};
use crate::tree::{PageInfo, SceneTree};
use crate::walk;
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug)]
struct Page {
    node: Node,
    loaded: bool,
}

/// Owned document tree with id minting and a version counter that
/// increments on every structural or geometric mutation.
#[derive(Debug)]
pub struct Document {
    pages: Vec<Page>,
    active: usize,
    next_id: u64,
    pub version: u64,
}

impl Document {
    /// Document with a single loaded, active page.
    pub fn new() -> Self {
        let mut doc = Self {
            pages: Vec::new(),
            active: 0,
            next_id: 0,
            version: 0,
        };
        doc.add_page("Page 1");
        doc
    }

    /// Append a loaded page; returns its id.
    pub fn add_page(&mut self, name: impl Into<String>) -> String {
        let mut node = Node::new(NodeKind::Page, name);
        node.id = self.mint_page_id();
        let id = node.id.clone();
        self.pages.push(Page { node, loaded: true });
        id
    }

    /// Append a page whose subtree is present but not yet resident: it is
    /// invisible to lookup and traversal until loaded. Ids are minted now
    /// so they stay stable across the load.
    pub fn add_deferred_page(
        &mut self,
        name: impl Into<String>,
        children: Vec<Node>,
    ) -> String {
        let mut node = Node::new(NodeKind::Page, name);
        node.id = self.mint_page_id();
        node.children = children;
        for child in &mut node.children {
            self.assign_ids(child);
        }
        let id = node.id.clone();
        self.pages.push(Page { node, loaded: false });
        id
    }

    pub fn set_active_page(&mut self, page_id: &str) -> Result<(), SceneError> {
        let index = self
            .pages
            .iter()
            .position(|p| p.node.id == page_id)
            .ok_or_else(|| SceneError::PageNotFound(page_id.to_string()))?;
        self.active = index;
        Ok(())
    }

    fn mint_page_id(&mut self) -> String {
        self.next_id += 1;
        format!("p{}", self.next_id)
    }

    fn mint_node_id(&mut self) -> String {
        self.next_id += 1;
        format!("n{}", self.next_id)
    }

    fn assign_ids(&mut self, node: &mut Node) {
        node.id = self.mint_node_id();
        for child in &mut node.children {
            self.assign_ids(child);
        }
    }

    fn page_by_id(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.node.id == page_id)
    }

    fn loaded_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.loaded)
    }

    fn attach(
        &mut self,
        parent_id: &str,
        index: Option<usize>,
        mut node: Node,
    ) -> Result<String, SceneError> {
        self.assign_ids(&mut node);
        let id = node.id.clone();

        let parent = self
            .lookup_mut(parent_id)
            .ok_or_else(|| SceneError::NodeNotFound(parent_id.to_string()))?;
        let children = parent
            .child_nodes_mut()
            .ok_or_else(|| SceneError::NotAContainer(parent_id.to_string()))?;

        let at = index.unwrap_or(children.len()).min(children.len());
        children.insert(at, node);
        self.version += 1;
        Ok(id)
    }

    fn lookup(&self, id: &str) -> Option<&Node> {
        for page in self.loaded_pages() {
            if page.node.id == id {
                return Some(&page.node);
            }
            if let Some(node) = walk::find(&page.node, id) {
                return Some(node);
            }
        }
        None
    }

    fn lookup_mut(&mut self, id: &str) -> Option<&mut Node> {
        for page in self.pages.iter_mut().filter(|p| p.loaded) {
            if page.node.id == id {
                return Some(&mut page.node);
            }
            if walk::find(&page.node, id).is_some() {
                return walk::find_mut(&mut page.node, id);
            }
        }
        None
    }

    /// Detach a node from whichever loaded page holds it.
    fn detach(&mut self, id: &str) -> Result<Node, SceneError> {
        for page in self.pages.iter_mut().filter(|p| p.loaded) {
            if let Some(node) = detach_from(&mut page.node, id) {
                self.version += 1;
                return Ok(node);
            }
        }
        Err(SceneError::NodeNotFound(id.to_string()))
    }
}

/// Recursive search-and-detach within one subtree.
fn detach_from(parent: &mut Node, id: &str) -> Option<Node> {
    if let Some(pos) = parent.children.iter().position(|c| c.id == id) {
        return Some(parent.children.remove(pos));
    }
    for child in &mut parent.children {
        if let Some(node) = detach_from(child, id) {
            return Some(node);
        }
    }
    None
}

fn cleared_copy(node: &Node) -> Node {
    let mut copy = node.clone();
    clear_ids(&mut copy);
    copy
}

fn clear_ids(node: &mut Node) {
    node.id.clear();
    for child in &mut node.children {
        clear_ids(child);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneTree for Document {
    async fn load_page_index(&mut self) -> Result<Vec<PageInfo>, SceneError> {
        let active = self.active;
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| PageInfo {
                id: p.node.id.clone(),
                name: p.node.name.clone(),
                loaded: p.loaded,
                active: i == active,
            })
            .collect())
    }

    async fn load_page(&mut self, page_id: &str) -> Result<(), SceneError> {
        let page = self
            .pages
            .iter_mut()
            .find(|p| p.node.id == page_id)
            .ok_or_else(|| SceneError::PageNotFound(page_id.to_string()))?;
        if !page.loaded {
            debug!(page = %page_id, "loading page subtree");
            page.loaded = true;
        }
        Ok(())
    }

    async fn load_all_pages(&mut self) -> Result<(), SceneError> {
        for page in &mut self.pages {
            page.loaded = true;
        }
        Ok(())
    }

    fn active_page_id(&self) -> String {
        self.pages[self.active].node.id.clone()
    }

    fn is_page_loaded(&self, page_id: &str) -> bool {
        self.page_by_id(page_id).map(|p| p.loaded).unwrap_or(false)
    }

    fn page(&self, page_id: &str) -> Option<&Node> {
        self.page_by_id(page_id).map(|p| &p.node)
    }

    fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.lookup(id)
    }

    fn find_in_page(&self, page_id: &str, id: &str) -> Option<&Node> {
        let page = self.page_by_id(page_id)?;
        if !page.loaded {
            return None;
        }
        walk::find(&page.node, id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.lookup(id).is_none() {
            return None;
        }
        self.version += 1;
        self.lookup_mut(id)
    }

    fn parent_id(&self, id: &str) -> Option<String> {
        for page in self.loaded_pages() {
            if let Some(path) = walk::find_path(&page.node, id) {
                if path.len() >= 2 {
                    return Some(path[path.len() - 2].id.clone());
                }
                return None;
            }
        }
        None
    }

    fn append_child(&mut self, parent_id: &str, node: Node) -> Result<String, SceneError> {
        self.attach(parent_id, None, node)
    }

    fn insert_child(
        &mut self,
        parent_id: &str,
        index: usize,
        node: Node,
    ) -> Result<String, SceneError> {
        self.attach(parent_id, Some(index), node)
    }

    fn remove(&mut self, id: &str) -> Result<(), SceneError> {
        self.detach(id).map(|_| ())
    }

    fn move_to(&mut self, id: &str, x: f64, y: f64) -> Result<(), SceneError> {
        let node = self
            .lookup_mut(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))?;
        node.x = x;
        node.y = y;
        self.version += 1;
        Ok(())
    }

    fn resize_to(&mut self, id: &str, width: f64, height: f64) -> Result<(), SceneError> {
        let node = self
            .lookup_mut(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))?;
        node.width = width.max(0.0);
        node.height = height.max(0.0);
        self.version += 1;
        Ok(())
    }

    fn clone_of(&self, id: &str) -> Result<Node, SceneError> {
        let node = self
            .lookup(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))?;
        Ok(cleared_copy(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(name: &str) -> Node {
        Node::new(NodeKind::Rectangle { corner_radius: 0.0 }, name)
    }

    #[test]
    fn test_new_document_has_active_page() {
        let doc = Document::new();
        let page_id = doc.active_page_id();
        assert!(doc.is_page_loaded(&page_id));
        assert!(doc.page(&page_id).is_some());
    }

    #[test]
    fn test_append_mints_ids_and_bumps_version() {
        let mut doc = Document::new();
        let page_id = doc.active_page_id();
        let id = doc.append_child(&page_id, rect("R1")).unwrap();
        assert!(id.starts_with('n'));
        assert_eq!(doc.version, 1);
        assert_eq!(doc.find_by_id(&id).unwrap().name, "R1");
    }

    #[test]
    fn test_append_to_leaf_fails() {
        let mut doc = Document::new();
        let page_id = doc.active_page_id();
        let leaf = doc.append_child(&page_id, rect("R1")).unwrap();
        let err = doc.append_child(&leaf, rect("R2")).unwrap_err();
        assert_eq!(err, SceneError::NotAContainer(leaf));
    }

    #[test]
    fn test_remove_is_terminal() {
        let mut doc = Document::new();
        let page_id = doc.active_page_id();
        let id = doc.append_child(&page_id, rect("R1")).unwrap();
        doc.remove(&id).unwrap();
        assert!(doc.find_by_id(&id).is_none());
        assert_eq!(doc.remove(&id), Err(SceneError::NodeNotFound(id)));
    }

    #[test]
    fn test_insert_child_clamps_index() {
        let mut doc = Document::new();
        let page_id = doc.active_page_id();
        doc.append_child(&page_id, rect("R1")).unwrap();
        let id = doc.insert_child(&page_id, 99, rect("R2")).unwrap();
        let page = doc.page(&page_id).unwrap();
        assert_eq!(page.children.last().unwrap().id, id);
    }

    #[test]
    fn test_clone_of_clears_ids() {
        let mut doc = Document::new();
        let page_id = doc.active_page_id();
        let id = doc.append_child(&page_id, rect("R1")).unwrap();
        let copy = doc.clone_of(&id).unwrap();
        assert!(copy.id.is_empty());
        assert_eq!(copy.name, "R1");
    }

    #[tokio::test]
    async fn test_deferred_page_invisible_until_loaded() {
        let mut doc = Document::new();
        let page_id = doc.add_deferred_page("Page 2", vec![rect("Hidden")]);

        let child_id = {
            let page = doc.page(&page_id).unwrap();
            page.children[0].id.clone()
        };
        assert!(doc.find_by_id(&child_id).is_none());
        assert!(doc.find_in_page(&page_id, &child_id).is_none());

        doc.load_page(&page_id).await.unwrap();
        assert!(doc.find_by_id(&child_id).is_some());
        assert!(doc.find_in_page(&page_id, &child_id).is_some());
    }

    #[tokio::test]
    async fn test_page_index_marks_active_and_loaded() {
        let mut doc = Document::new();
        doc.add_deferred_page("Page 2", vec![]);
        let index = doc.load_page_index().await.unwrap();
        assert_eq!(index.len(), 2);
        assert!(index[0].active && index[0].loaded);
        assert!(!index[1].active && !index[1].loaded);
    }
}
