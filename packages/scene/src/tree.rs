//! The tree handle threaded through every operation.
//!
//! Engines never hold long-lived references into the document; they borrow
//! a [`SceneTree`] for the duration of one request. Page loading and
//! page-index loading are the only asynchronous suspension points; no
//! operation proceeds against a partially loaded page.

use crate::errors::SceneError;
use crate::node::Node;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry of the document's page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub id: String,
    pub name: String,
    pub loaded: bool,
    pub active: bool,
}

/// Abstract document tree: lookup, lazy page loading and the mutation
/// primitives the operation engines are built on.
///
/// [`crate::Document`] is the in-memory implementation; tests may
/// substitute their own.
#[async_trait]
pub trait SceneTree: Send {
    /// Load the document's page index. Must complete before any explicit
    /// page id is resolved.
    async fn load_page_index(&mut self) -> Result<Vec<PageInfo>, SceneError>;

    /// Load one page's subtree. Idempotent.
    async fn load_page(&mut self, page_id: &str) -> Result<(), SceneError>;

    /// Load every page's subtree.
    async fn load_all_pages(&mut self) -> Result<(), SceneError>;

    fn active_page_id(&self) -> String;

    fn is_page_loaded(&self, page_id: &str) -> bool;

    /// Page node by id. Children are only meaningful once loaded.
    fn page(&self, page_id: &str) -> Option<&Node>;

    /// Global lookup across every loaded page, O(document size). Page
    /// nodes themselves resolve too.
    fn find_by_id(&self, id: &str) -> Option<&Node>;

    /// Lookup scoped to one loaded page, O(page size).
    fn find_in_page(&self, page_id: &str, id: &str) -> Option<&Node>;

    fn node_mut(&mut self, id: &str) -> Option<&mut Node>;

    /// Id of the node's parent; `None` for page nodes and unknown ids.
    fn parent_id(&self, id: &str) -> Option<String>;

    /// Attach a detached node as the last child of `parent_id`, minting
    /// ids for it and its subtree. Returns the new id.
    fn append_child(&mut self, parent_id: &str, node: Node) -> Result<String, SceneError>;

    /// Attach a detached node at `index` (clamped) under `parent_id`.
    fn insert_child(&mut self, parent_id: &str, index: usize, node: Node)
        -> Result<String, SceneError>;

    /// Detach and drop a node. Terminal: the id becomes invalid for all
    /// subsequent lookups.
    fn remove(&mut self, id: &str) -> Result<(), SceneError>;

    fn move_to(&mut self, id: &str, x: f64, y: f64) -> Result<(), SceneError>;

    fn resize_to(&mut self, id: &str, width: f64, height: f64) -> Result<(), SceneError>;

    /// Detached deep copy with ids cleared; attach through
    /// [`Self::append_child`] to mint fresh ids.
    fn clone_of(&self, id: &str) -> Result<Node, SceneError>;
}
