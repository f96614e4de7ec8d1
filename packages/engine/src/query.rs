//! Query engine: traversal modes and the filter pipeline.
//!
//! A query resolves a set of target nodes from a declarative request:
//! resolve the target page (loading it if needed), resolve explicit start
//! nodes, walk the tree under the requested traversal mode, then run the
//! filter pipeline. Depth limits truncate the walk itself: nodes past the
//! bound are never materialized, which the pipeline could not recover
//! after the fact.
//!
//! Filter stages run in a fixed order: visibility, page exclusion, type,
//! name, locked state, result cap. Visibility must precede page exclusion;
//! the order is part of the observable contract for overlapping filters.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::params::ParamBag;
use easel_scene::{format, walk, Detail, Node, SceneTree};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::debug;

/// How the tree is walked relative to each start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    #[default]
    Descendants,
    Children,
    Ancestors,
    Siblings,
}

impl TraversalMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "descendants" => Some(Self::Descendants),
            "children" => Some(Self::Children),
            "ancestors" => Some(Self::Ancestors),
            "siblings" => Some(Self::Siblings),
            _ => None,
        }
    }
}

/// First stage of the filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityFilter {
    #[default]
    Visible,
    Hidden,
    All,
}

impl VisibilityFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn keeps(&self, node: &Node) -> bool {
        match self {
            Self::Visible => node.visible,
            Self::Hidden => !node.visible,
            Self::All => true,
        }
    }
}

/// Parsed and validated query request.
#[derive(Debug)]
pub struct QuerySpec {
    pub page_id: Option<String>,
    pub start_ids: Vec<String>,
    pub mode: TraversalMode,
    pub max_depth: Option<u32>,
    pub include_all_pages: bool,
    pub visibility: VisibilityFilter,
    pub types: Vec<String>,
    pub name_pattern: Option<Regex>,
    pub locked: Option<bool>,
    pub max_results: Option<usize>,
    pub detail: Detail,
}

impl QuerySpec {
    /// Parse from the request bag. Malformed filter parameters are
    /// validation errors and fail the whole request.
    pub fn from_params(bag: &ParamBag, config: &EngineConfig) -> Result<Self, EngineError> {
        let item = bag.item(0);

        let mode = match item.str("traversal") {
            Some(text) => TraversalMode::parse(&text).ok_or_else(|| {
                EngineError::Validation(format!(
                    "Invalid traversal mode: {text:?}. Valid modes: descendants, children, ancestors, siblings"
                ))
            })?,
            None => TraversalMode::default(),
        };

        let visibility = match item.str("filterByVisibility") {
            Some(text) => VisibilityFilter::parse(&text).ok_or_else(|| {
                EngineError::Validation(format!(
                    "Invalid visibility filter: {text:?}. Valid values: visible, hidden, all"
                ))
            })?,
            None => VisibilityFilter::default(),
        };

        let name_pattern = match item.str("filterByName") {
            Some(pattern) => Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| EngineError::InvalidNamePattern { pattern, source })?,
            ),
            None => None,
        };

        let detail = item.detail(config.default_detail)?;

        Ok(Self {
            page_id: item.str("pageId"),
            start_ids: bag.all_strings("nodeId"),
            mode,
            max_depth: item.u32("maxDepth"),
            include_all_pages: item.bool("includeAllPages").unwrap_or(false),
            visibility,
            types: bag.all_strings("filterByType"),
            name_pattern,
            locked: item.bool("filterByLocked"),
            max_results: item.usize("maxResults"),
            detail,
        })
    }
}

/// Run a query end to end: load what must be resident, traverse, filter,
/// format.
pub async fn find_nodes(
    tree: &mut dyn SceneTree,
    spec: &QuerySpec,
    config: &EngineConfig,
) -> Result<Vec<Value>, EngineError> {
    if spec.include_all_pages {
        tree.load_all_pages().await?;
    }

    let target_page_id = resolve_target_page(tree, spec).await?;

    // Start nodes that are page nodes expand lazily; make their subtrees
    // resident before the immutable traversal phase begins.
    for id in &spec.start_ids {
        if tree.page(id).is_some() {
            tree.load_page(id).await?;
        }
    }

    let all_page_ids: Vec<String> = if spec.include_all_pages {
        tree.load_page_index()
            .await?
            .into_iter()
            .map(|info| info.id)
            .collect()
    } else {
        Vec::new()
    };

    let tree: &dyn SceneTree = &*tree;
    let mut nodes: Vec<&Node> = Vec::new();

    if spec.start_ids.is_empty() {
        let anchors: Vec<&Node> = if spec.include_all_pages {
            all_page_ids.iter().filter_map(|id| tree.page(id)).collect()
        } else {
            vec![tree
                .page(&target_page_id)
                .ok_or_else(|| EngineError::PageNotFound(target_page_id.clone()))?]
        };
        for page in anchors {
            collect_from_page_anchor(page, spec, &mut nodes);
        }
    } else {
        for id in &spec.start_ids {
            let node = resolve_start(tree, id, &target_page_id, spec)?;
            collect_from_start(tree, node, &target_page_id, &all_page_ids, spec, &mut nodes)?;
        }
    }

    debug!(collected = nodes.len(), "traversal complete");

    let filtered = apply_filters(nodes, spec, config);
    Ok(filtered
        .into_iter()
        .map(|node| format(node, spec.detail))
        .collect())
}

/// Global single-node lookup for `get_node`.
pub fn get_node(
    tree: &dyn SceneTree,
    node_id: &str,
    detail: Detail,
) -> Result<Value, EngineError> {
    let node = tree
        .find_by_id(node_id)
        .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
    Ok(format(node, detail))
}

/// Page index listing for `list_pages`; forces the index load.
pub async fn list_pages(tree: &mut dyn SceneTree) -> Result<Value, EngineError> {
    let index = tree.load_page_index().await?;
    Ok(serde_json::to_value(index).expect("page index serialization is infallible"))
}

async fn resolve_target_page(
    tree: &mut dyn SceneTree,
    spec: &QuerySpec,
) -> Result<String, EngineError> {
    match &spec.page_id {
        Some(id) => {
            // Explicit page ids resolve against the fully loaded index.
            let index = tree.load_page_index().await?;
            if !index.iter().any(|info| info.id == *id) {
                return Err(EngineError::PageNotFound(id.clone()));
            }
            tree.load_page(id).await?;
            Ok(id.clone())
        }
        None => {
            let id = tree.active_page_id();
            tree.load_page(&id).await?;
            Ok(id)
        }
    }
}

fn resolve_start<'a>(
    tree: &'a dyn SceneTree,
    id: &str,
    target_page_id: &str,
    spec: &QuerySpec,
) -> Result<&'a Node, EngineError> {
    if spec.include_all_pages {
        tree.find_by_id(id)
            .ok_or_else(|| EngineError::NodeNotFound(id.to_string()))
    } else {
        tree.find_in_page(target_page_id, id)
            .ok_or_else(|| EngineError::NodeNotFoundInPage {
                id: id.to_string(),
                page: target_page_id.to_string(),
            })
    }
}

/// Traversal rooted at a page with no explicit start node. The page
/// anchors the walk but is never itself a result; ancestor/sibling modes
/// are empty at the page boundary.
fn collect_from_page_anchor<'a>(page: &'a Node, spec: &QuerySpec, out: &mut Vec<&'a Node>) {
    match spec.mode {
        TraversalMode::Descendants => out.extend(walk::child_descendants(page, spec.max_depth)),
        TraversalMode::Children => out.extend(page.children.iter()),
        TraversalMode::Ancestors | TraversalMode::Siblings => {}
    }
}

fn collect_from_start<'a>(
    tree: &'a dyn SceneTree,
    node: &'a Node,
    target_page_id: &str,
    all_page_ids: &[String],
    spec: &QuerySpec,
    out: &mut Vec<&'a Node>,
) -> Result<(), EngineError> {
    let is_page = tree.page(&node.id).is_some();

    match spec.mode {
        TraversalMode::Descendants => {
            if is_page {
                out.extend(walk::child_descendants(node, spec.max_depth));
            } else {
                out.extend(walk::descendants(node, spec.max_depth));
            }
        }
        TraversalMode::Children => {
            out.extend(node.children.iter());
        }
        TraversalMode::Ancestors => {
            if !is_page {
                let path = path_to(tree, &node.id, target_page_id, all_page_ids, spec)?;
                // Parent chain upward, stopping before the page boundary.
                out.extend(path[1..path.len() - 1].iter().rev().copied());
            }
        }
        TraversalMode::Siblings => {
            if !is_page {
                let path = path_to(tree, &node.id, target_page_id, all_page_ids, spec)?;
                let parent = path[path.len() - 2];
                out.extend(parent.children.iter().filter(|child| child.id != node.id));
            }
        }
    }

    Ok(())
}

/// Path from the containing page down to the node, both inclusive.
fn path_to<'a>(
    tree: &'a dyn SceneTree,
    node_id: &str,
    target_page_id: &str,
    all_page_ids: &[String],
    spec: &QuerySpec,
) -> Result<Vec<&'a Node>, EngineError> {
    let candidates: Vec<&str> = if spec.include_all_pages {
        all_page_ids.iter().map(String::as_str).collect()
    } else {
        vec![target_page_id]
    };

    for page_id in candidates {
        if let Some(page) = tree.page(page_id) {
            if let Some(path) = walk::find_path(page, node_id) {
                return Ok(path);
            }
        }
    }

    Err(EngineError::NodeNotFound(node_id.to_string()))
}

/// The filter pipeline. Every stage is a pure, order-preserving transform
/// over the working sequence.
fn apply_filters<'a>(
    nodes: Vec<&'a Node>,
    spec: &QuerySpec,
    config: &EngineConfig,
) -> Vec<&'a Node> {
    let mut nodes: Vec<&Node> = nodes
        .into_iter()
        .filter(|node| spec.visibility.keeps(node))
        .collect();

    if !spec.include_all_pages {
        nodes.retain(|node| node.node_type() != easel_scene::NodeType::Page);
    }

    if !spec.types.is_empty() {
        nodes.retain(|node| {
            spec.types
                .iter()
                .any(|name| name.eq_ignore_ascii_case(node.node_type().as_str()))
        });
    }

    if let Some(pattern) = &spec.name_pattern {
        nodes.retain(|node| pattern.is_match(&node.name));
    }

    if let Some(locked) = spec.locked {
        nodes.retain(|node| node.locked == locked);
    }

    let cap = match (spec.max_results, config.max_results_ceiling) {
        (Some(requested), Some(ceiling)) => Some(requested.min(ceiling)),
        (Some(requested), None) => Some(requested),
        (None, ceiling) => ceiling,
    };
    if let Some(cap) = cap {
        nodes.truncate(cap);
    }

    nodes
}
