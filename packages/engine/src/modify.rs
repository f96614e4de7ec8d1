//! Update, delete and duplicate operations.
//!
//! All three take `nodeId` as the array-able axis. Kind-specific updates
//! reject nodes of the wrong type before touching them; delete is
//! terminal; duplicate clones the source in place under the same parent,
//! offset per item.

use crate::apply::{apply_common, apply_kind, check_kind};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fanout::ItemError;
use crate::params::{ItemParams, ParamBag};
use easel_scene::{format, NodeType, SceneTree};
use serde_json::{json, Value};

/// Update one node. `expected` is set for kind-specific update
/// operations; the generic `update` applies common attributes only.
pub fn update_item(
    tree: &mut dyn SceneTree,
    expected: Option<NodeType>,
    item: &ItemParams,
    config: &EngineConfig,
) -> Result<Value, ItemError> {
    let detail = item.detail(config.default_detail)?;
    let id = item.require_str("nodeId")?;

    {
        let node = tree
            .node_mut(&id)
            .ok_or_else(|| ItemError::for_node(id.clone(), EngineError::NodeNotFound(id.clone())))?;

        if let Some(expected) = expected {
            check_kind(node, expected).map_err(|error| ItemError::for_node(id.clone(), error))?;
        }

        apply_common(node, item).map_err(|error| ItemError::for_node(id.clone(), error))?;
        if expected.is_some() {
            apply_kind(node, item);
        }
    }

    let node = tree
        .find_by_id(&id)
        .ok_or_else(|| ItemError::for_node(id.clone(), EngineError::NodeNotFound(id.clone())))?;
    Ok(format(node, detail))
}

/// Remove one node. The id becomes invalid for every later lookup,
/// including later items of the same batch.
pub fn delete_item(tree: &mut dyn SceneTree, item: &ItemParams) -> Result<Value, ItemError> {
    let id = item.require_str("nodeId")?;
    tree.remove(&id)
        .map_err(|error| ItemError::for_node(id.clone(), EngineError::from(error)))?;
    Ok(json!({ "id": id, "deleted": true }))
}

/// Clone one node under its own parent, offset from the source position.
///
/// Array-valued offsets are read per item through cycling and applied
/// relative to the source; scalar offsets progress with the copy index so
/// a single offset value fans copies out into a row.
pub fn duplicate_item(
    tree: &mut dyn SceneTree,
    bag: &ParamBag,
    item: &ItemParams,
    config: &EngineConfig,
) -> Result<Value, ItemError> {
    let detail = item.detail(config.default_detail)?;
    let id = item.require_str("nodeId")?;

    let (source_x, source_y) = {
        let source = tree
            .find_by_id(&id)
            .ok_or_else(|| ItemError::for_node(id.clone(), EngineError::NodeNotFound(id.clone())))?;
        (source.x, source.y)
    };
    let parent_id = tree.parent_id(&id).ok_or_else(|| {
        ItemError::for_node(
            id.clone(),
            EngineError::Validation(format!("Cannot duplicate a page node: {id}")),
        )
    })?;

    let mut copy = tree
        .clone_of(&id)
        .map_err(|error| ItemError::for_node(id.clone(), EngineError::from(error)))?;
    copy.x = source_x + offset(bag, item, "offsetX");
    copy.y = source_y + offset(bag, item, "offsetY");

    let new_id = tree
        .append_child(&parent_id, copy)
        .map_err(|error| ItemError::for_node(id.clone(), EngineError::from(error)))?;
    let node = tree
        .find_by_id(&new_id)
        .ok_or_else(|| ItemError::for_node(new_id.clone(), EngineError::NodeNotFound(new_id.clone())))?;
    Ok(format(node, detail))
}

fn offset(bag: &ParamBag, item: &ItemParams, key: &str) -> f64 {
    match item.f64(key) {
        Some(value) if bag.is_array(key) => value,
        Some(value) => value * (item.index() as f64 + 1.0),
        None => 0.0,
    }
}
