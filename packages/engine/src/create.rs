//! Creation operations.
//!
//! Each created node starts from its kind blueprint, takes geometry from
//! the item parameters, runs through the placement engine, then through
//! the property appliers, and is finally attached to the resolved parent
//! (or the active page). Placement output, either the advisory overlap
//! warning or the auto-placement reason, rides along on the item result.

use crate::apply::{apply_common, apply_kind};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fanout::ItemError;
use crate::params::ItemParams;
use crate::placement;
use crate::request::Operation;
use easel_scene::{format, Node, NodeKind, SceneError, SceneTree};
use serde_json::{json, Value};

/// Default payload and name for a creation operation.
pub fn blueprint(op: Operation) -> Option<(NodeKind, &'static str)> {
    match op {
        Operation::CreateRectangle => {
            Some((NodeKind::Rectangle { corner_radius: 0.0 }, "Rectangle"))
        }
        Operation::CreateEllipse => Some((NodeKind::Ellipse, "Ellipse")),
        Operation::CreateFrame => Some((
            NodeKind::Frame {
                clips_content: true,
                corner_radius: 0.0,
            },
            "Frame",
        )),
        Operation::CreateSection => Some((NodeKind::Section { hidden: false }, "Section")),
        Operation::CreateSlice => Some((NodeKind::Slice, "Slice")),
        Operation::CreateStar => Some((
            NodeKind::Star {
                point_count: 5,
                inner_radius: 0.5,
            },
            "Star",
        )),
        Operation::CreatePolygon => Some((NodeKind::Polygon { point_count: 6 }, "Polygon")),
        _ => None,
    }
}

/// Create one node from a scalarized item.
pub fn create_item(
    tree: &mut dyn SceneTree,
    kind: NodeKind,
    default_name: &str,
    item: &ItemParams,
    config: &EngineConfig,
) -> Result<Value, ItemError> {
    let detail = item.detail(config.default_detail)?;

    let parent_id = match item.str("parentId") {
        Some(id) => id,
        None => tree.active_page_id(),
    };

    let mut node = Node::new(
        kind,
        item.str("name").unwrap_or_else(|| default_name.to_string()),
    );
    if let Some(width) = item.f64("width") {
        node.width = width.max(0.0);
    }
    if let Some(height) = item.f64("height") {
        node.height = height.max(0.0);
    }

    let placed = {
        let parent = tree
            .find_by_id(&parent_id)
            .ok_or_else(|| EngineError::NodeNotFound(parent_id.clone()))?;
        if parent.child_nodes().is_none() {
            return Err(EngineError::Scene(SceneError::NotAContainer(parent_id)).into());
        }
        placement::plan(
            &parent.children,
            node.width,
            node.height,
            item.f64("x"),
            item.f64("y"),
            config.placement_gap,
        )
    };
    node.x = placed.x;
    node.y = placed.y;

    apply_common(&mut node, item)?;
    apply_kind(&mut node, item);

    let id = tree.append_child(&parent_id, node).map_err(EngineError::from)?;
    let created = tree
        .find_by_id(&id)
        .ok_or_else(|| EngineError::NodeNotFound(id.clone()))?;

    let mut data = format(created, detail);
    if let Value::Object(map) = &mut data {
        if let Some(warning) = placed.warning {
            map.insert("warning".into(), json!(warning));
        }
        if let Some(reason) = placed.reason {
            map.insert("positionReason".into(), json!(reason));
        }
    }
    Ok(data)
}
