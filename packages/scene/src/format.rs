//! Response formatting.
//!
//! Serializes a node into the structured record returned to callers. The
//! detail level controls how much of the node is included; formatting is a
//! pure function of the node, so formatting the same unmodified node twice
//! yields identical output.

use crate::node::{Node, NodeKind};
use crate::paint::Paint;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// How much of a node's attributes to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    Minimal,
    #[default]
    Standard,
    Detailed,
}

impl Detail {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "standard" => Some(Self::Standard),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }
}

/// Serialize one node at the given detail level.
pub fn format(node: &Node, detail: Detail) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(node.id));
    out.insert("name".into(), json!(node.name));
    out.insert("type".into(), json!(node.node_type().as_str()));

    if detail == Detail::Minimal {
        return Value::Object(out);
    }

    out.insert("x".into(), json!(node.x));
    out.insert("y".into(), json!(node.y));
    out.insert("width".into(), json!(node.width));
    out.insert("height".into(), json!(node.height));
    out.insert("visible".into(), json!(node.visible));

    if detail == Detail::Standard {
        return Value::Object(out);
    }

    out.insert("rotation".into(), json!(node.rotation));
    out.insert("locked".into(), json!(node.locked));
    out.insert("opacity".into(), json!(node.opacity));
    out.insert("blendMode".into(), json!(node.blend_mode.as_str()));
    out.insert("fills".into(), format_paints(&node.fills));
    out.insert("strokes".into(), format_paints(&node.strokes));
    out.insert("strokeWeight".into(), json!(node.stroke_weight));
    out.insert("strokeAlign".into(), json!(node.stroke_align.as_str()));

    match &node.kind {
        NodeKind::Frame {
            clips_content,
            corner_radius,
        } => {
            out.insert("clipsContent".into(), json!(clips_content));
            out.insert("cornerRadius".into(), json!(corner_radius));
        }
        NodeKind::Section { hidden } => {
            out.insert("sectionHidden".into(), json!(hidden));
        }
        NodeKind::Rectangle { corner_radius } => {
            out.insert("cornerRadius".into(), json!(corner_radius));
        }
        NodeKind::Star {
            point_count,
            inner_radius,
        } => {
            out.insert("pointCount".into(), json!(point_count));
            out.insert("innerRadius".into(), json!(inner_radius));
        }
        NodeKind::Polygon { point_count } => {
            out.insert("pointCount".into(), json!(point_count));
        }
        NodeKind::Page | NodeKind::Group | NodeKind::Ellipse | NodeKind::Slice => {}
    }

    if node.node_type().is_container() {
        out.insert("childCount".into(), json!(node.children.len()));
    }

    Value::Object(out)
}

fn format_paints(paints: &[Paint]) -> Value {
    Value::Array(
        paints
            .iter()
            .map(|p| json!({ "color": p.color.to_hex(), "opacity": p.opacity }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    fn sample_node() -> Node {
        let mut node = Node::new(NodeKind::Star { point_count: 5, inner_radius: 0.5 }, "Star 1");
        node.id = "n1".to_string();
        node.fills = vec![Paint::solid(Color::rgb(255, 0, 0))];
        node
    }

    #[test]
    fn test_minimal_has_only_identity() {
        let value = format(&sample_node(), Detail::Minimal);
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["type"], "star");
    }

    #[test]
    fn test_standard_adds_geometry() {
        let value = format(&sample_node(), Detail::Standard);
        let obj = value.as_object().unwrap();
        assert_eq!(obj["width"], 100.0);
        assert_eq!(obj["visible"], true);
        assert!(!obj.contains_key("fills"));
    }

    #[test]
    fn test_detailed_includes_kind_attributes() {
        let value = format(&sample_node(), Detail::Detailed);
        let obj = value.as_object().unwrap();
        assert_eq!(obj["pointCount"], 5);
        assert_eq!(obj["innerRadius"], 0.5);
        assert_eq!(obj["fills"][0]["color"], "#FF0000");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let node = sample_node();
        assert_eq!(format(&node, Detail::Detailed), format(&node, Detail::Detailed));
    }
}
