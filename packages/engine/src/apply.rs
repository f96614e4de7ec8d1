//! Per-kind property application.
//!
//! Common attributes apply uniformly across every kind whose capability
//! table supports them; unsupported kinds no-op. Out-of-range values are
//! clamped, never raised: star inner radius to [0,1], star/polygon point
//! count to >= 3, corner radius and stroke weight to >= 0, opacity to
//! [0,1].

use crate::error::EngineError;
use crate::params::ItemParams;
use easel_scene::{BlendMode, Node, NodeKind, NodeType, Paint, StrokeAlign};

/// Apply the attributes shared by every node kind.
pub fn apply_common(node: &mut Node, item: &ItemParams) -> Result<(), EngineError> {
    let node_type = node.node_type();

    if let Some(name) = item.str("name") {
        node.name = name;
    }
    if let Some(x) = item.f64("x") {
        node.x = x;
    }
    if let Some(y) = item.f64("y") {
        node.y = y;
    }
    if let Some(width) = item.f64("width") {
        node.width = width.max(0.0);
    }
    if let Some(height) = item.f64("height") {
        node.height = height.max(0.0);
    }
    if let Some(rotation) = item.f64("rotation") {
        if node_type.supports_rotation() {
            node.rotation = rotation;
        }
    }
    if let Some(visible) = item.bool("visible") {
        node.visible = visible;
    }
    if let Some(locked) = item.bool("locked") {
        node.locked = locked;
    }
    if let Some(opacity) = item.f64("opacity") {
        if node_type.supports_opacity() {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
    }
    if let Some(text) = item.str("blendMode") {
        node.blend_mode = BlendMode::parse(&text).ok_or_else(|| {
            EngineError::Validation(format!("Invalid blend mode: {text:?}"))
        })?;
    }

    if node_type.supports_fills() {
        if let Some(color) = item.color("fillColor")? {
            let opacity = item.f64("fillOpacity").unwrap_or(1.0);
            node.fills = vec![Paint::with_opacity(color, opacity)];
        }
    }
    if node_type.supports_strokes() {
        if let Some(color) = item.color("strokeColor")? {
            let opacity = item.f64("strokeOpacity").unwrap_or(1.0);
            node.strokes = vec![Paint::with_opacity(color, opacity)];
        }
        if let Some(weight) = item.f64("strokeWeight") {
            node.stroke_weight = weight.max(0.0);
        }
        if let Some(text) = item.str("strokeAlign") {
            node.stroke_align = StrokeAlign::parse(&text).ok_or_else(|| {
                EngineError::Validation(format!("Invalid stroke alignment: {text:?}"))
            })?;
        }
    }

    Ok(())
}

/// Apply attributes specific to the node's kind. The caller has already
/// checked the kind for kind-specific update operations, so an unexpected
/// variant here is simply a no-op.
pub fn apply_kind(node: &mut Node, item: &ItemParams) {
    match &mut node.kind {
        NodeKind::Frame {
            clips_content,
            corner_radius,
        } => {
            if let Some(clips) = item.bool("clipsContent") {
                *clips_content = clips;
            }
            if let Some(radius) = item.f64("cornerRadius") {
                *corner_radius = radius.max(0.0);
            }
        }
        NodeKind::Rectangle { corner_radius } => {
            if let Some(radius) = item.f64("cornerRadius") {
                *corner_radius = radius.max(0.0);
            }
        }
        NodeKind::Section { hidden } => {
            if let Some(value) = item.bool("sectionHidden") {
                *hidden = value;
            }
        }
        NodeKind::Star {
            point_count,
            inner_radius,
        } => {
            if let Some(count) = item.u32("pointCount") {
                *point_count = count.max(3);
            }
            if let Some(radius) = item.f64("innerRadius") {
                *inner_radius = radius.clamp(0.0, 1.0);
            }
        }
        NodeKind::Polygon { point_count } => {
            if let Some(count) = item.u32("pointCount") {
                *point_count = count.max(3);
            }
        }
        NodeKind::Page | NodeKind::Group | NodeKind::Ellipse | NodeKind::Slice => {}
    }
}

/// Reject a node whose actual type does not match the kind an update
/// operation was addressed to.
pub fn check_kind(node: &Node, expected: NodeType) -> Result<(), EngineError> {
    let actual = node.node_type();
    if actual == expected {
        Ok(())
    } else {
        Err(EngineError::TypeMismatch {
            id: node.id.clone(),
            expected: expected.as_str(),
            actual: actual.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamBag;
    use serde_json::json;

    fn item(value: serde_json::Value) -> ItemParams {
        ParamBag::new(value.as_object().unwrap()).item(0)
    }

    #[test]
    fn test_common_attributes_apply() {
        let mut node = Node::new(NodeKind::Rectangle { corner_radius: 0.0 }, "R");
        apply_common(
            &mut node,
            &item(json!({
                "name": "Renamed",
                "rotation": 45,
                "opacity": 0.5,
                "fillColor": "#FF0000",
                "strokeColor": "#000000",
                "strokeWeight": 2,
                "blendMode": "multiply"
            })),
        )
        .unwrap();

        assert_eq!(node.name, "Renamed");
        assert_eq!(node.rotation, 45.0);
        assert_eq!(node.opacity, 0.5);
        assert_eq!(node.fills[0].color.to_hex(), "#FF0000");
        assert_eq!(node.stroke_weight, 2.0);
        assert_eq!(node.blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn test_unsupported_attributes_noop() {
        let mut slice = Node::new(NodeKind::Slice, "S");
        apply_common(&mut slice, &item(json!({ "fillColor": "#FF0000", "opacity": 0.5 })))
            .unwrap();
        assert!(slice.fills.is_empty());
        assert_eq!(slice.opacity, 1.0);
    }

    #[test]
    fn test_clamps_are_silent() {
        let mut node = Node::new(NodeKind::Star { point_count: 5, inner_radius: 0.5 }, "S");
        apply_common(&mut node, &item(json!({ "opacity": 7, "strokeWeight": -3 }))).unwrap();
        assert_eq!(node.opacity, 1.0);
        assert_eq!(node.stroke_weight, 0.0);

        apply_kind(&mut node, &item(json!({ "pointCount": 1, "innerRadius": 2.5 })));
        assert_eq!(node.kind, NodeKind::Star { point_count: 3, inner_radius: 1.0 });
    }

    #[test]
    fn test_corner_radius_clamped_to_zero() {
        let mut node = Node::new(NodeKind::Rectangle { corner_radius: 4.0 }, "R");
        apply_kind(&mut node, &item(json!({ "cornerRadius": -10 })));
        assert_eq!(node.kind, NodeKind::Rectangle { corner_radius: 0.0 });
    }

    #[test]
    fn test_check_kind_names_the_mismatch() {
        let mut node = Node::new(NodeKind::Ellipse, "E");
        node.id = "n9".to_string();
        let err = check_kind(&node, NodeType::Star).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("n9"));
        assert!(message.contains("star"));
        assert!(message.contains("ellipse"));
    }

    #[test]
    fn test_invalid_blend_mode_is_an_error() {
        let mut node = Node::new(NodeKind::Ellipse, "E");
        assert!(apply_common(&mut node, &item(json!({ "blendMode": "difference" }))).is_err());
    }
}
