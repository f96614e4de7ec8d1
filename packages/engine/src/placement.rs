//! Spatial placement for newly created nodes.
//!
//! When a caller supplies coordinates, the engine only checks the proposed
//! box against the future siblings and reports overlaps as an advisory
//! warning; the node is still placed where asked. When no coordinates are
//! supplied, the engine picks a non-overlapping slot near existing
//! content: candidate positions to the right of and below each sibling,
//! closest to the content centroid first. The scan is deterministic for
//! identical input state and always terminates with a valid coordinate;
//! the final fallback sits clear of all existing content.

use easel_scene::{Node, Rect};

/// Resolved coordinates plus at most one of {warning, reason}, surfaced
/// unchanged in the per-item result.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub warning: Option<String>,
    pub reason: Option<String>,
}

/// Place a `width` × `height` node among `siblings`.
pub fn plan(
    siblings: &[Node],
    width: f64,
    height: f64,
    explicit_x: Option<f64>,
    explicit_y: Option<f64>,
    gap: f64,
) -> Placement {
    if explicit_x.is_some() || explicit_y.is_some() {
        let x = explicit_x.unwrap_or(0.0);
        let y = explicit_y.unwrap_or(0.0);
        return Placement {
            x,
            y,
            warning: overlap_warning(siblings, &Rect::new(x, y, width, height)),
            reason: None,
        };
    }

    auto_place(siblings, width, height, gap)
}

/// Advisory overlap report for an explicitly positioned box.
fn overlap_warning(siblings: &[Node], proposed: &Rect) -> Option<String> {
    let overlapped: Vec<String> = siblings
        .iter()
        .filter(|sibling| sibling.bounds().intersects(proposed))
        .map(|sibling| format!("{:?} ({})", sibling.name, sibling.id))
        .collect();

    if overlapped.is_empty() {
        None
    } else {
        Some(format!(
            "Overlaps {} existing sibling(s): {}",
            overlapped.len(),
            overlapped.join(", ")
        ))
    }
}

fn auto_place(siblings: &[Node], width: f64, height: f64, gap: f64) -> Placement {
    if siblings.is_empty() {
        return Placement {
            x: 0.0,
            y: 0.0,
            warning: None,
            reason: Some("no existing siblings".to_string()),
        };
    }

    let bounds: Vec<Rect> = siblings.iter().map(Node::bounds).collect();
    let content = bounds
        .iter()
        .skip(1)
        .fold(bounds[0], |acc, rect| acc.union(rect));
    let (cx, cy) = content.center();

    // One slot to the right of and one below each sibling, nearest to the
    // content centroid first; (x, y) breaks ties so the scan is stable.
    let mut candidates: Vec<(f64, f64, &'static str)> = Vec::with_capacity(bounds.len() * 2);
    for rect in &bounds {
        candidates.push((rect.right() + gap, rect.y, "placed beside nearest sibling"));
        candidates.push((rect.x, rect.bottom() + gap, "placed below nearest sibling"));
    }
    candidates.sort_by(|a, b| {
        let da = distance_sq(a.0 + width / 2.0, a.1 + height / 2.0, cx, cy);
        let db = distance_sq(b.0 + width / 2.0, b.1 + height / 2.0, cx, cy);
        da.total_cmp(&db)
            .then(a.0.total_cmp(&b.0))
            .then(a.1.total_cmp(&b.1))
    });

    for (x, y, reason) in &candidates {
        let proposed = Rect::new(*x, *y, width, height);
        if !bounds.iter().any(|rect| rect.intersects(&proposed)) {
            return Placement {
                x: *x,
                y: *y,
                warning: None,
                reason: Some((*reason).to_string()),
            };
        }
    }

    // Clear of everything: right of the whole content box.
    Placement {
        x: content.right() + gap,
        y: content.y,
        warning: None,
        reason: Some("placed clear of existing content".to_string()),
    }
}

fn distance_sq(x: f64, y: f64, cx: f64, cy: f64) -> f64 {
    (x - cx).powi(2) + (y - cy).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_scene::NodeKind;

    fn sibling(name: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        let mut node = Node::new(NodeKind::Rectangle { corner_radius: 0.0 }, name);
        node.id = format!("id-{name}");
        node.x = x;
        node.y = y;
        node.width = w;
        node.height = h;
        node
    }

    #[test]
    fn test_empty_parent_places_at_origin() {
        let placement = plan(&[], 100.0, 100.0, None, None, 20.0);
        assert_eq!((placement.x, placement.y), (0.0, 0.0));
        assert_eq!(placement.reason.as_deref(), Some("no existing siblings"));
        assert!(placement.warning.is_none());
    }

    #[test]
    fn test_explicit_position_with_overlap_warns_but_places() {
        let siblings = vec![sibling("A", 0.0, 0.0, 10.0, 10.0)];
        let placement = plan(&siblings, 10.0, 10.0, Some(5.0), Some(5.0), 20.0);
        assert_eq!((placement.x, placement.y), (5.0, 5.0));
        let warning = placement.warning.unwrap();
        assert!(warning.contains("\"A\""));
        assert!(placement.reason.is_none());
    }

    #[test]
    fn test_edge_touching_is_not_an_overlap() {
        let siblings = vec![sibling("A", 0.0, 0.0, 10.0, 10.0)];
        let placement = plan(&siblings, 10.0, 10.0, Some(10.0), Some(0.0), 20.0);
        assert!(placement.warning.is_none());
    }

    #[test]
    fn test_partial_explicit_defaults_other_axis_to_zero() {
        let siblings = vec![sibling("A", 0.0, 0.0, 10.0, 10.0)];
        let placement = plan(&siblings, 10.0, 10.0, Some(50.0), None, 20.0);
        assert_eq!((placement.x, placement.y), (50.0, 0.0));
        assert!(placement.warning.is_none());
        assert!(placement.reason.is_none());
    }

    #[test]
    fn test_auto_placement_avoids_siblings() {
        let siblings = vec![
            sibling("A", 0.0, 0.0, 100.0, 100.0),
            sibling("B", 120.0, 0.0, 100.0, 100.0),
        ];
        let placement = plan(&siblings, 100.0, 100.0, None, None, 20.0);
        let chosen = Rect::new(placement.x, placement.y, 100.0, 100.0);
        for node in &siblings {
            assert!(!node.bounds().intersects(&chosen));
        }
        assert!(placement.reason.is_some());
    }

    #[test]
    fn test_auto_placement_is_deterministic() {
        let siblings = vec![
            sibling("A", 0.0, 0.0, 50.0, 50.0),
            sibling("B", 200.0, 200.0, 50.0, 50.0),
        ];
        let first = plan(&siblings, 80.0, 80.0, None, None, 20.0);
        let second = plan(&siblings, 80.0, 80.0, None, None, 20.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_node_still_finds_clear_slot() {
        let siblings = vec![
            sibling("A", 0.0, 0.0, 100.0, 100.0),
            sibling("B", 110.0, 0.0, 100.0, 100.0),
            sibling("C", 0.0, 110.0, 100.0, 100.0),
            sibling("D", 110.0, 110.0, 100.0, 100.0),
        ];
        let placement = plan(&siblings, 400.0, 400.0, None, None, 20.0);
        let chosen = Rect::new(placement.x, placement.y, 400.0, 400.0);
        for node in &siblings {
            assert!(!node.bounds().intersects(&chosen));
        }
    }
}
