//! Node model for the document tree.
//!
//! Every element of a document is a [`Node`]: a page, a container
//! (frame/group/section) or a leaf shape. Kind-specific attributes live in
//! the [`NodeKind`] variant; attribute support is a static capability table
//! on [`NodeType`], queried with a plain `match` rather than probed at
//! runtime.

use crate::geometry::Rect;
use crate::paint::{BlendMode, Paint, StrokeAlign};
use serde::{Deserialize, Serialize};

/// Closed set of node types.
///
/// Containers may hold children; every other type is a leaf shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Page,
    Frame,
    Group,
    Section,
    Rectangle,
    Ellipse,
    Star,
    Polygon,
    Slice,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Frame => "frame",
            Self::Group => "group",
            Self::Section => "section",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Star => "star",
            Self::Polygon => "polygon",
            Self::Slice => "slice",
        }
    }

    /// Case-insensitive parse, used by the type filter.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "page" => Some(Self::Page),
            "frame" => Some(Self::Frame),
            "group" => Some(Self::Group),
            "section" => Some(Self::Section),
            "rectangle" => Some(Self::Rectangle),
            "ellipse" => Some(Self::Ellipse),
            "star" => Some(Self::Star),
            "polygon" => Some(Self::Polygon),
            "slice" => Some(Self::Slice),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Page | Self::Frame | Self::Group | Self::Section)
    }

    pub fn supports_fills(&self) -> bool {
        matches!(
            self,
            Self::Frame
                | Self::Section
                | Self::Rectangle
                | Self::Ellipse
                | Self::Star
                | Self::Polygon
        )
    }

    pub fn supports_strokes(&self) -> bool {
        matches!(
            self,
            Self::Frame | Self::Rectangle | Self::Ellipse | Self::Star | Self::Polygon
        )
    }

    pub fn supports_corner_radius(&self) -> bool {
        matches!(self, Self::Frame | Self::Rectangle)
    }

    pub fn supports_rotation(&self) -> bool {
        !matches!(self, Self::Page | Self::Section)
    }

    pub fn supports_opacity(&self) -> bool {
        !matches!(self, Self::Page | Self::Slice)
    }
}

/// Kind-specific payload. The variant decides [`NodeType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Page,
    Frame {
        clips_content: bool,
        corner_radius: f64,
    },
    Group,
    Section {
        hidden: bool,
    },
    Rectangle {
        corner_radius: f64,
    },
    Ellipse,
    Star {
        point_count: u32,
        inner_radius: f64,
    },
    Polygon {
        point_count: u32,
    },
    Slice,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Page => NodeType::Page,
            Self::Frame { .. } => NodeType::Frame,
            Self::Group => NodeType::Group,
            Self::Section { .. } => NodeType::Section,
            Self::Rectangle { .. } => NodeType::Rectangle,
            Self::Ellipse => NodeType::Ellipse,
            Self::Star { .. } => NodeType::Star,
            Self::Polygon { .. } => NodeType::Polygon,
            Self::Slice => NodeType::Slice,
        }
    }
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque id, unique within the document. Empty until attached.
    pub id: String,
    pub name: String,
    pub kind: NodeKind,

    // Geometry. Meaningful only while the node is attached to a tree;
    // detached nodes keep their kind defaults.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,

    // Visual attributes.
    pub visible: bool,
    pub locked: bool,
    pub opacity: f64,
    pub blend_mode: BlendMode,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: f64,
    pub stroke_align: StrokeAlign,

    /// Ordered children. Only container types ever hold entries.
    pub children: Vec<Node>,
}

impl Node {
    /// Detached node with kind defaults. Attach through the document
    /// handle, which assigns the id.
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        let (width, height) = match kind.node_type() {
            NodeType::Section => (500.0, 300.0),
            NodeType::Page | NodeType::Group => (0.0, 0.0),
            _ => (100.0, 100.0),
        };

        Self {
            id: String::new(),
            name: name.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width,
            height,
            rotation: 0.0,
            visible: true,
            locked: false,
            opacity: 1.0,
            blend_mode: BlendMode::default(),
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: 1.0,
            stroke_align: StrokeAlign::default(),
            children: Vec::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Children, if this node type may hold any.
    pub fn child_nodes(&self) -> Option<&Vec<Node>> {
        if self.node_type().is_container() {
            Some(&self.children)
        } else {
            None
        }
    }

    pub fn child_nodes_mut(&mut self) -> Option<&mut Vec<Node>> {
        if self.node_type().is_container() {
            Some(&mut self.children)
        } else {
            None
        }
    }
}
