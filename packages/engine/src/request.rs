//! Request/response boundary types.
//!
//! One request carries an operation tag and a flat parameter bag whose
//! values are independently scalars, arrays, or JSON-encoded strings.
//! Responses are either a single payload (query operations) or the bulk
//! shape: an ordered list of per-item outcomes plus an overall success
//! flag.

use crate::error::EngineError;
use crate::fanout::BulkSummary;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One call into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub operation: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Request {
    pub fn new(operation: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            operation: operation.into(),
            params,
        }
    }
}

/// Closed set of operations the router dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateRectangle,
    CreateEllipse,
    CreateFrame,
    CreateSection,
    CreateSlice,
    CreateStar,
    CreatePolygon,
    Update,
    UpdateRectangle,
    UpdateFrame,
    UpdateSection,
    UpdateStar,
    UpdatePolygon,
    Delete,
    Duplicate,
    GetNode,
    FindNodes,
    ListPages,
}

pub const ALL_OPERATIONS: [Operation; 18] = [
    Operation::CreateRectangle,
    Operation::CreateEllipse,
    Operation::CreateFrame,
    Operation::CreateSection,
    Operation::CreateSlice,
    Operation::CreateStar,
    Operation::CreatePolygon,
    Operation::Update,
    Operation::UpdateRectangle,
    Operation::UpdateFrame,
    Operation::UpdateSection,
    Operation::UpdateStar,
    Operation::UpdatePolygon,
    Operation::Delete,
    Operation::Duplicate,
    Operation::GetNode,
    Operation::FindNodes,
    Operation::ListPages,
];

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRectangle => "create_rectangle",
            Self::CreateEllipse => "create_ellipse",
            Self::CreateFrame => "create_frame",
            Self::CreateSection => "create_section",
            Self::CreateSlice => "create_slice",
            Self::CreateStar => "create_star",
            Self::CreatePolygon => "create_polygon",
            Self::Update => "update",
            Self::UpdateRectangle => "update_rectangle",
            Self::UpdateFrame => "update_frame",
            Self::UpdateSection => "update_section",
            Self::UpdateStar => "update_star",
            Self::UpdatePolygon => "update_polygon",
            Self::Delete => "delete",
            Self::Duplicate => "duplicate",
            Self::GetNode => "get_node",
            Self::FindNodes => "find_nodes",
            Self::ListPages => "list_pages",
        }
    }

    /// Parse an operation tag; unknown tags fail listing the valid set.
    pub fn parse(operation: &str) -> Result<Self, EngineError> {
        ALL_OPERATIONS
            .iter()
            .copied()
            .find(|op| op.name() == operation)
            .ok_or_else(|| EngineError::UnknownOperation {
                operation: operation.to_string(),
                valid: ALL_OPERATIONS
                    .iter()
                    .map(|op| op.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::CreateRectangle
                | Self::CreateEllipse
                | Self::CreateFrame
                | Self::CreateSection
                | Self::CreateSlice
                | Self::CreateStar
                | Self::CreatePolygon
        )
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::GetNode | Self::FindNodes | Self::ListPages)
    }

    /// Bulk operations whose array-able axis is `nodeId`.
    pub fn targets_existing_nodes(&self) -> bool {
        !self.is_creation() && !self.is_query()
    }

    /// Node type a kind-specific update operation is addressed to.
    pub fn update_type(&self) -> Option<easel_scene::NodeType> {
        use easel_scene::NodeType;
        match self {
            Self::UpdateRectangle => Some(NodeType::Rectangle),
            Self::UpdateFrame => Some(NodeType::Frame),
            Self::UpdateSection => Some(NodeType::Section),
            Self::UpdateStar => Some(NodeType::Star),
            Self::UpdatePolygon => Some(NodeType::Polygon),
            _ => None,
        }
    }
}

/// One result object per request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Single payload, query operations.
    Single { success: bool, data: Value },
    /// Ordered per-item outcomes, bulk operations.
    Bulk(BulkSummary),
}

impl Response {
    pub fn single(data: Value) -> Self {
        Self::Single {
            success: true,
            data,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("response serialization is infallible")
    }
}
