//! Bulk execution with per-item error isolation.
//!
//! Items run strictly sequentially, so item i sees every mutation made by
//! items 0..i-1 (sibling-aware placement and progressive duplicate offsets
//! depend on this). A failure in one item is captured as a failure record
//! and execution continues: one bad identity in a batch of ten never
//! aborts the other nine. The summary always carries the full ordered
//! result list, successes and failures interleaved in request order.

use crate::error::EngineError;
use crate::params::{ItemParams, ParamBag};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Per-item failure carrying the target identity when it was resolvable.
#[derive(Debug)]
pub struct ItemError {
    pub node_id: Option<String>,
    pub error: EngineError,
}

impl ItemError {
    pub fn new(error: EngineError) -> Self {
        Self {
            node_id: None,
            error,
        }
    }

    pub fn for_node(node_id: impl Into<String>, error: EngineError) -> Self {
        Self {
            node_id: Some(node_id.into()),
            error,
        }
    }
}

impl From<EngineError> for ItemError {
    fn from(error: EngineError) -> Self {
        Self::new(error)
    }
}

/// One entry of a bulk response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate outcome of one bulk request. `success` is true iff zero
/// items failed.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSummary {
    pub success: bool,
    pub results: Vec<ItemResult>,
}

impl BulkSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Drive `handler` over `count` items resolved from `bag`, capturing
/// failures at the item boundary. Error messages are carried verbatim.
pub fn run_bulk<F>(bag: &ParamBag, count: usize, mut handler: F) -> BulkSummary
where
    F: FnMut(ItemParams) -> Result<Value, ItemError>,
{
    let mut results = Vec::with_capacity(count);
    for index in 0..count {
        let item = bag.item(index);
        match handler(item) {
            Ok(data) => {
                debug!(index, "bulk item succeeded");
                results.push(ItemResult {
                    index,
                    success: true,
                    data: Some(data),
                    node_id: None,
                    error: None,
                });
            }
            Err(failure) => {
                warn!(
                    index,
                    node_id = failure.node_id.as_deref(),
                    error = %failure.error,
                    "bulk item failed"
                );
                results.push(ItemResult {
                    index,
                    success: false,
                    data: None,
                    node_id: failure.node_id,
                    error: Some(failure.error.to_string()),
                });
            }
        }
    }

    BulkSummary {
        success: results.iter().all(|r| r.success),
        results,
    }
}
