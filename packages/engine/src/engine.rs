//! The operation router.
//!
//! One request enters, one response leaves. Validation failures (unknown
//! operation, disallowed `count`, missing required parameters, malformed
//! filter patterns) abort before any fan-out begins, so a rejected request
//! never mutates the tree. Everything after validation goes through the
//! bulk executor or the query engine.

use crate::config::EngineConfig;
use crate::create;
use crate::error::EngineError;
use crate::fanout::run_bulk;
use crate::modify;
use crate::params::ParamBag;
use crate::query::{self, QuerySpec};
use crate::request::{Operation, Request, Response};
use easel_scene::SceneTree;
use serde_json::Value;
use tracing::debug;

/// Stateless operation core. Holds configuration only; the document tree
/// is borrowed per call.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute one request against the given tree.
    pub async fn execute(
        &self,
        tree: &mut dyn SceneTree,
        request: &Request,
    ) -> Result<Response, EngineError> {
        let op = Operation::parse(&request.operation)?;
        let bag = ParamBag::new(&request.params);
        validate(op, &bag)?;
        debug!(operation = op.name(), "dispatching request");

        match op {
            Operation::GetNode => {
                let item = bag.item(0);
                let id = item.require_str("nodeId")?;
                let detail = item.detail(self.config.default_detail)?;
                Ok(Response::single(query::get_node(&*tree, &id, detail)?))
            }
            Operation::FindNodes => {
                let spec = QuerySpec::from_params(&bag, &self.config)?;
                let nodes = query::find_nodes(tree, &spec, &self.config).await?;
                Ok(Response::single(Value::Array(nodes)))
            }
            Operation::ListPages => Ok(Response::single(query::list_pages(tree).await?)),

            op if op.is_creation() => {
                let (kind, default_name) =
                    create::blueprint(op).expect("creation operations have a blueprint");

                // Items attach to the active page unless a parent is
                // named; make it resident before the sequential run.
                let active = tree.active_page_id();
                tree.load_page(&active).await?;

                let count = bag.fan_out_len();
                let summary = run_bulk(&bag, count, |item| {
                    create::create_item(tree, kind.clone(), default_name, &item, &self.config)
                });
                Ok(Response::Bulk(summary))
            }

            Operation::Delete => {
                let count = bag.fan_out_len();
                let summary = run_bulk(&bag, count, |item| modify::delete_item(tree, &item));
                Ok(Response::Bulk(summary))
            }

            Operation::Duplicate => {
                let count = match bag.item(0).usize("count") {
                    Some(0) => {
                        return Err(EngineError::Validation(
                            "Parameter 'count' must be at least 1".to_string(),
                        ))
                    }
                    Some(count) => count,
                    None => bag.fan_out_len(),
                };
                let summary = run_bulk(&bag, count, |item| {
                    modify::duplicate_item(tree, &bag, &item, &self.config)
                });
                Ok(Response::Bulk(summary))
            }

            // update and the kind-specific updates
            op => {
                let expected = op.update_type();
                let count = bag.fan_out_len();
                let summary = run_bulk(&bag, count, |item| {
                    modify::update_item(tree, expected, &item, &self.config)
                });
                Ok(Response::Bulk(summary))
            }
        }
    }
}

/// Request-level validation, before any mutation occurs.
fn validate(op: Operation, bag: &ParamBag) -> Result<(), EngineError> {
    if bag.contains("count") && op != Operation::Duplicate {
        return Err(EngineError::Validation(format!(
            "Parameter 'count' is only valid for the duplicate operation, not {}",
            op.name()
        )));
    }

    if op.targets_existing_nodes() && !bag.contains("nodeId") {
        return Err(EngineError::missing_param("nodeId"));
    }
    if op == Operation::GetNode && !bag.contains("nodeId") {
        return Err(EngineError::missing_param("nodeId"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_operation_fails_fast() {
        let engine = Engine::new();
        let mut doc = easel_scene::Document::new();
        let err = engine
            .execute(&mut doc, &request(json!({ "operation": "explode" })))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownOperation { .. }));
    }

    #[tokio::test]
    async fn test_count_outside_duplicate_is_rejected_before_mutation() {
        let engine = Engine::new();
        let mut doc = easel_scene::Document::new();
        let err = engine
            .execute(
                &mut doc,
                &request(json!({ "operation": "create_rectangle", "count": 3 })),
            )
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("count"));
        assert!(message.contains("duplicate"));
        // Nothing was created.
        let page_id = doc.active_page_id();
        assert!(doc.page(&page_id).unwrap().children.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_node_id_is_a_validation_error() {
        let engine = Engine::new();
        let mut doc = easel_scene::Document::new();
        let err = engine
            .execute(&mut doc, &request(json!({ "operation": "update", "width": 10 })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nodeId"));
    }
}
