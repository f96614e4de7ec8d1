//! Error types for the operation engine

use easel_scene::SceneError;
use thiserror::Error;

/// Engine-level failures.
///
/// Validation errors abort the whole request before any fan-out begins;
/// not-found and type-mismatch errors fail only the bulk item that raised
/// them. Out-of-range attribute values are clamped by the appliers and
/// never surface here.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown operation: {operation}. Valid operations: {valid}")]
    UnknownOperation { operation: String, valid: String },

    #[error("{0}")]
    Validation(String),

    #[error("Invalid name pattern {pattern:?}: {source}")]
    InvalidNamePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node not found: {id} in page {page}")]
    NodeNotFoundInPage { id: String, page: String },

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Type mismatch for node {id}: expected {expected}, found {actual}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl EngineError {
    pub(crate) fn missing_param(name: &str) -> Self {
        Self::Validation(format!("Missing required parameter: {name}"))
    }
}
