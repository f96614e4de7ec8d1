//! Error types for the scene model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node not found: {id} in page {page}")]
    NodeNotFoundInPage { id: String, page: String },

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Page not loaded: {0}")]
    PageNotLoaded(String),

    #[error("Node {0} cannot hold children")]
    NotAContainer(String),
}
