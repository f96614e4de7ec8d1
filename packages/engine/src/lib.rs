//! # Easel Engine
//!
//! Operation core for the easel document model: single or batched
//! mutation/query requests against a tree of typed nodes, with
//! normalized, error-isolated results.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ engine: Engine::execute(tree, request)      │
//! │  - Router: parse + validate + dispatch      │
//! │  - Fan-out: scalar/array/JSON-string params │
//! │    → N scalarized items, cycling, isolated  │
//! │  - Query: traversal modes + filter pipeline │
//! │  - Placement: overlap warnings, auto slots  │
//! │  - Appliers: per-kind properties, clamps    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ scene: SceneTree (Document in-memory impl)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use easel_engine::{Engine, Request};
//! use easel_scene::Document;
//!
//! let engine = Engine::new();
//! let mut doc = Document::new();
//!
//! let request: Request = serde_json::from_value(serde_json::json!({
//!     "operation": "create_rectangle",
//!     "name": ["R1", "R2"],
//!     "width": 100
//! }))?;
//!
//! let response = engine.execute(&mut doc, &request).await?;
//! ```

mod apply;
mod config;
mod create;
mod engine;
mod error;
mod fanout;
mod modify;
mod params;
mod placement;
mod query;
mod request;

pub use config::{EngineConfig, DEFAULT_CONFIG_NAME};
pub use engine::Engine;
pub use error::EngineError;
pub use fanout::{BulkSummary, ItemError, ItemResult};
pub use params::{ItemParams, ParamBag, ParamEntry};
pub use placement::Placement;
pub use query::{QuerySpec, TraversalMode, VisibilityFilter};
pub use request::{Operation, Request, Response, ALL_OPERATIONS};

// Re-export common types for convenience
pub use easel_scene::{Detail, Document, SceneTree};
