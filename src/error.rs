//! Error types for the path engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("Invalid edge {src} -> {dst}: weight {weight} must be a positive number")]
    InvalidEdge { src: String, dst: String, weight: f64 },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Target {end} is unreachable from {start}")]
    UnreachableTarget { start: String, end: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
