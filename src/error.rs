//! Error taxonomy for the cartographer core.
//!
//! Assembly-time problems are [`ConfigError`]s: they are logged and the
//! offending record or element collection is skipped. Everything a query can
//! trip over is a [`GraphError`], which aborts only that one call and leaves
//! the shared graph untouched.

use crate::element::ElementKind;

/// Defects in the raw configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A top-level key that does not name one of the five element types.
    #[error("element type [{0}] unknown")]
    UnknownElementType(String),

    /// A record that could not be read as its declared element type.
    #[error("malformed {kind} record: {source}")]
    InvalidRecord {
        kind: ElementKind,
        #[source]
        source: serde_json::Error,
    },

    /// An element collection that is present but is not an array.
    #[error("{kind} must be an array of records")]
    NotAnArray { kind: ElementKind },

    /// The document root is not a key/value object.
    #[error("space config must be an object")]
    NotAnObject,
}

/// Failures of a single graph query (or of linking during assembly).
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("element {id} not found")]
    Lookup { id: String },

    #[error("{referenced_by} references missing source {missing}")]
    DanglingReference {
        referenced_by: String,
        missing: String,
    },

    #[error("cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error("no experiment for parameter {parameter} at scope {scope}")]
    UnknownExperiment { scope: String, parameter: String },

    #[error("id {id} is declared by both a feed and an umt")]
    NamespaceCollision { id: String },

    #[error("node {id} already has a layout")]
    AlreadyPlaced { id: String },

    #[error("layout returned no placement for node {id}")]
    MissingPlacement { id: String },

    #[error("layout engine failed: {0}")]
    Layout(#[source] crate::layout::LayoutFailure),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphError {
    pub(crate) fn lookup(id: impl Into<String>) -> Self {
        GraphError::Lookup { id: id.into() }
    }

    pub(crate) fn dangling(referenced_by: impl Into<String>, missing: impl Into<String>) -> Self {
        GraphError::DanglingReference {
            referenced_by: referenced_by.into(),
            missing: missing.into(),
        }
    }
}
