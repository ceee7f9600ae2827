//! Directed edges between elements: `source -> target`, where the target
//! consumes the source. Identity is the endpoint pair alone.

use serde::Serialize;

/// Glue used for rendered edge ids (`source-to-target`).
pub const EDGE_GLUE: &str = "-to-";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementEdge {
    pub source_id: String,
    pub target_id: String,
}

impl ElementEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        ElementEdge {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Display key for this edge. Not used for equality.
    pub fn id(&self, glue: &str) -> String {
        format!("{}{}{}", self.source_id, glue, self.target_id)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }
}
