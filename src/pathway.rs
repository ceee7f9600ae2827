//! Pathway walker: everything reachable upstream from one element.
//!
//! Depth-first from the start id. For each element the effective sources are
//! its override entry when one exists, else its declared sources. Each
//! source is expanded, then the edge `source -> element` is recorded. An id
//! already produced by an earlier branch is not expanded again, so shared
//! ancestors cost one visit no matter how many paths reach them.
//!
//! Overrides replace an element's whole source list; that is how one
//! experiment arm is pinned instead of following every variant.

use crate::edge::ElementEdge;
use crate::error::GraphError;
use crate::graph::SpaceGraph;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeSet;

/// Element id -> replacement source list.
pub type SourceOverrides = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathwayResult {
    /// Post-order: every source precedes the elements consuming it.
    pub nodes: Vec<String>,
    pub edges: IndexSet<ElementEdge>,
}

impl PathwayResult {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn contains_edge(&self, source_id: &str, target_id: &str) -> bool {
        self.edges.contains(&ElementEdge::new(source_id, target_id))
    }

    pub fn node_set(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(String::as_str).collect()
    }

    pub fn edge_ids(&self, glue: &str) -> Vec<String> {
        self.edges.iter().map(|e| e.id(glue)).collect()
    }
}

/// Walk upstream from `start_id`.
///
/// Fails with a lookup error when `start_id` is not a node, with a dangling
/// reference when a walked source resolves to nothing, and with a cycle
/// error when the overrides close a loop. Override entries for ids the walk
/// never reaches are ignored.
pub fn walk(
    graph: &SpaceGraph,
    start_id: &str,
    overrides: &SourceOverrides,
) -> Result<PathwayResult, GraphError> {
    graph.require(start_id)?;

    let mut walker = Walker {
        graph,
        overrides,
        produced: IndexSet::new(),
        edges: IndexSet::new(),
        active: IndexSet::new(),
    };
    walker.visit(start_id)?;

    Ok(PathwayResult {
        nodes: walker.produced.into_iter().collect(),
        edges: walker.edges,
    })
}

struct Walker<'a> {
    graph: &'a SpaceGraph,
    overrides: &'a SourceOverrides,
    produced: IndexSet<String>,
    edges: IndexSet<ElementEdge>,
    // Ids on the current descent, in order.
    active: IndexSet<&'a str>,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, id: &'a str) -> Result<(), GraphError> {
        if self.produced.contains(id) {
            return Ok(());
        }
        if let Some(pos) = self.active.get_index_of(id) {
            let mut path: Vec<String> = self
                .active
                .iter()
                .skip(pos)
                .map(|s| s.to_string())
                .collect();
            path.push(id.to_string());
            return Err(GraphError::CycleDetected { path });
        }

        let sources: Option<&'a [String]> = match self.overrides.get(id) {
            Some(replacement) => Some(replacement.as_slice()),
            None => self.graph.require(id)?.source_feed_ids(),
        };

        let Some(sources) = sources else {
            self.produced.insert(id.to_string());
            return Ok(());
        };

        tracing::trace!(%id, sources = sources.len(), "expanding");
        self.active.insert(id);

        for source in sources {
            if self.graph.node(source).is_none() {
                return Err(GraphError::dangling(id, source.as_str()));
            }
            self.visit(source)?;
            self.edges.insert(ElementEdge::new(source.as_str(), id));
        }

        self.active.pop();
        self.produced.insert(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn chain() -> SpaceGraph {
        SpaceGraph::build(&json!({
            "Feeds": [
                {"feedId": "A", "sourceFeedId": "B"},
                {"feedId": "B", "sourceFeedId": "C"},
                {"feedId": "C"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn chain_is_walked_in_post_order() {
        let result = walk(&chain(), "A", &SourceOverrides::new()).unwrap();
        assert_eq!(result.nodes, vec!["C", "B", "A"]);
        assert_eq!(
            result.edge_ids("-to-"),
            vec!["C-to-B".to_string(), "B-to-A".to_string()]
        );
    }

    #[test]
    fn leaf_yields_itself_only() {
        let result = walk(&chain(), "C", &SourceOverrides::new()).unwrap();
        assert_eq!(result.nodes, vec!["C"]);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn unknown_start_is_a_lookup_error() {
        let err = walk(&chain(), "Z", &SourceOverrides::new()).unwrap_err();
        assert!(matches!(err, GraphError::Lookup { id } if id == "Z"));
    }

    #[test]
    fn override_loop_is_reported_not_recursed() {
        let mut overrides = SourceOverrides::new();
        overrides.insert("C".into(), vec!["A".into()]);
        let err = walk(&chain(), "A", &overrides).unwrap_err();
        match err {
            GraphError::CycleDetected { path } => assert_eq!(path, vec!["A", "B", "C", "A"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn dangling_source_aborts_only_the_query() {
        let graph = SpaceGraph::build(&json!({
            "Feeds": [
                {"feedId": "A", "sourceFeedIds": ["B", "ghost"]},
                {"feedId": "B"}
            ]
        }))
        .unwrap();

        let err = walk(&graph, "A", &SourceOverrides::new()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingReference { referenced_by, missing }
                if referenced_by == "A" && missing == "ghost"
        ));

        // The graph is still usable.
        let result = walk(&graph, "B", &SourceOverrides::new()).unwrap();
        assert_eq!(result.nodes, vec!["B"]);
    }
}
