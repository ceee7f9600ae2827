//! Graph assembly: records -> typed elements, then the section/placement
//! linking pass, then the acyclicity check.

use super::{SpaceGraph, cycle};
use crate::document::SpaceDocument;
use crate::element::{Element, ElementKind};
use crate::error::GraphError;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

impl SpaceGraph {
    /// Assemble a graph from a parsed space config.
    ///
    /// Unknown element types and malformed records are logged and skipped.
    /// Fails when a placement names a section that does not exist, or when
    /// the declared sources contain a cycle.
    pub fn build(config: &Value) -> Result<SpaceGraph, GraphError> {
        let doc = SpaceDocument::from_value(config)?;
        Self::from_document(&doc)
    }

    pub fn from_document(doc: &SpaceDocument) -> Result<SpaceGraph, GraphError> {
        let mut collections: BTreeMap<ElementKind, IndexMap<String, Element>> = BTreeMap::new();

        for (&kind, records) in &doc.collections {
            let mut elements: IndexMap<String, Element> = IndexMap::new();
            for (index, record) in records.iter().enumerate() {
                match Element::from_kind(kind, record) {
                    Ok(element) => {
                        // Later records replace earlier ones with the same id.
                        elements.insert(element.id().to_string(), element);
                    }
                    Err(err) => {
                        tracing::warn!(%kind, index, error = %err, "skipping record");
                    }
                }
            }
            tracing::debug!(%kind, count = elements.len(), "elements assembled");
            collections.insert(kind, elements);
        }

        link_sections(&mut collections)?;

        let graph = SpaceGraph {
            collections,
            version: doc.version.clone(),
            node_index: OnceLock::new(),
            experiments: OnceLock::new(),
        };

        cycle::ensure_acyclic(&graph)?;

        Ok(graph)
    }
}

/// Make every placement a source of the section it serves.
fn link_sections(
    collections: &mut BTreeMap<ElementKind, IndexMap<String, Element>>,
) -> Result<(), GraphError> {
    let links: Vec<(String, String)> = collections
        .get(&ElementKind::Placement)
        .into_iter()
        .flat_map(|placements| placements.values())
        .filter_map(Element::as_placement)
        .map(|p| (p.id().to_string(), p.section_id().to_string()))
        .collect();

    for (placement_id, section_id) in links {
        let section = collections
            .get_mut(&ElementKind::Section)
            .and_then(|sections| sections.get_mut(&section_id))
            .and_then(Element::as_section_mut)
            .ok_or_else(|| GraphError::lookup(section_id.as_str()))?;

        tracing::trace!(%placement_id, %section_id, "linking placement");
        section.link_placement(&placement_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_collections_stay_absent() {
        let g = SpaceGraph::build(&json!({"Feeds": [{"feedId": "a"}], "Umts": null})).unwrap();
        assert!(g.collection(ElementKind::Feed).is_some());
        assert!(g.collection(ElementKind::Umt).is_none());
        assert!(g.collection(ElementKind::Section).is_none());
        assert_eq!(g.version(), None);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let g = SpaceGraph::build(&json!({
            "Feeds": [{"feedId": "ok"}, {"name": "no id"}, 42]
        }))
        .unwrap();
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn placements_link_into_their_sections() {
        let g = SpaceGraph::build(&json!({
            "Feeds": [{"feedId": "P1"}, {"feedId": "P2"}],
            "Sections": [{"sectionId": "S1"}],
            "Placements": [
                {"feedId": "P1", "sectionId": "S1"},
                {"feedId": "P2", "sectionId": "S1"}
            ]
        }))
        .unwrap();

        let section = g.node("section--S1").unwrap();
        assert_eq!(
            section.source_feed_ids().unwrap().to_vec(),
            vec!["placement--P1".to_string(), "placement--P2".to_string()]
        );
    }

    #[test]
    fn linking_to_missing_section_fails() {
        let err = SpaceGraph::build(&json!({
            "Feeds": [{"feedId": "P1"}],
            "Placements": [{"feedId": "P1", "sectionId": "ghost"}]
        }))
        .unwrap_err();
        assert!(matches!(err, GraphError::Lookup { id } if id == "section--ghost"));
    }

    #[test]
    fn declared_cycle_fails_fast() {
        let err = SpaceGraph::build(&json!({
            "Feeds": [
                {"feedId": "a", "sourceFeedId": "b"},
                {"feedId": "b", "sourceFeedId": "c"},
                {"feedId": "c", "sourceFeedId": "a"}
            ]
        }))
        .unwrap_err();
        match err {
            GraphError::CycleDetected { path } => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
