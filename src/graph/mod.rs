//! The space graph: typed element collections assembled once from a config.
//!
//! After [`SpaceGraph::build`] returns, the graph is read-only. Two derived
//! views are computed lazily and cached for the graph's lifetime:
//! - the node index (every plottable element id -> its kind)
//! - the experiment dictionary
//!
//! Both sit behind `OnceLock`, so concurrent readers on different threads
//! agree on a single computed value.

mod build;
mod cycle;

use crate::element::{Element, ElementKind};
use crate::error::GraphError;
use crate::experiments::ExperimentsDictionary;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Element types that become nodes, in node-set order. Pages are config-only.
pub const PLOTTABLE_KINDS: [ElementKind; 4] = [
    ElementKind::Feed,
    ElementKind::Umt,
    ElementKind::Placement,
    ElementKind::Section,
];

#[derive(Debug)]
pub struct SpaceGraph {
    collections: BTreeMap<ElementKind, IndexMap<String, Element>>,
    version: Option<Value>,
    node_index: OnceLock<IndexMap<String, ElementKind>>,
    experiments: OnceLock<ExperimentsDictionary>,
}

/// Endpoint candidate ids grouped by element type, for a selection control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointCandidates {
    pub feeds: Vec<String>,
    pub umts: Vec<String>,
    pub placements: Vec<String>,
    pub sections: Vec<String>,
}

impl SpaceGraph {
    /// Collection for one element type; `None` when the config omitted it.
    pub fn collection(&self, kind: ElementKind) -> Option<&IndexMap<String, Element>> {
        self.collections.get(&kind)
    }

    pub fn version(&self) -> Option<&Value> {
        self.version.as_ref()
    }

    /// Every plottable element id, mapped to the collection that owns it.
    ///
    /// A feed and an umt sharing a raw id collapse to one entry (the umt);
    /// use [`SpaceGraph::validate_namespace`] to reject such configs.
    pub fn node_ids(&self) -> &IndexMap<String, ElementKind> {
        self.node_index.get_or_init(|| {
            let mut index = IndexMap::new();
            for kind in PLOTTABLE_KINDS {
                for id in self.collection(kind).into_iter().flat_map(|c| c.keys()) {
                    if let Some(prev) = index.insert(id.clone(), kind) {
                        tracing::debug!(%id, %prev, %kind, "node id shadowed");
                    }
                }
            }
            tracing::debug!(nodes = index.len(), "node index built");
            index
        })
    }

    /// Plottable element by id.
    pub fn node(&self, id: &str) -> Option<&Element> {
        let kind = self.node_ids().get(id)?;
        self.collection(*kind)?.get(id)
    }

    /// Any element by id, pages included.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.node(id)
            .or_else(|| self.collection(ElementKind::Page)?.get(id))
    }

    /// Plottable element by id, or a lookup error.
    pub fn require(&self, id: &str) -> Result<&Element, GraphError> {
        self.node(id).ok_or_else(|| GraphError::lookup(id))
    }

    /// All plottable elements in node-set order.
    pub fn nodes(&self) -> impl Iterator<Item = &Element> + '_ {
        self.node_ids()
            .keys()
            .filter_map(move |id| self.node(id))
    }

    pub fn len(&self) -> usize {
        self.node_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids().is_empty()
    }

    pub fn experiments(&self) -> &ExperimentsDictionary {
        self.experiments
            .get_or_init(|| ExperimentsDictionary::from_graph(self))
    }

    pub fn endpoint_candidates(&self) -> EndpointCandidates {
        let ids = |kind| -> Vec<String> {
            self.collection(kind)
                .map(|c| c.keys().cloned().collect())
                .unwrap_or_default()
        };

        EndpointCandidates {
            feeds: ids(ElementKind::Feed),
            umts: ids(ElementKind::Umt),
            placements: ids(ElementKind::Placement),
            sections: ids(ElementKind::Section),
        }
    }

    /// Strict check that feeds and umts do not share a raw id.
    pub fn validate_namespace(&self) -> Result<(), GraphError> {
        let (Some(feeds), Some(umts)) = (
            self.collection(ElementKind::Feed),
            self.collection(ElementKind::Umt),
        ) else {
            return Ok(());
        };

        match umts.keys().find(|id| feeds.contains_key(*id)) {
            Some(id) => Err(GraphError::NamespaceCollision { id: id.clone() }),
            None => Ok(()),
        }
    }
}
