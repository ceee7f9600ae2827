//! View model: what the rendering side gets for one query.
//!
//! Flow per query:
//! 1) [`Scene::select`] picks the nodes and edges (whole graph or one pathway)
//! 2) [`Scene::layout_request`] hands them to a layout engine
//! 3) [`Scene::apply_layout`] stores the returned positions on the nodes
//! 4) [`Scene::view`] flattens everything into serializable render data

use crate::edge::{EDGE_GLUE, ElementEdge};
use crate::error::GraphError;
use crate::experiments::VariantSelection;
use crate::graph::SpaceGraph;
use crate::layout::{LayoutEngine, LayoutNode, LayoutRequest, LayoutResponse};
use crate::node::{ElementNode, NodeClassForm, NodeType, Point, Size};
use crate::pathway::{self, PathwayResult, SourceOverrides};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub node_width: f64,
    pub node_height: f64,
    pub edge_glue: String,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            node_width: 100.0,
            node_height: 50.0,
            edge_glue: EDGE_GLUE.to_string(),
        }
    }
}

/// Nodes and edges selected for one plot.
#[derive(Debug, Clone)]
pub struct Scene<'g> {
    nodes: IndexMap<&'g str, ElementNode<'g>>,
    edges: IndexSet<ElementEdge>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub element_type: String,
    pub node_type: NodeType,
    pub class_name: String,
    pub class_label: String,
    pub tracking_code: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Straight edge from the source's bottom-center to the target's top-center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSegment {
    pub edge_id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Same anchors as [`EdgeSegment`], shaped for curve generators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagonal {
    pub edge_id: String,
    pub source: Point,
    pub target: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeSegment>,
    pub diagonals: Vec<Diagonal>,
    /// Element id under each node.
    pub element_id_labels: Vec<TextLabel>,
    /// Class label inside each node.
    pub class_name_labels: Vec<TextLabel>,
}

impl<'g> Scene<'g> {
    /// Select what to plot. With no endpoint (or an empty one) that is every
    /// node and every effective source edge; otherwise the pathway upstream
    /// of `endpoint`.
    pub fn select(
        graph: &'g SpaceGraph,
        endpoint: Option<&str>,
        overrides: &SourceOverrides,
    ) -> Result<Scene<'g>, GraphError> {
        match endpoint.filter(|id| !id.is_empty()) {
            Some(id) => {
                let pathway = pathway::walk(graph, id, overrides)?;
                Self::from_pathway(graph, &pathway)
            }
            None => Self::whole_graph(graph, overrides),
        }
    }

    fn from_pathway(graph: &'g SpaceGraph, pathway: &PathwayResult) -> Result<Scene<'g>, GraphError> {
        let mut nodes = IndexMap::new();
        for id in &pathway.nodes {
            let element = graph.require(id)?;
            nodes.insert(element.id(), ElementNode::new(element));
        }
        Ok(Scene {
            nodes,
            edges: pathway.edges.clone(),
        })
    }

    fn whole_graph(graph: &'g SpaceGraph, overrides: &SourceOverrides) -> Result<Scene<'g>, GraphError> {
        let mut nodes = IndexMap::new();
        let mut edges = IndexSet::new();

        for element in graph.nodes() {
            let id = element.id();
            let sources = match overrides.get(id) {
                Some(replacement) => Some(replacement.as_slice()),
                None => element.source_feed_ids(),
            };
            for source in sources.unwrap_or_default() {
                if graph.node(source).is_none() {
                    return Err(GraphError::dangling(id, source.as_str()));
                }
                edges.insert(ElementEdge::new(source.as_str(), id));
            }
            nodes.insert(id, ElementNode::new(element));
        }

        Ok(Scene { nodes, edges })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ElementNode<'g>> + '_ {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&ElementNode<'g>> {
        self.nodes.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &ElementEdge> + '_ {
        self.edges.iter()
    }

    pub fn layout_request(&self, options: &PlotOptions) -> LayoutRequest {
        LayoutRequest {
            nodes: self
                .nodes
                .keys()
                .map(|id| LayoutNode {
                    id: id.to_string(),
                    width: options.node_width,
                    height: options.node_height,
                })
                .collect(),
            edges: self.edges.iter().cloned().collect(),
        }
    }

    /// Store the engine's placements. Every selected node must be placed.
    pub fn apply_layout(&mut self, response: &LayoutResponse) -> Result<(), GraphError> {
        for (id, node) in self.nodes.iter_mut() {
            let placement = response
                .get(*id)
                .ok_or_else(|| GraphError::MissingPlacement { id: id.to_string() })?;
            node.place(
                Point {
                    x: placement.x,
                    y: placement.y,
                },
                Size {
                    width: placement.width,
                    height: placement.height,
                },
            )?;
        }
        Ok(())
    }

    pub fn layout_with(
        &mut self,
        engine: &dyn LayoutEngine,
        options: &PlotOptions,
    ) -> Result<(), GraphError> {
        let request = self.layout_request(options);
        let response = engine.layout(&request).map_err(GraphError::Layout)?;
        self.apply_layout(&response)
    }

    /// Render data. Requires a layout to have been applied.
    pub fn view(&self, options: &PlotOptions) -> Result<SceneView, GraphError> {
        let mut view = SceneView {
            nodes: Vec::with_capacity(self.nodes.len()),
            edges: Vec::with_capacity(self.edges.len()),
            diagonals: Vec::with_capacity(self.edges.len()),
            element_id_labels: Vec::with_capacity(self.nodes.len()),
            class_name_labels: Vec::with_capacity(self.nodes.len()),
        };

        for node in self.nodes.values() {
            let geometry = Geometry::of(node)?;
            let element = node.element();

            view.nodes.push(NodeView {
                id: node.id().to_string(),
                element_type: element.element_type().to_string(),
                node_type: node.node_type(),
                class_name: node.node_class(NodeClassForm::Class),
                class_label: node.node_class(NodeClassForm::Label),
                tracking_code: element.tracking_code().map(|c| c.into_owned()),
                x: geometry.position.x,
                y: geometry.position.y,
                width: geometry.size.width,
                height: geometry.size.height,
            });
            view.element_id_labels.push(TextLabel {
                text: node.id().to_string(),
                x: geometry.x_center(),
                y: geometry.y_bottom(),
            });
            view.class_name_labels.push(TextLabel {
                text: node.node_class(NodeClassForm::Label),
                x: geometry.x_center(),
                y: geometry.y_middle(),
            });
        }

        for edge in &self.edges {
            let source = self
                .nodes
                .get(edge.source_id())
                .ok_or_else(|| GraphError::dangling(edge.target_id(), edge.source_id()))?;
            let target = self
                .nodes
                .get(edge.target_id())
                .ok_or_else(|| GraphError::lookup(edge.target_id()))?;
            let (from, to) = (Geometry::of(source)?, Geometry::of(target)?);
            let edge_id = edge.id(&options.edge_glue);

            view.edges.push(EdgeSegment {
                edge_id: edge_id.clone(),
                x1: from.x_center(),
                y1: from.y_bottom(),
                x2: to.x_center(),
                y2: to.y_top(),
            });
            view.diagonals.push(Diagonal {
                edge_id,
                source: Point {
                    x: from.x_center(),
                    y: from.y_bottom(),
                },
                target: Point {
                    x: to.x_center(),
                    y: to.y_top(),
                },
            });
        }

        Ok(view)
    }
}

/// Placed position and size of one node.
struct Geometry {
    position: Point,
    size: Size,
}

impl Geometry {
    fn of(node: &ElementNode<'_>) -> Result<Geometry, GraphError> {
        match (node.position(), node.size()) {
            (Some(position), Some(size)) => Ok(Geometry { position, size }),
            _ => Err(GraphError::MissingPlacement {
                id: node.id().to_string(),
            }),
        }
    }

    fn x_center(&self) -> f64 {
        self.position.x + self.size.width / 2.0
    }

    fn y_top(&self) -> f64 {
        self.position.y
    }

    fn y_middle(&self) -> f64 {
        self.position.y + self.size.height / 2.0
    }

    fn y_bottom(&self) -> f64 {
        self.position.y + self.size.height
    }
}

/// Select, lay out and flatten in one call.
pub fn plot(
    graph: &SpaceGraph,
    endpoint: Option<&str>,
    overrides: &SourceOverrides,
    engine: &dyn LayoutEngine,
    options: &PlotOptions,
) -> Result<SceneView, GraphError> {
    let mut scene = Scene::select(graph, endpoint, overrides)?;
    scene.layout_with(engine, options)?;
    scene.view(options)
}

/// Pathway for a hovered or clicked node under the current toggle selection.
pub fn highlight(
    graph: &SpaceGraph,
    element_id: &str,
    selections: &[VariantSelection],
) -> Result<PathwayResult, GraphError> {
    let overrides = graph.experiments().resolve_selections(selections)?;
    pathway::walk(graph, element_id, &overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutFailure, NodePlacement};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn graph() -> SpaceGraph {
        SpaceGraph::build(&json!({
            "Feeds": [
                {"feedId": "top", "sourceFeedIds": ["mid"]},
                {"feedId": "mid", "sourceFeedId": "leaf"},
                {"feedId": "leaf"},
                {"feedId": "other"}
            ]
        }))
        .unwrap()
    }

    // Stacks nodes vertically in request order.
    fn column(request: &LayoutRequest) -> Result<LayoutResponse, LayoutFailure> {
        Ok(request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                (
                    n.id.clone(),
                    NodePlacement {
                        x: 0.0,
                        y: i as f64 * 100.0,
                        width: n.width,
                        height: n.height,
                    },
                )
            })
            .collect())
    }

    #[test]
    fn no_endpoint_selects_everything() {
        let g = graph();
        let scene = Scene::select(&g, Some(""), &SourceOverrides::new()).unwrap();
        assert_eq!(scene.nodes().count(), 4);
        assert_eq!(scene.edges().count(), 2);
    }

    #[test]
    fn endpoint_selects_its_pathway() {
        let g = graph();
        let scene = Scene::select(&g, Some("mid"), &SourceOverrides::new()).unwrap();
        let ids: Vec<&str> = scene.nodes().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["leaf", "mid"]);

        let request = scene.layout_request(&PlotOptions::default());
        assert_eq!(request.nodes[0].width, 100.0);
        assert_eq!(request.nodes[0].height, 50.0);
        assert_eq!(request.edges, vec![ElementEdge::new("leaf", "mid")]);
    }

    #[test]
    fn plot_produces_anchored_segments() {
        let g = graph();
        let view = plot(
            &g,
            Some("mid"),
            &SourceOverrides::new(),
            &column,
            &PlotOptions::default(),
        )
        .unwrap();

        assert_eq!(
            view.edges,
            vec![EdgeSegment {
                edge_id: "leaf-to-mid".into(),
                x1: 50.0,
                y1: 50.0,
                x2: 50.0,
                y2: 100.0,
            }]
        );
        assert_eq!(view.diagonals[0].target, Point { x: 50.0, y: 100.0 });
        assert_eq!(
            view.element_id_labels[1],
            TextLabel {
                text: "mid".into(),
                x: 50.0,
                y: 150.0
            }
        );
        assert_eq!(view.nodes[0].node_type, NodeType::Source);
    }

    #[test]
    fn missing_placement_is_reported() {
        let g = graph();
        let mut scene = Scene::select(&g, Some("mid"), &SourceOverrides::new()).unwrap();
        let mut response = LayoutResponse::new();
        response.insert(
            "mid".into(),
            NodePlacement {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
        );
        let err = scene.apply_layout(&response).unwrap_err();
        assert!(matches!(err, GraphError::MissingPlacement { id } if id == "leaf"));
    }

    #[test]
    fn view_before_layout_fails() {
        let g = graph();
        let scene = Scene::select(&g, Some("leaf"), &SourceOverrides::new()).unwrap();
        assert!(scene.view(&PlotOptions::default()).is_err());
    }
}
