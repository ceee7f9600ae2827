//! Dependency cartography for ad-serving space configs.
//!
//! A space config lists feeds, pages, placements, sections and umts wired
//! together by upstream source ids. This crate turns that document into a
//! typed element graph and answers the questions a flowchart front end asks:
//! which elements sit upstream of a chosen one, which experiments exist, and
//! what the graph looks like when one experiment arm is pinned.
//!
//! Drawing and geometric layout live outside the crate; see [`layout`].

pub mod document;
pub mod edge;
pub mod element;
pub mod error;
pub mod experiments;
pub mod graph;
pub mod layout;
pub mod node;
pub mod pathway;
pub mod view;

pub use edge::{EDGE_GLUE, ElementEdge};
pub use element::{Element, ElementKind, Params};
pub use error::{ConfigError, GraphError};
pub use experiments::{ExperimentEntry, ExperimentsDictionary, ScopeLevel, VariantSelection};
pub use graph::{EndpointCandidates, SpaceGraph};
pub use node::{ElementNode, NodeType};
pub use pathway::{PathwayResult, SourceOverrides, walk};
pub use view::{PlotOptions, Scene, SceneView};
