//! Visualization-ready wrappers around elements.
//!
//! An [`ElementNode`] is built per query pass. It adds a display
//! classification and write-once layout slots that only the layout
//! collaborator fills in.

use crate::element::{EXPERIMENT_SWITCH_CLASS, Element, ElementKind, short_class_name};
use crate::error::GraphError;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Section,
    Placement,
    Umt,
    /// A feed with no upstream sources.
    Source,
    Feed,
}

impl NodeType {
    pub fn classify(element: &Element) -> NodeType {
        match element {
            Element::Section(_) => NodeType::Section,
            Element::Placement(_) => NodeType::Placement,
            Element::Umt(_) => NodeType::Umt,
            // Experiment switches draw like umts.
            Element::Feed(feed) if feed.is_experiment_switch() => NodeType::Umt,
            Element::Feed(feed) if feed.source_feed_ids().is_none() => NodeType::Source,
            Element::Feed(_) => NodeType::Feed,
            // Pages never become nodes; classify as the terminal they are.
            Element::Page(_) => NodeType::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Section => "section",
            NodeType::Placement => "placement",
            NodeType::Umt => "umt",
            NodeType::Source => "source",
            NodeType::Feed => "feed",
        }
    }
}

/// Rendering of an element's class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClassForm {
    /// `ExperimentSwitchFilter`
    Class,
    /// `Experiment Switch Filter`
    Label,
    /// `Krs\Feed\Filter\ExperimentSwitchFilter`
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct ElementNode<'g> {
    element: &'g Element,
    node_type: NodeType,
    position: Option<Point>,
    size: Option<Size>,
}

impl<'g> ElementNode<'g> {
    pub fn new(element: &'g Element) -> Self {
        ElementNode {
            element,
            node_type: NodeType::classify(element),
            position: None,
            size: None,
        }
    }

    pub fn element(&self) -> &'g Element {
        self.element
    }

    pub fn id(&self) -> &'g str {
        self.element.id()
    }

    pub fn element_kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn node_class(&self, form: NodeClassForm) -> String {
        let path = self.element.feed_class_name();
        match form {
            NodeClassForm::Class => short_class_name(path),
            NodeClassForm::Label => class_label(path),
            NodeClassForm::Path => path.to_string(),
        }
    }

    pub fn is_experiment_switch(&self) -> bool {
        self.node_class(NodeClassForm::Class) == EXPERIMENT_SWITCH_CLASS
    }

    /// Store the layout's answer for this node. Each node is placed once.
    pub fn place(&mut self, position: Point, size: Size) -> Result<(), GraphError> {
        if self.position.is_some() {
            return Err(GraphError::AlreadyPlaced {
                id: self.id().to_string(),
            });
        }
        self.position = Some(position);
        self.size = Some(size);
        Ok(())
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn x_left(&self) -> Option<f64> {
        Some(self.position?.x)
    }

    pub fn x_center(&self) -> Option<f64> {
        Some(self.position?.x + self.size?.width / 2.0)
    }

    pub fn x_right(&self) -> Option<f64> {
        Some(self.position?.x + self.size?.width)
    }

    pub fn y_top(&self) -> Option<f64> {
        Some(self.position?.y)
    }

    pub fn y_middle(&self) -> Option<f64> {
        Some(self.position?.y + self.size?.height / 2.0)
    }

    pub fn y_bottom(&self) -> Option<f64> {
        Some(self.position?.y + self.size?.height)
    }
}

/// Split the last path segment into capitalised words; fall back to the raw
/// segment when it has none (e.g. `KRS UMT`).
fn class_label(class_path: &str) -> String {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let re = WORD_RE.get_or_init(|| Regex::new(r"[A-Z][a-z]+").expect("valid regex"));

    let last = class_path.rsplit('\\').next().unwrap_or(class_path);
    let words: Vec<&str> = re.find_iter(last).map(|m| m.as_str()).collect();
    if words.is_empty() {
        last.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(record: serde_json::Value) -> Element {
        Element::from_record("Feeds", &record).unwrap()
    }

    #[test]
    fn classification_table() {
        let leaf = feed(json!({"feedId": "a"}));
        let inner = feed(json!({"feedId": "b", "sourceFeedId": "a"}));
        let switch = feed(json!({
            "feedId": "s",
            "feedClassName": "Krs\\Feed\\ExperimentSwitchFilter",
            "sourceFeedIds": {"on": "a", "off": "b"}
        }));
        let section = Element::from_record("Sections", &json!({"sectionId": "S"})).unwrap();
        let placement =
            Element::from_record("Placements", &json!({"feedId": "b", "sectionId": "S"})).unwrap();
        let umt = Element::from_record("Umts", &json!({"feedId": "u", "variants": []})).unwrap();

        assert_eq!(NodeType::classify(&leaf), NodeType::Source);
        assert_eq!(NodeType::classify(&inner), NodeType::Feed);
        assert_eq!(NodeType::classify(&switch), NodeType::Umt);
        assert_eq!(NodeType::classify(&section), NodeType::Section);
        assert_eq!(NodeType::classify(&placement), NodeType::Placement);
        assert_eq!(NodeType::classify(&umt), NodeType::Umt);
        // The switch is still a feed as far as the model is concerned.
        assert_eq!(switch.kind(), ElementKind::Feed);
    }

    #[test]
    fn class_forms() {
        let element = feed(json!({
            "feedId": "a",
            "feedClassName": "Krs\\Feed\\Filter\\ExperimentSwitchFilter"
        }));
        let node = ElementNode::new(&element);

        assert_eq!(node.node_class(NodeClassForm::Class), "ExperimentSwitchFilter");
        assert_eq!(node.node_class(NodeClassForm::Label), "Experiment Switch Filter");
        assert_eq!(
            node.node_class(NodeClassForm::Path),
            "Krs\\Feed\\Filter\\ExperimentSwitchFilter"
        );
        assert!(node.is_experiment_switch());

        let umt = Element::from_record("Umts", &json!({"feedId": "u", "variants": []})).unwrap();
        assert_eq!(ElementNode::new(&umt).node_class(NodeClassForm::Label), "KRS UMT");
    }

    #[test]
    fn layout_slots_are_write_once() {
        let element = feed(json!({"feedId": "a"}));
        let mut node = ElementNode::new(&element);
        assert_eq!(node.x_center(), None);

        node.place(
            Point { x: 10.0, y: 20.0 },
            Size {
                width: 100.0,
                height: 50.0,
            },
        )
        .unwrap();

        assert_eq!(node.x_left(), Some(10.0));
        assert_eq!(node.x_center(), Some(60.0));
        assert_eq!(node.x_right(), Some(110.0));
        assert_eq!(node.y_top(), Some(20.0));
        assert_eq!(node.y_middle(), Some(45.0));
        assert_eq!(node.y_bottom(), Some(70.0));

        let again = node.place(
            Point { x: 0.0, y: 0.0 },
            Size {
                width: 1.0,
                height: 1.0,
            },
        );
        assert!(matches!(again, Err(GraphError::AlreadyPlaced { id }) if id == "a"));
    }
}
