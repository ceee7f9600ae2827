//! Element model: one typed read view per record of the space config.
//!
//! The five variants share a small capability set (id, type tag, class name,
//! upstream sources, params, tracking code) exposed on [`Element`]; anything
//! variant-specific lives on the variant struct itself.

pub mod feed;
pub mod page;
pub mod params;
pub mod placement;
pub mod section;
pub mod umt;

pub use feed::Feed;
pub use page::Page;
pub use params::{Params, Variant};
pub use placement::Placement;
pub use section::Section;
pub use umt::Umt;

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Label -> upstream element id, in declaration order.
pub type NamedSources = IndexMap<String, String>;

/// Short class name of feeds that route to one of several named sources.
pub const EXPERIMENT_SWITCH_CLASS: &str = "ExperimentSwitchFilter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Feed,
    Page,
    Placement,
    Section,
    Umt,
}

impl ElementKind {
    /// Assembly order of the config collections.
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Feed,
        ElementKind::Page,
        ElementKind::Placement,
        ElementKind::Section,
        ElementKind::Umt,
    ];

    /// The `elementType` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Feed => "feed",
            ElementKind::Page => "page",
            ElementKind::Placement => "placement",
            ElementKind::Section => "section",
            ElementKind::Umt => "umt",
        }
    }

    /// Top-level key of this element type's collection in the space config.
    pub fn collection_key(self) -> &'static str {
        match self {
            ElementKind::Feed => "Feeds",
            ElementKind::Page => "Pages",
            ElementKind::Placement => "Placements",
            ElementKind::Section => "Sections",
            ElementKind::Umt => "Umts",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ConfigError;

    /// Accepts either the collection key (`Feeds`) or the type tag (`feed`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.collection_key() == s || kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownElementType(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub enum Element {
    Feed(Feed),
    Page(Page),
    Placement(Placement),
    Section(Section),
    Umt(Umt),
}

impl Element {
    /// Construct the variant declared by `type_name` from one config record.
    pub fn from_record(type_name: &str, record: &Value) -> Result<Self, ConfigError> {
        let kind = type_name.parse::<ElementKind>()?;
        Self::from_kind(kind, record)
    }

    pub fn from_kind(kind: ElementKind, record: &Value) -> Result<Self, ConfigError> {
        let built = match kind {
            ElementKind::Feed => Feed::from_record(record).map(Element::Feed),
            ElementKind::Page => Page::from_record(record).map(Element::Page),
            ElementKind::Placement => Placement::from_record(record).map(Element::Placement),
            ElementKind::Section => Section::from_record(record).map(Element::Section),
            ElementKind::Umt => Umt::from_record(record).map(Element::Umt),
        };
        built.map_err(|source| ConfigError::InvalidRecord { kind, source })
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Feed(_) => ElementKind::Feed,
            Element::Page(_) => ElementKind::Page,
            Element::Placement(_) => ElementKind::Placement,
            Element::Section(_) => ElementKind::Section,
            Element::Umt(_) => ElementKind::Umt,
        }
    }

    pub fn element_type(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn id(&self) -> &str {
        match self {
            Element::Feed(e) => e.id(),
            Element::Page(e) => e.id(),
            Element::Placement(e) => e.id(),
            Element::Section(e) => e.id(),
            Element::Umt(e) => e.id(),
        }
    }

    /// Placements carry no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Feed(e) => e.name(),
            Element::Page(e) => e.name(),
            Element::Placement(_) => None,
            Element::Section(e) => e.name(),
            Element::Umt(e) => e.name(),
        }
    }

    pub fn feed_class_name(&self) -> &str {
        match self {
            Element::Feed(e) => e.feed_class_name(),
            Element::Page(_) => Page::CLASS_NAME,
            Element::Placement(_) => Placement::CLASS_NAME,
            Element::Section(_) => Section::CLASS_NAME,
            Element::Umt(_) => Umt::CLASS_NAME,
        }
    }

    /// Upstream element ids. `None` marks a terminal element, which is not the
    /// same thing as an empty list (a section nothing has been linked to yet).
    pub fn source_feed_ids(&self) -> Option<&[String]> {
        match self {
            Element::Feed(e) => e.source_feed_ids(),
            Element::Page(_) => None,
            Element::Placement(e) => Some(e.source_feed_ids()),
            Element::Section(e) => Some(e.source_feed_ids()),
            Element::Umt(e) => Some(e.source_feed_ids()),
        }
    }

    pub fn named_sources(&self) -> Option<&NamedSources> {
        match self {
            Element::Feed(e) => e.named_sources(),
            Element::Umt(e) => Some(e.named_sources()),
            _ => None,
        }
    }

    pub fn has_named_sources(&self) -> bool {
        self.named_sources().is_some()
    }

    pub fn params(&self) -> Params {
        match self {
            Element::Feed(e) => e.params(),
            Element::Umt(e) => e.params(),
            _ => Params::None,
        }
    }

    /// Display tracking code; falls back to `(name)` for elements that have a name.
    pub fn tracking_code(&self) -> Option<Cow<'_, str>> {
        match self {
            Element::Feed(e) => Some(e.tracking_code()),
            Element::Page(e) => Some(e.tracking_code()),
            Element::Placement(_) => None,
            Element::Section(e) => Some(e.tracking_code()),
            Element::Umt(e) => Some(e.tracking_code()),
        }
    }

    /// A feed whose class routes between named sources.
    pub fn is_experiment_switch(&self) -> bool {
        match self {
            Element::Feed(e) => e.is_experiment_switch(),
            _ => false,
        }
    }

    /// Umts and experiment switches: the elements the experiment dictionary indexes.
    pub fn is_experiment(&self) -> bool {
        matches!(self, Element::Umt(_)) || self.is_experiment_switch()
    }

    pub(crate) fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            Element::Section(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_placement(&self) -> Option<&Placement> {
        match self {
            Element::Placement(p) => Some(p),
            _ => None,
        }
    }
}

/// Last `\`-separated segment of a class path with spaces dropped,
/// e.g. `Krs\Feed\ExperimentSwitchFilter` -> `ExperimentSwitchFilter`.
pub fn short_class_name(class_path: &str) -> String {
    let last = class_path.rsplit('\\').next().unwrap_or(class_path);
    last.split(' ').collect()
}

pub(crate) fn wrap_name(name: Option<&str>) -> String {
    format!("({})", name.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parses_collection_keys_and_tags() {
        assert_eq!("Umts".parse::<ElementKind>().unwrap(), ElementKind::Umt);
        assert_eq!("section".parse::<ElementKind>().unwrap(), ElementKind::Section);
        assert!(matches!(
            "Widgets".parse::<ElementKind>(),
            Err(ConfigError::UnknownElementType(name)) if name == "Widgets"
        ));
    }

    #[test]
    fn from_record_rejects_unknown_type() {
        let err = Element::from_record("Gadgets", &json!({})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownElementType(_)));
    }

    #[test]
    fn from_record_reports_malformed_record() {
        let err = Element::from_record("Placements", &json!({"sectionId": "S1"})).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRecord {
                kind: ElementKind::Placement,
                ..
            }
        ));
    }

    #[test]
    fn short_class_name_takes_last_segment() {
        assert_eq!(
            short_class_name("Krs\\Feed\\Filter\\ExperimentSwitchFilter"),
            "ExperimentSwitchFilter"
        );
        assert_eq!(short_class_name("KRS UMT"), "KRSUMT");
        assert_eq!(short_class_name(""), "");
    }

    #[test]
    fn experiment_capability() {
        let switch = Element::from_record(
            "Feeds",
            &json!({
                "feedId": "sw",
                "feedClassName": "Krs\\ExperimentSwitchFilter",
                "sourceFeedIds": {"control": "a", "test": "b"}
            }),
        )
        .unwrap();
        let plain = Element::from_record("Feeds", &json!({"feedId": "f"})).unwrap();
        let umt = Element::from_record(
            "Umts",
            &json!({"feedId": "u", "variants": [], "buckets": []}),
        )
        .unwrap();

        assert!(switch.is_experiment());
        assert!(!plain.is_experiment());
        assert!(umt.is_experiment());
        assert!(!umt.is_experiment_switch());
    }
}
