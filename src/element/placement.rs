//! Placement elements: the point where a pipeline's endpoint feed is served
//! into a section.

use crate::element::Section;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlacement {
    feed_id: String,

    section_id: String,

    #[serde(default)]
    login_mask: Option<Value>,

    #[serde(default)]
    mobile_mask: Option<Value>,

    #[serde(default)]
    uri_pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Placement {
    id: String,
    section_id: String,
    // Always exactly the endpoint feed id.
    sources: Vec<String>,
    login_mask: Option<Value>,
    mobile_mask: Option<Value>,
    uri_pattern: Option<String>,
}

impl Placement {
    pub const ID_PREFIX: &'static str = "placement--";
    pub const CLASS_NAME: &'static str = "KRS Placement";

    pub fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawPlacement::deserialize(record)?;

        Ok(Placement {
            id: format!("{}{}", Self::ID_PREFIX, raw.feed_id),
            section_id: format!("{}{}", Section::ID_PREFIX, raw.section_id),
            sources: vec![raw.feed_id],
            login_mask: raw.login_mask,
            mobile_mask: raw.mobile_mask,
            uri_pattern: raw.uri_pattern,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Element id (prefixed) of the section this placement serves.
    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    pub fn source_feed_ids(&self) -> &[String] {
        &self.sources
    }

    pub fn login_mask(&self) -> Option<&Value> {
        self.login_mask.as_ref()
    }

    pub fn mobile_mask(&self) -> Option<&Value> {
        self.mobile_mask.as_ref()
    }

    pub fn uri_pattern(&self) -> Option<&str> {
        self.uri_pattern.as_deref()
    }
}
