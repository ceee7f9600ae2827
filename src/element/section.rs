//! Section elements. A section's sources are the placements that serve it,
//! filled in by the graph's linking pass.

use crate::element::wrap_name;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    section_id: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    silent: Option<bool>,

    #[serde(default)]
    tracking_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Section {
    id: String,
    name: Option<String>,
    silent: bool,
    tracking_code: Option<String>,
    placement_sources: Vec<String>,
}

impl Section {
    pub const ID_PREFIX: &'static str = "section--";
    pub const CLASS_NAME: &'static str = "KRS Section";

    pub fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawSection::deserialize(record)?;

        Ok(Section {
            id: format!("{}{}", Self::ID_PREFIX, raw.section_id),
            name: raw.name,
            silent: raw.silent.unwrap_or(false),
            tracking_code: raw.tracking_code,
            placement_sources: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    pub fn source_feed_ids(&self) -> &[String] {
        &self.placement_sources
    }

    pub fn tracking_code(&self) -> Cow<'_, str> {
        match &self.tracking_code {
            Some(code) => Cow::Borrowed(code),
            None => Cow::Owned(wrap_name(self.name())),
        }
    }

    pub(crate) fn link_placement(&mut self, placement_id: &str) {
        self.placement_sources.push(placement_id.to_string());
    }
}
