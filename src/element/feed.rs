//! Feed elements.
//!
//! Config shape:
//! {
//!   "feedId": "trending",
//!   "name": "Trending",
//!   "feedClassName": "Krs\\Feed\\Filter\\DedupeFilter",
//!   "sourceFeedId": "popular",                    // or an array of ids
//!   "sourceFeedIds": ["a", "b"],                  // or {"label": "id", ...}
//!   "params": {"limit": 10},
//!   "trackingCode": "TRND"
//! }

use crate::element::{EXPERIMENT_SWITCH_CLASS, NamedSources, Params, short_class_name, wrap_name};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Raw feed record as it appears in the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeed {
    feed_id: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    feed_class_name: Option<String>,

    #[serde(default)]
    source_feed_id: Option<SourceRef>,

    #[serde(default)]
    source_feed_ids: Option<SourceRef>,

    #[serde(default)]
    params: Option<Map<String, Value>>,

    #[serde(default)]
    tracking_code: Option<String>,
}

/// Source references in feed records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SourceRef {
    // "sourceFeedId": "a"
    One(String),
    // "sourceFeedIds": ["a", "b"]
    Many(Vec<String>),
    // "sourceFeedIds": {"control": "a", "test": "b"}
    Named(NamedSources),
}

impl SourceRef {
    fn into_ids(self) -> Vec<String> {
        match self {
            SourceRef::One(id) => vec![id],
            SourceRef::Many(ids) => ids,
            SourceRef::Named(named) => named.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Feed {
    id: String,
    name: Option<String>,
    feed_class_name: String,
    sources: Option<Vec<String>>,
    named_sources: Option<NamedSources>,
    params: Option<Map<String, Value>>,
    tracking_code: Option<String>,
}

impl Feed {
    pub fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawFeed::deserialize(record)?;

        let named_sources = match &raw.source_feed_ids {
            Some(SourceRef::Named(named)) => Some(named.clone()),
            _ => None,
        };

        // The singular field wins when both are declared.
        let sources = match (raw.source_feed_id, raw.source_feed_ids) {
            (Some(single), _) => Some(single.into_ids()),
            (None, Some(many)) => Some(many.into_ids()),
            (None, None) => None,
        };

        Ok(Feed {
            id: raw.feed_id,
            name: raw.name,
            feed_class_name: raw.feed_class_name.unwrap_or_default(),
            sources,
            named_sources,
            params: raw.params,
            tracking_code: raw.tracking_code,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn feed_class_name(&self) -> &str {
        &self.feed_class_name
    }

    pub fn source_feed_ids(&self) -> Option<&[String]> {
        self.sources.as_deref()
    }

    pub fn has_named_sources(&self) -> bool {
        self.named_sources.is_some()
    }

    pub fn named_sources(&self) -> Option<&NamedSources> {
        self.named_sources.as_ref()
    }

    /// Named sources merged with the declared params, params winning on a
    /// shared key.
    pub fn params(&self) -> Params {
        let mut merged: IndexMap<String, Value> = IndexMap::new();
        if let Some(named) = &self.named_sources {
            for (label, id) in named {
                merged.insert(label.clone(), Value::String(id.clone()));
            }
        }
        if let Some(params) = &self.params {
            for (key, value) in params {
                merged.insert(key.clone(), value.clone());
            }
        }

        if !merged.is_empty() {
            Params::Map(merged)
        } else if self.params.is_some() {
            Params::Empty
        } else {
            Params::None
        }
    }

    pub fn tracking_code(&self) -> Cow<'_, str> {
        match &self.tracking_code {
            Some(code) => Cow::Borrowed(code),
            None => Cow::Owned(wrap_name(self.name())),
        }
    }

    pub fn is_experiment_switch(&self) -> bool {
        short_class_name(&self.feed_class_name) == EXPERIMENT_SWITCH_CLASS
    }
}
