//! UMT elements: multi-variant experiments where each variant routes to a
//! different upstream feed.
//!
//! Config shape:
//! {
//!   "feedId": "homepage-umt",
//!   "name": "Homepage UMT",
//!   "seed": 17,
//!   "variants": [{"name": "control", "feedId": "a"}, {"name": "test", "feedId": "b"}],
//!   "buckets":  [{"name": "control", "percent": 90}, {"name": "test", "percent": 10}]
//! }

use crate::element::{NamedSources, Params, Variant, wrap_name};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUmt {
    feed_id: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    seed: Option<Value>,

    #[serde(default)]
    variants: Vec<RawVariant>,

    #[serde(default)]
    buckets: Vec<RawBucket>,

    #[serde(default)]
    tracking_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariant {
    name: String,
    feed_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBucket {
    name: String,

    #[serde(default)]
    percent: f64,
}

#[derive(Debug, Clone)]
pub struct Umt {
    id: String,
    name: Option<String>,
    seed: Option<Value>,
    variants: Vec<Variant>,
    sources: Vec<String>,
    named_sources: NamedSources,
    tracking_code: Option<String>,
}

impl Umt {
    pub const CLASS_NAME: &'static str = "KRS UMT";

    pub fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawUmt::deserialize(record)?;

        let variants: Vec<Variant> = raw
            .variants
            .iter()
            .map(|v| Variant {
                name: v.name.clone(),
                feed_id: v.feed_id.clone(),
                // Last bucket with a matching name wins.
                percent: raw
                    .buckets
                    .iter()
                    .rev()
                    .find(|b| b.name == v.name)
                    .map(|b| b.percent)
                    .unwrap_or(0.0),
            })
            .collect();

        let sources = variants.iter().map(|v| v.feed_id.clone()).collect();
        let named_sources = variants
            .iter()
            .map(|v| (v.name.clone(), v.feed_id.clone()))
            .collect();

        Ok(Umt {
            id: raw.feed_id,
            name: raw.name,
            seed: raw.seed,
            variants,
            sources,
            named_sources,
            tracking_code: raw.tracking_code,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn seed(&self) -> Option<&Value> {
        self.seed.as_ref()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// One source per variant, in variant order.
    pub fn source_feed_ids(&self) -> &[String] {
        &self.sources
    }

    /// Variant name -> feed id.
    pub fn named_sources(&self) -> &NamedSources {
        &self.named_sources
    }

    pub fn params(&self) -> Params {
        Params::Variants(self.variants.clone())
    }

    pub fn tracking_code(&self) -> Cow<'_, str> {
        match &self.tracking_code {
            Some(code) => Cow::Borrowed(code),
            None => Cow::Owned(wrap_name(self.name())),
        }
    }
}
