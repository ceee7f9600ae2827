//! Element params.
//!
//! Consumers branch on whether an element declared no params at all or an
//! explicitly empty map, so the two stay distinct here.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// One UMT variant joined with its bucket percentage.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub feed_id: String,
    /// 0 when no bucket carries the variant's name.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// Nothing declared (and, for feeds, no named sources either).
    #[default]
    None,
    /// An explicit `params: {}` with nothing else to merge in.
    Empty,
    Map(IndexMap<String, Value>),
    /// UMT params: its variants with bucket percentages.
    Variants(Vec<Variant>),
}

impl Params {
    pub fn is_none(&self) -> bool {
        matches!(self, Params::None)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Params::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// String value of `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::None => serializer.serialize_none(),
            Params::Empty => serializer.serialize_map(Some(0))?.end(),
            Params::Map(map) => map.serialize(serializer),
            Params::Variants(variants) => variants.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_absent_and_empty_differently() {
        assert_eq!(serde_json::to_value(Params::None).unwrap(), Value::Null);
        assert_eq!(serde_json::to_value(Params::Empty).unwrap(), json!({}));
    }

    #[test]
    fn get_str_only_reads_maps() {
        let mut map = IndexMap::new();
        map.insert("Experiment Scope".to_string(), json!("space"));
        map.insert("weight".to_string(), json!(3));
        let params = Params::Map(map);

        assert_eq!(params.get_str("Experiment Scope"), Some("space"));
        assert_eq!(params.get_str("weight"), None);
        assert_eq!(Params::Empty.get("weight"), None);
    }
}
