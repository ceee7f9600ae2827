//! Space config document: splits the raw top-level object into per-type
//! record lists.
//!
//! JSON shape:
//! {
//!   "Feeds":      [ { "feedId": ..., ... }, ... ],
//!   "Pages":      [ ... ],
//!   "Placements": [ ... ],
//!   "Sections":   [ ... ],
//!   "Umts":       [ ... ],
//!   "Version":    "2024.06.1"
//! }
//!
//! A missing or `null` collection means that element type is absent. Keys
//! that name no element type are reported and skipped.

use crate::element::ElementKind;
use crate::error::ConfigError;
use serde_json::Value;
use std::collections::BTreeMap;

pub const VERSION_KEY: &str = "Version";

#[derive(Debug, Clone, Default)]
pub struct SpaceDocument {
    /// Record lists for the element types present in the document.
    pub collections: BTreeMap<ElementKind, Vec<Value>>,
    pub version: Option<Value>,
}

impl SpaceDocument {
    /// Split a parsed config. Only a non-object root is an error; everything
    /// else degrades to a diagnostic.
    pub fn from_value(config: &Value) -> Result<Self, ConfigError> {
        let Some(root) = config.as_object() else {
            return Err(ConfigError::NotAnObject);
        };

        let mut doc = SpaceDocument::default();
        for (key, value) in root {
            if key == VERSION_KEY {
                doc.version = (!value.is_null()).then(|| value.clone());
                continue;
            }

            let kind = match key.parse::<ElementKind>() {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot create elements, skipping");
                    continue;
                }
            };

            match value {
                Value::Null => {}
                Value::Array(records) => {
                    doc.collections.insert(kind, records.clone());
                }
                _ => {
                    let err = ConfigError::NotAnArray { kind };
                    tracing::warn!(error = %err, "skipping element collection");
                }
            }
        }

        Ok(doc)
    }
}
