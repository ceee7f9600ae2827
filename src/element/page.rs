//! Page elements. Pages are terminal and never appear in a pathway.

use crate::element::wrap_name;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    page_id: Option<String>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    uri: Option<String>,

    #[serde(default)]
    tracking_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Page {
    id: String,
    name: Option<String>,
    uri: Option<String>,
    tracking_code: Option<String>,
}

impl Page {
    pub const ID_PREFIX: &'static str = "page--";
    pub const CLASS_NAME: &'static str = "KRS Page";

    pub fn from_record(record: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawPage::deserialize(record)?;

        // Pages without a pageId are keyed by name.
        let key = raw
            .page_id
            .clone()
            .or_else(|| raw.name.clone())
            .unwrap_or_default();

        Ok(Page {
            id: format!("{}{}", Self::ID_PREFIX, key),
            name: raw.name,
            uri: raw.uri,
            tracking_code: raw.tracking_code,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn tracking_code(&self) -> Cow<'_, str> {
        match &self.tracking_code {
            Some(code) => Cow::Borrowed(code),
            None => Cow::Owned(wrap_name(self.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_prefers_page_id_over_name() {
        let page = Page::from_record(&json!({"pageId": "home", "name": "Home"})).unwrap();
        assert_eq!(page.id(), "page--home");

        let by_name = Page::from_record(&json!({"name": "Sports", "uri": "/sports"})).unwrap();
        assert_eq!(by_name.id(), "page--Sports");
        assert_eq!(by_name.uri(), Some("/sports"));
        assert_eq!(by_name.tracking_code(), "(Sports)");
    }
}
