//! Experiment dictionary: scope -> parameter -> variants, derived from the
//! umts and experiment-switch feeds of one graph.
//!
//! Per experiment element:
//! - scope: umts are feed-scoped; a switch reads its `Experiment Scope`
//!   param and defaults to `feed`
//! - parameter: umts use their own id; a switch reads its
//!   `Darwin Parameter` param and defaults to its own id
//! - variant labels: the keys of its named sources
//!
//! The first element seen for a (scope, parameter) pair fixes the entry's
//! variant labels. Later elements with the same key only add their id; their
//! labels are not merged in.

use crate::element::{Element, NamedSources};
use crate::error::GraphError;
use crate::graph::SpaceGraph;
use crate::pathway::SourceOverrides;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DARWIN_PARAMETER: &str = "Darwin Parameter";
pub const EXPERIMENT_SCOPE: &str = "Experiment Scope";

/// Granularity an experiment parameter applies at, widest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    /// Pipeline-wide.
    Krs,
    Space,
    Feed,
}

impl ScopeLevel {
    pub const ALL: [ScopeLevel; 3] = [ScopeLevel::Krs, ScopeLevel::Space, ScopeLevel::Feed];

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeLevel::Krs => "krs",
            ScopeLevel::Space => "space",
            ScopeLevel::Feed => "feed",
        }
    }

    pub fn parse(s: &str) -> Option<ScopeLevel> {
        ScopeLevel::ALL.into_iter().find(|level| level.as_str() == s)
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentEntry {
    pub variant_labels: Vec<String>,
    pub element_ids: Vec<String>,
}

/// A checked experiment toggle, as serialized by a selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelection {
    pub scope: String,
    pub parameter: String,
    pub variant: String,
}

impl FromStr for VariantSelection {
    type Err = String;

    /// `scope:parameter:variant`; the variant may itself contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scope), Some(parameter), Some(variant)) if !scope.is_empty() => {
                Ok(VariantSelection {
                    scope: scope.to_string(),
                    parameter: parameter.to_string(),
                    variant: variant.to_string(),
                })
            }
            _ => Err(format!("expected scope:parameter:variant, got {s:?}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperimentsDictionary {
    scopes: IndexMap<String, IndexMap<String, ExperimentEntry>>,

    // Named sources of every indexed element, for resolving selections.
    #[serde(skip)]
    named_sources: IndexMap<String, NamedSources>,
}

impl ExperimentsDictionary {
    pub fn from_graph(graph: &SpaceGraph) -> Self {
        let dictionary = Self::from_elements(graph.nodes());
        tracing::debug!(
            scopes = dictionary.scopes.len(),
            experiments = dictionary.named_sources.len(),
            "experiment dictionary built"
        );
        dictionary
    }

    /// Index the experiment-capable elements among `elements`, in order.
    pub fn from_elements<'e>(elements: impl IntoIterator<Item = &'e Element>) -> Self {
        let mut dictionary = ExperimentsDictionary::default();

        for element in elements.into_iter().filter(|e| e.is_experiment()) {
            let id = element.id();
            let scope = scope_of(element);
            let parameter = parameter_of(element);
            let named = element.named_sources().cloned().unwrap_or_default();

            let parameters = dictionary.scopes.entry(scope).or_default();
            match parameters.get_mut(&parameter) {
                Some(entry) => {
                    if !entry.element_ids.iter().any(|e| e == id) {
                        entry.element_ids.push(id.to_string());
                    }
                }
                None => {
                    parameters.insert(
                        parameter,
                        ExperimentEntry {
                            variant_labels: named.keys().cloned().collect(),
                            element_ids: vec![id.to_string()],
                        },
                    );
                }
            }

            dictionary.named_sources.insert(id.to_string(), named);
        }

        dictionary
    }

    pub fn scope_levels(&self) -> [ScopeLevel; 3] {
        ScopeLevel::ALL
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Every parameter at one scope level; `None` when nothing uses that scope.
    pub fn scope(&self, scope: &str) -> Option<&IndexMap<String, ExperimentEntry>> {
        self.scopes.get(scope)
    }

    /// Scopes in first-seen order, including any outside the three fixed levels.
    pub fn scopes(&self) -> impl Iterator<Item = &str> + '_ {
        self.scopes.keys().map(String::as_str)
    }

    pub fn entry(&self, scope: &str, parameter: &str) -> Option<&ExperimentEntry> {
        self.scopes.get(scope)?.get(parameter)
    }

    /// Overrides that pin `variant` on every element of one experiment.
    ///
    /// Elements that have no source labelled `variant` are left out.
    pub fn resolve_overrides(
        &self,
        scope: &str,
        parameter: &str,
        variant: &str,
    ) -> Result<SourceOverrides, GraphError> {
        let entry = self
            .entry(scope, parameter)
            .ok_or_else(|| GraphError::UnknownExperiment {
                scope: scope.to_string(),
                parameter: parameter.to_string(),
            })?;

        let mut overrides = SourceOverrides::new();
        for id in &entry.element_ids {
            let source = self
                .named_sources
                .get(id)
                .and_then(|named| named.get(variant));
            match source {
                Some(source) => {
                    overrides.insert(id.clone(), vec![source.clone()]);
                }
                None => tracing::debug!(%id, %variant, "element has no such variant"),
            }
        }

        Ok(overrides)
    }

    /// Merge the overrides of several toggles; a later toggle wins for an
    /// element both touch.
    pub fn resolve_selections(
        &self,
        selections: &[VariantSelection],
    ) -> Result<SourceOverrides, GraphError> {
        let mut merged = SourceOverrides::new();
        for selection in selections {
            let overrides =
                self.resolve_overrides(&selection.scope, &selection.parameter, &selection.variant)?;
            merged.extend(overrides);
        }
        Ok(merged)
    }
}

fn scope_of(element: &Element) -> String {
    if !element.is_experiment_switch() {
        return ScopeLevel::Feed.as_str().to_string();
    }

    let params = element.params();
    match params.get_str(EXPERIMENT_SCOPE) {
        Some(scope) => {
            if ScopeLevel::parse(scope).is_none() {
                tracing::debug!(id = element.id(), %scope, "non-standard experiment scope");
            }
            scope.to_string()
        }
        None => ScopeLevel::Feed.as_str().to_string(),
    }
}

fn parameter_of(element: &Element) -> String {
    if !element.is_experiment_switch() {
        return element.id().to_string();
    }

    element
        .params()
        .get_str(DARWIN_PARAMETER)
        .unwrap_or(element.id())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn switch(id: &str, params: serde_json::Value, sources: serde_json::Value) -> Element {
        Element::from_record(
            "Feeds",
            &json!({
                "feedId": id,
                "feedClassName": "Krs\\Feed\\ExperimentSwitchFilter",
                "sourceFeedIds": sources,
                "params": params
            }),
        )
        .unwrap()
    }

    #[test]
    fn umt_is_feed_scoped_under_its_own_id() {
        let umt = Element::from_record(
            "Umts",
            &json!({
                "feedId": "u1",
                "variants": [{"name": "a", "feedId": "x"}, {"name": "b", "feedId": "y"}]
            }),
        )
        .unwrap();
        let dictionary = ExperimentsDictionary::from_elements([&umt]);

        assert_eq!(
            dictionary.entry("feed", "u1"),
            Some(&ExperimentEntry {
                variant_labels: vec!["a".into(), "b".into()],
                element_ids: vec!["u1".into()],
            })
        );
    }

    #[test]
    fn switch_reads_scope_and_parameter_params() {
        let sw = switch(
            "sw",
            json!({"Experiment Scope": "space", "Darwin Parameter": "ranker"}),
            json!({"old": "r1", "new": "r2"}),
        );
        let bare = switch("bare", json!({}), json!({"on": "r1"}));
        let dictionary = ExperimentsDictionary::from_elements([&sw, &bare]);

        assert!(dictionary.entry("space", "ranker").is_some());
        assert!(dictionary.entry("feed", "bare").is_some());
        assert_eq!(dictionary.scopes().collect::<Vec<_>>(), vec!["space", "feed"]);
    }

    #[test]
    fn first_element_fixes_variant_labels() {
        let first = switch(
            "first",
            json!({"Darwin Parameter": "p"}),
            json!({"a": "x1", "b": "y1"}),
        );
        let second = switch(
            "second",
            json!({"Darwin Parameter": "p"}),
            json!({"b": "y2", "c": "z2"}),
        );
        let dictionary = ExperimentsDictionary::from_elements([&first, &second]);

        let entry = dictionary.entry("feed", "p").unwrap();
        assert_eq!(entry.variant_labels, vec!["a", "b"]);
        assert_eq!(entry.element_ids, vec!["first", "second"]);
    }

    #[test]
    fn resolve_omits_elements_missing_the_label() {
        let first = switch(
            "first",
            json!({"Darwin Parameter": "p"}),
            json!({"a": "x1", "b": "y1"}),
        );
        let second = switch(
            "second",
            json!({"Darwin Parameter": "p"}),
            json!({"b": "y2", "c": "z2"}),
        );
        let dictionary = ExperimentsDictionary::from_elements([&first, &second]);

        let a = dictionary.resolve_overrides("feed", "p", "a").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a["first"], vec!["x1"]);

        let b = dictionary.resolve_overrides("feed", "p", "b").unwrap();
        assert_eq!(b["first"], vec!["y1"]);
        assert_eq!(b["second"], vec!["y2"]);

        // "c" is reachable even though it is not among the entry's labels.
        let c = dictionary.resolve_overrides("feed", "p", "c").unwrap();
        assert_eq!(c.keys().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn resolving_unknown_experiment_fails() {
        let dictionary = ExperimentsDictionary::default();
        let err = dictionary.resolve_overrides("krs", "nope", "a").unwrap_err();
        assert!(matches!(err, GraphError::UnknownExperiment { .. }));
        assert!(dictionary.scope("krs").is_none());
    }

    #[test]
    fn selections_merge_later_wins() {
        let sw = switch("sw", json!({"Darwin Parameter": "p"}), json!({"a": "x", "b": "y"}));
        let dictionary = ExperimentsDictionary::from_elements([&sw]);

        let merged = dictionary
            .resolve_selections(&[
                "feed:p:a".parse().unwrap(),
                "feed:p:b".parse().unwrap(),
            ])
            .unwrap();
        assert_eq!(merged["sw"], vec!["y"]);
    }

    #[test]
    fn selection_parses_triples() {
        let sel: VariantSelection = "space:ranker:v2:beta".parse().unwrap();
        assert_eq!(sel.scope, "space");
        assert_eq!(sel.parameter, "ranker");
        assert_eq!(sel.variant, "v2:beta");
        assert!("space:ranker".parse::<VariantSelection>().is_err());
    }
}
