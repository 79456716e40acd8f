//! Labels of fields, traits and resources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A display label: either a plain string or a locale-keyed map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl Label {
    pub fn plain(s: impl Into<String>) -> Self {
        Label::Plain(s.into())
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Plain(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Plain(s)
    }
}

/// A label map keyed by trait key, verb, rule or field name.
pub type LabelMap = BTreeMap<String, Label>;

/// The singular / plural labels of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singular: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<Label>,
}

impl Labels {
    /// Fills the missing side from the present one. When only one of
    /// singular/plural is declared the other reuses it verbatim.
    pub fn sanitize(mut self) -> Self {
        match (&self.singular, &self.plural) {
            (Some(s), None) => self.plural = Some(s.clone()),
            (None, Some(p)) => self.singular = Some(p.clone()),
            _ => {}
        }
        self
    }
}
