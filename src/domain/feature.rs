//! Features and trait extraction
//!
//! A feature is an authorization subject. It is either backed by a declared
//! resource (its fields, auth capability and endpoints become traits) or
//! declared manually as a synopsis of (trait, label) pairs.

use super::label::{Label, LabelMap};
use super::resource::{FieldConfig, OptionPair, ResourceConfig};
use super::rule::Rule;
use super::verb::Verb;
use crate::warden::should;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// All peripheral fields introduced by the schema framework. They never
/// become traits.
pub const PERIPHERALS: [&str; 2] = ["createdAt", "updatedAt"];

/// A manually declared feature: explicit (trait, label) pairs.
#[derive(Clone)]
pub struct Synopsis {
    pub slug: String,
    pub traits: Vec<(String, Option<Label>)>,
    pub label: Option<Label>,
}

/// An authorization subject.
#[derive(Clone)]
pub enum Feature {
    /// Backed by a resource descriptor.
    Schema(ResourceConfig),
    /// Manually declared.
    Synopsis(Synopsis),
}

impl Feature {
    pub fn slug(&self) -> &str {
        match self {
            Feature::Schema(resource) => &resource.slug,
            Feature::Synopsis(synopsis) => &synopsis.slug,
        }
    }

    /// Picks the display label of the feature, if any.
    pub fn label(&self) -> Option<&Label> {
        match self {
            Feature::Schema(resource) => resource.labels.as_ref()?.singular.as_ref(),
            Feature::Synopsis(synopsis) => synopsis.label.as_ref(),
        }
    }
}

/// A grant of verbs over a feature's traits, held by a role. Empty `traits`
/// means the grant applies at feature level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub feature: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<Verb>,
}

impl FeatureValue {
    /// The traits this grant stores under: the sentinel key when empty.
    pub fn traits_or_sentinel(&self) -> Vec<&str> {
        if self.traits.is_empty() {
            vec![super::lookup::FEATURE_LEVEL]
        } else {
            self.traits.iter().map(String::as_str).collect()
        }
    }
}

/// A keyed set of (trait, label) pairs preserving insertion order. A repeated
/// key keeps its position and takes the later label.
#[derive(Default)]
struct TraitSet {
    entries: Vec<(String, Label)>,
    index: HashMap<String, usize>,
}

impl TraitSet {
    fn set(&mut self, key: &str, label: Label) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 = label,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), label));
            }
        }
    }

    fn into_vec(self) -> Vec<(String, Label)> {
        self.entries
    }
}

/// Picks the trait contribution of a field: its name and label, unless the
/// field is excluded or opts out of warding.
pub fn pick(field: &FieldConfig, excludes: &[&str]) -> Option<(String, Label)> {
    if excludes.contains(&field.name.as_str()) || !should(&field.warding, None, true) {
        return None;
    }

    let label = field
        .label
        .clone()
        .unwrap_or_else(|| Label::plain(&field.name));
    Some((field.name.clone(), label))
}

/// Extracts all the traits the given feature offers.
///
/// Returns `None` when a schema-backed feature opts out of warding entirely;
/// such a feature contributes no traits and callers must skip it.
pub fn traits(feature: &Feature, labels: Option<&LabelMap>) -> Option<Vec<(String, Label)>> {
    let mut set = TraitSet::default();

    let resource = match feature {
        Feature::Synopsis(synopsis) => {
            for (key, label) in &synopsis.traits {
                let label = label.clone().unwrap_or_else(|| Label::plain(key));
                set.set(key, label);
            }
            return Some(set.into_vec());
        }
        Feature::Schema(resource) => resource,
    };

    if !should(&resource.warding, None, true) {
        return None;
    }

    for field in &resource.fields {
        if let Some((key, label)) = pick(field, &PERIPHERALS) {
            set.set(&key, label);
        }
    }

    if resource.auth {
        for rule in Rule::ALL {
            let label = labels
                .and_then(|m| m.get(rule.as_str()).cloned())
                .unwrap_or_else(|| Label::plain(rule.as_str()));
            set.set(rule.as_str(), label);
        }
    }

    for endpoint in &resource.endpoints {
        if should(&endpoint.warding, None, true) {
            set.set(&endpoint.path, Label::plain(&endpoint.path));
        }
    }

    Some(set.into_vec())
}

/// Builds the per-feature option lists consumed by the permission-matrix
/// field, skipping features that contribute no traits.
pub fn lookup(features: &[Feature], labels: Option<&LabelMap>) -> BTreeMap<String, Vec<OptionPair>> {
    let mut map = BTreeMap::new();

    for feature in features {
        if let Some(pairs) = traits(feature, labels) {
            let options = pairs
                .into_iter()
                .map(|(value, label)| OptionPair { value, label })
                .collect();
            map.insert(feature.slug().to_string(), options);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::{EndpointConfig, WardSetting};
    use crate::domain::verb::Method;
    use std::sync::Arc;

    fn synopsis(slug: &str, traits: &[(&str, Option<&str>)]) -> Feature {
        Feature::Synopsis(Synopsis {
            slug: slug.to_string(),
            traits: traits
                .iter()
                .map(|(k, l)| (k.to_string(), l.map(Label::plain)))
                .collect(),
            label: None,
        })
    }

    fn keys(pairs: Vec<(String, Label)>) -> Vec<String> {
        pairs.into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_synopsis_traits_verbatim() {
        let feature = synopsis("report", &[("export", Some("Export")), ("print", None)]);
        let pairs = traits(&feature, None).unwrap();
        assert_eq!(pairs[0], ("export".to_string(), Label::plain("Export")));
        // label defaults to the key
        assert_eq!(pairs[1], ("print".to_string(), Label::plain("print")));
    }

    #[test]
    fn test_synopsis_dedup_keeps_position_takes_later_label() {
        let feature = synopsis("report", &[("a", Some("first")), ("b", None), ("a", Some("second"))]);
        let pairs = traits(&feature, None).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("a".to_string(), Label::plain("second")));
    }

    #[test]
    fn test_schema_traits_from_fields() {
        let resource = ResourceConfig::new("order").with_fields(vec![
            FieldConfig::text("status"),
            FieldConfig::text("total"),
            FieldConfig::text("createdAt"),
        ]);
        let pairs = traits(&Feature::Schema(resource), None).unwrap();
        assert_eq!(keys(pairs), vec!["status", "total"]);
    }

    #[test]
    fn test_schema_skips_opted_out_fields() {
        let resource = ResourceConfig::new("order").with_fields(vec![
            FieldConfig::text("status"),
            FieldConfig::text("secret").with_warding(WardSetting::Always(false)),
        ]);
        let pairs = traits(&Feature::Schema(resource), None).unwrap();
        assert_eq!(keys(pairs), vec!["status"]);
    }

    #[test]
    fn test_opted_out_feature_contributes_nothing() {
        let resource = ResourceConfig::new("internal")
            .with_fields(vec![FieldConfig::text("status")])
            .with_warding(WardSetting::Always(false));
        assert!(traits(&Feature::Schema(resource), None).is_none());
    }

    #[test]
    fn test_auth_feature_gains_rules() {
        let resource = ResourceConfig::new("user")
            .with_fields(vec![FieldConfig::text("email")])
            .with_auth();
        let pairs = traits(&Feature::Schema(resource), None).unwrap();
        assert_eq!(keys(pairs), vec!["email", "<admin>", "<unlock>"]);
    }

    #[test]
    fn test_rule_labels_supplied() {
        let resource = ResourceConfig::new("user").with_auth();
        let mut labels = LabelMap::new();
        labels.insert("<admin>".to_string(), Label::plain("< Admin Panel >"));
        let pairs = traits(&Feature::Schema(resource), Some(&labels)).unwrap();
        assert!(pairs.contains(&("<admin>".to_string(), Label::plain("< Admin Panel >"))));
        assert!(pairs.contains(&("<unlock>".to_string(), Label::plain("<unlock>"))));
    }

    #[test]
    fn test_endpoints_become_traits() {
        let noop: crate::domain::resource::EndpointHandler = Arc::new(|_| Ok(()));
        let mut skipped = EndpointConfig::new(Method::Get, "/internal", noop.clone());
        skipped.warding = WardSetting::Always(false);
        let resource = ResourceConfig::new("order").with_endpoints(vec![
            EndpointConfig::new(Method::Post, "/submit", noop),
            skipped,
        ]);
        let pairs = traits(&Feature::Schema(resource), None).unwrap();
        assert_eq!(keys(pairs), vec!["/submit"]);
    }

    #[test]
    fn test_lookup_skips_undefined_features() {
        let features = vec![
            synopsis("report", &[("export", None)]),
            Feature::Schema(ResourceConfig::new("hidden").with_warding(WardSetting::Always(false))),
        ];
        let map = lookup(&features, None);
        assert!(map.contains_key("report"));
        assert!(!map.contains_key("hidden"));
    }

    #[test]
    fn test_feature_value_sentinel() {
        let fv = FeatureValue {
            feature: "order".to_string(),
            traits: vec![],
            verbs: vec![Verb::Read],
        };
        assert_eq!(fv.traits_or_sentinel(), vec!["_"]);
    }
}
