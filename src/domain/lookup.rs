//! The compiled feature lookup table

use super::feature::FeatureValue;
use super::verb::Verb;
use std::collections::{BTreeMap, BTreeSet};

/// Trait key a feature-level grant (empty traits) is stored under.
pub const FEATURE_LEVEL: &str = "_";

/// The lookup table of a role: feature -> trait -> verbs.
///
/// Always recomputed from the full [`FeatureValue`] list; never merged in
/// place.
pub type Lookup = BTreeMap<String, BTreeMap<String, BTreeSet<Verb>>>;

/// Compresses the given grants into a [`Lookup`] for O(1) queries.
///
/// A grant with no traits is stored under the [`FEATURE_LEVEL`] sentinel.
/// Verb sets union, so the result does not depend on grant order and feeding
/// the same list twice yields an identical table.
pub fn to_lookup(fvs: &[FeatureValue]) -> Lookup {
    let mut lookup = Lookup::new();

    for fv in fvs {
        let traits = fv.traits_or_sentinel();
        let feature = lookup.entry(fv.feature.clone()).or_default();
        for t in traits {
            feature
                .entry(t.to_string())
                .or_default()
                .extend(fv.verbs.iter().copied());
        }
    }

    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fv(feature: &str, traits: &[&str], verbs: &[Verb]) -> FeatureValue {
        FeatureValue {
            feature: feature.to_string(),
            traits: traits.iter().map(|s| s.to_string()).collect(),
            verbs: verbs.to_vec(),
        }
    }

    #[test]
    fn test_to_lookup_basic() {
        let lookup = to_lookup(&[fv("order", &["status"], &[Verb::Read, Verb::Update])]);
        let verbs = &lookup["order"]["status"];
        assert!(verbs.contains(&Verb::Read));
        assert!(verbs.contains(&Verb::Update));
        assert_eq!(verbs.len(), 2);
    }

    #[test]
    fn test_to_lookup_sentinel_for_empty_traits() {
        let lookup = to_lookup(&[fv("order", &[], &[Verb::Read])]);
        assert!(lookup["order"].contains_key(FEATURE_LEVEL));
    }

    #[test]
    fn test_to_lookup_unions_verbs_across_entries() {
        let lookup = to_lookup(&[
            fv("order", &["status"], &[Verb::Read]),
            fv("order", &["status"], &[Verb::Update]),
        ]);
        assert_eq!(lookup["order"]["status"].len(), 2);
    }

    #[test]
    fn test_to_lookup_idempotent() {
        let fvs = vec![
            fv("order", &["status", "total"], &[Verb::Read]),
            fv("user", &[], &[Verb::Update, Verb::Read]),
        ];
        let once = to_lookup(&fvs);
        let doubled: Vec<_> = fvs.iter().chain(fvs.iter()).cloned().collect();
        assert_eq!(once, to_lookup(&doubled));
    }

    #[test]
    fn test_to_lookup_order_insensitive() {
        let a = vec![
            fv("order", &["status"], &[Verb::Read]),
            fv("order", &["total"], &[Verb::Update]),
            fv("user", &["email"], &[Verb::Read]),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(to_lookup(&a), to_lookup(&b));
    }

    #[test]
    fn test_to_lookup_deterministic_serialization() {
        let fvs = vec![
            fv("zeta", &["z"], &[Verb::Delete, Verb::Create]),
            fv("alpha", &["a"], &[Verb::Read]),
        ];
        let one = serde_json::to_string(&to_lookup(&fvs)).unwrap();
        let two = serde_json::to_string(&to_lookup(&fvs)).unwrap();
        assert_eq!(one, two);
    }
}
