//! Opt-out resolution
//!
//! The single source of truth for whether automatic warding applies to an
//! object and verb. Callers thread the parent's resolved value in as
//! `fallback`, forming the field -> resource -> global-default-true chain.

use crate::domain::resource::WardSetting;
use crate::domain::verb::Verb;

/// Resolves whether the given setting opts into warding for the given verb.
///
/// An explicit boolean overrides everything. A per-verb map answers for the
/// given verb and falls back for absent verbs. The fallback only applies
/// when a verb is supplied; a verbless query without an explicit setting
/// stays opted in.
pub fn should(setting: &WardSetting, verb: Option<Verb>, fallback: bool) -> bool {
    match (setting, verb) {
        (WardSetting::Always(b), _) => *b,
        (WardSetting::PerVerb(map), Some(v)) => map.get(&v).copied().unwrap_or(fallback),
        (WardSetting::Default, Some(_)) => fallback,
        (WardSetting::PerVerb(_), None) | (WardSetting::Default, None) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn per_verb(entries: &[(Verb, bool)]) -> WardSetting {
        WardSetting::PerVerb(entries.iter().copied().collect::<BTreeMap<_, _>>())
    }

    #[rstest]
    #[case(WardSetting::Always(false), Some(Verb::Create), true, false)]
    #[case(WardSetting::Always(false), None, true, false)]
    #[case(WardSetting::Always(true), Some(Verb::Delete), false, true)]
    #[case(WardSetting::Default, Some(Verb::Read), true, true)]
    #[case(WardSetting::Default, Some(Verb::Read), false, false)]
    #[case(WardSetting::Default, None, false, true)]
    #[case(WardSetting::Default, None, true, true)]
    fn test_should_overrides_and_defaults(
        #[case] setting: WardSetting,
        #[case] verb: Option<Verb>,
        #[case] fallback: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(should(&setting, verb, fallback), expected);
    }

    #[test]
    fn test_per_verb_entry_and_fallback() {
        let setting = per_verb(&[(Verb::Create, false)]);
        assert!(!should(&setting, Some(Verb::Create), true));
        // 'read' is absent from the map; the fallback answers
        assert!(should(&setting, Some(Verb::Read), true));
        assert!(!should(&setting, Some(Verb::Read), false));
    }

    #[test]
    fn test_default_without_verb_ignores_fallback() {
        // the fallback only speaks for verbed queries; a verbless query
        // with no explicit setting stays opted in
        assert!(should(&WardSetting::Default, None, false));
    }

    #[test]
    fn test_per_verb_without_verb_is_true() {
        let setting = per_verb(&[(Verb::Create, false), (Verb::Read, false)]);
        assert!(should(&setting, None, false));
    }
}
