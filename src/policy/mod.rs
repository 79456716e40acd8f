//! Centralized access-check policy
//!
//! Evaluation is pure and synchronous over an already-loaded
//! [`AccessContext`]; a denial is a `false` result, never an error.

use crate::domain::role::{RecordId, Requester, Role, Spec, ACTIVE};
use crate::domain::rule::Rule;
use crate::domain::verb::Verb;
use std::sync::Arc;

/// Paths that are unconditionally treated as self-service.
const SELF_PATHS: [&str; 2] = ["/me", "/login"];

/// The expected feature + traits + verbs combination of an access query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    pub feature: String,
    pub traits: Vec<String>,
    pub verbs: Vec<Verb>,
}

impl Expectation {
    pub fn feature(slug: impl Into<String>) -> Self {
        Self {
            feature: slug.into(),
            ..Default::default()
        }
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_verbs(mut self, verbs: impl IntoIterator<Item = Verb>) -> Self {
        self.verbs = verbs.into_iter().collect();
        self
    }
}

/// Everything an access predicate may consult.
#[derive(Clone, Copy)]
pub struct AccessContext<'a> {
    pub requester: Option<&'a Requester>,
    /// Target record id, if the operation addresses one.
    pub id: Option<&'a RecordId>,
    /// Slug of the resource being operated on.
    pub resource: Option<&'a str>,
    /// Request path.
    pub path: &'a str,
}

/// A generated access predicate.
pub type Access = Arc<dyn Fn(&AccessContext<'_>) -> bool + Send + Sync>;

/// A caller-declared predicate. Receives the generated base checker as an
/// explicit argument and may delegate to it.
pub type CustomAccess = Arc<dyn Fn(&AccessContext<'_>, &Access) -> bool + Send + Sync>;

/// Checks that every element of `list` is included in (or excluded from)
/// `expected`. Vacuously true for an empty list.
fn expect<T, U>(included: bool, list: &[T], expected: &[U]) -> bool
where
    T: PartialEq<U>,
{
    list.iter()
        .all(|x| expected.iter().any(|e| x == e) == included)
}

/// The self-service exemption: an active user may read/update their own
/// non-sensitive profile data without an explicit grant.
fn operation_me(spec: &Spec, ctx: &AccessContext<'_>, ex: &Expectation) -> bool {
    if ex.feature != spec.user && ctx.resource != Some(spec.user.as_str()) {
        return false;
    }

    // a '/me' or a '/login' is always self-service
    if SELF_PATHS.contains(&ctx.path) {
        return true;
    }

    let requester = match ctx.requester {
        Some(requester) => requester,
        None => return false,
    };
    if ctx.id != Some(&requester.id) {
        return false;
    }

    // self-service never covers the rules, the role relationship or the
    // active flag, and only the read/update verbs
    let restricted = [
        Rule::Admin.as_str().to_string(),
        Rule::Unlock.as_str().to_string(),
        spec.role.clone(),
        ACTIVE.to_string(),
    ];
    expect(false, &ex.traits, &restricted) && expect(true, &ex.verbs, &[Verb::Read, Verb::Update])
}

/// Whether the given role authorizes the expectation.
pub fn allow(role: &Role, ex: &Expectation) -> bool {
    let feature = match role.lookup.get(&ex.feature) {
        Some(feature) => feature,
        None => return false,
    };

    if ex.traits.is_empty() {
        // no specific traits expected; the verbs granted anywhere in the
        // feature count, except through the reserved rules
        let granted: Vec<Verb> = feature
            .iter()
            .filter(|(key, _)| !Rule::is_rule(key))
            .flat_map(|(_, verbs)| verbs.iter().copied())
            .collect();
        return expect(true, &ex.verbs, &granted);
    }

    ex.traits.iter().all(|t| match feature.get(t) {
        Some(granted) => {
            let granted: Vec<Verb> = granted.iter().copied().collect();
            expect(true, &ex.verbs, &granted)
        }
        None => false,
    })
}

/// Creates an access predicate for the given expectation.
pub fn check(ex: Expectation, spec: Spec) -> Access {
    Arc::new(move |ctx| {
        // no requester, no further
        let requester = match ctx.requester {
            Some(requester) if requester.active => requester,
            _ => return false,
        };

        // operating on me myself is totally fine
        if operation_me(&spec, ctx, &ex) {
            return true;
        }

        // no role, no further
        if requester.roles.is_empty() {
            return false;
        }

        requester.roles.iter().any(|role| allow(role, &ex))
    })
}
