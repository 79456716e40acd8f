//! The decoration engine
//!
//! [`Warden`] wires generated access predicates into a resource tree:
//! create/read/update at resource and field level, delete/admin/unlock for
//! top-level resources, and guard steps on endpoint handler chains. Existing
//! custom predicates are kept and paired with the generated base checker;
//! opt-outs resolve through [`should`].

pub mod should;

pub use should::should;

use crate::domain::resource::{
    AccessEntry, EndpointConfig, ResourceConfig, WardSetting,
};
use crate::domain::role::Spec;
use crate::domain::rule::Rule;
use crate::domain::verb::Verb;
use crate::error::AppError;
use crate::policy::{check, Access, Expectation};
use std::sync::Arc;

/// Warden of the north!
pub struct Warden {
    spec: Spec,
}

impl Warden {
    pub fn new(spec: Spec) -> Self {
        Self { spec }
    }

    /// Decorates the given resource. `top_level` resources additionally get
    /// the delete predicate and, when authenticable, admin/unlock.
    ///
    /// Warding twice is safe: generated entries are replaced and wrapped
    /// custom entries are re-paired with an equivalent base checker.
    pub fn ward(&self, mut resource: ResourceConfig, top_level: bool) -> ResourceConfig {
        if top_level {
            resource = self.resource_specific(resource);
        }

        resource = self.cru(resource);
        resource = self.fields(resource);
        self.endpoints(resource)
    }

    /// Wards the delete/admin/unlock slots of a top-level resource.
    ///
    /// Admin and unlock are not verbs, so their opt-out resolves without
    /// one: a per-verb map cannot suppress just these two slots; use
    /// `WardSetting::Always(false)` to opt the whole resource out.
    fn resource_specific(&self, mut resource: ResourceConfig) -> ResourceConfig {
        let slug = resource.slug.clone();

        resource.access.delete = self.ck(
            Expectation::feature(&slug).with_verbs([Verb::Delete]),
            resource.access.delete.take(),
            &resource.warding,
            Some(Verb::Delete),
            true,
        );

        if resource.auth {
            resource.access.admin = self.ck(
                Expectation::feature(&slug).with_traits([Rule::Admin.as_str()]),
                resource.access.admin.take(),
                &resource.warding,
                None,
                true,
            );
            resource.access.unlock = self.ck(
                Expectation::feature(&slug).with_traits([Rule::Unlock.as_str()]),
                resource.access.unlock.take(),
                &resource.warding,
                None,
                true,
            );
        }

        resource
    }

    /// Wards the create/read/update slots at resource level.
    fn cru(&self, mut resource: ResourceConfig) -> ResourceConfig {
        let slug = resource.slug.clone();

        for verb in [Verb::Create, Verb::Read, Verb::Update] {
            let entry = self.ck(
                Expectation::feature(&slug).with_verbs([verb]),
                resource.access.verb(verb).cloned(),
                &resource.warding,
                Some(verb),
                true,
            );
            resource.access.set_verb(verb, entry);
        }

        resource
    }

    /// Wards the create/read/update slots of every field, using the
    /// resource's resolved setting as the fallback.
    fn fields(&self, mut resource: ResourceConfig) -> ResourceConfig {
        let slug = resource.slug.clone();
        let parent = resource.warding.clone();

        for field in &mut resource.fields {
            for verb in [Verb::Create, Verb::Read, Verb::Update] {
                let entry = self.ck(
                    Expectation::feature(&slug)
                        .with_traits([field.name.as_str()])
                        .with_verbs([verb]),
                    field.access.verb(verb).cloned(),
                    &field.warding,
                    Some(verb),
                    should(&parent, Some(verb), true),
                );
                field.access.set_verb(verb, entry);
            }
        }

        resource
    }

    /// Wards every endpoint: a guard step for opted-in endpoints, a
    /// context-injected checker for opted-out ones.
    fn endpoints(&self, mut resource: ResourceConfig) -> ResourceConfig {
        let slug = resource.slug.clone();
        let parent = resource.warding.clone();

        for endpoint in &mut resource.endpoints {
            let verb = endpoint.method.verb();
            let ck = check(
                Expectation::feature(&slug)
                    .with_traits([endpoint.path.as_str()])
                    .with_verbs([verb]),
                self.spec.clone(),
            );

            if !should(&endpoint.warding, Some(verb), should(&parent, Some(verb), true)) {
                // the endpoint rejects automatic enforcement; hand it the raw
                // checker to consult voluntarily
                Self::inject(endpoint, ck);
                continue;
            }

            Self::guard(endpoint, ck);
        }

        resource
    }

    fn inject(endpoint: &mut EndpointConfig, ck: Access) {
        endpoint.handlers.insert(
            0,
            Arc::new(move |req| {
                req.warding = Some(ck.clone());
                Ok(())
            }),
        );
    }

    fn guard(endpoint: &mut EndpointConfig, ck: Access) {
        let path = endpoint.path.clone();
        endpoint.handlers.insert(
            0,
            Arc::new(move |req| {
                if ck(&req.access_context()) {
                    return Ok(());
                }
                tracing::debug!(path = %path, "endpoint guard denied access");
                Err(AppError::Forbidden(path.clone()))
            }),
        );
    }

    /// Resolves a single access slot: replaces generated entries, pairs
    /// custom entries with the generated base checker, and leaves the slot
    /// empty when warding is opted out.
    fn ck(
        &self,
        ex: Expectation,
        current: Option<AccessEntry>,
        setting: &WardSetting,
        verb: Option<Verb>,
        pshould: bool,
    ) -> Option<AccessEntry> {
        let base = check(ex, self.spec.clone());

        match current {
            Some(AccessEntry::Custom(custom)) | Some(AccessEntry::Wrapped { custom, .. }) => {
                Some(AccessEntry::Wrapped { custom, base })
            }
            Some(AccessEntry::Generated(_)) | None => {
                if should(setting, verb, pshould) {
                    Some(AccessEntry::Generated(base))
                } else {
                    // warding rejected
                    None
                }
            }
        }
    }
}
