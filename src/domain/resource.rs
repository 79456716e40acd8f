//! Declarative resource descriptors consumed and decorated by the engine
//!
//! A [`ResourceConfig`] describes a record collection, a singleton resource
//! or a set of callable endpoints as plain data. The warden fills the access
//! slots; the schema framework that registers the result is external.

use super::label::{Label, Labels};
use super::role::{RecordId, Requester};
use super::verb::{Method, Verb};
use crate::error::Result;
use crate::policy::{Access, AccessContext, CustomAccess};
use crate::repository::Persistence;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A selectable option: value plus display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPair {
    pub value: String,
    pub label: Label,
}

impl OptionPair {
    pub fn new(value: impl Into<String>, label: impl Into<Label>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Whether an object opts into automatic warding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WardSetting {
    /// No explicit setting; the parent's resolved value applies.
    #[default]
    Default,
    /// Total override, regardless of verb.
    Always(bool),
    /// Per-verb overrides; absent verbs fall back to the parent's value.
    PerVerb(BTreeMap<Verb, bool>),
}

/// An access slot on a resource or field.
#[derive(Clone)]
pub enum AccessEntry {
    /// Installed by the warden.
    Generated(Access),
    /// Declared by the resource author. Receives the generated base checker
    /// as an explicit argument and may delegate to it.
    Custom(CustomAccess),
    /// A custom predicate the warden has paired with its generated base
    /// checker.
    Wrapped { custom: CustomAccess, base: Access },
}

impl AccessEntry {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&AccessContext<'_>, &Access) -> bool + Send + Sync + 'static,
    {
        AccessEntry::Custom(Arc::new(f))
    }

    /// Evaluates the entry. A custom predicate not yet paired with a base
    /// checker gets a deny-all base.
    pub fn evaluate(&self, ctx: &AccessContext<'_>) -> bool {
        match self {
            AccessEntry::Generated(access) => access(ctx),
            AccessEntry::Wrapped { custom, base } => custom(ctx, base),
            AccessEntry::Custom(custom) => {
                let deny: Access = Arc::new(|_| false);
                custom(ctx, &deny)
            }
        }
    }
}

/// The verb-keyed access slots of a resource.
#[derive(Clone, Default)]
pub struct AccessSlots {
    pub create: Option<AccessEntry>,
    pub read: Option<AccessEntry>,
    pub update: Option<AccessEntry>,
    pub delete: Option<AccessEntry>,
    /// Admin-panel access; only meaningful on authenticable resources.
    pub admin: Option<AccessEntry>,
    /// Account-unlock access; only meaningful on authenticable resources.
    pub unlock: Option<AccessEntry>,
}

impl AccessSlots {
    pub fn verb(&self, verb: Verb) -> Option<&AccessEntry> {
        match verb {
            Verb::Create => self.create.as_ref(),
            Verb::Read => self.read.as_ref(),
            Verb::Update => self.update.as_ref(),
            Verb::Delete => self.delete.as_ref(),
        }
    }

    pub fn set_verb(&mut self, verb: Verb, entry: Option<AccessEntry>) {
        match verb {
            Verb::Create => self.create = entry,
            Verb::Read => self.read = entry,
            Verb::Update => self.update = entry,
            Verb::Delete => self.delete = entry,
        }
    }
}

/// The create/read/update slots of a field.
#[derive(Clone, Default)]
pub struct FieldAccessSlots {
    pub create: Option<AccessEntry>,
    pub read: Option<AccessEntry>,
    pub update: Option<AccessEntry>,
}

impl FieldAccessSlots {
    pub fn verb(&self, verb: Verb) -> Option<&AccessEntry> {
        match verb {
            Verb::Create => self.create.as_ref(),
            Verb::Read => self.read.as_ref(),
            Verb::Update => self.update.as_ref(),
            Verb::Delete => None,
        }
    }

    pub fn set_verb(&mut self, verb: Verb, entry: Option<AccessEntry>) {
        match verb {
            Verb::Create => self.create = entry,
            Verb::Read => self.read = entry,
            Verb::Update => self.update = entry,
            Verb::Delete => {}
        }
    }
}

/// Computes a field's value from its sibling data in a pre-validation step.
pub type FieldBeforeValidate = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Arguments of a resource-level pre-validation hook.
pub struct BeforeValidateArgs<'a> {
    /// Inbound record data; the hook returns it, possibly modified.
    pub data: Option<Value>,
    /// Request path that triggered the write.
    pub path: &'a str,
    pub persistence: &'a dyn Persistence,
}

pub type BeforeValidateHook = Arc<
    dyn for<'a> Fn(BeforeValidateArgs<'a>) -> BoxFuture<'a, Result<Option<Value>>> + Send + Sync,
>;

/// Arguments of a resource-level pre-deletion hook.
pub struct BeforeDeleteArgs<'a> {
    pub id: &'a RecordId,
    pub persistence: &'a dyn Persistence,
}

pub type BeforeDeleteHook =
    Arc<dyn for<'a> Fn(BeforeDeleteArgs<'a>) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Lifecycle hooks of a resource.
#[derive(Clone, Default)]
pub struct ResourceHooks {
    pub before_validate: Vec<BeforeValidateHook>,
    pub before_delete: Vec<BeforeDeleteHook>,
}

/// The kind of data a field carries. Rendering is external; these are data
/// shapes only.
#[derive(Clone)]
pub enum FieldKind {
    Text,
    Checkbox {
        default_value: bool,
    },
    Json,
    Select {
        options: Vec<OptionPair>,
        has_many: bool,
        default_value: Vec<String>,
    },
    Relationship {
        to: String,
        has_many: bool,
    },
    Array {
        fields: Vec<FieldConfig>,
    },
    /// A multi-select whose option list is keyed by the current value of a
    /// sibling field.
    Cascading {
        reference: String,
        options: BTreeMap<String, Vec<OptionPair>>,
    },
}

/// Admin-surface knobs of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAdmin {
    /// Direct edits disabled in the admin surface.
    pub disabled: bool,
    /// Rendered read-only/deemphasized.
    pub shy: bool,
}

/// A data-bearing field of a resource.
#[derive(Clone)]
pub struct FieldConfig {
    pub name: String,
    pub label: Option<Label>,
    pub kind: FieldKind,
    pub required: bool,
    pub unique: bool,
    pub index: bool,
    pub access: FieldAccessSlots,
    pub warding: WardSetting,
    pub admin: FieldAdmin,
    pub before_validate: Option<FieldBeforeValidate>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            required: false,
            unique: false,
            index: false,
            access: FieldAccessSlots::default(),
            warding: WardSetting::default(),
            admin: FieldAdmin::default(),
            before_validate: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_warding(mut self, warding: WardSetting) -> Self {
        self.warding = warding;
        self
    }
}

/// A request flowing through an endpoint's handler chain.
pub struct EndpointRequest {
    pub requester: Option<Requester>,
    pub id: Option<RecordId>,
    /// Slug of the resource the endpoint belongs to.
    pub resource: Option<String>,
    pub path: String,
    /// The raw generated checker, injected ahead of the handlers when the
    /// endpoint opts out of automatic enforcement so the handler can consult
    /// it voluntarily.
    pub warding: Option<Access>,
}

impl EndpointRequest {
    pub fn access_context(&self) -> AccessContext<'_> {
        AccessContext {
            requester: self.requester.as_ref(),
            id: self.id.as_ref(),
            resource: self.resource.as_deref(),
            path: &self.path,
        }
    }
}

/// A step of an endpoint's handler chain.
pub type EndpointHandler = Arc<dyn Fn(&mut EndpointRequest) -> Result<()> + Send + Sync>;

/// A callable endpoint of a resource.
#[derive(Clone)]
pub struct EndpointConfig {
    pub method: Method,
    pub path: String,
    pub handlers: Vec<EndpointHandler>,
    pub warding: WardSetting,
}

impl EndpointConfig {
    pub fn new(method: Method, path: impl Into<String>, handler: EndpointHandler) -> Self {
        Self {
            method,
            path: path.into(),
            handlers: vec![handler],
            warding: WardSetting::default(),
        }
    }

    /// Runs the handler chain in order, stopping at the first failure.
    pub fn handle(&self, req: &mut EndpointRequest) -> Result<()> {
        for handler in &self.handlers {
            handler(req)?;
        }
        Ok(())
    }
}

/// Admin-surface knobs of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAdmin {
    pub use_as_title: Option<String>,
}

/// A declarative resource: a record collection, singleton or endpoint host.
#[derive(Clone)]
pub struct ResourceConfig {
    pub slug: String,
    pub labels: Option<Labels>,
    /// Authenticable resources additionally expose the reserved rule traits.
    pub auth: bool,
    pub fields: Vec<FieldConfig>,
    pub endpoints: Vec<EndpointConfig>,
    pub access: AccessSlots,
    pub warding: WardSetting,
    pub hooks: ResourceHooks,
    pub admin: ResourceAdmin,
}

impl ResourceConfig {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            labels: None,
            auth: false,
            fields: Vec::new(),
            endpoints: Vec::new(),
            access: AccessSlots::default(),
            warding: WardSetting::default(),
            hooks: ResourceHooks::default(),
            admin: ResourceAdmin::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldConfig>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_auth(mut self) -> Self {
        self.auth = true;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<EndpointConfig>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_warding(mut self, warding: WardSetting) -> Self {
        self.warding = warding;
        self
    }
}
