//! Domain models of the warding engine

pub mod feature;
pub mod label;
pub mod lookup;
pub mod resource;
pub mod role;
pub mod rule;
pub mod verb;

pub use feature::{Feature, FeatureValue, Synopsis, PERIPHERALS};
pub use label::{Label, LabelMap, Labels};
pub use lookup::{to_lookup, Lookup, FEATURE_LEVEL};
pub use resource::{
    AccessEntry, AccessSlots, BeforeDeleteArgs, BeforeDeleteHook, BeforeValidateArgs,
    BeforeValidateHook, EndpointConfig, EndpointHandler, EndpointRequest, FieldAccessSlots,
    FieldAdmin, FieldBeforeValidate, FieldConfig, FieldKind, OptionPair, ResourceAdmin,
    ResourceConfig, ResourceHooks, WardSetting,
};
pub use role::{RecordId, Requester, Role, Spec, ROOT};
pub use rule::Rule;
pub use verb::{Method, Verb};
