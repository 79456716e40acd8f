//! Synthesis of the role and user resources
//!
//! [`Warding`] builds the two resources the engine introduces: a role
//! carrying the permission matrix and its compiled lookup, and an
//! authenticable user carrying the active flag and the role relationship.
//! It also wires their lifecycle hooks and hands out the populate and
//! initialize entry points.

pub mod populate;

pub use populate::{has, InitializationExtra, Initializer, Populate, RolePopulate, UserPopulate};

use crate::config::WardingOptions;
use crate::domain::feature::{self, Feature, FeatureValue, Synopsis};
use crate::domain::label::{Label, LabelMap, Labels};
use crate::domain::lookup::to_lookup;
use crate::domain::resource::{
    BeforeDeleteArgs, BeforeDeleteHook, BeforeValidateArgs, BeforeValidateHook, FieldConfig,
    FieldKind, OptionPair, ResourceConfig, WardSetting,
};
use crate::domain::role::{ACTIVE, EMAIL, FEATURES, LOOKUP, NAME, ROOT};
use crate::domain::verb::Verb;
use crate::error::AppError;
use crate::repository::Where;
use crate::warden::Warden;
use serde_json::Value;
use std::sync::Arc;

/// The path a first-time self-registration arrives on.
const FIRST_REGISTER: &str = "/first-register";

/// The result of [`Warding::build`].
pub struct Built {
    pub user: ResourceConfig,
    pub role: ResourceConfig,
    pub warden: Warden,
    pub populate: Populate,
    pub initializer: Initializer,
    pub initialization_extra: Option<InitializationExtra>,
}

/// Builds the role-based resource pair from the discovered feature set.
pub struct Warding {
    options: WardingOptions,
}

impl Warding {
    pub fn new(options: WardingOptions) -> Self {
        Self { options }
    }

    /// Synthesizes the user and role resources over the given features. The
    /// two synthesized resources join the feature set themselves: the user
    /// schema-backed, the role as a synopsis (its matrix and lookup fields
    /// must not auto-derive traits).
    pub fn build(&self, features: Vec<Feature>) -> Built {
        let spec = self.options.spec();

        let user = self.user_resource();

        let mut all = features;
        all.push(Feature::Schema(user.clone()));
        all.push(Feature::Synopsis(self.role_synopsis()));

        let role = self.role_resource(&all);

        // the root role is granted every trait of every feature
        let grants: Vec<FeatureValue> = all
            .iter()
            .filter_map(|f| {
                let pairs = feature::traits(f, None)?;
                Some(FeatureValue {
                    feature: f.slug().to_string(),
                    traits: pairs.into_iter().map(|(key, _)| key).collect(),
                    verbs: Verb::ALL.to_vec(),
                })
            })
            .collect();

        let populate = Populate::new(spec.clone());
        tracing::debug!(
            user = %user.slug,
            role = %role.slug,
            features = all.len(),
            "built warding resources"
        );

        Built {
            user,
            role,
            warden: Warden::new(spec),
            initializer: Initializer::new(populate.clone(), grants),
            populate,
            initialization_extra: None,
        }
    }

    fn label(&self, key: &str) -> Option<Label> {
        self.options.label.get(key).cloned()
    }

    /// The synthesized user resource: active flag, role relationship, extra
    /// fields, and the first-registration hook.
    fn user_resource(&self) -> ResourceConfig {
        let role_slug = self.options.role.slug.clone();

        let mut active = FieldConfig::new(
            ACTIVE,
            FieldKind::Checkbox {
                default_value: true,
            },
        );
        active.required = true;
        active.admin.shy = true;
        active.label = self.label(ACTIVE);

        let mut roles = FieldConfig::new(
            role_slug.clone(),
            FieldKind::Relationship {
                to: role_slug.clone(),
                has_many: true,
            },
        );
        roles.index = true;
        roles.admin.shy = true;
        roles.label = self
            .options
            .role
            .tag
            .as_ref()
            .and_then(|tag| tag.singular.clone());

        let mut fields = vec![active, roles];
        fields.extend(self.options.user_fields.iter().cloned());

        let mut user = Self::create(
            &self.options.user.slug,
            self.options.user.tag.clone(),
            fields,
            EMAIL,
        );
        user.auth = true;
        user.hooks.before_validate = vec![Self::first_register_hook(role_slug)];
        user
    }

    /// Assigns the root role to a user arriving through first registration.
    fn first_register_hook(role_slug: String) -> BeforeValidateHook {
        Arc::new(move |args: BeforeValidateArgs<'_>| {
            let role_slug = role_slug.clone();
            Box::pin(async move {
                let data = match args.data {
                    Some(data) if args.path == FIRST_REGISTER => data,
                    other => return Ok(other),
                };

                let mut data = data;
                let root = has(args.persistence, &role_slug, Where::equals(NAME, ROOT)).await?;
                if let (Some(object), Some(id)) = (data.as_object_mut(), root) {
                    object.insert(role_slug.clone(), serde_json::to_value(&id)?);
                }
                Ok(Some(data))
            })
        })
    }

    /// The synthesized role resource: unique name, permission matrix,
    /// compiled lookup, extra fields, and the deletion guard.
    fn role_resource(&self, features: &[Feature]) -> ResourceConfig {
        let mut name = FieldConfig::text(NAME);
        name.required = true;
        name.unique = true;
        name.index = true;
        name.label = self.label("roleName");

        let mut fields = vec![name];
        fields.extend(self.matrix_fields(features));
        fields.extend(self.options.role_fields.iter().cloned());

        let mut role = Self::create(
            &self.options.role.slug,
            self.options.role.tag.clone(),
            fields,
            NAME,
        );
        role.hooks.before_delete = vec![Self::delete_guard(
            self.options.user.slug.clone(),
            self.options.role.slug.clone(),
        )];
        role
    }

    /// Refuses to delete a role as long as any user still references it.
    fn delete_guard(user_slug: String, role_slug: String) -> BeforeDeleteHook {
        Arc::new(move |args: BeforeDeleteArgs<'_>| {
            let user_slug = user_slug.clone();
            let role_slug = role_slug.clone();
            Box::pin(async move {
                let id = serde_json::to_value(args.id)?;
                let referenced = has(
                    args.persistence,
                    &user_slug,
                    Where {
                        field: role_slug.clone(),
                        equals: id,
                    },
                )
                .await?;

                if referenced.is_some() {
                    return Err(AppError::still_in_use(&role_slug));
                }
                Ok(())
            })
        })
    }

    /// The permission-matrix array field and the derived lookup field.
    fn matrix_fields(&self, features: &[Feature]) -> Vec<FieldConfig> {
        let feature_options: Vec<OptionPair> = features
            .iter()
            .map(|f| OptionPair {
                value: f.slug().to_string(),
                label: f.label().cloned().unwrap_or_else(|| Label::plain(f.slug())),
            })
            .collect();

        let mut feature_select = FieldConfig::new(
            "feature",
            FieldKind::Select {
                options: feature_options,
                has_many: false,
                default_value: Vec::new(),
            },
        );
        feature_select.label = self.label("feature");

        let mut verbs = FieldConfig::new(
            "verbs",
            FieldKind::Select {
                options: Verb::ALL
                    .iter()
                    .map(|v| OptionPair {
                        value: v.as_str().to_string(),
                        label: self
                            .label(v.as_str())
                            .unwrap_or_else(|| Label::plain(v.as_str())),
                    })
                    .collect(),
                has_many: true,
                default_value: Verb::ALL.iter().map(|v| v.as_str().to_string()).collect(),
            },
        );
        verbs.label = self.label("verbs");

        let mut traits = FieldConfig::new(
            "traits",
            FieldKind::Cascading {
                reference: "feature".to_string(),
                options: feature::lookup(features, Some(&self.options.label)),
            },
        );
        traits.label = self.label("traits");

        let mut matrix = FieldConfig::new(
            FEATURES,
            FieldKind::Array {
                fields: vec![feature_select, verbs, traits],
            },
        );
        matrix.required = true;
        matrix.label = self.label(FEATURES);

        // the lookup is derived; never directly edited, never warded
        let mut lookup = FieldConfig::new(LOOKUP, FieldKind::Json);
        lookup.admin.disabled = true;
        lookup.warding = WardSetting::Always(false);
        lookup.before_validate = Some(Arc::new(|sibling: &Value| {
            let fvs: Vec<FeatureValue> = match sibling.get(FEATURES) {
                Some(value) => serde_json::from_value(value.clone())?,
                None => Vec::new(),
            };
            Ok(serde_json::to_value(to_lookup(&fvs))?)
        }));

        vec![matrix, lookup]
    }

    /// The role's own feature: name, matrix, and any extra role fields.
    fn role_synopsis(&self) -> Synopsis {
        let mut traits: Vec<(String, Option<Label>)> = vec![
            (NAME.to_string(), self.label("roleName")),
            (FEATURES.to_string(), self.label(FEATURES)),
        ];
        traits.extend(
            self.options
                .role_fields
                .iter()
                .filter_map(|f| feature::pick(f, &feature::PERIPHERALS))
                .map(|(key, label)| (key, Some(label))),
        );

        Synopsis {
            slug: self.options.role.slug.clone(),
            traits,
            label: self
                .options
                .role
                .tag
                .as_ref()
                .and_then(|tag| tag.singular.clone()),
        }
    }

    /// Creates a resource shell from options: slug, sanitized labels and
    /// the admin title field.
    fn create(
        slug: &str,
        tag: Option<Labels>,
        fields: Vec<FieldConfig>,
        title: &str,
    ) -> ResourceConfig {
        let mut resource = ResourceConfig::new(slug).with_fields(fields);
        resource.labels = tag.map(Labels::sanitize);
        resource.admin.use_as_title = Some(title.to_string());
        resource
    }
}
