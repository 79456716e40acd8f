//! Idempotent population and bootstrap initialization
//!
//! Population is find-or-create on a unique key (role name / user email),
//! best-effort only: concurrent first-time initializers racing on the same
//! key can create duplicates, and no retry is attempted.

use crate::config::merge;
use crate::domain::feature::FeatureValue;
use crate::domain::lookup::to_lookup;
use crate::domain::role::{RecordId, Spec, ACTIVE, EMAIL, FEATURES, LOOKUP, NAME, ROOT};
use crate::error::Result;
use crate::repository::{Persistence, Where};
use serde_json::{json, Value};
use validator::Validate;

/// Finds the single record matching the filter, if any.
pub async fn has(
    persistence: &dyn Persistence,
    slug: &str,
    filter: Where,
) -> Result<Option<RecordId>> {
    let found = persistence.find(slug, &filter, 1).await?;
    Ok(found.records.into_iter().next().map(|r| r.id))
}

/// A role to populate.
#[derive(Debug, Clone, Validate)]
pub struct RolePopulate {
    #[validate(length(min = 1))]
    pub name: String,
    pub features: Vec<FeatureValue>,
}

/// A user to populate.
#[derive(Debug, Clone, Validate)]
pub struct UserPopulate {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub roles: Vec<RecordId>,
}

/// Extra record data the host may inject during initialization.
#[derive(Debug, Clone, Default)]
pub struct InitializationExtra {
    pub role: Option<Value>,
    pub user: Option<Value>,
}

/// Populates roles and users against a persistence collaborator.
#[derive(Debug, Clone)]
pub struct Populate {
    spec: Spec,
}

impl Populate {
    pub fn new(spec: Spec) -> Self {
        Self { spec }
    }

    /// Find-or-create a role by name. Returns the existing id when present;
    /// the created record writes both the matrix and its recomputed lookup.
    pub async fn role(
        &self,
        persistence: &dyn Persistence,
        input: RolePopulate,
        extra: Option<Value>,
    ) -> Result<RecordId> {
        input.validate()?;

        if let Some(id) = has(
            persistence,
            &self.spec.role,
            Where::equals(NAME, input.name.clone()),
        )
        .await?
        {
            tracing::debug!(role = %input.name, id = %id, "role already populated");
            return Ok(id);
        }

        let lookup = to_lookup(&input.features);
        let mut data = extra.unwrap_or_else(|| json!({}));
        merge::merge(
            &mut data,
            &json!({
                NAME: input.name,
                FEATURES: input.features,
                LOOKUP: lookup,
            }),
        );

        let created = persistence.create(&self.spec.role, data).await?;
        tracing::info!(role = %self.spec.role, id = %created.id, "populated role");
        Ok(created.id)
    }

    /// Find-or-create a user by email.
    pub async fn user(
        &self,
        persistence: &dyn Persistence,
        input: UserPopulate,
        extra: Option<Value>,
    ) -> Result<RecordId> {
        input.validate()?;

        if let Some(id) = has(
            persistence,
            &self.spec.user,
            Where::equals(EMAIL, input.email.clone()),
        )
        .await?
        {
            tracing::debug!(email = %input.email, id = %id, "user already populated");
            return Ok(id);
        }

        let mut data = extra.unwrap_or_else(|| json!({}));
        merge::merge(
            &mut data,
            &json!({
                EMAIL: input.email,
                "password": input.password,
                ACTIVE: true,
                self.spec.role.clone(): input.roles,
            }),
        );

        let created = persistence.create(&self.spec.user, data).await?;
        tracing::info!(user = %self.spec.user, id = %created.id, "populated user");
        Ok(created.id)
    }
}

/// Bootstraps the root role and, when credentials are supplied, the root
/// user referencing it. Role population happens before user population.
#[derive(Debug, Clone)]
pub struct Initializer {
    populate: Populate,
    /// Every trait of every discovered feature, with the full verb set.
    grants: Vec<FeatureValue>,
}

impl Initializer {
    pub fn new(populate: Populate, grants: Vec<FeatureValue>) -> Self {
        Self { populate, grants }
    }

    pub fn grants(&self) -> &[FeatureValue] {
        &self.grants
    }

    pub async fn run(
        &self,
        persistence: &dyn Persistence,
        root: Option<&crate::config::RootCredentials>,
        extra: Option<&InitializationExtra>,
    ) -> Result<()> {
        let role = self
            .populate
            .role(
                persistence,
                RolePopulate {
                    name: ROOT.to_string(),
                    features: self.grants.clone(),
                },
                extra.and_then(|e| e.role.clone()),
            )
            .await?;

        let root = match root {
            Some(root) => root,
            None => return Ok(()),
        };

        self.populate
            .user(
                persistence,
                UserPopulate {
                    email: root.email.clone(),
                    password: root.password.clone(),
                    roles: vec![role],
                },
                extra.and_then(|e| e.user.clone()),
            )
            .await?;

        Ok(())
    }
}
