//! Warding - role-based authorization over declarative resources
//!
//! This crate derives and enforces fine-grained permissions over a declared
//! set of resources without per-resource access logic. A permission matrix
//! of feature x trait x verb is stored per role; the engine synthesizes
//! create/read/update/delete (plus admin/unlock) predicates for every
//! resource, field and endpoint, and bootstraps the root role and user.

pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod provision;
pub mod repository;
pub mod warden;

// Re-export commonly used types
pub use config::WardingOptions;
pub use error::{AppError, Result};

use domain::feature::Feature;
use domain::resource::ResourceConfig;
use provision::{InitializationExtra, Initializer, Populate, Warding};
use warden::Warden;

/// The declared resource set the engine takes over.
#[derive(Clone, Default)]
pub struct Schema {
    /// Singleton resources.
    pub globals: Vec<ResourceConfig>,
    /// Record collections.
    pub collections: Vec<ResourceConfig>,
}

/// The warded resource set plus the engine handles the host keeps.
pub struct WardedSchema {
    /// Slug of the resource backing admin authentication, when active.
    pub admin_user: Option<String>,
    pub globals: Vec<ResourceConfig>,
    pub collections: Vec<ResourceConfig>,
    pub warden: Option<Warden>,
    pub populate: Option<Populate>,
    /// Run this during the host's bootstrap hook.
    pub initializer: Option<Initializer>,
    pub initialization_extra: Option<InitializationExtra>,
}

impl WardedSchema {
    fn untouched(schema: Schema) -> Self {
        Self {
            admin_user: None,
            globals: schema.globals,
            collections: schema.collections,
            warden: None,
            populate: None,
            initializer: None,
            initialization_extra: None,
        }
    }
}

/// Applies the warding engine to the given schema.
///
/// Collects every global, collection and declared synopsis as a feature,
/// synthesizes the user/role pair, and wards the entire tree. A muted
/// options set, or a schema without any feature, passes through untouched.
pub fn warding(options: WardingOptions, schema: Schema) -> WardedSchema {
    if options.mute {
        return WardedSchema::untouched(schema);
    }

    let mut features: Vec<Feature> = Vec::new();
    features.extend(schema.globals.iter().cloned().map(Feature::Schema));
    features.extend(schema.collections.iter().cloned().map(Feature::Schema));
    features.extend(options.ext.iter().cloned().map(Feature::Synopsis));

    if features.is_empty() {
        return WardedSchema::untouched(schema);
    }

    let user_slug = options.user.slug.clone();
    let transform = options.transform.clone();

    let mut built = Warding::new(options).build(features);
    if let Some(transform) = transform {
        built = transform(built);
    }

    let warden = built.warden;
    let globals = schema
        .globals
        .into_iter()
        .map(|g| warden.ward(g, false))
        .collect();
    let mut collections: Vec<ResourceConfig> = schema
        .collections
        .into_iter()
        .map(|c| warden.ward(c, true))
        .collect();
    collections.push(warden.ward(built.user, true));
    collections.push(warden.ward(built.role, true));

    WardedSchema {
        admin_user: Some(user_slug),
        globals,
        collections,
        warden: Some(warden),
        populate: Some(built.populate),
        initializer: Some(built.initializer),
        initialization_extra: built.initialization_extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_passes_through() {
        let mut options = config::defaults();
        options.mute = true;
        let schema = Schema {
            globals: vec![],
            collections: vec![ResourceConfig::new("order")],
        };
        let warded = warding(options, schema);
        assert!(warded.warden.is_none());
        assert_eq!(warded.collections.len(), 1);
        assert!(warded.collections[0].access.read.is_none());
    }

    #[test]
    fn test_empty_schema_passes_through() {
        let warded = warding(config::defaults(), Schema::default());
        assert!(warded.warden.is_none());
        assert!(warded.collections.is_empty());
    }

    #[test]
    fn test_warding_appends_user_and_role() {
        let schema = Schema {
            globals: vec![ResourceConfig::new("settings")],
            collections: vec![ResourceConfig::new("order")],
        };
        let warded = warding(config::defaults(), schema);

        assert_eq!(warded.admin_user.as_deref(), Some("user"));
        let slugs: Vec<&str> = warded.collections.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["order", "user", "role"]);

        // everything is decorated
        assert!(warded.globals[0].access.read.is_some());
        assert!(warded.globals[0].access.delete.is_none());
        for collection in &warded.collections {
            assert!(collection.access.read.is_some());
            assert!(collection.access.delete.is_some());
        }
    }
}
